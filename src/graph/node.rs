use std::collections::BTreeSet;

use super::link::Link;

/// Visual weight given to nodes built from host files.
pub const DEFAULT_NODE_VAL: f64 = 10.0;

/// One file-like entity in the graph. The id is the path.
///
/// Identity fields never change after construction; only the link set does,
/// and only through the owning [`Graph`](super::Graph).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	id: String,
	name: String,
	path: String,
	val: f64,
	links: BTreeSet<Link>,
}

impl Node {
	pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
		Self::with_val(name, path, DEFAULT_NODE_VAL)
	}

	/// Negative or NaN weights are clamped to zero.
	pub fn with_val(name: impl Into<String>, path: impl Into<String>, val: f64) -> Self {
		let path = path.into();
		Self {
			id: path.clone(),
			name: name.into(),
			path,
			val: if val > 0.0 { val } else { 0.0 },
			links: BTreeSet::new(),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn val(&self) -> f64 {
		self.val
	}

	/// Incoming and outgoing links touching this node.
	pub fn links(&self) -> impl Iterator<Item = &Link> {
		self.links.iter()
	}

	pub fn has_link(&self, link: &Link) -> bool {
		self.links.contains(link)
	}

	pub fn degree(&self) -> usize {
		self.links.len()
	}

	/// A node with zero incident links.
	pub fn is_orphan(&self) -> bool {
		self.links.is_empty()
	}

	/// Copy of this node with an empty link set.
	pub(super) fn detached(&self) -> Self {
		Self {
			id: self.id.clone(),
			name: self.name.clone(),
			path: self.path.clone(),
			val: self.val,
			links: BTreeSet::new(),
		}
	}

	pub(super) fn attach(&mut self, link: Link) {
		self.links.insert(link);
	}

	pub(super) fn detach(&mut self, link: &Link) {
		self.links.remove(link);
	}

	pub(super) fn detach_all_touching(&mut self, id: &str) {
		self.links.retain(|l| !l.touches(id));
	}
}
