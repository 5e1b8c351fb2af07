use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::link::{Link, ResolvedLinks};
use super::node::Node;
use crate::vault::FileRecord;

/// Which link directions a local graph follows outward from the focus node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
	Inlinks,
	Outlinks,
	#[default]
	Both,
}

/// How far and along which links a local graph reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalGraphOptions {
	pub depth: u32,
	pub link_type: LinkDirection,
}

impl Default for LocalGraphOptions {
	fn default() -> Self {
		Self {
			depth: 1,
			link_type: LinkDirection::Both,
		}
	}
}

/// Indexed node and link storage.
///
/// `nodes`/`links` and their indices are only ever changed together, so
/// every index entry points at the position holding the element with that
/// key. Derived graphs (`filter`, `local_graph`, `clone`) are independent
/// values; nothing done to them reaches back into the source.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<Link>,
	node_index: HashMap<String, usize>,
	link_index: HashMap<String, HashMap<String, usize>>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assemble a graph from explicit parts.
	///
	/// Link sets carried by the incoming nodes are discarded and rebuilt from
	/// `links`. Stops at the first duplicate node, duplicate link or link to
	/// an unknown node.
	pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, GraphError> {
		let mut graph = Self::default();
		for node in nodes {
			graph.add_node(node)?;
		}
		for link in links {
			graph.add_link(link)?;
		}
		Ok(graph)
	}

	/// Build the canonical graph from the host's file list and resolved links.
	///
	/// Targets (and sources) that are not among the files are dropped, as are
	/// repeated file paths. Link order follows file order, then target path.
	pub fn create_from_source(files: &[FileRecord], resolved: &ResolvedLinks) -> Self {
		let mut graph = Self::default();
		for file in files {
			if graph.node_index.contains_key(&file.path) {
				debug!("skipping repeated file {}", file.path);
				continue;
			}
			graph.index_node(Node::new(&file.name, &file.path));
		}

		let mut dropped = 0usize;
		for file in files {
			let Some(targets) = resolved.get(&file.path) else {
				continue;
			};
			let mut targets: Vec<&String> = targets.keys().collect();
			targets.sort();
			for target in targets {
				if !graph.node_index.contains_key(target.as_str()) {
					dropped += 1;
					continue;
				}
				if graph.get_link_by_ids(&file.path, target).is_none() {
					graph.index_link(Link::new(&file.path, target));
				}
			}
		}
		if dropped > 0 {
			debug!("dropped {dropped} dangling link targets");
		}
		graph
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	/// Ids are paths, so this is an index hit unless the caller passes a
	/// `./`-prefixed path, which falls back to a scan.
	pub fn get_node_by_path(&self, path: &str) -> Option<&Node> {
		self.get_node_by_id(path).or_else(|| {
			let trimmed = path.strip_prefix("./")?;
			self.nodes.iter().find(|n| n.path() == trimmed)
		})
	}

	pub fn get_link_by_ids(&self, source: &str, target: &str) -> Option<&Link> {
		self.link_index
			.get(source)
			.and_then(|targets| targets.get(target))
			.map(|&i| &self.links[i])
	}

	/// All outgoing links of `source`.
	pub fn get_links_from_node(&self, source: &str) -> Vec<&Link> {
		let Some(targets) = self.link_index.get(source) else {
			return Vec::new();
		};
		let mut positions: Vec<usize> = targets.values().copied().collect();
		positions.sort_unstable();
		positions.into_iter().map(|i| &self.links[i]).collect()
	}

	/// Outgoing and incoming links of `id`, in graph order.
	pub fn get_links_with_node(&self, id: &str) -> Vec<&Link> {
		let Some(node) = self.get_node_by_id(id) else {
			return Vec::new();
		};
		let mut positions: Vec<usize> = node
			.links()
			.filter_map(|l| self.link_position(l.source(), l.target()))
			.collect();
		positions.sort_unstable();
		positions.into_iter().map(|i| &self.links[i]).collect()
	}

	/// Nodes one link away from `id` in either direction.
	pub fn neighbors(&self, id: &str) -> Vec<&Node> {
		let Some(node) = self.get_node_by_id(id) else {
			return Vec::new();
		};
		let mut seen = HashSet::new();
		node.links()
			.filter_map(|l| l.other_end(id))
			.filter(|&other| other != id && seen.insert(other))
			.filter_map(|other| self.get_node_by_id(other))
			.collect()
	}

	pub fn orphans(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter().filter(|n| n.is_orphan())
	}

	/// 1-hop induced subgraph around `id`; empty when `id` is unknown.
	pub fn get_local_graph(&self, id: &str) -> Graph {
		self.local_graph(id, LocalGraphOptions::default())
	}

	/// Induced subgraph of every node within `options.depth` hops of `id`,
	/// walking only the requested link directions.
	pub fn local_graph(&self, id: &str, options: LocalGraphOptions) -> Graph {
		let Some(start) = self.get_node_by_id(id) else {
			return Graph::default();
		};

		let mut keep: HashSet<&str> = HashSet::from([start.id()]);
		let mut frontier = vec![start];
		for _ in 0..options.depth {
			let mut next = Vec::new();
			for node in frontier {
				for link in node.links() {
					let neighbor = match options.link_type {
						LinkDirection::Outlinks if link.source() == node.id() => link.target(),
						LinkDirection::Inlinks if link.target() == node.id() => link.source(),
						LinkDirection::Both => match link.other_end(node.id()) {
							Some(other) => other,
							None => continue,
						},
						_ => continue,
					};
					if keep.insert(neighbor) {
						if let Some(n) = self.get_node_by_id(neighbor) {
							next.push(n);
						}
					}
				}
			}
			if next.is_empty() {
				break;
			}
			frontier = next;
		}

		self.subgraph(|node| keep.contains(node.id()))
	}

	/// Nodes satisfying `predicate` and the links between them.
	pub fn filter(&self, predicate: impl Fn(&Node) -> bool) -> Graph {
		self.subgraph(predicate)
	}

	/// Replace this graph's contents in place, keeping the object callers hold.
	pub fn update(&mut self, newer: Graph) {
		*self = newer;
	}

	pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
		if self.node_index.contains_key(node.id()) {
			return Err(GraphError::DuplicateNode(node.id().to_string()));
		}
		self.index_node(node.detached());
		Ok(())
	}

	pub fn add_link(&mut self, link: Link) -> Result<(), GraphError> {
		for id in [link.source(), link.target()] {
			if !self.node_index.contains_key(id) {
				return Err(GraphError::UnknownNode(id.to_string()));
			}
		}
		if self.get_link_by_ids(link.source(), link.target()).is_some() {
			return Err(GraphError::DuplicateLink { key: link.key() });
		}
		self.index_link(link);
		Ok(())
	}

	/// Remove a node and every link touching it. Returns the node with an
	/// emptied link set.
	pub fn remove_node(&mut self, id: &str) -> Option<Node> {
		let pos = self.node_index.remove(id)?;

		let touching: Vec<Link> = self.nodes[pos].links().cloned().collect();
		for link in &touching {
			if let Some(other) = link.other_end(id) {
				if let Some(&i) = self.node_index.get(other) {
					self.nodes[i].detach(link);
				}
			}
		}
		if !touching.is_empty() {
			self.links.retain(|l| !l.touches(id));
			self.rebuild_link_index();
		}

		let mut node = self.nodes.remove(pos);
		for (i, shifted) in self.nodes.iter().enumerate().skip(pos) {
			self.node_index.insert(shifted.id().to_string(), i);
		}
		node.detach_all_touching(id);
		Some(node)
	}

	pub fn remove_link(&mut self, source: &str, target: &str) -> Option<Link> {
		let pos = self.link_index.get_mut(source)?.remove(target)?;
		if self.link_index.get(source).is_some_and(HashMap::is_empty) {
			self.link_index.remove(source);
		}

		let link = self.links.remove(pos);
		for (i, shifted) in self.links.iter().enumerate().skip(pos) {
			if let Some(slot) = self
				.link_index
				.get_mut(shifted.source())
				.and_then(|t| t.get_mut(shifted.target()))
			{
				*slot = i;
			}
		}
		for id in [link.source(), link.target()] {
			if let Some(&i) = self.node_index.get(id) {
				self.nodes[i].detach(&link);
			}
		}
		Some(link)
	}

	/// Equal node id sets and equal link pair sets.
	///
	/// This is what decides whether a visualization needs a new graph;
	/// names and weights are not compared.
	pub fn compare(a: &Graph, b: &Graph) -> bool {
		if std::ptr::eq(a, b) {
			return true;
		}
		a.nodes.len() == b.nodes.len()
			&& a.links.len() == b.links.len()
			&& a.nodes.iter().all(|n| b.node_index.contains_key(n.id()))
			&& a.links
				.iter()
				.all(|l| b.get_link_by_ids(l.source(), l.target()).is_some())
	}

	/// Whether every index entry points at the element carrying its key and
	/// every node's link set agrees with the link list.
	pub fn is_consistent(&self) -> bool {
		let nodes_ok = self.node_index.len() == self.nodes.len()
			&& self
				.nodes
				.iter()
				.enumerate()
				.all(|(i, n)| self.node_index.get(n.id()) == Some(&i));

		let indexed_links: usize = self.link_index.values().map(HashMap::len).sum();
		let links_ok = indexed_links == self.links.len()
			&& self.links.iter().enumerate().all(|(i, l)| {
				self.link_position(l.source(), l.target()) == Some(i)
					&& [l.source(), l.target()]
						.iter()
						.all(|id| self.get_node_by_id(id).is_some_and(|n| n.has_link(l)))
			});

		let back_refs_ok = self.nodes.iter().all(|n| {
			n.links()
				.all(|l| l.touches(n.id()) && self.get_link_by_ids(l.source(), l.target()).is_some())
		});

		nodes_ok && links_ok && back_refs_ok
	}

	fn link_position(&self, source: &str, target: &str) -> Option<usize> {
		self.link_index.get(source)?.get(target).copied()
	}

	fn subgraph(&self, keep: impl Fn(&Node) -> bool) -> Graph {
		let mut graph = Graph::default();
		for node in self.nodes.iter().filter(|n| keep(n)) {
			graph.index_node(node.detached());
		}
		for link in &self.links {
			if graph.node_index.contains_key(link.source())
				&& graph.node_index.contains_key(link.target())
			{
				graph.index_link(link.clone());
			}
		}
		graph
	}

	// Callers have already checked the id is new.
	fn index_node(&mut self, node: Node) {
		self.node_index.insert(node.id().to_string(), self.nodes.len());
		self.nodes.push(node);
	}

	// Callers have already checked both endpoints exist and the pair is new.
	fn index_link(&mut self, link: Link) {
		let (Some(&s), Some(&t)) = (
			self.node_index.get(link.source()),
			self.node_index.get(link.target()),
		) else {
			return;
		};
		self.link_index
			.entry(link.source().to_string())
			.or_default()
			.insert(link.target().to_string(), self.links.len());
		self.nodes[s].attach(link.clone());
		self.nodes[t].attach(link.clone());
		self.links.push(link);
	}

	fn rebuild_link_index(&mut self) {
		self.link_index.clear();
		for (i, link) in self.links.iter().enumerate() {
			self.link_index
				.entry(link.source().to_string())
				.or_default()
				.insert(link.target().to_string(), i);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn files(paths: &[&str]) -> Vec<FileRecord> {
		paths.iter().map(|p| FileRecord::from_path(*p)).collect()
	}

	fn resolved(pairs: &[(&str, &str)]) -> ResolvedLinks {
		let mut map = ResolvedLinks::new();
		for &(s, t) in pairs {
			map.entry(s.to_string()).or_default().insert(t.to_string(), 1);
		}
		map
	}

	fn abc() -> Graph {
		Graph::create_from_source(
			&files(&["A.md", "B.md", "C.md"]),
			&resolved(&[("A.md", "B.md"), ("B.md", "C.md")]),
		)
	}

	fn ids(graph: &Graph) -> Vec<&str> {
		let mut ids: Vec<&str> = graph.nodes().iter().map(Node::id).collect();
		ids.sort();
		ids
	}

	fn keys(graph: &Graph) -> Vec<String> {
		let mut keys: Vec<String> = graph.links().iter().map(Link::key).collect();
		keys.sort();
		keys
	}

	#[test]
	fn builds_nodes_and_links_from_source() {
		let g = abc();
		assert_eq!(g.node_count(), 3);
		assert_eq!(keys(&g), vec!["A.md->B.md", "B.md->C.md"]);
		assert!(g.is_consistent());
		for node in g.nodes() {
			assert_eq!(g.get_node_by_id(node.id()), Some(node));
		}
	}

	#[test]
	fn dangling_targets_are_dropped() {
		let g = Graph::create_from_source(
			&files(&["A.md", "B.md"]),
			&resolved(&[("A.md", "B.md"), ("A.md", "missing.md"), ("ghost.md", "A.md")]),
		);
		assert_eq!(keys(&g), vec!["A.md->B.md"]);
		assert!(g.is_consistent());
	}

	#[test]
	fn repeated_files_become_one_node() {
		let g = Graph::create_from_source(&files(&["A.md", "A.md"]), &resolved(&[("A.md", "A.md")]));
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.link_count(), 1);
		assert!(g.is_consistent());
	}

	#[test]
	fn from_parts_rejects_duplicate_link() {
		let err = Graph::from_parts(
			vec![Node::new("a", "a.md"), Node::new("b", "b.md")],
			vec![Link::new("a.md", "b.md"), Link::new("a.md", "b.md")],
		)
		.unwrap_err();
		assert_eq!(
			err,
			GraphError::DuplicateLink {
				key: "a.md->b.md".into()
			}
		);
		assert_eq!(err.to_string(), "Duplicate link found: a.md->b.md");
	}

	#[test]
	fn from_parts_rejects_unknown_endpoint() {
		let err = Graph::from_parts(vec![Node::new("a", "a.md")], vec![Link::new("a.md", "b.md")])
			.unwrap_err();
		assert_eq!(err, GraphError::UnknownNode("b.md".into()));
	}

	#[test]
	fn lookups_miss_without_panicking() {
		let g = abc();
		assert!(g.get_node_by_id("nope").is_none());
		assert!(g.get_link_by_ids("A.md", "C.md").is_none());
		assert!(g.get_link_by_ids("nope", "A.md").is_none());
		assert!(g.get_links_from_node("nope").is_empty());
		assert!(g.get_links_with_node("nope").is_empty());
	}

	#[test]
	fn path_lookup_accepts_dot_slash_prefix() {
		let g = abc();
		assert_eq!(g.get_node_by_path("./B.md").map(Node::id), Some("B.md"));
	}

	#[test]
	fn links_with_node_cover_both_directions() {
		let g = abc();
		let with_b: Vec<String> = g.get_links_with_node("B.md").iter().map(|l| l.key()).collect();
		assert_eq!(with_b, vec!["A.md->B.md", "B.md->C.md"]);
		let from_b: Vec<String> = g.get_links_from_node("B.md").iter().map(|l| l.key()).collect();
		assert_eq!(from_b, vec!["B.md->C.md"]);
	}

	#[test]
	fn local_graph_of_middle_node() {
		let g = abc();
		let local = g.get_local_graph("B.md");
		assert_eq!(ids(&local), vec!["A.md", "B.md", "C.md"]);
		assert_eq!(keys(&local), vec!["A.md->B.md", "B.md->C.md"]);
		assert!(local.is_consistent());
	}

	#[test]
	fn local_graph_of_unknown_node_is_empty() {
		let local = abc().get_local_graph("Z.md");
		assert_eq!(local.node_count(), 0);
		assert_eq!(local.link_count(), 0);
	}

	#[test]
	fn local_graph_does_not_touch_source_link_sets() {
		let g = Graph::create_from_source(
			&files(&["A.md", "B.md", "C.md", "D.md"]),
			&resolved(&[("A.md", "B.md"), ("B.md", "C.md"), ("C.md", "D.md")]),
		);
		let before = g.clone();
		let local = g.get_local_graph("A.md");
		assert_eq!(ids(&local), vec!["A.md", "B.md"]);
		assert_eq!(local.get_node_by_id("B.md").map(Node::degree), Some(1));
		assert_eq!(g.get_node_by_id("B.md").map(Node::degree), Some(2));
		assert_eq!(g.nodes(), before.nodes());
	}

	#[test]
	fn local_graph_respects_depth_and_direction() {
		let g = Graph::create_from_source(
			&files(&["A.md", "B.md", "C.md", "D.md"]),
			&resolved(&[("A.md", "B.md"), ("B.md", "C.md"), ("D.md", "B.md")]),
		);
		let two_hops = g.local_graph(
			"A.md",
			LocalGraphOptions {
				depth: 2,
				link_type: LinkDirection::Both,
			},
		);
		assert_eq!(ids(&two_hops), vec!["A.md", "B.md", "C.md", "D.md"]);

		let out_only = g.local_graph(
			"B.md",
			LocalGraphOptions {
				depth: 1,
				link_type: LinkDirection::Outlinks,
			},
		);
		assert_eq!(ids(&out_only), vec!["B.md", "C.md"]);

		let in_only = g.local_graph(
			"B.md",
			LocalGraphOptions {
				depth: 1,
				link_type: LinkDirection::Inlinks,
			},
		);
		assert_eq!(ids(&in_only), vec!["A.md", "B.md", "D.md"]);

		let zero = g.local_graph(
			"B.md",
			LocalGraphOptions {
				depth: 0,
				link_type: LinkDirection::Both,
			},
		);
		assert_eq!(ids(&zero), vec!["B.md"]);
	}

	#[test]
	fn filter_keeps_links_between_survivors_only() {
		let g = abc();
		let filtered = g.filter(|n| n.id() != "C.md");
		assert_eq!(ids(&filtered), vec!["A.md", "B.md"]);
		assert_eq!(keys(&filtered), vec!["A.md->B.md"]);
		assert!(filtered.is_consistent());
		assert_eq!(g.node_count(), 3);
		assert_eq!(g.link_count(), 2);
		assert_eq!(g.get_node_by_id("C.md").map(Node::degree), Some(1));
	}

	#[test]
	fn remove_node_purges_touching_links() {
		let mut g = abc();
		let removed = g.remove_node("B.md").unwrap();
		assert_eq!(removed.degree(), 0);
		assert!(g.get_node_by_id("B.md").is_none());
		assert!(g.links().iter().all(|l| !l.touches("B.md")));
		assert!(g.get_links_from_node("B.md").is_empty());
		assert_eq!(g.get_node_by_id("A.md").map(Node::degree), Some(0));
		assert!(g.is_consistent());
		assert!(g.remove_node("B.md").is_none());
	}

	#[test]
	fn remove_link_keeps_indices_aligned() {
		let mut g = Graph::create_from_source(
			&files(&["A.md", "B.md", "C.md"]),
			&resolved(&[("A.md", "B.md"), ("A.md", "C.md"), ("B.md", "C.md")]),
		);
		let removed = g.remove_link("A.md", "B.md").unwrap();
		assert_eq!(removed.key(), "A.md->B.md");
		assert!(g.get_link_by_ids("A.md", "B.md").is_none());
		assert_eq!(g.get_link_by_ids("B.md", "C.md").map(Link::key).as_deref(), Some("B.md->C.md"));
		assert!(!g.get_node_by_id("B.md").unwrap().has_link(&removed));
		assert!(g.is_consistent());
		assert!(g.remove_link("A.md", "B.md").is_none());
	}

	#[test]
	fn mutation_sequence_stays_consistent() {
		let mut g = Graph::new();
		for p in ["a.md", "b.md", "c.md", "d.md"] {
			g.add_node(Node::new(p, p)).unwrap();
		}
		g.add_link(Link::new("a.md", "b.md")).unwrap();
		g.add_link(Link::new("c.md", "a.md")).unwrap();
		g.add_link(Link::new("d.md", "c.md")).unwrap();
		g.remove_node("a.md");
		g.add_node(Node::new("e.md", "e.md")).unwrap();
		g.add_link(Link::new("e.md", "d.md")).unwrap();
		g.remove_link("d.md", "c.md");
		assert!(g.is_consistent());
		for node in g.nodes() {
			assert_eq!(g.get_node_by_id(node.id()).map(Node::id), Some(node.id()));
		}
		assert_eq!(keys(&g), vec!["e.md->d.md"]);
	}

	#[test]
	fn add_node_rejects_duplicate_id() {
		let mut g = abc();
		assert_eq!(
			g.add_node(Node::new("A", "A.md")),
			Err(GraphError::DuplicateNode("A.md".into()))
		);
		assert!(g.is_consistent());
	}

	#[test]
	fn clone_is_independent() {
		let g = abc();
		let mut copy = g.clone();
		copy.remove_node("A.md");
		assert_eq!(g.node_count(), 3);
		assert!(g.get_link_by_ids("A.md", "B.md").is_some());

		let mut original = g;
		original.add_node(Node::new("D", "D.md")).unwrap();
		assert!(copy.get_node_by_id("D.md").is_none());
	}

	#[test]
	fn compare_is_structural() {
		let a = abc();
		assert!(Graph::compare(&a, &a));
		assert!(Graph::compare(&a, &a.clone()));
		assert!(Graph::compare(&Graph::new(), &Graph::new()));

		let mut fewer_links = a.filter(|_| true);
		fewer_links.remove_link("A.md", "B.md");
		assert!(!Graph::compare(&a, &fewer_links));

		let mut swapped = a.clone();
		swapped.remove_node("C.md");
		swapped.add_node(Node::new("D", "D.md")).unwrap();
		swapped.add_link(Link::new("B.md", "D.md")).unwrap();
		assert_eq!(swapped.node_count(), a.node_count());
		assert_eq!(swapped.link_count(), a.link_count());
		assert!(!Graph::compare(&a, &swapped));
	}

	#[test]
	fn update_replaces_contents() {
		let mut g = abc();
		g.update(Graph::new());
		assert!(g.is_empty());
		assert!(g.get_node_by_id("A.md").is_none());
	}
}
