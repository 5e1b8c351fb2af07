use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use super::source::FileSource;
use crate::graph::{Graph, ResolvedLinks, diff_resolved_links};

/// The canonical graph, shared by every view that derives from it.
pub type SharedGraph = Rc<RefCell<Graph>>;

/// Keeps the shared canonical graph in step with the host's link cache.
///
/// The host fires a lot of resolve events that change nothing this graph
/// cares about, so a rebuild only happens when the file set or the set of
/// linked pairs actually moved. The shared handle is updated in place.
#[derive(Debug, Default)]
pub struct CanonicalGraph {
	graph: SharedGraph,
	resolved: Option<ResolvedLinks>,
	paths: Vec<String>,
	ready: bool,
	revision: u64,
}

impl CanonicalGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn handle(&self) -> SharedGraph {
		Rc::clone(&self.graph)
	}

	/// False until the host reports its link cache as fully resolved.
	pub fn is_ready(&self) -> bool {
		self.ready
	}

	/// Bumped on every rebuild.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// The host finished resolving every file. Returns whether the graph changed.
	pub fn on_resolved(&mut self, source: &dyn FileSource) -> bool {
		info!("link cache is ready");
		self.ready = true;
		self.refresh(source)
	}

	/// The host re-resolved some files. Ignored until the cache is ready.
	pub fn on_resolve_changed(&mut self, source: &dyn FileSource) -> bool {
		if !self.ready {
			debug!("resolve event before the cache is ready");
			return false;
		}
		self.refresh(source)
	}

	fn refresh(&mut self, source: &dyn FileSource) -> bool {
		let files = source.list_files();
		let resolved = source.resolved_links();

		let mut paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
		paths.sort();
		let files_changed = paths != self.paths;
		let links_changed = match &self.resolved {
			Some(old) => diff_resolved_links(old, &resolved).is_structural(),
			None => true,
		};
		if !files_changed && !links_changed {
			debug!("resolve event left the graph unchanged");
			return false;
		}

		let graph = Graph::create_from_source(&files, &resolved);
		info!(
			"rebuilt canonical graph: {} nodes, {} links",
			graph.node_count(),
			graph.link_count()
		);
		self.graph.borrow_mut().update(graph);
		self.resolved = Some(resolved);
		self.paths = paths;
		self.revision += 1;
		true
	}
}
