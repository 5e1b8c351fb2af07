use log::warn;

use crate::notice::Notifier;
use crate::settings::SearchEngineType;
use crate::vault::SharedGraph;

/// One file matched by a search.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchResultFile {
	pub path: String,
}

impl SearchResultFile {
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}
}

/// What a search provider can do, fixed when it is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchCapabilities {
	/// Results are observed from the host's own search view as they trickle
	/// in, instead of being returned by [`SearchProvider::search`].
	pub passive: bool,
}

/// A source of files matching a query.
pub trait SearchProvider {
	fn capabilities(&self) -> SearchCapabilities;

	/// Files matching `query`. Passive providers return nothing here; their
	/// results arrive through observation.
	fn search(&self, query: &str) -> Vec<SearchResultFile>;
}

/// Case-insensitive substring match over canonical node paths.
#[derive(Debug)]
pub struct PathSearch {
	graph: SharedGraph,
}

impl PathSearch {
	pub fn new(graph: SharedGraph) -> Self {
		Self { graph }
	}
}

impl SearchProvider for PathSearch {
	fn capabilities(&self) -> SearchCapabilities {
		SearchCapabilities { passive: false }
	}

	fn search(&self, query: &str) -> Vec<SearchResultFile> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Vec::new();
		}
		self.graph
			.borrow()
			.nodes()
			.iter()
			.filter(|n| n.path().to_lowercase().contains(&needle))
			.map(|n| SearchResultFile::new(n.path()))
			.collect()
	}
}

/// Results come from the host search view; see [`SearchCapabilities::passive`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ObservedSearch;

impl SearchProvider for ObservedSearch {
	fn capabilities(&self) -> SearchCapabilities {
		SearchCapabilities { passive: true }
	}

	fn search(&self, _query: &str) -> Vec<SearchResultFile> {
		Vec::new()
	}
}

/// Pick the provider for the configured engine.
pub fn provider_for(
	kind: SearchEngineType,
	graph: SharedGraph,
	notifier: &dyn Notifier,
) -> Box<dyn SearchProvider> {
	match kind {
		SearchEngineType::Default => Box::new(PathSearch::new(graph)),
		SearchEngineType::BuiltIn => Box::new(ObservedSearch),
		SearchEngineType::Dataview => {
			warn!("dataview search is not available, using the default engine");
			notifier.notice("Dataview search is not available. Falling back to the default search engine.");
			Box::new(PathSearch::new(graph))
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::graph::{Graph, ResolvedLinks};
	use crate::notice::LogNotifier;
	use crate::vault::FileRecord;

	fn shared(paths: &[&str]) -> SharedGraph {
		let files: Vec<FileRecord> = paths.iter().map(|p| FileRecord::from_path(*p)).collect();
		Rc::new(RefCell::new(Graph::create_from_source(
			&files,
			&ResolvedLinks::new(),
		)))
	}

	#[test]
	fn path_search_matches_substring_ignoring_case() {
		let search = PathSearch::new(shared(&["Daily/mon.md", "notes/daily.md", "other.md"]));
		let found: Vec<String> = search.search(" DAILY ").into_iter().map(|f| f.path).collect();
		assert_eq!(found, vec!["Daily/mon.md", "notes/daily.md"]);
		assert!(search.search("   ").is_empty());
	}

	#[test]
	fn provider_selection_by_capability() {
		let graph = shared(&[]);
		assert!(!provider_for(SearchEngineType::Default, graph.clone(), &LogNotifier)
			.capabilities()
			.passive);
		assert!(provider_for(SearchEngineType::BuiltIn, graph.clone(), &LogNotifier)
			.capabilities()
			.passive);
		assert!(!provider_for(SearchEngineType::Dataview, graph, &LogNotifier)
			.capabilities()
			.passive);
	}
}
