//! Derived graphs for global and local views.

use std::collections::HashSet;

use super::search::SearchResultFile;
use crate::graph::{Graph, Node};
use crate::settings::FilterSettings;

fn is_markdown(node: &Node) -> bool {
	node.path().ends_with(".md")
}

/// Paths the search restricts to, or `None` when nothing is restricted.
///
/// A blank query never restricts. A query whose results have not arrived
/// yet does not restrict either, so the view does not flash empty.
fn search_scope<'a>(
	filter: &FilterSettings,
	results: Option<&'a [SearchResultFile]>,
) -> Option<HashSet<&'a str>> {
	if filter.search_query.trim().is_empty() {
		return None;
	}
	results.map(|files| files.iter().map(|f| f.path.as_str()).collect())
}

/// The global view: attachments and search first, then orphans of what is
/// left.
pub fn global_view(
	canonical: &Graph,
	filter: &FilterSettings,
	results: Option<&[SearchResultFile]>,
) -> Graph {
	let scope = search_scope(filter, results);
	let matched = canonical.filter(|node| {
		(filter.show_attachments || is_markdown(node))
			&& scope.as_ref().is_none_or(|s| s.contains(node.path()))
	});
	if filter.show_orphans {
		matched
	} else {
		matched.filter(|node| !node.is_orphan())
	}
}

/// The local view around `focus`. The focus node survives every filter.
pub fn local_view(
	canonical: &Graph,
	focus: &str,
	filter: &FilterSettings,
	results: Option<&[SearchResultFile]>,
) -> Graph {
	let local = canonical.local_graph(focus, filter.local_options());
	let scope = search_scope(filter, results);
	let matched = local.filter(|node| {
		node.id() == focus
			|| ((filter.show_attachments || is_markdown(node))
				&& scope.as_ref().is_none_or(|s| s.contains(node.path())))
	});
	if filter.show_orphans {
		matched
	} else {
		matched.filter(|node| node.id() == focus || !node.is_orphan())
	}
}
