use std::collections::HashMap;
use std::fmt;

/// Resolved links as reported by the host: `source path -> target path -> weight`.
pub type ResolvedLinks = HashMap<String, HashMap<String, u32>>;

/// A directed edge between two nodes, identified by its `(source, target)` pair.
///
/// The same value is stored in the owning graph's link list and in the link
/// set of both endpoint nodes, so equality doubles as identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
	source: String,
	target: String,
}

impl Link {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn target(&self) -> &str {
		&self.target
	}

	/// `"<source>-><target>"`, the key duplicate detection reports.
	pub fn key(&self) -> String {
		self.to_string()
	}

	/// True when `id` is either endpoint.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if `id` is an endpoint at all.
	pub fn other_end(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

impl fmt::Display for Link {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}->{}", self.source, self.target)
	}
}

/// Structural difference between two resolved-link snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedLinkDiff {
	/// Pairs present only in the newer snapshot.
	pub added: Vec<(String, String)>,
	/// Pairs present only in the older snapshot.
	pub removed: Vec<(String, String)>,
	/// Pairs present in both with a different weight.
	pub reweighted: Vec<(String, String)>,
}

impl ResolvedLinkDiff {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty() && self.reweighted.is_empty()
	}

	/// Whether the set of linked pairs changed. Weight changes do not count.
	pub fn is_structural(&self) -> bool {
		!self.added.is_empty() || !self.removed.is_empty()
	}
}

/// Compare two resolved-link snapshots pair by pair.
///
/// Sources mapping to an empty target map are treated the same as absent
/// sources. All output lists are sorted.
pub fn diff_resolved_links(old: &ResolvedLinks, new: &ResolvedLinks) -> ResolvedLinkDiff {
	let mut diff = ResolvedLinkDiff::default();

	for (source, new_targets) in new {
		let old_targets = old.get(source);
		for (target, weight) in new_targets {
			match old_targets.and_then(|t| t.get(target)) {
				None => diff.added.push((source.clone(), target.clone())),
				Some(old_weight) if old_weight != weight => {
					diff.reweighted.push((source.clone(), target.clone()))
				}
				Some(_) => {}
			}
		}
	}

	for (source, old_targets) in old {
		let new_targets = new.get(source);
		for target in old_targets.keys() {
			if !new_targets.is_some_and(|t| t.contains_key(target)) {
				diff.removed.push((source.clone(), target.clone()));
			}
		}
	}

	diff.added.sort();
	diff.removed.sort();
	diff.reweighted.sort();
	diff
}

#[cfg(test)]
mod tests {
	use super::*;

	fn resolved(pairs: &[(&str, &str, u32)]) -> ResolvedLinks {
		let mut map = ResolvedLinks::new();
		for &(s, t, w) in pairs {
			map.entry(s.to_string())
				.or_default()
				.insert(t.to_string(), w);
		}
		map
	}

	#[test]
	fn key_uses_arrow_notation() {
		assert_eq!(Link::new("a.md", "b.md").key(), "a.md->b.md");
	}

	#[test]
	fn other_end_of_self_loop_is_itself() {
		let link = Link::new("a.md", "a.md");
		assert_eq!(link.other_end("a.md"), Some("a.md"));
		assert_eq!(link.other_end("b.md"), None);
	}

	#[test]
	fn identical_snapshots_have_empty_diff() {
		let a = resolved(&[("a.md", "b.md", 1), ("b.md", "c.md", 2)]);
		assert!(diff_resolved_links(&a, &a.clone()).is_empty());
	}

	#[test]
	fn empty_target_map_equals_missing_source() {
		let mut a = resolved(&[("a.md", "b.md", 1)]);
		let b = a.clone();
		a.insert("c.md".into(), HashMap::new());
		assert!(diff_resolved_links(&a, &b).is_empty());
	}

	#[test]
	fn detects_added_removed_and_reweighted() {
		let old = resolved(&[("a.md", "b.md", 1), ("b.md", "c.md", 1)]);
		let new = resolved(&[("a.md", "b.md", 3), ("c.md", "a.md", 1)]);
		let diff = diff_resolved_links(&old, &new);
		assert_eq!(diff.added, vec![("c.md".to_string(), "a.md".to_string())]);
		assert_eq!(diff.removed, vec![("b.md".to_string(), "c.md".to_string())]);
		assert_eq!(diff.reweighted, vec![("a.md".to_string(), "b.md".to_string())]);
		assert!(diff.is_structural());
	}

	#[test]
	fn weight_only_change_is_not_structural() {
		let old = resolved(&[("a.md", "b.md", 1)]);
		let new = resolved(&[("a.md", "b.md", 2)]);
		let diff = diff_resolved_links(&old, &new);
		assert!(!diff.is_empty());
		assert!(!diff.is_structural());
	}
}
