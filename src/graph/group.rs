use log::warn;
use regex::{Regex, RegexBuilder};

use super::node::Node;

/// A path query mapped to a display color.
///
/// The query is compiled once per change. A query that fails to compile
/// leaves the group degraded: it matches nothing and reports the compile
/// error through [`NodeGroup::error`].
#[derive(Clone, Debug)]
pub struct NodeGroup {
	query: String,
	color: String,
	matcher: Matcher,
}

#[derive(Clone, Debug)]
enum Matcher {
	Empty,
	Compiled(Regex),
	Invalid(String),
}

impl NodeGroup {
	pub fn new(query: impl Into<String>, color: impl Into<String>) -> Self {
		let query = query.into();
		let matcher = compile(&query);
		Self {
			query,
			color: color.into(),
			matcher,
		}
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn color(&self) -> &str {
		&self.color
	}

	pub fn set_query(&mut self, query: impl Into<String>) {
		self.query = query.into();
		self.matcher = compile(&self.query);
	}

	pub fn set_color(&mut self, color: impl Into<String>) {
		self.color = color.into();
	}

	/// Case-insensitive test of the node path. Empty and invalid queries
	/// match nothing.
	pub fn matches(&self, node: &Node) -> bool {
		match &self.matcher {
			Matcher::Compiled(regex) => regex.is_match(node.path()),
			Matcher::Empty | Matcher::Invalid(_) => false,
		}
	}

	/// False for blank queries, which the group list skips.
	pub fn is_active(&self) -> bool {
		!matches!(self.matcher, Matcher::Empty)
	}

	/// The compile error of a malformed query.
	pub fn error(&self) -> Option<&str> {
		match &self.matcher {
			Matcher::Invalid(err) => Some(err),
			_ => None,
		}
	}
}

/// Color of the last group matching `node`.
pub fn group_color<'a>(groups: &'a [NodeGroup], node: &Node) -> Option<&'a str> {
	groups
		.iter()
		.rev()
		.find(|g| g.matches(node))
		.map(NodeGroup::color)
}

fn sanitize(query: &str) -> &str {
	let query = query.trim();
	query.strip_prefix("./").unwrap_or(query)
}

fn compile(query: &str) -> Matcher {
	let pattern = sanitize(query);
	if pattern.is_empty() {
		return Matcher::Empty;
	}
	match RegexBuilder::new(pattern).case_insensitive(true).build() {
		Ok(regex) => Matcher::Compiled(regex),
		Err(err) => {
			warn!("group query {query:?} is not a valid pattern: {err}");
			Matcher::Invalid(err.to_string())
		}
	}
}
