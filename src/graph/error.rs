//! Errors raised while assembling or mutating a [`Graph`](super::Graph).

use thiserror::Error;

/// Construction and mutation failures.
///
/// Lookups never produce these; a missing node or link is an `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
	/// The same `(source, target)` pair appeared twice.
	#[error("Duplicate link found: {key}")]
	DuplicateLink { key: String },

	/// A node id was added twice.
	#[error("Duplicate node found: {0}")]
	DuplicateNode(String),

	/// A link endpoint does not exist in the graph.
	#[error("Unknown node: {0}")]
	UnknownNode(String),
}
