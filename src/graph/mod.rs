//! Indexed note graph: nodes, links, groups and derived sub-graphs.

mod error;
#[allow(clippy::module_inception)]
mod graph;
mod group;
mod link;
mod node;

pub use error::GraphError;
pub use graph::{Graph, LinkDirection, LocalGraphOptions};
pub use group::{NodeGroup, group_color};
pub use link::{Link, ResolvedLinkDiff, ResolvedLinks, diff_resolved_links};
pub use node::{DEFAULT_NODE_VAL, Node};
