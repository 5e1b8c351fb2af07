use crate::graph::{Node, NodeGroup, group_color};
use crate::settings::{DagOrientation, DisplaySettings, GroupSetting};

/// Color of nodes no group claims.
pub const DEFAULT_NODE_COLOR: &str = "#7f7f7f";

const MAX_NODE_WEIGHT: f64 = 5.0;

/// Visual attributes a sink can apply without touching the layout.
#[derive(Clone, Debug, Default)]
pub struct GraphStyle {
	pub display: DisplaySettings,
	groups: Vec<NodeGroup>,
}

impl GraphStyle {
	pub fn new(display: DisplaySettings, groups: &[GroupSetting]) -> Self {
		let mut style = Self {
			display,
			groups: Vec::new(),
		};
		style.set_groups(groups);
		style
	}

	/// Recompile groups. Blank queries are skipped. Returns the
	/// `(query, error)` of every query that failed to compile.
	pub fn set_groups(&mut self, groups: &[GroupSetting]) -> Vec<(String, String)> {
		self.groups = groups
			.iter()
			.map(|g| NodeGroup::new(&g.query, &g.color))
			.filter(NodeGroup::is_active)
			.collect();
		self.groups
			.iter()
			.filter_map(|g| g.error().map(|e| (g.query().to_string(), e.to_string())))
			.collect()
	}

	pub fn groups(&self) -> &[NodeGroup] {
		&self.groups
	}

	pub fn node_color(&self, node: &Node) -> &str {
		group_color(&self.groups, node).unwrap_or(DEFAULT_NODE_COLOR)
	}

	/// Name or full path, with or without the extension.
	pub fn node_label(&self, node: &Node) -> String {
		let text = if self.display.show_full_path {
			node.path()
		} else {
			node.name()
		};
		if self.display.show_extension {
			return text.to_string();
		}
		match text.rsplit_once('.') {
			Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
				stem.to_string()
			}
			_ => text.to_string(),
		}
	}

	/// Grows with degree and saturates: `node_size * cbrt(1 + 5 * (1 - e^(-degree / 5)))`.
	pub fn node_radius(&self, node: &Node) -> f64 {
		let weight = MAX_NODE_WEIGHT * (1.0 - (-(node.degree() as f64) / 5.0).exp());
		self.display.node_size * (1.0 + weight).cbrt()
	}

	pub fn forces(&self) -> ForceSettings {
		ForceSettings::from(&self.display)
	}
}

/// The display settings that feed the layout simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceSettings {
	pub link_distance: f64,
	pub node_repulsion: f64,
	pub dag_orientation: DagOrientation,
}

impl Default for ForceSettings {
	fn default() -> Self {
		Self::from(&DisplaySettings::default())
	}
}

impl From<&DisplaySettings> for ForceSettings {
	fn from(display: &DisplaySettings) -> Self {
		Self {
			link_distance: display.link_distance,
			node_repulsion: display.node_repulsion,
			dag_orientation: display.dag_orientation,
		}
	}
}

/// `#rrggbb` (or `#rgb`) to a CSS `rgba()` string. Malformed input gives black.
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
	let hex = hex.trim_start_matches('#');
	let expanded: String = if hex.len() == 3 {
		hex.chars().flat_map(|c| [c, c]).collect()
	} else {
		hex.to_string()
	};
	let channel = |i: usize| {
		expanded
			.get(i..i + 2)
			.and_then(|s| u8::from_str_radix(s, 16).ok())
			.unwrap_or(0)
	};
	format!(
		"rgba({}, {}, {}, {})",
		channel(0),
		channel(2),
		channel(4),
		alpha
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Graph, Link};

	fn style() -> GraphStyle {
		GraphStyle::new(DisplaySettings::default(), &[])
	}

	#[test]
	fn label_modes() {
		let node = Node::new("today.md", "daily/today.md");
		let mut style = style();
		assert_eq!(style.node_label(&node), "today");
		style.display.show_extension = true;
		assert_eq!(style.node_label(&node), "today.md");
		style.display.show_full_path = true;
		assert_eq!(style.node_label(&node), "daily/today.md");
		style.display.show_extension = false;
		assert_eq!(style.node_label(&node), "daily/today");
	}

	#[test]
	fn label_without_extension_is_kept_whole() {
		let style = style();
		assert_eq!(style.node_label(&Node::new("README", "README")), "README");
		assert_eq!(style.node_label(&Node::new(".hidden", ".hidden")), ".hidden");
	}

	#[test]
	fn radius_grows_with_degree() {
		let g = Graph::from_parts(
			vec![Node::new("a", "a"), Node::new("b", "b"), Node::new("c", "c")],
			vec![Link::new("a", "b"), Link::new("a", "c")],
		)
		.unwrap();
		let style = style();
		let a = style.node_radius(g.get_node_by_id("a").unwrap());
		let b = style.node_radius(g.get_node_by_id("b").unwrap());
		let lone = style.node_radius(&Node::new("z", "z"));
		assert_eq!(lone, style.display.node_size);
		assert!(a > b && b > lone);
	}

	#[test]
	fn group_colors_and_invalid_groups() {
		let mut style = style();
		let invalid = style.set_groups(&[
			GroupSetting {
				query: "daily".into(),
				color: "#ff0000".into(),
			},
			GroupSetting {
				query: "".into(),
				color: "#00ff00".into(),
			},
			GroupSetting {
				query: "(".into(),
				color: "#0000ff".into(),
			},
		]);
		assert_eq!(invalid.len(), 1);
		assert_eq!(invalid[0].0, "(");
		assert_eq!(style.groups().len(), 2);
		assert_eq!(style.node_color(&Node::new("a", "daily/a.md")), "#ff0000");
		assert_eq!(style.node_color(&Node::new("a", "a.md")), DEFAULT_NODE_COLOR);
	}

	#[test]
	fn hex_conversion() {
		assert_eq!(hex_to_rgba("#ff8000", 0.5), "rgba(255, 128, 0, 0.5)");
		assert_eq!(hex_to_rgba("0f0", 1.0), "rgba(0, 255, 0, 1)");
		assert_eq!(hex_to_rgba("nope", 1.0), "rgba(0, 0, 0, 1)");
	}
}
