//! Persisted settings document.
//!
//! Field names are camelCase on the wire so the document stays compatible
//! with the host plugin's data file.

use serde::{Deserialize, Serialize};

use crate::graph::{LinkDirection, LocalGraphOptions};

/// Which kind of view a graph setting belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
	Global,
	Local,
}

/// Search backends the host can offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchEngineType {
	Dataview,
	#[default]
	Default,
	BuiltIn,
}

/// Layered layout orientation. `Null` turns it off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DagOrientation {
	Td,
	Bu,
	Lr,
	Rl,
	Zout,
	Zin,
	Radialout,
	Radialin,
	#[default]
	Null,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
	pub search_query: String,
	pub show_orphans: bool,
	pub show_attachments: bool,
	/// Local graphs only.
	#[serde(default = "default_depth")]
	pub depth: u32,
	/// Local graphs only.
	#[serde(default)]
	pub link_type: LinkDirection,
}

fn default_depth() -> u32 {
	1
}

impl Default for FilterSettings {
	fn default() -> Self {
		Self {
			search_query: String::new(),
			show_orphans: true,
			show_attachments: false,
			depth: default_depth(),
			link_type: LinkDirection::Both,
		}
	}
}

impl FilterSettings {
	pub fn local_options(&self) -> LocalGraphOptions {
		LocalGraphOptions {
			depth: self.depth,
			link_type: self.link_type,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSetting {
	pub query: String,
	pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
	pub node_size: f64,
	pub link_thickness: f64,
	pub link_distance: f64,
	pub node_repulsion: f64,
	pub node_hover_color: String,
	pub node_hover_neighbour_color: String,
	pub link_hover_color: String,
	pub show_extension: bool,
	pub show_full_path: bool,
	pub show_center_coordinates: bool,
	pub show_link_arrow: bool,
	pub dont_move_when_drag: bool,
	#[serde(default)]
	pub dag_orientation: DagOrientation,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			node_size: 4.0,
			link_thickness: 1.5,
			link_distance: 100.0,
			node_repulsion: 28.0,
			node_hover_color: "#ff0000".into(),
			node_hover_neighbour_color: "#00ff00".into(),
			link_hover_color: "#0000ff".into(),
			show_extension: false,
			show_full_path: false,
			show_center_coordinates: true,
			show_link_arrow: true,
			dont_move_when_drag: false,
			dag_orientation: DagOrientation::Null,
		}
	}
}

/// Everything one graph view is configured by.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSettings {
	pub filter: FilterSettings,
	pub groups: Vec<GroupSetting>,
	pub display: DisplaySettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSetting {
	pub title: String,
	pub id: String,
	pub setting: GraphSettings,
	#[serde(rename = "type")]
	pub graph_type: GraphType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSetting {
	pub max_node_number: usize,
	pub search_engine: SearchEngineType,
}

impl Default for PluginSetting {
	fn default() -> Self {
		Self {
			max_node_number: 1000,
			search_engine: SearchEngineType::Default,
		}
	}
}

/// The whole persisted document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
	pub saved_settings: Vec<SavedSetting>,
	pub temporary_local_graph_setting: GraphSettings,
	pub temporary_global_graph_setting: GraphSettings,
	pub plugin_setting: PluginSetting,
}

impl Setting {
	pub fn graph_settings(&self, graph_type: GraphType) -> &GraphSettings {
		match graph_type {
			GraphType::Global => &self.temporary_global_graph_setting,
			GraphType::Local => &self.temporary_local_graph_setting,
		}
	}

	pub fn graph_settings_mut(&mut self, graph_type: GraphType) -> &mut GraphSettings {
		match graph_type {
			GraphType::Global => &mut self.temporary_global_graph_setting,
			GraphType::Local => &mut self.temporary_local_graph_setting,
		}
	}

	/// Reject numbers the views cannot work with. Returns the offending field.
	pub fn validate(&self) -> Result<(), String> {
		let graphs = self
			.saved_settings
			.iter()
			.map(|s| &s.setting)
			.chain([
				&self.temporary_local_graph_setting,
				&self.temporary_global_graph_setting,
			]);
		for graph in graphs {
			let d = &graph.display;
			for (name, value) in [
				("nodeSize", d.node_size),
				("linkThickness", d.link_thickness),
				("linkDistance", d.link_distance),
				("nodeRepulsion", d.node_repulsion),
			] {
				if !value.is_finite() || value < 0.0 {
					return Err(format!("display.{name} = {value}"));
				}
			}
		}
		Ok(())
	}
}
