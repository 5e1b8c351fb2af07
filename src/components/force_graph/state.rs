use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::layout::{LEVEL_DISTANCE, dag_levels, layered_position};
use crate::graph::Graph;
use crate::settings::DagOrientation;
use crate::sync::{ForceSettings, GraphStyle, VisualizationSink};

/// Ticks the simulation runs after a reheat before it is left to rest.
pub const COOLDOWN_TICKS: u32 = 300;
/// Hit radius in world space; scales with zoom like the nodes.
pub const HIT_RADIUS: f64 = 12.0;
/// Screen distance a press may travel and still count as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

const SEED_RADIUS: f64 = 100.0;
const SEED_JITTER: f64 = 20.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hover is keyed by node id so it survives a rebind.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub highlight_t: f64,
	pub prev_node: Option<String>,
	pub prev_neighbors: HashSet<String>,
	delay_t: f64,
}

fn simulation_parameters(forces: &ForceSettings) -> SimulationParameters {
	SimulationParameters {
		force_charge: (forces.node_repulsion * 5.0) as f32,
		force_spring: (0.05 * 100.0 / forces.link_distance.max(1.0)) as f32,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

/// Canvas-side simulation of the bound graph.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	pub style: GraphStyle,
	bound: Graph,
	forces: ForceSettings,
	cooling: u32,
	indices: HashMap<String, DefaultNodeIdx>,
	levels: HashMap<String, usize>,
	depth: usize,
	clicked: Option<String>,
	selected: HashSet<String>,
}

impl ForceGraphState {
	pub fn new(width: f64, height: f64) -> Self {
		let forces = ForceSettings::default();
		Self {
			graph: ForceGraph::new(simulation_parameters(&forces)),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			style: GraphStyle::default(),
			bound: Graph::new(),
			forces,
			cooling: 0,
			indices: HashMap::new(),
			levels: HashMap::new(),
			depth: 0,
			clicked: None,
			selected: HashSet::new(),
		}
	}

	/// Rebuild the simulation from the bound graph, keeping the position of
	/// every node that was already on screen.
	fn rebuild(&mut self) {
		let mut positions: HashMap<String, (f32, f32)> = HashMap::new();
		let mut anchors: HashSet<String> = HashSet::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.data.user_data.id.clone(), (node.x(), node.y()));
			if node.data.is_anchor {
				anchors.insert(node.data.user_data.id.clone());
			}
		});

		let mut graph = ForceGraph::new(simulation_parameters(&self.forces));
		let mut indices = HashMap::new();
		let count = self.bound.node_count().max(1);

		for (i, node) in self.bound.nodes().iter().enumerate() {
			let (x, y) = match positions.get(node.id()) {
				Some(&pos) => pos,
				None => self.seed_position(node.id(), i, count, &positions),
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: anchors.contains(node.id()),
				user_data: NodeInfo {
					id: node.id().to_string(),
					label: self.style.node_label(node),
					color: self.style.node_color(node).to_string(),
					radius: self.style.node_radius(node),
				},
			});
			indices.insert(node.id().to_string(), idx);
		}

		for link in self.bound.links() {
			if link.source() == link.target() {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (indices.get(link.source()), indices.get(link.target()))
			{
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		self.graph = graph;
		self.indices = indices;
		if self.forces.dag_orientation == DagOrientation::Null {
			self.levels.clear();
		} else {
			self.levels = dag_levels(&self.bound);
		}
		self.depth = self.levels.values().copied().max().unwrap_or(0);
		self.apply_layers();

		let indices = &self.indices;
		self.selected.retain(|id| indices.contains_key(id));
		if self.drag.node.as_ref().is_some_and(|id| !self.indices.contains_key(id)) {
			self.drag = DragState::default();
		}
		let hovered = self.hover.node.take();
		self.hover.neighbors.clear();
		self.set_hover(hovered.filter(|id| self.indices.contains_key(id)));
	}

	// New nodes start next to a neighbor already on screen, or on a circle.
	fn seed_position(
		&self,
		id: &str,
		i: usize,
		count: usize,
		positions: &HashMap<String, (f32, f32)>,
	) -> (f32, f32) {
		let angle = (i as f64) * 2.0 * PI / count as f64;
		let neighbor = self
			.bound
			.neighbors(id)
			.into_iter()
			.find_map(|n| positions.get(n.id()).copied());
		match neighbor {
			Some((nx, ny)) => (
				nx + (SEED_JITTER * angle.cos()) as f32,
				ny + (SEED_JITTER * angle.sin()) as f32,
			),
			None => (
				(SEED_RADIUS * angle.cos()) as f32,
				(SEED_RADIUS * angle.sin()) as f32,
			),
		}
	}

	// Pins every node to its layer while a layered orientation is set.
	fn apply_layers(&mut self) {
		if self.levels.is_empty() {
			return;
		}
		let (orientation, depth) = (self.forces.dag_orientation, self.depth);
		let levels = &self.levels;
		self.graph.visit_nodes_mut(|node| {
			let Some(&level) = levels.get(&node.data.user_data.id) else {
				return;
			};
			if let Some((x, y)) =
				layered_position(orientation, level, depth, LEVEL_DISTANCE, (node.data.x, node.data.y))
			{
				node.data.x = x;
				node.data.y = y;
			}
		});
	}

	pub fn is_cooling(&self) -> bool {
		self.cooling > 0
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = HIT_RADIUS.max(node.data.user_data.radius);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the old highlight around for the fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.neighbors.clear();
		if let Some(id) = &node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for link in self.bound.get_links_with_node(id) {
				if let Some(other) = link.other_end(id) {
					self.hover.neighbors.insert(other.to_string());
				}
			}
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id)
			|| self.hover.neighbors.contains(id)
			|| self.hover.prev_node.as_deref() == Some(id)
			|| self.hover.prev_neighbors.contains(id)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.prev_node.as_deref() == Some(id)
	}

	pub fn is_neighbor(&self, id: &str) -> bool {
		self.hover.neighbors.contains(id) || self.hover.prev_neighbors.contains(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn press(&mut self, x: f64, y: f64) {
		match self.node_at_position(x, y) {
			Some(id) => {
				let idx = self.indices.get(&id).copied();
				self.drag.active = true;
				self.drag.start_x = x;
				self.drag.start_y = y;
				self.graph.visit_nodes(|node| {
					if Some(node.index()) == idx {
						self.drag.node_start_x = node.x();
						self.drag.node_start_y = node.y();
					}
				});
				self.drag.node = Some(id);
			}
			None => {
				self.pan.active = true;
				self.pan.start_x = x;
				self.pan.start_y = y;
				self.pan.transform_start_x = self.transform.x;
				self.pan.transform_start_y = self.transform.y;
			}
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			let Some(idx) = self.drag.node.as_ref().and_then(|id| self.indices.get(id)).copied()
			else {
				return;
			};
			if !self.drag.moved {
				let (mx, my) = (x - self.drag.start_x, y - self.drag.start_y);
				if (mx * mx + my * my).sqrt() <= CLICK_TOLERANCE {
					return;
				}
				self.drag.moved = true;
			}
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
			if !self.style.display.dont_move_when_drag {
				self.reheat();
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// End a press. A press on a node that never moved is a click: with
	/// `toggle` it flips the node in the selection, otherwise it clears the
	/// selection and is reported by [`ForceGraphState::take_clicked`].
	pub fn release(&mut self, toggle: bool) {
		if self.drag.active && !self.drag.moved {
			if let Some(id) = self.drag.node.take() {
				if toggle {
					if !self.selected.remove(&id) {
						self.selected.insert(id);
					}
				} else {
					self.selected.clear();
					self.clicked = Some(id);
				}
			}
		}
		self.drag = DragState::default();
		self.pan.active = false;
	}

	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	/// The node clicked since the last call.
	pub fn take_clicked(&mut self) -> Option<String> {
		self.clicked.take()
	}

	pub fn selected(&self) -> &HashSet<String> {
		&self.selected
	}

	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.cooling > 0 {
			self.graph.update(dt);
			self.apply_layers();
			self.cooling -= 1;
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl VisualizationSink for ForceGraphState {
	fn bind(&mut self, graph: &Graph, style: &GraphStyle) {
		self.bound = graph.clone();
		self.style = style.clone();
		self.rebuild();
	}

	fn restyle(&mut self, style: &GraphStyle) {
		self.style = style.clone();
		let bound = &self.bound;
		let style = &self.style;
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			if let Some(n) = bound.get_node_by_id(&info.id) {
				info.label = style.node_label(n);
				info.color = style.node_color(n).to_string();
				info.radius = style.node_radius(n);
			}
		});
	}

	fn set_forces(&mut self, forces: &ForceSettings) {
		if self.forces == *forces {
			return;
		}
		self.forces = *forces;
		self.rebuild();
	}

	fn reheat(&mut self) {
		self.cooling = COOLDOWN_TICKS;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Link, Node};

	fn graph(ids: &[&str], links: &[(&str, &str)]) -> Graph {
		Graph::from_parts(
			ids.iter().map(|id| Node::new(*id, *id)).collect(),
			links.iter().map(|(s, t)| Link::new(*s, *t)).collect(),
		)
		.unwrap()
	}

	fn position(state: &ForceGraphState, id: &str) -> Option<(f32, f32)> {
		let mut found = None;
		state.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	#[test]
	fn rebind_keeps_surviving_positions() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b"], &[("a", "b")]), &GraphStyle::default());
		let before = position(&state, "a");
		state.bind(&graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]), &GraphStyle::default());
		assert_eq!(position(&state, "a"), before);
		assert!(position(&state, "c").is_some());
	}

	#[test]
	fn cooling_budget_stops_the_simulation() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b"], &[("a", "b")]), &GraphStyle::default());
		assert!(!state.is_cooling());
		state.reheat();
		for _ in 0..COOLDOWN_TICKS {
			assert!(state.is_cooling());
			state.tick(0.016);
		}
		assert!(!state.is_cooling());
	}

	#[test]
	fn hover_follows_links() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b", "c"], &[("a", "b")]), &GraphStyle::default());
		state.set_hover(Some("b".into()));
		assert!(state.is_hovered("b"));
		assert!(state.is_neighbor("a"));
		assert!(!state.is_highlighted("c"));

		state.bind(&graph(&["a", "c"], &[]), &GraphStyle::default());
		assert!(!state.has_active_highlight());
	}

	fn screen_position(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let (x, y) = position(state, id).unwrap();
		(
			x as f64 * state.transform.k + state.transform.x,
			y as f64 * state.transform.k + state.transform.y,
		)
	}

	#[test]
	fn press_without_movement_is_a_click() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b"], &[("a", "b")]), &GraphStyle::default());
		let before = position(&state, "a");
		let (x, y) = screen_position(&state, "a");

		state.press(x, y);
		state.pointer_move(x + 1.0, y + 1.0);
		state.release(false);
		assert_eq!(state.take_clicked().as_deref(), Some("a"));
		assert_eq!(state.take_clicked(), None);
		assert_eq!(position(&state, "a"), before);
		assert!(!state.is_cooling());
	}

	#[test]
	fn drag_is_not_a_click() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b"], &[("a", "b")]), &GraphStyle::default());
		let (x, y) = screen_position(&state, "a");

		state.press(x, y);
		state.pointer_move(x + 40.0, y);
		state.release(false);
		assert_eq!(state.take_clicked(), None);
		let (moved_x, _) = screen_position(&state, "a");
		assert!((moved_x - (x + 40.0)).abs() < 1e-3);

		// Pressing empty space pans instead
		state.press(5.0, 5.0);
		state.release(false);
		assert_eq!(state.take_clicked(), None);
	}

	#[test]
	fn toggle_click_builds_a_selection() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b"], &[]), &GraphStyle::default());
		let (ax, ay) = screen_position(&state, "a");
		let (bx, by) = screen_position(&state, "b");

		state.press(ax, ay);
		state.release(true);
		state.press(bx, by);
		state.release(true);
		assert_eq!(state.selected().len(), 2);
		assert_eq!(state.take_clicked(), None);

		state.press(ax, ay);
		state.release(true);
		assert!(!state.selected().contains("a"));

		state.press(bx, by);
		state.release(false);
		assert!(state.selected().is_empty());
		assert_eq!(state.take_clicked().as_deref(), Some("b"));
	}

	#[test]
	fn layered_orientation_orders_nodes_by_depth() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.bind(&graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]), &GraphStyle::default());
		state.set_forces(&ForceSettings {
			dag_orientation: DagOrientation::Td,
			..ForceSettings::default()
		});
		state.reheat();
		for _ in 0..10 {
			state.tick(0.016);
		}
		let y = |state: &ForceGraphState, id| position(state, id).unwrap().1;
		assert_eq!(y(&state, "a"), -200.0);
		assert_eq!(y(&state, "b"), 0.0);
		assert_eq!(y(&state, "c"), 200.0);

		state.set_forces(&ForceSettings::default());
		state.reheat();
		state.tick(0.016);
		assert_ne!(y(&state, "a"), -200.0);
	}
}
