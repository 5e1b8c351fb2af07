use std::collections::{HashMap, VecDeque};

use crate::graph::{Graph, Node};
use crate::settings::DagOrientation;

/// Distance between two layers of a layered layout.
pub const LEVEL_DISTANCE: f64 = 200.0;

/// Layer of every node: the longest chain of links leading into it.
/// Nodes on a cycle keep the deepest layer reached before the cycle.
pub fn dag_levels(graph: &Graph) -> HashMap<String, usize> {
	let mut pending: HashMap<&str, usize> = graph.nodes().iter().map(|n| (n.id(), 0)).collect();
	for link in graph.links() {
		if link.source() == link.target() {
			continue;
		}
		if let Some(count) = pending.get_mut(link.target()) {
			*count += 1;
		}
	}

	let mut levels: HashMap<String, usize> =
		graph.nodes().iter().map(|n| (n.id().to_string(), 0)).collect();
	let mut queue: VecDeque<&str> = graph
		.nodes()
		.iter()
		.map(Node::id)
		.filter(|id| pending.get(id) == Some(&0))
		.collect();

	while let Some(id) = queue.pop_front() {
		let next = levels.get(id).copied().unwrap_or(0) + 1;
		for link in graph.get_links_from_node(id) {
			let target = link.target();
			if target == id {
				continue;
			}
			if let Some(level) = levels.get_mut(target) {
				*level = (*level).max(next);
			}
			if let Some(count) = pending.get_mut(target) {
				*count = count.saturating_sub(1);
				if *count == 0 {
					queue.push_back(target);
				}
			}
		}
	}
	levels
}

/// Pin a node to its layer, keeping the free coordinate. Layers are
/// `spacing` apart and centred on the origin. `depth` is the deepest layer.
///
/// The canvas is flat, so the depth-axis orientations leave nodes alone.
pub fn layered_position(
	orientation: DagOrientation,
	level: usize,
	depth: usize,
	spacing: f64,
	(x, y): (f32, f32),
) -> Option<(f32, f32)> {
	let offset = (level as f64 - depth as f64 / 2.0) * spacing;
	let (x, y) = (x as f64, y as f64);
	let pos = match orientation {
		DagOrientation::Td => (x, offset),
		DagOrientation::Bu => (x, -offset),
		DagOrientation::Lr => (offset, y),
		DagOrientation::Rl => (-offset, y),
		DagOrientation::Radialout | DagOrientation::Radialin => {
			let ring = match orientation {
				DagOrientation::Radialout => level,
				_ => depth.saturating_sub(level),
			};
			let radius = ring as f64 * spacing;
			let angle = y.atan2(x);
			(radius * angle.cos(), radius * angle.sin())
		}
		DagOrientation::Zout | DagOrientation::Zin | DagOrientation::Null => return None,
	};
	Some((pos.0 as f32, pos.1 as f32))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Link;

	fn graph(ids: &[&str], links: &[(&str, &str)]) -> Graph {
		Graph::from_parts(
			ids.iter().map(|id| Node::new(*id, *id)).collect(),
			links.iter().map(|(s, t)| Link::new(*s, *t)).collect(),
		)
		.unwrap()
	}

	#[test]
	fn levels_follow_the_longest_chain() {
		let g = graph(
			&["a", "b", "c", "d"],
			&[("a", "b"), ("b", "c"), ("a", "c"), ("d", "d")],
		);
		let levels = dag_levels(&g);
		assert_eq!(levels["a"], 0);
		assert_eq!(levels["b"], 1);
		assert_eq!(levels["c"], 2);
		assert_eq!(levels["d"], 0);
	}

	#[test]
	fn cycles_do_not_loop() {
		let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "b")]);
		let levels = dag_levels(&g);
		assert_eq!(levels["a"], 0);
		assert_eq!(levels["b"], 1);
		assert_eq!(levels["c"], 0);
	}

	#[test]
	fn orientations_pin_one_axis() {
		let at = |o, level| layered_position(o, level, 2, 100.0, (7.0, 9.0));
		assert_eq!(at(DagOrientation::Td, 0), Some((7.0, -100.0)));
		assert_eq!(at(DagOrientation::Bu, 0), Some((7.0, 100.0)));
		assert_eq!(at(DagOrientation::Lr, 2), Some((100.0, 9.0)));
		assert_eq!(at(DagOrientation::Rl, 2), Some((-100.0, 9.0)));
		assert_eq!(at(DagOrientation::Zout, 1), None);
		assert_eq!(at(DagOrientation::Null, 1), None);

		let (x, y) = layered_position(DagOrientation::Radialout, 1, 2, 100.0, (3.0, 4.0)).unwrap();
		assert!((x - 60.0).abs() < 1e-3 && (y - 80.0).abs() < 1e-3);
		let (x, y) = layered_position(DagOrientation::Radialin, 2, 2, 100.0, (3.0, 4.0)).unwrap();
		assert!(x.abs() < 1e-3 && y.abs() < 1e-3);
	}
}
