use super::style::{ForceSettings, GraphStyle};
use crate::graph::Graph;

/// The live visualization a [`GraphSyncEngine`](super::GraphSyncEngine) drives.
///
/// `bind` is the expensive call: it swaps the simulated graph. Everything
/// else keeps the current layout.
pub trait VisualizationSink {
	/// Replace the displayed graph. Positions of nodes that survive, the
	/// camera, and hover state are the sink's to keep.
	fn bind(&mut self, graph: &Graph, style: &GraphStyle);

	/// Re-apply sizes, colors, and labels to the current graph.
	fn restyle(&mut self, style: &GraphStyle);

	/// New layout force parameters. Followed by a [`reheat`](Self::reheat).
	fn set_forces(&mut self, forces: &ForceSettings);

	/// Run the layout simulation for a while even if it had cooled down.
	fn reheat(&mut self);
}
