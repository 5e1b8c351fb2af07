//! Keeps each graph view in step with the canonical graph.

mod debounce;
mod engine;
mod queue;
mod search;
mod sink;
mod style;
mod view;

pub use debounce::{Generation, Settle, SettleOptions, SettleWait, Ticket};
pub use engine::{EngineOptions, GraphSyncEngine, ReconcileOutcome, SyncPhase};
pub use queue::TaskSlot;
pub use search::{
	ObservedSearch, PathSearch, SearchCapabilities, SearchProvider, SearchResultFile, provider_for,
};
pub use sink::VisualizationSink;
pub use style::{DEFAULT_NODE_COLOR, ForceSettings, GraphStyle, hex_to_rgba};
pub use view::{global_view, local_view};
