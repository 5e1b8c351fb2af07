mod component;
mod layout;
mod render;
mod state;

pub use component::{CanvasEngine, ForceGraphCanvas};
pub use state::{COOLDOWN_TICKS, ForceGraphState, NodeInfo};
