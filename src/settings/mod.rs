//! Settings schema, change paths and persistence.

mod error;
mod manager;
mod path;
mod schema;

pub use error::SettingsError;
pub use manager::{CORRUPTED_MESSAGE, MemoryStorage, SettingManager, SettingsStorage};
pub use path::{SettingEffect, SettingPath};
pub use schema::{
	DagOrientation, DisplaySettings, FilterSettings, GraphSettings, GraphType, GroupSetting,
	PluginSetting, SavedSetting, SearchEngineType, Setting,
};
