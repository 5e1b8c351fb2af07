use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};

use super::error::SettingsError;
use super::schema::Setting;
use crate::notice::Notifier;
use crate::sync::TaskSlot;

pub const CORRUPTED_MESSAGE: &str = "The setting is corrupted. You will not be able to save the setting. Please backup your data.json, remove it and reload the plugin. Then migrate your old setting back.";

/// Where the settings document is persisted.
pub trait SettingsStorage {
	/// `Ok(None)` when nothing has been saved yet.
	fn load(&self) -> Result<Option<String>, SettingsError>;
	fn save(&self, data: &str) -> Result<(), SettingsError>;
}

/// Storage kept in memory. Clones share the same document.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
	data: Rc<RefCell<Option<String>>>,
	saves: Rc<Cell<usize>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_document(data: impl Into<String>) -> Self {
		let storage = Self::default();
		*storage.data.borrow_mut() = Some(data.into());
		storage
	}

	pub fn document(&self) -> Option<String> {
		self.data.borrow().clone()
	}

	/// Number of completed saves.
	pub fn saves(&self) -> usize {
		self.saves.get()
	}
}

impl SettingsStorage for MemoryStorage {
	fn load(&self) -> Result<Option<String>, SettingsError> {
		Ok(self.data.borrow().clone())
	}

	fn save(&self, data: &str) -> Result<(), SettingsError> {
		*self.data.borrow_mut() = Some(data.to_string());
		self.saves.set(self.saves.get() + 1);
		Ok(())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadState {
	Unloaded,
	Loaded,
	Corrupted,
}

/// Owns the live settings and serializes writes to storage.
///
/// Updates apply immediately; the write is queued in a single slot, so a
/// burst of updates produces one save of the latest document when
/// [`SettingManager::flush`] runs. A document that failed to load is never
/// overwritten until [`SettingManager::reset`] is called.
pub struct SettingManager<S> {
	storage: S,
	setting: Setting,
	state: LoadState,
	pending_save: TaskSlot<()>,
	notifier: Rc<dyn Notifier>,
}

impl<S: SettingsStorage> SettingManager<S> {
	/// Call [`SettingManager::load`] before relying on the values.
	pub fn new(storage: S, notifier: Rc<dyn Notifier>) -> Self {
		Self {
			storage,
			setting: Setting::default(),
			state: LoadState::Unloaded,
			pending_save: TaskSlot::new(),
			notifier,
		}
	}

	pub fn load(&mut self) -> &Setting {
		let loaded = self.storage.load().and_then(|raw| match raw {
			None => Ok(None),
			Some(raw) => {
				let setting: Setting = serde_json::from_str(&raw)?;
				setting.validate().map_err(SettingsError::Invalid)?;
				Ok(Some(setting))
			}
		});

		match loaded {
			Ok(Some(setting)) => {
				info!("settings loaded");
				self.setting = setting;
				self.state = LoadState::Loaded;
			}
			Ok(None) => {
				info!("no stored settings, using defaults");
				self.setting = Setting::default();
				self.state = LoadState::Loaded;
				self.pending_save.push(());
			}
			Err(err) => {
				warn!("failed to load settings: {err}");
				self.notifier.notice(CORRUPTED_MESSAGE);
				self.setting = Setting::default();
				self.state = LoadState::Corrupted;
			}
		}
		&self.setting
	}

	pub fn settings(&self) -> &Setting {
		&self.setting
	}

	/// True after a failed load, until [`SettingManager::reset`].
	pub fn is_corrupted(&self) -> bool {
		self.state == LoadState::Corrupted
	}

	/// Apply `f` and queue a save.
	pub fn update(&mut self, f: impl FnOnce(&mut Setting)) -> &Setting {
		f(&mut self.setting);
		if !self.pending_save.push(()) {
			debug!("save already queued");
		}
		&self.setting
	}

	pub fn has_pending_save(&self) -> bool {
		self.pending_save.is_pending()
	}

	/// Run the queued save, if any. Returns whether a document was written.
	pub fn flush(&mut self) -> Result<bool, SettingsError> {
		if self.pending_save.take().is_none() {
			return Ok(false);
		}
		match self.state {
			LoadState::Corrupted => {
				warn!("refusing to overwrite corrupted settings");
				self.notifier.notice(CORRUPTED_MESSAGE);
				Ok(false)
			}
			LoadState::Unloaded => {
				debug!("settings not loaded yet, save dropped");
				Ok(false)
			}
			LoadState::Loaded => {
				let data = serde_json::to_string_pretty(&self.setting)?;
				self.storage.save(&data)?;
				debug!("settings saved");
				Ok(true)
			}
		}
	}

	/// Back to defaults. Clears the corrupted state so saving works again.
	pub fn reset(&mut self) -> &Setting {
		info!("resetting settings to defaults");
		self.setting = Setting::default();
		self.state = LoadState::Loaded;
		self.pending_save.push(());
		&self.setting
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::notice::LogNotifier;
	use crate::settings::GraphType;

	#[derive(Default)]
	struct Recorder(RefCell<Vec<String>>);

	impl Notifier for Recorder {
		fn notice(&self, message: &str) {
			self.0.borrow_mut().push(message.to_string());
		}
	}

	fn manager(storage: MemoryStorage) -> SettingManager<MemoryStorage> {
		SettingManager::new(storage, Rc::new(LogNotifier))
	}

	#[test]
	fn missing_document_loads_defaults_and_saves() {
		let storage = MemoryStorage::new();
		let mut settings = manager(storage.clone());
		assert_eq!(settings.load(), &Setting::default());
		assert!(settings.has_pending_save());
		assert!(settings.flush().unwrap());
		assert_eq!(storage.saves(), 1);
		assert!(storage.document().unwrap().contains("\"maxNodeNumber\": 1000"));
	}

	#[test]
	fn stored_document_round_trips() {
		let mut original = Setting::default();
		original.plugin_setting.max_node_number = 42;
		original.temporary_global_graph_setting.filter.search_query = "tag".into();
		let storage = MemoryStorage::with_document(serde_json::to_string(&original).unwrap());
		let mut settings = manager(storage);
		assert_eq!(settings.load(), &original);
		assert!(!settings.has_pending_save());
	}

	#[test]
	fn corrupted_document_falls_back_and_refuses_saves() {
		let recorder = Rc::new(Recorder::default());
		let storage = MemoryStorage::with_document("{ not json");
		let mut settings = SettingManager::new(storage.clone(), recorder.clone());
		assert_eq!(settings.load(), &Setting::default());
		assert!(settings.is_corrupted());
		assert_eq!(recorder.0.borrow().as_slice(), [CORRUPTED_MESSAGE]);

		settings.update(|s| s.plugin_setting.max_node_number = 5);
		assert!(!settings.flush().unwrap());
		assert_eq!(storage.document().as_deref(), Some("{ not json"));
		assert_eq!(recorder.0.borrow().len(), 2);

		settings.reset();
		assert!(!settings.is_corrupted());
		assert!(settings.flush().unwrap());
		assert_eq!(storage.saves(), 1);
	}

	#[test]
	fn invalid_values_count_as_corrupted() {
		let mut bad = Setting::default();
		bad.temporary_local_graph_setting.display.node_size = -1.0;
		let storage = MemoryStorage::with_document(serde_json::to_string(&bad).unwrap());
		let mut settings = manager(storage);
		settings.load();
		assert!(settings.is_corrupted());
	}

	#[test]
	fn burst_of_updates_saves_once() {
		let storage = MemoryStorage::new();
		let mut settings = manager(storage.clone());
		settings.load();
		settings.flush().unwrap();

		for n in 1..=5 {
			settings.update(|s| {
				s.graph_settings_mut(GraphType::Global).display.node_size = n as f64
			});
		}
		assert!(settings.flush().unwrap());
		assert!(!settings.flush().unwrap());
		assert_eq!(storage.saves(), 2);

		let saved: Setting = serde_json::from_str(&storage.document().unwrap()).unwrap();
		assert_eq!(saved.temporary_global_graph_setting.display.node_size, 5.0);
	}

	#[test]
	fn older_documents_without_local_fields_still_load() {
		let raw = r##"{
			"savedSettings": [],
			"temporaryLocalGraphSetting": {
				"filter": { "searchQuery": "", "showOrphans": true, "showAttachments": false },
				"groups": [{ "query": "daily", "color": "#ff0000" }],
				"display": {
					"nodeSize": 3, "linkThickness": 2, "linkDistance": 100, "nodeRepulsion": 28,
					"nodeHoverColor": "#f00", "nodeHoverNeighbourColor": "#0f0", "linkHoverColor": "#00f",
					"showExtension": false, "showFullPath": false, "showCenterCoordinates": true,
					"showLinkArrow": true, "dontMoveWhenDrag": false
				}
			},
			"temporaryGlobalGraphSetting": {
				"filter": { "searchQuery": "", "showOrphans": false, "showAttachments": true },
				"groups": [],
				"display": {
					"nodeSize": 3, "linkThickness": 2, "linkDistance": 100, "nodeRepulsion": 28,
					"nodeHoverColor": "#f00", "nodeHoverNeighbourColor": "#0f0", "linkHoverColor": "#00f",
					"showExtension": false, "showFullPath": false, "showCenterCoordinates": true,
					"showLinkArrow": true, "dontMoveWhenDrag": false, "dagOrientation": "radialout"
				}
			},
			"pluginSetting": { "maxNodeNumber": 300, "searchEngine": "builtIn" }
		}"##;
		let mut settings = manager(MemoryStorage::with_document(raw));
		let loaded = settings.load().clone();
		assert!(!settings.is_corrupted());
		assert_eq!(loaded.temporary_local_graph_setting.filter.depth, 1);
		assert_eq!(loaded.temporary_local_graph_setting.groups[0].query, "daily");
		assert_eq!(
			loaded.temporary_global_graph_setting.display.dag_orientation,
			crate::settings::DagOrientation::Radialout
		);
		assert_eq!(
			loaded.plugin_setting.search_engine,
			crate::settings::SearchEngineType::BuiltIn
		);
	}
}
