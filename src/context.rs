//! Plugin-wide state shared by every open graph view.

use std::rc::Rc;

use log::{info, warn};

use crate::notice::Notifier;
use crate::settings::{GraphType, SettingManager, SettingsError, SettingsStorage};
use crate::sync::{EngineOptions, GraphSyncEngine, VisualizationSink, provider_for};
use crate::vault::{CanonicalGraph, FileSource, SharedGraph};

/// Owns the canonical graph and the settings, and hands out views.
///
/// Views are returned to the caller rather than kept here; the caller
/// forwards canonical changes to each of them.
pub struct AppContext<S> {
	canonical: CanonicalGraph,
	settings: SettingManager<S>,
	notifier: Rc<dyn Notifier>,
	open_file: Option<String>,
}

impl<S: SettingsStorage> AppContext<S> {
	/// Load settings and set up an empty canonical graph. The graph is
	/// built once the host reports its link cache as resolved.
	pub fn init(storage: S, notifier: Rc<dyn Notifier>) -> Self {
		let mut settings = SettingManager::new(storage, Rc::clone(&notifier));
		settings.load();
		info!("graph plugin initialized");
		Self {
			canonical: CanonicalGraph::new(),
			settings,
			notifier,
			open_file: None,
		}
	}

	pub fn graph(&self) -> SharedGraph {
		self.canonical.handle()
	}

	pub fn canonical(&self) -> &CanonicalGraph {
		&self.canonical
	}

	pub fn settings(&self) -> &SettingManager<S> {
		&self.settings
	}

	pub fn settings_mut(&mut self) -> &mut SettingManager<S> {
		&mut self.settings
	}

	pub fn notifier(&self) -> Rc<dyn Notifier> {
		Rc::clone(&self.notifier)
	}

	pub fn on_resolved(&mut self, source: &dyn FileSource) -> bool {
		self.canonical.on_resolved(source)
	}

	pub fn on_resolve_changed(&mut self, source: &dyn FileSource) -> bool {
		self.canonical.on_resolve_changed(source)
	}

	pub fn set_open_file(&mut self, path: Option<String>) {
		self.open_file = path;
	}

	pub fn open_file(&self) -> Option<&str> {
		self.open_file.as_deref()
	}

	/// Build and start a view over the canonical graph. Local views start
	/// focused on the open file.
	pub fn open_view<V: VisualizationSink>(
		&self,
		graph_type: GraphType,
		sink: V,
	) -> GraphSyncEngine<V> {
		let setting = self.settings.settings();
		let options = EngineOptions::new(
			graph_type,
			setting.graph_settings(graph_type).clone(),
			setting.plugin_setting.max_node_number,
		);
		let search = provider_for(
			setting.plugin_setting.search_engine,
			self.canonical.handle(),
			self.notifier.as_ref(),
		);
		let mut engine = GraphSyncEngine::new(
			options,
			self.canonical.handle(),
			sink,
			search,
			Rc::clone(&self.notifier),
		);
		engine.start();
		if graph_type == GraphType::Local {
			if let Some(path) = &self.open_file {
				engine.set_focus(path.as_str());
			}
		}
		engine
	}

	/// Write any queued settings change.
	pub fn shutdown(&mut self) -> Result<(), SettingsError> {
		info!("graph plugin shutting down");
		if let Err(err) = self.settings.flush() {
			warn!("failed to save settings: {err}");
			return Err(err);
		}
		Ok(())
	}
}
