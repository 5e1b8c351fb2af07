use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, info, warn};

use super::debounce::{Generation, Settle, SettleOptions, SettleWait, Ticket};
use super::queue::TaskSlot;
use super::search::{SearchProvider, SearchResultFile};
use super::sink::VisualizationSink;
use super::style::GraphStyle;
use super::view::{global_view, local_view};
use crate::graph::Graph;
use crate::notice::Notifier;
use crate::settings::{
	GraphSettings, GraphType, GroupSetting, Setting, SettingEffect, SettingPath,
};
use crate::vault::SharedGraph;

/// Where a view is in its reconcile cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPhase {
	#[default]
	Idle,
	Recomputing,
	Rebinding,
}

/// What a reconcile did to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
	/// The derived graph matched the bound one; the sink was left alone.
	Unchanged,
	/// A new graph was bound and the simulation reheated.
	Rebound { nodes: usize, links: usize },
	/// The derived graph was over the node limit and an empty graph was
	/// used instead. `rebound` says whether the sink had to be cleared.
	Oversized { nodes: usize, rebound: bool },
}

impl ReconcileOutcome {
	pub fn rebound(self) -> bool {
		matches!(
			self,
			ReconcileOutcome::Rebound { .. } | ReconcileOutcome::Oversized { rebound: true, .. }
		)
	}
}

/// Construction-time configuration of one view.
#[derive(Clone, Debug)]
pub struct EngineOptions {
	pub graph_type: GraphType,
	pub settings: GraphSettings,
	pub max_nodes: usize,
	pub settle: SettleOptions,
}

impl EngineOptions {
	pub fn new(graph_type: GraphType, settings: GraphSettings, max_nodes: usize) -> Self {
		Self {
			graph_type,
			settings,
			max_nodes,
			settle: SettleOptions::default(),
		}
	}
}

/// Binds one view's derived graph to a live visualization.
///
/// On every trigger the engine derives the graph the view should show from
/// the canonical graph and the view's filters, compares it with the graph
/// currently bound, and only rebinds (and reheats) the sink when they
/// differ. Style and force changes go to the sink without a rebind.
pub struct GraphSyncEngine<V> {
	canonical: SharedGraph,
	sink: V,
	search: Box<dyn SearchProvider>,
	notifier: Rc<dyn Notifier>,
	graph_type: GraphType,
	focus: Option<String>,
	settings: GraphSettings,
	max_nodes: usize,
	style: GraphStyle,
	bound: Graph,
	phase: SyncPhase,
	generation: Generation,
	search_results: Option<Vec<SearchResultFile>>,
	observed: Vec<SearchResultFile>,
	pending_search: TaskSlot<SettleWait>,
	settle: SettleOptions,
	invalid_groups: HashSet<(String, String)>,
}

impl<V: VisualizationSink> GraphSyncEngine<V> {
	pub fn new(
		options: EngineOptions,
		canonical: SharedGraph,
		sink: V,
		search: Box<dyn SearchProvider>,
		notifier: Rc<dyn Notifier>,
	) -> Self {
		let style = GraphStyle::new(options.settings.display.clone(), &[]);
		Self {
			canonical,
			sink,
			search,
			notifier,
			graph_type: options.graph_type,
			focus: None,
			settings: options.settings,
			max_nodes: options.max_nodes,
			style,
			bound: Graph::new(),
			phase: SyncPhase::Idle,
			generation: Generation::new(),
			search_results: None,
			observed: Vec::new(),
			pending_search: TaskSlot::new(),
			settle: options.settle,
			invalid_groups: HashSet::new(),
		}
	}

	/// First sync: compile groups, push forces, run the search if a query is
	/// set, and bind.
	pub fn start(&mut self) -> ReconcileOutcome {
		info!("starting {:?} graph view", self.graph_type);
		let groups = self.settings.groups.clone();
		self.regroup(&groups);
		self.sink.set_forces(&self.style.forces());
		self.sink.restyle(&self.style);
		match self.begin_search() {
			Some(outcome) => outcome,
			None => self.reconcile(),
		}
	}

	pub fn sink(&self) -> &V {
		&self.sink
	}

	pub fn sink_mut(&mut self) -> &mut V {
		&mut self.sink
	}

	/// The graph the sink currently shows.
	pub fn bound_graph(&self) -> &Graph {
		&self.bound
	}

	pub fn phase(&self) -> SyncPhase {
		self.phase
	}

	pub fn graph_type(&self) -> GraphType {
		self.graph_type
	}

	pub fn settings(&self) -> &GraphSettings {
		&self.settings
	}

	pub fn style(&self) -> &GraphStyle {
		&self.style
	}

	pub fn focus(&self) -> Option<&str> {
		self.focus.as_deref()
	}

	/// The canonical graph was rebuilt.
	pub fn on_canonical_changed(&mut self) -> ReconcileOutcome {
		if self.has_query() && !self.search.capabilities().passive {
			if let Some(outcome) = self.begin_search() {
				return outcome;
			}
		}
		self.reconcile()
	}

	/// A new file became active. Only local views follow it.
	pub fn set_focus(&mut self, path: impl Into<String>) -> ReconcileOutcome {
		let path = path.into();
		if self.focus.as_deref() == Some(path.as_str()) {
			return ReconcileOutcome::Unchanged;
		}
		self.focus = Some(path);
		match self.graph_type {
			GraphType::Local => self.reconcile(),
			GraphType::Global => ReconcileOutcome::Unchanged,
		}
	}

	pub fn set_max_nodes(&mut self, max_nodes: usize) -> ReconcileOutcome {
		if self.max_nodes == max_nodes {
			return ReconcileOutcome::Unchanged;
		}
		self.max_nodes = max_nodes;
		self.reconcile()
	}

	/// Apply the new settings document. The view reads its own graph
	/// settings and the node limit from it. `changed` names what moved;
	/// each path is routed by its [`SettingEffect`], and at most one
	/// reconcile runs.
	pub fn on_setting_changed(&mut self, setting: &Setting, changed: &[SettingPath]) -> ReconcileOutcome {
		self.settings = setting.graph_settings(self.graph_type).clone();
		self.max_nodes = setting.plugin_setting.max_node_number;
		let effects: HashSet<SettingEffect> = changed.iter().map(|p| p.effect()).collect();
		debug!("setting change {changed:?}");

		if effects.contains(&SettingEffect::Regroup) {
			let groups = self.settings.groups.clone();
			self.regroup(&groups);
		}
		if effects.contains(&SettingEffect::Restyle) || effects.contains(&SettingEffect::Regroup) {
			self.style.display = self.settings.display.clone();
			self.sink.restyle(&self.style);
		}

		let mut outcome = None;
		if effects.contains(&SettingEffect::Search) {
			outcome = self.begin_search();
		}
		if outcome.is_none() && effects.contains(&SettingEffect::Recompute) {
			outcome = Some(self.reconcile());
		}
		let outcome = outcome.unwrap_or(ReconcileOutcome::Unchanged);

		if effects.contains(&SettingEffect::Forces) {
			self.style.display = self.settings.display.clone();
			self.sink.set_forces(&self.style.forces());
			if !outcome.rebound() {
				self.sink.reheat();
			}
		}
		outcome
	}

	/// The passive search view reported its current results.
	///
	/// Results are recorded immediately; a settle wait is queued only if
	/// none is pending, so a burst of observations costs one reconcile.
	pub fn observe_search_results(&mut self, files: Vec<SearchResultFile>, now_ms: f64) {
		self.observed = files;
		let wait = SettleWait::new(self.generation.ticket(), now_ms, self.settle);
		if !self.pending_search.push(wait) {
			debug!("search update already queued");
		}
	}

	/// Drive the pending settle wait. Returns the reconcile it triggered, if
	/// any.
	pub fn poll(&mut self, now_ms: f64) -> Option<ReconcileOutcome> {
		let sample = self.observed.len();
		let status = self.pending_search.get_mut()?.poll(now_ms, sample);
		if status == Settle::Pending {
			return None;
		}
		let wait = self.pending_search.take()?;
		if status == Settle::TimedOut {
			debug!("search results did not settle, using the last seen");
		}
		let files = self.observed.clone();
		self.deliver_search_results(wait.ticket(), files)
	}

	/// Apply search results for `ticket`. Results for a superseded query are
	/// discarded.
	pub fn deliver_search_results(
		&mut self,
		ticket: Ticket,
		files: Vec<SearchResultFile>,
	) -> Option<ReconcileOutcome> {
		if !self.generation.is_current(ticket) {
			debug!("discarding stale search results ({} files)", files.len());
			return None;
		}
		self.search_results = Some(files);
		Some(self.reconcile())
	}

	/// Derive, compare, and rebind if needed.
	pub fn reconcile(&mut self) -> ReconcileOutcome {
		self.phase = SyncPhase::Recomputing;
		let mut candidate = self.derive();

		let oversized = candidate.node_count() > self.max_nodes;
		let nodes = candidate.node_count();
		if oversized {
			let message = format!(
				"Graph is too large to be rendered. Have {nodes} nodes, the limit is {}.",
				self.max_nodes
			);
			warn!("{message}");
			self.notifier.notice(&message);
			candidate = Graph::new();
		}

		let rebound = !Graph::compare(&candidate, &self.bound);
		if rebound {
			self.phase = SyncPhase::Rebinding;
			debug!(
				"rebinding: {} nodes, {} links",
				candidate.node_count(),
				candidate.link_count()
			);
			self.sink.bind(&candidate, &self.style);
			self.sink.reheat();
			self.bound = candidate;
		}
		self.phase = SyncPhase::Idle;

		match (oversized, rebound) {
			(true, rebound) => ReconcileOutcome::Oversized { nodes, rebound },
			(false, true) => ReconcileOutcome::Rebound {
				nodes: self.bound.node_count(),
				links: self.bound.link_count(),
			},
			(false, false) => ReconcileOutcome::Unchanged,
		}
	}

	fn derive(&self) -> Graph {
		let canonical = self.canonical.borrow();
		let filter = &self.settings.filter;
		let results = self.search_results.as_deref();
		match (self.graph_type, self.focus.as_deref()) {
			(GraphType::Global, _) => global_view(&canonical, filter, results),
			(GraphType::Local, Some(focus)) => local_view(&canonical, focus, filter, results),
			(GraphType::Local, None) => Graph::new(),
		}
	}

	fn has_query(&self) -> bool {
		!self.settings.filter.search_query.trim().is_empty()
	}

	// Any wait still pending belongs to the old query. Returns `None` while
	// a passive provider's results are still to come.
	fn begin_search(&mut self) -> Option<ReconcileOutcome> {
		let ticket = self.generation.advance();
		self.pending_search.clear();

		if !self.has_query() {
			self.search_results = None;
			return Some(self.reconcile());
		}
		if self.search.capabilities().passive {
			debug!("waiting for observed search results");
			return None;
		}
		let files = self.search.search(&self.settings.filter.search_query);
		self.deliver_search_results(ticket, files)
	}

	// Only queries that were not already broken are reported.
	fn regroup(&mut self, groups: &[GroupSetting]) {
		let invalid: HashSet<(String, String)> = self.style.set_groups(groups).into_iter().collect();
		for (query, err) in invalid.difference(&self.invalid_groups) {
			self.notifier
				.notice(&format!("Group query \"{query}\" is invalid and matches nothing: {err}"));
		}
		self.invalid_groups = invalid;
	}
}
