use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;

use crate::components::force_graph::{CanvasEngine, ForceGraphCanvas, ForceGraphState};
use crate::context::AppContext;
use crate::notice::Notifier;
use crate::settings::{GraphType, MemoryStorage, SettingPath};
use crate::vault::MemoryVault;

/// Sample vault shaped like a random tree, with a few attachments.
fn sample_vault(n: usize) -> MemoryVault {
	let mut vault = MemoryVault::new();
	for i in 0..n {
		vault.add_file(format!("notes/note-{i}.md"));
	}
	for i in 1..n {
		let target = (rand_simple(i) * (i as f64)) as usize;
		vault.link(&format!("notes/note-{i}.md"), &format!("notes/note-{target}.md"));
	}
	for i in (0..n).step_by(10) {
		let image = format!("assets/image-{i}.png");
		vault.add_file(image.as_str());
		vault.link(&format!("notes/note-{i}.md"), &image);
	}
	vault
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Notices shown over the canvas.
struct Toasts(WriteSignal<Vec<String>>);

impl Notifier for Toasts {
	fn notice(&self, message: &str) {
		warn!("{message}");
		let message = message.to_string();
		self.0.update(|all| all.push(message));
	}
}

fn save(ctx: &mut AppContext<MemoryStorage>) {
	if let Err(err) = ctx.settings_mut().flush() {
		warn!("settings were not saved: {err}");
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (notices, set_notices) = signal(Vec::<String>::new());
	let (open_file, set_open_file) = signal(Some("notes/note-0.md".to_string()));
	let mut ctx = AppContext::init(MemoryStorage::new(), Rc::new(Toasts(set_notices)));
	ctx.on_resolved(&sample_vault(100));
	ctx.set_open_file(open_file.get_untracked());

	let global: CanvasEngine = Rc::new(RefCell::new(
		ctx.open_view(GraphType::Global, ForceGraphState::new(800.0, 600.0)),
	));
	let local: CanvasEngine = Rc::new(RefCell::new(
		ctx.open_view(GraphType::Local, ForceGraphState::new(320.0, 240.0)),
	));

	// The engines and context are single-threaded; the stored handles are
	// what the view closures capture.
	let ctx = StoredValue::new_local(ctx);
	let global = StoredValue::new_local(global);
	let local = StoredValue::new_local(local);

	// A clicked node becomes the open file and the local view follows it
	Effect::new(move |_| {
		let Some(path) = open_file.get() else {
			return;
		};
		ctx.update_value(|ctx| ctx.set_open_file(Some(path.clone())));
		local.with_value(|local| {
			local.borrow_mut().set_focus(path);
		});
	});

	let on_search = move |ev: leptos::ev::Event| {
		let query = event_target_value(&ev);
		ctx.update_value(|ctx| {
			ctx.settings_mut().update(|s| {
				s.temporary_global_graph_setting.filter.search_query = query;
			});
			global.with_value(|engine| {
				engine
					.borrow_mut()
					.on_setting_changed(ctx.settings().settings(), &[SettingPath::FilterSearchQuery]);
			});
			save(ctx);
		});
	};

	let on_orphans = move |ev: leptos::ev::Event| {
		let show = event_target_checked(&ev);
		ctx.update_value(|ctx| {
			ctx.settings_mut().update(|s| {
				s.temporary_global_graph_setting.filter.show_orphans = show;
			});
			global.with_value(|engine| {
				engine
					.borrow_mut()
					.on_setting_changed(ctx.settings().settings(), &[SettingPath::FilterShowOrphans]);
			});
			save(ctx);
		});
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					engine=global.get_value()
					fullscreen=true
					on_node_click=set_open_file
				/>
				<div class="graph-overlay">
					<h1>"Vault Graph"</h1>
					<p class="subtitle">
						"Click a node to open it. Shift-click to select. Drag nodes to reposition. Scroll to zoom."
					</p>
					<input type="search" placeholder="Search files" on:input=on_search />
					<label>
						<input type="checkbox" checked=true on:change=on_orphans />
						"Show orphans"
					</label>
					<ul class="notices">
						{move || {
							notices
								.get()
								.into_iter()
								.map(|n| view! { <li>{n}</li> })
								.collect_view()
						}}
					</ul>
				</div>
				<div class="local-graph">
					<p class="open-file">{move || open_file.get().unwrap_or_default()}</p>
					<ForceGraphCanvas
						engine=local.get_value()
						width=Some(320.0)
						height=Some(240.0)
						on_node_click=set_open_file
					/>
				</div>
			</div>
		</ErrorBoundary>
	}
}
