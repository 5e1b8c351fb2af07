use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use crate::sync::hex_to_rgba;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	if state.style.display.show_center_coordinates {
		draw_origin(state, ctx);
	}
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	draw_selection(state, ctx);
	ctx.restore();
}

fn draw_selection(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	if state.selected().is_empty() {
		return;
	}
	let k = state.transform.k;
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
	ctx.set_line_width(2.0 / k);
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !state.selected().contains(&info.id) {
			return;
		}
		ctx.begin_path();
		let _ = ctx.arc(node.x() as f64, node.y() as f64, info.radius + 3.0 / k, 0.0, 2.0 * PI);
		ctx.stroke();
	});
}

fn draw_origin(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (k, size) = (state.transform.k, 12.0 / state.transform.k);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
	ctx.set_line_width(1.0 / k);
	ctx.begin_path();
	ctx.move_to(-size, 0.0);
	ctx.line_to(size, 0.0);
	ctx.move_to(0.0, -size);
	ctx.line_to(0.0, size);
	ctx.stroke();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let display = &state.style.display;
	let (line_width, dash, gap) = (display.link_thickness / k, 8.0 / k, 4.0 / k);
	let arrow_size = if display.show_link_arrow { 8.0 / k } else { 0.0 };
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return;
		}

		let (a, b) = (&n1.data.user_data, &n2.data.user_data);
		let is_highlighted = state.has_active_highlight()
			&& (state.is_hovered(&a.id) || state.is_hovered(&b.id))
			&& state.is_highlighted(&a.id)
			&& state.is_highlighted(&b.id);

		// Base values when no highlight active
		// When highlighting: highlighted edges brighten, others dim
		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		let color = |alpha: f64| {
			if is_highlighted {
				hex_to_rgba(&display.link_hover_color, alpha)
			} else {
				format!("rgba(100, 180, 255, {})", alpha)
			}
		};
		ctx.set_stroke_style_str(&color(edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * a.radius, y1 + uy * a.radius);
		ctx.line_to(
			x2 - ux * (b.radius + arrow_size),
			y2 - uy * (b.radius + arrow_size),
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		if arrow_size == 0.0 {
			return;
		}
		ctx.set_fill_style_str(&color(arrow_alpha));
		let (tip_x, tip_y) = (x2 - ux * b.radius, y2 - uy * b.radius);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	});
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	let display = &state.style.display;

	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if has_highlight && state.is_highlighted(&info.id) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		// Labels only once zoomed in far enough to read them
		if k >= 0.8 {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 3.0);
		}
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !state.is_highlighted(&info.id) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(&info.id);
		let is_neighbor = state.is_neighbor(&info.id);

		let (radius, glow_radius, color) = if is_hovered {
			(
				info.radius * (1.0 + 0.35 * t),
				info.radius * (1.8 + 1.2 * t),
				display.node_hover_color.as_str(),
			)
		} else if is_neighbor {
			(
				info.radius * (1.0 + 0.2 * t),
				info.radius * (1.4 + 0.6 * t),
				display.node_hover_neighbour_color.as_str(),
			)
		} else {
			(info.radius, 0.0, info.color.as_str())
		};

		if glow_radius > 0.0 && t > 0.01 {
			let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let _ = gradient.add_color_stop(0.0, &hex_to_rgba(color, alpha));
				let _ = gradient.add_color_stop(0.6, &hex_to_rgba(color, alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if t > 0.5 { color } else { info.color.as_str() });
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 3.0);
	});
}
