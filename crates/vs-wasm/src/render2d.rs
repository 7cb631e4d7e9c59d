//! Canvas2D surface.
//!
//! Forwards every [`Surface`] call straight to a `CanvasRenderingContext2d`.
//! The browser keeps the transform stack and the current path, so this is
//! a thin adapter.

use kurbo::{Affine, Point, Rect};
use std::f64::consts::TAU;
use vs_render::Surface;
use web_sys::CanvasRenderingContext2d;

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    font_family: &'static str,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            font_family: "system-ui, sans-serif",
        }
    }

    /// Reset to identity and clear, ready for a full redraw.
    pub fn clear(&mut self, width: f64, height: f64) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }
}

impl Surface for CanvasSurface<'_> {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn transform(&mut self, m: Affine) {
        let [a, b, c, d, e, f] = m.as_coeffs();
        let _ = self.ctx.transform(a, b, c, d, e, f);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: Point) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.ctx.line_to(p.x, p.y);
    }

    fn quad_to(&mut self, ctrl: Point, end: Point) {
        self.ctx.quadratic_curve_to(ctrl.x, ctrl.y, end.x, end.y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn arc(&mut self, center: Point, radius: f64) {
        // Start a fresh subpath so the circle is not joined to the last point.
        self.ctx.move_to(center.x + radius, center.y);
        let _ = self.ctx.arc(center.x, center.y, radius, 0.0, TAU);
    }

    fn fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn stroke(&mut self, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_text(&mut self, text: &str, at: Point, color: &str, size_px: f64) {
        self.ctx.set_font(&format!("{size_px}px {}", self.font_family));
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }
}
