//! The 2D drawing surface everything renders through.
//!
//! Mirrors the retained canvas model: a current path that persists across
//! `fill`/`stroke` until the next `begin_path`, and a transform stack where
//! path points are mapped through the transform current at the time they
//! are added.

use kurbo::{Affine, Point, Rect};

pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    /// Post-multiply the current transform, like canvas `transform()`.
    fn transform(&mut self, m: Affine);

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate((dx, dy)));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::scale_non_uniform(sx, sy));
    }

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, ctrl: Point, end: Point);
    fn close_path(&mut self);
    /// Add a full circle as its own subpath.
    fn arc(&mut self, center: Point, radius: f64);

    /// Fill the current path with a CSS color.
    fn fill(&mut self, color: &str);
    /// Stroke the current path; `line_width` is in current user units.
    fn stroke(&mut self, color: &str, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn fill_text(&mut self, text: &str, at: Point, color: &str, size_px: f64);
}

/// Transform stack shared by the surfaces in this crate.
#[derive(Debug, Clone)]
pub(crate) struct TransformStack {
    current: Affine,
    saved: Vec<Affine>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Affine::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub(crate) fn current(&self) -> Affine {
        self.current
    }

    pub(crate) fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub(crate) fn restore(&mut self) {
        // Unbalanced restore is a no-op, as on a canvas.
        if let Some(m) = self.saved.pop() {
            self.current = m;
        }
    }

    pub(crate) fn apply(&mut self, m: Affine) {
        self.current *= m;
    }

    /// Uniform scale factor of the current transform, for line widths.
    pub(crate) fn linear_scale(&self) -> f64 {
        self.current.determinant().abs().sqrt()
    }
}

// ─── Display list ────────────────────────────────────────────────────────

/// One recorded primitive. Path points are stored in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Transform(Affine),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    ClosePath,
    Arc(Point, f64),
    Fill(String),
    Stroke(String, f64),
    FillRect(Rect, String),
    Text(String, Point),
}

/// A surface that records what was drawn. Used by tests and by callers that
/// want to inspect a frame without rasterizing it.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub ops: Vec<DrawOp>,
    transforms: TransformStack,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_transform(&self) -> Affine {
        self.transforms.current()
    }

    /// Colors of every `fill`, in paint order.
    pub fn fills(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill(c) => Some(c.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(color, width)` of every `stroke`, in paint order.
    pub fn strokes(&self) -> Vec<(&str, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke(c, w) => Some((c.as_str(), *w)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(t, _) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every device-space path point (endpoints and controls).
    pub fn path_points(&self) -> Vec<Point> {
        let mut out = Vec::new();
        for op in &self.ops {
            match *op {
                DrawOp::MoveTo(p) | DrawOp::LineTo(p) => out.push(p),
                DrawOp::QuadTo(c, p) => {
                    out.push(c);
                    out.push(p);
                }
                _ => {}
            }
        }
        out
    }
}

impl Surface for DisplayList {
    fn save(&mut self) {
        self.transforms.save();
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.transforms.restore();
        self.ops.push(DrawOp::Restore);
    }

    fn transform(&mut self, m: Affine) {
        self.transforms.apply(m);
        self.ops.push(DrawOp::Transform(m));
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        let p = self.transforms.current() * p;
        self.ops.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        let p = self.transforms.current() * p;
        self.ops.push(DrawOp::LineTo(p));
    }

    fn quad_to(&mut self, ctrl: Point, end: Point) {
        let m = self.transforms.current();
        self.ops.push(DrawOp::QuadTo(m * ctrl, m * end));
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
    }

    fn arc(&mut self, center: Point, radius: f64) {
        let center = self.transforms.current() * center;
        let radius = radius * self.transforms.linear_scale();
        self.ops.push(DrawOp::Arc(center, radius));
    }

    fn fill(&mut self, color: &str) {
        self.ops.push(DrawOp::Fill(color.to_owned()));
    }

    fn stroke(&mut self, color: &str, line_width: f64) {
        self.ops.push(DrawOp::Stroke(color.to_owned(), line_width));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ops.push(DrawOp::FillRect(rect, color.to_owned()));
    }

    fn fill_text(&mut self, text: &str, at: Point, _color: &str, _size_px: f64) {
        let at = self.transforms.current() * at;
        self.ops.push(DrawOp::Text(text.to_owned(), at));
    }
}
