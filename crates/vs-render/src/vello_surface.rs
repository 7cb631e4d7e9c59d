//! Surface → Vello scene.
//!
//! Points are mapped to device space as they are added, matching canvas
//! path semantics, so fills and strokes are issued with an identity
//! transform. Stroke widths are scaled by the current transform's uniform
//! scale factor.

use crate::surface::{Surface, TransformStack};
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as _, Stroke};
use peniko::{Color, Fill};
use vello::Scene;
use vs_core::parse_css_color;

/// Curve flattening tolerance used when converting circles to paths.
const TOLERANCE: f64 = 0.1;

pub struct VelloSurface<'a> {
    scene: &'a mut Scene,
    transforms: TransformStack,
    path: BezPath,
    has_current_point: bool,
}

impl<'a> VelloSurface<'a> {
    /// Draw into `scene`. Call once per frame with a freshly-reset scene.
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            transforms: TransformStack::default(),
            path: BezPath::new(),
            has_current_point: false,
        }
    }

    fn device(&self, p: Point) -> Point {
        self.transforms.current() * p
    }
}

/// Colors that do not parse paint opaque black, like an invalid canvas style.
fn to_color(css: &str) -> Color {
    match parse_css_color(css) {
        Some(c) => {
            let [r, g, b, a] = c.to_rgba8();
            Color::from_rgba8(r, g, b, a)
        }
        None => {
            log::trace!("unparsed color {css:?}; painting black");
            Color::from_rgb8(0, 0, 0)
        }
    }
}

impl Surface for VelloSurface<'_> {
    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) {
        self.transforms.restore();
    }

    fn transform(&mut self, m: Affine) {
        self.transforms.apply(m);
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.has_current_point = false;
    }

    fn move_to(&mut self, p: Point) {
        let p = self.device(p);
        self.path.move_to(p);
        self.has_current_point = true;
    }

    fn line_to(&mut self, p: Point) {
        if !self.has_current_point {
            return self.move_to(p);
        }
        let p = self.device(p);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, ctrl: Point, end: Point) {
        if !self.has_current_point {
            self.move_to(ctrl);
        }
        let (c, e) = (self.device(ctrl), self.device(end));
        self.path.quad_to(c, e);
    }

    fn close_path(&mut self) {
        if self.has_current_point {
            self.path.close_path();
        }
    }

    fn arc(&mut self, center: Point, radius: f64) {
        let circle = self.transforms.current() * Circle::new(center, radius).to_path(TOLERANCE);
        self.path.extend(circle.elements().iter().copied());
        self.has_current_point = true;
    }

    fn fill(&mut self, color: &str) {
        if self.path.elements().is_empty() {
            return;
        }
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, &self.path);
    }

    fn stroke(&mut self, color: &str, line_width: f64) {
        if self.path.elements().is_empty() {
            return;
        }
        let stroke = Stroke::new(line_width * self.transforms.linear_scale());
        self.scene
            .stroke(&stroke, Affine::IDENTITY, to_color(color), None, &self.path);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        let shape = self.transforms.current() * rect.to_path(TOLERANCE);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, &shape);
    }

    fn fill_text(&mut self, text: &str, at: Point, _color: &str, _size_px: f64) {
        let at = self.device(at);
        // Glyph shaping needs a font context; labels are skipped here.
        log::trace!("TEXT {text:?} at ({}, {})", at.x, at.y);
    }
}
