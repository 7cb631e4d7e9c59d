//! Standalone SVG output.
//!
//! Paths are flattened into device space as they are built, so the
//! document carries no `transform` attributes. CSS colors that parse are
//! written as `#RRGGBB` plus an opacity attribute; anything else is passed
//! through for the SVG renderer to interpret.

use crate::surface::{Surface, TransformStack};
use kurbo::{Point, Rect};
use std::fmt::Write as _;
use vs_core::parse_css_color;

#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
    path: String,
    has_current_point: bool,
    transforms: TransformStack,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            path: String::new(),
            has_current_point: false,
            transforms: TransformStack::default(),
        }
    }

    /// Wrap everything drawn so far into an `<svg>` document.
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = num(self.width),
            h = num(self.height),
            body = self.body
        )
    }

    fn device(&self, p: Point) -> Point {
        self.transforms.current() * p
    }

    fn push_point(&mut self, op: char, p: Point) {
        let p = self.device(p);
        let _ = write!(self.path, "{op}{} {} ", num(p.x), num(p.y));
    }
}

/// Trim coordinates to what a viewer can show.
fn num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_owned()
    } else {
        format!("{rounded}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `name="color"` plus `name-opacity` when the color is translucent.
fn paint_attr(name: &str, color: &str) -> String {
    match parse_css_color(color) {
        Some(c) if c.a < 1.0 => format!(
            "{name}=\"{}\" {name}-opacity=\"{}\"",
            c.to_hex_rgb(),
            num(f64::from(c.a))
        ),
        Some(c) => format!("{name}=\"{}\"", c.to_hex_rgb()),
        None => format!("{name}=\"{}\"", escape(color)),
    }
}

impl Surface for SvgSurface {
    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) {
        self.transforms.restore();
    }

    fn transform(&mut self, m: kurbo::Affine) {
        self.transforms.apply(m);
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.has_current_point = false;
    }

    fn move_to(&mut self, p: Point) {
        self.push_point('M', p);
        self.has_current_point = true;
    }

    fn line_to(&mut self, p: Point) {
        if !self.has_current_point {
            return self.move_to(p);
        }
        self.push_point('L', p);
    }

    fn quad_to(&mut self, ctrl: Point, end: Point) {
        if !self.has_current_point {
            self.move_to(ctrl);
        }
        let (c, e) = (self.device(ctrl), self.device(end));
        let _ = write!(self.path, "Q{} {} {} {} ", num(c.x), num(c.y), num(e.x), num(e.y));
    }

    fn close_path(&mut self) {
        if self.has_current_point {
            self.path.push_str("Z ");
        }
    }

    fn arc(&mut self, center: Point, radius: f64) {
        let c = self.device(center);
        let r = radius * self.transforms.linear_scale();
        // Two half arcs make a full circle subpath.
        let _ = write!(
            self.path,
            "M{} {} A{r} {r} 0 1 0 {} {} A{r} {r} 0 1 0 {} {} Z ",
            num(c.x + r),
            num(c.y),
            num(c.x - r),
            num(c.y),
            num(c.x + r),
            num(c.y),
            r = num(r)
        );
        self.has_current_point = true;
    }

    fn fill(&mut self, color: &str) {
        if self.path.is_empty() {
            return;
        }
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" {}/>",
            self.path.trim_end(),
            paint_attr("fill", color)
        );
    }

    fn stroke(&mut self, color: &str, line_width: f64) {
        if self.path.is_empty() {
            return;
        }
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" fill=\"none\" {} stroke-width=\"{}\"/>",
            self.path.trim_end(),
            paint_attr("stroke", color),
            num(line_width * self.transforms.linear_scale())
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        let mut d = String::new();
        for (i, p) in corners.into_iter().enumerate() {
            let p = self.device(p);
            let _ = write!(d, "{}{} {} ", if i == 0 { 'M' } else { 'L' }, num(p.x), num(p.y));
        }
        let _ = writeln!(self.body, "<path d=\"{d}Z\" {}/>", paint_attr("fill", color));
    }

    fn fill_text(&mut self, text: &str, at: Point, color: &str, size_px: f64) {
        let p = self.device(at);
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" {}>{}</text>",
            num(p.x),
            num(p.y),
            num(size_px * self.transforms.linear_scale()),
            paint_attr("fill", color),
            escape(text)
        );
    }
}
