//! The vector command language and its paint-layer segmentation.
//!
//! A shape is an ordered list of commands. `MOVE`, `LINE` and `CURVE` build
//! path geometry in shape-local units; `STYLE` closes the current paint layer
//! and sets fill, stroke and line width for the next one.

use crate::color::paint_color;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::Range;

// ─── Commands ────────────────────────────────────────────────────────────

/// Paint settings carried by a `STYLE` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
}

impl LayerStyle {
    /// Fill to paint, if any (`None` when unset or transparent).
    pub fn fill(&self) -> Option<&str> {
        paint_color(self.fill_color.as_deref())
    }

    /// Stroke to paint, if any (`None` when unset or transparent).
    pub fn stroke(&self) -> Option<&str> {
        paint_color(self.stroke_color.as_deref())
    }
}

/// One step of a vector path.
///
/// Decoded from the upstream `{"type": "MOVE", "x": .., "y": ..}` records.
/// Unrecognized `type` values become [`Command::Unknown`] and are skipped by
/// every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Command {
    Move {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Line {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    /// Quadratic Bézier to `(x, y)` through control point `(cx, cy)`.
    Curve {
        #[serde(default)]
        cx: f64,
        #[serde(default)]
        cy: f64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Style(LayerStyle),
    #[serde(other)]
    Unknown,
}

/// Which of a command's points is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    End,
    Control,
}

impl Command {
    pub fn move_to(x: f64, y: f64) -> Self {
        Self::Move { x, y }
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        Self::Line { x, y }
    }

    pub fn curve_to(cx: f64, cy: f64, x: f64, y: f64) -> Self {
        Self::Curve { cx, cy, x, y }
    }

    pub fn style(fill: Option<&str>, stroke: Option<&str>, line_width: Option<f64>) -> Self {
        Self::Style(LayerStyle {
            fill_color: fill.map(str::to_owned),
            stroke_color: stroke.map(str::to_owned),
            line_width,
        })
    }

    pub fn is_style(&self) -> bool {
        matches!(self, Self::Style(_))
    }

    pub fn as_style(&self) -> Option<&LayerStyle> {
        match self {
            Self::Style(style) => Some(style),
            _ => None,
        }
    }

    pub fn as_style_mut(&mut self) -> Option<&mut LayerStyle> {
        match self {
            Self::Style(style) => Some(style),
            _ => None,
        }
    }

    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::Move { x, y } | Self::Line { x, y } | Self::Curve { x, y, .. } => {
                Some(Point::new(x, y))
            }
            Self::Style(_) | Self::Unknown => None,
        }
    }

    pub fn control_point(&self) -> Option<Point> {
        match *self {
            Self::Curve { cx, cy, .. } => Some(Point::new(cx, cy)),
            _ => None,
        }
    }

    pub fn point(&self, kind: PointKind) -> Option<Point> {
        match kind {
            PointKind::End => self.end_point(),
            PointKind::Control => self.control_point(),
        }
    }

    /// Overwrite the addressed point. Returns `false` if the command has no
    /// such point (e.g. the control point of a `LINE`).
    pub fn set_point(&mut self, kind: PointKind, p: Point) -> bool {
        match (self, kind) {
            (
                Self::Move { x, y } | Self::Line { x, y } | Self::Curve { x, y, .. },
                PointKind::End,
            ) => {
                *x = p.x;
                *y = p.y;
                true
            }
            (Self::Curve { cx, cy, .. }, PointKind::Control) => {
                *cx = p.x;
                *cy = p.y;
                true
            }
            _ => false,
        }
    }

    /// Endpoint first, then the control point for curves.
    pub fn points(&self) -> SmallVec<[Point; 2]> {
        let mut out = SmallVec::new();
        out.extend(self.end_point());
        out.extend(self.control_point());
        out
    }
}

/// Flat point set of a command list: every endpoint plus every control
/// point, in declared order. `STYLE` contributes nothing.
pub fn extract_points(commands: &[Command]) -> Vec<Point> {
    commands.iter().flat_map(Command::points).collect()
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// A contiguous run of draw commands governed by one `STYLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Index of the heading `STYLE` command; `None` for a leading unstyled run.
    pub style_index: Option<usize>,
    /// Draw commands of this layer (the heading `STYLE` is excluded).
    pub commands: Range<usize>,
    pub style: LayerStyle,
}

impl Layer {
    /// True when the layer has no draw commands at all.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Split a command list at every `STYLE` command.
///
/// Commands before the first `STYLE` form layer 0 with a default (unpainted)
/// style, but only if there are any. Every `STYLE` opens a new layer, even
/// when the next command is another `STYLE`.
pub fn split_layers(commands: &[Command]) -> Vec<Layer> {
    let mut layers = Vec::new();
    let mut current: Option<(Option<usize>, LayerStyle)> = None;
    let mut start = 0;

    for (i, cmd) in commands.iter().enumerate() {
        if let Command::Style(style) = cmd {
            match current.take() {
                Some((style_index, prev)) => layers.push(Layer {
                    style_index,
                    commands: start..i,
                    style: prev,
                }),
                None if i > 0 => layers.push(Layer {
                    style_index: None,
                    commands: 0..i,
                    style: LayerStyle::default(),
                }),
                None => {}
            }
            current = Some((Some(i), style.clone()));
            start = i + 1;
        }
    }

    match current {
        Some((style_index, style)) => layers.push(Layer {
            style_index,
            commands: start..commands.len(),
            style,
        }),
        None if !commands.is_empty() => layers.push(Layer {
            style_index: None,
            commands: 0..commands.len(),
            style: LayerStyle::default(),
        }),
        None => {}
    }

    layers
}
