pub mod color;
pub mod command;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod model;
pub mod transform;

pub use color::{Color, paint_color, parse_css_color};
pub use command::{Command, Layer, LayerStyle, PointKind, extract_points, split_layers};
pub use error::{Result, SceneError};
pub use geometry::{Bounds, BoundsBuilder, compute_bounds, convex_hull};
pub use graph::sprite_cycles;
pub use id::CharId;
pub use model::*;
pub use transform::{IDENTITY, compose, sanitize};

// Re-export kurbo geometry types so downstream crates share one definition.
pub use kurbo::{Affine, Point, Vec2};
