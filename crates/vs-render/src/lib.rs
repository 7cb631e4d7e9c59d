pub mod atlas;
pub mod compositor;
pub mod paint;
pub mod surface;
pub mod svg;
pub mod vello_surface;

pub use atlas::{AtlasCell, AtlasConfig, AtlasLayout, fit_scale, render_atlas};
pub use compositor::{CameraConfig, RenderReport, SceneCompositor, camera_transform};
pub use paint::{draw_hull, replay, replay_layers};
pub use surface::{DisplayList, DrawOp, Surface};
pub use svg::SvgSurface;
pub use vello_surface::VelloSurface;
