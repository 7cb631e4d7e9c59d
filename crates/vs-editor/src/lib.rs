pub mod editor;
pub mod export;
pub mod history;
pub mod input;
pub mod session;
pub mod view;
pub mod workbench;

pub use editor::{LayerInfo, PointEditor};
pub use export::{export_commands, export_json, normalize_commands};
pub use history::{Version, VersionHistory};
pub use input::{InputEvent, PointerButton};
pub use session::{Axis, DragState, EditSession, EditorConfig, Outcome, SelectedPoint, ViewTransform};
pub use view::render_editor_view;
pub use workbench::{OpenIn, Workbench};
