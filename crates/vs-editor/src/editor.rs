//! The point editor: one open shape, its edit session, layer controls and
//! per-shape version histories.
//!
//! The editor does not own shapes. It edits the live commands held by the
//! [`Library`] so every other view sees edits immediately.

use crate::export::export_commands;
use crate::history::{Version, VersionHistory};
use crate::input::InputEvent;
use crate::session::{EditSession, EditorConfig, Outcome, ViewTransform};
use crate::view::render_editor_view;
use kurbo::{Point, Size, Vec2};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use vs_core::{CharId, Command, LayerStyle, Library, Result, SceneError, split_layers};
use vs_render::{CameraConfig, Surface, camera_transform};

/// A layer as shown in the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    pub index: usize,
    /// `false` for the leading run before the first STYLE.
    pub styled: bool,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub line_width: Option<f64>,
    pub command_count: usize,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PointEditor {
    pub session: EditSession,
    shape: Option<CharId>,
    histories: HashMap<CharId, VersionHistory>,
    hidden_layers: BTreeSet<usize>,
}

impl PointEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            session: EditSession::new(config),
            ..Self::default()
        }
    }

    pub fn shape(&self) -> Option<CharId> {
        self.shape
    }

    /// Forget everything, including histories. Used when the dataset is
    /// replaced.
    pub fn reset(&mut self) {
        self.close();
        self.histories.clear();
    }

    pub fn close(&mut self) {
        self.shape = None;
        self.session.reset();
        self.hidden_layers.clear();
    }

    /// Open a shape for editing. Its original commands are captured the
    /// first time it is opened.
    pub fn open(&mut self, library: &Library, id: CharId) -> Result<()> {
        let shape = library.shape(id).ok_or(SceneError::UnknownShape(id))?;
        self.histories
            .entry(id)
            .or_insert_with(|| VersionHistory::new(shape.commands.clone()));
        self.shape = Some(id);
        self.session.reset();
        self.hidden_layers.clear();
        log::debug!("editing shape {id} ({} commands)", shape.commands.len());
        Ok(())
    }

    fn current(&self) -> Result<CharId> {
        self.shape.ok_or(SceneError::NoShapeSelected)
    }

    fn commands<'a>(&self, library: &'a Library) -> Result<&'a [Command]> {
        let id = self.current()?;
        let shape = library.shape(id).ok_or(SceneError::UnknownShape(id))?;
        Ok(&shape.commands)
    }

    fn commands_mut<'a>(&self, library: &'a mut Library) -> Result<&'a mut Vec<Command>> {
        let id = self.current()?;
        let shape = library.shape_mut(id).ok_or(SceneError::UnknownShape(id))?;
        Ok(&mut shape.commands)
    }

    fn history_mut(&mut self) -> Result<&mut VersionHistory> {
        let id = self.current()?;
        // Histories are created on open, so a missing one means the shape
        // vanished with a dataset swap.
        self.histories.get_mut(&id).ok_or(SceneError::UnknownShape(id))
    }

    /// Center the open shape in a `width`×`height` view.
    pub fn fit_view(&mut self, library: &Library, width: f64, height: f64) -> Result<()> {
        let id = self.current()?;
        let bounds = library.shape(id).ok_or(SceneError::UnknownShape(id))?.bounds();
        let config = &self.session.config;
        let camera = CameraConfig {
            padding: config.fit_padding,
            max_scale: config.max_zoom,
            ..CameraConfig::default()
        };
        let zoom = camera_transform(&bounds, width, height, &camera).as_coeffs()[0].max(config.min_zoom);
        let center = bounds.center();
        self.session.view = ViewTransform {
            offset: Vec2::new(width / 2.0 - center.x * zoom, height / 2.0 - center.y * zoom),
            zoom,
        };
        Ok(())
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Feed one input event. Without an open shape only the wheel has an
    /// effect.
    pub fn handle(&mut self, library: &mut Library, event: &InputEvent) -> Outcome {
        match *event {
            InputEvent::PointerDown { x, y, button } => match self.commands(library) {
                Ok(commands) => self.session.pointer_down(commands, Point::new(x, y), button),
                Err(_) => Outcome::Unchanged,
            },
            InputEvent::PointerMove { x, y } => match self.commands_mut(library) {
                Ok(commands) => self.session.pointer_move(commands, Point::new(x, y)),
                Err(_) => Outcome::Unchanged,
            },
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { x, y, delta_y } => self.session.wheel(Point::new(x, y), delta_y),
        }
    }

    /// Ends every gesture, and the live commands stop matching whatever
    /// version was active.
    pub fn pointer_up(&mut self) -> Outcome {
        if let Ok(history) = self.history_mut() {
            history.mark_divergent();
        }
        self.session.pointer_up()
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    pub fn is_layer_visible(&self, index: usize) -> bool {
        !self.hidden_layers.contains(&index)
    }

    pub fn layers(&self, library: &Library) -> Result<Vec<LayerInfo>> {
        let commands = self.commands(library)?;
        Ok(split_layers(commands)
            .into_iter()
            .enumerate()
            .map(|(index, layer)| LayerInfo {
                index,
                styled: layer.style_index.is_some(),
                fill_color: layer.style.fill_color,
                stroke_color: layer.style.stroke_color,
                line_width: layer.style.line_width,
                command_count: layer.commands.len(),
                visible: self.is_layer_visible(index),
            })
            .collect())
    }

    /// Show or hide a layer in the editor view. Does not touch commands.
    pub fn set_layer_visible(&mut self, library: &Library, index: usize, visible: bool) -> Result<()> {
        let len = split_layers(self.commands(library)?).len();
        if index >= len {
            return Err(SceneError::LayerOutOfRange { index, len });
        }
        if visible {
            self.hidden_layers.remove(&index);
        } else {
            self.hidden_layers.insert(index);
        }
        Ok(())
    }

    pub fn set_layer_fill(&mut self, library: &mut Library, index: usize, color: Option<&str>) -> Result<()> {
        self.edit_layer_style(library, index, |style| style.fill_color = color.map(str::to_owned))
    }

    pub fn set_layer_stroke(&mut self, library: &mut Library, index: usize, color: Option<&str>) -> Result<()> {
        self.edit_layer_style(library, index, |style| style.stroke_color = color.map(str::to_owned))
    }

    fn edit_layer_style(
        &mut self,
        library: &mut Library,
        index: usize,
        edit: impl FnOnce(&mut LayerStyle),
    ) -> Result<()> {
        let commands = self.commands_mut(library)?;
        let layers = split_layers(commands);
        let layer = layers.get(index).ok_or(SceneError::LayerOutOfRange {
            index,
            len: layers.len(),
        })?;
        let style = layer
            .style_index
            .and_then(|i| commands.get_mut(i))
            .and_then(Command::as_style_mut)
            .ok_or(SceneError::LayerWithoutStyle(index))?;
        edit(style);
        self.history_mut()?.mark_divergent();
        Ok(())
    }

    // ─── Versions ────────────────────────────────────────────────────────

    pub fn versions(&self) -> &[Version] {
        self.shape
            .and_then(|id| self.histories.get(&id))
            .map(VersionHistory::versions)
            .unwrap_or_default()
    }

    pub fn active_version(&self) -> Option<usize> {
        self.shape
            .and_then(|id| self.histories.get(&id))
            .and_then(VersionHistory::active)
    }

    pub fn save_version(&mut self, library: &Library, name: Option<&str>) -> Result<usize> {
        let commands = self.commands(library)?;
        let index = self.history_mut()?.save(name, commands);
        log::debug!("saved version {index} of shape {:?}", self.shape);
        Ok(index)
    }

    /// Replace the live commands with a saved version. Unsaved edits are lost.
    pub fn load_version(&mut self, library: &mut Library, index: usize) -> Result<()> {
        let restored = self.history_mut()?.load(index)?;
        *self.commands_mut(library)? = restored;
        self.session.clear_selection();
        Ok(())
    }

    /// Replace the live commands with the originally captured ones.
    pub fn revert_to_original(&mut self, library: &mut Library) -> Result<()> {
        let restored = self.history_mut()?.revert();
        *self.commands_mut(library)? = restored;
        self.session.clear_selection();
        Ok(())
    }

    // ─── Output ──────────────────────────────────────────────────────────

    pub fn export(&self, library: &Library, reference: Option<Size>) -> Result<Vec<Command>> {
        export_commands(self.commands(library)?, reference)
    }

    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        library: &Library,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let commands = self.commands(library)?;
        render_editor_view(
            surface,
            commands,
            &self.session,
            |i| self.is_layer_visible(i),
            width,
            height,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButton;
    use pretty_assertions::assert_eq;
    use vs_core::{Dataset, Shape};
    use vs_render::DisplayList;

    fn library() -> Library {
        Library::from_dataset(Dataset {
            shapes: vec![Shape::new(
                CharId(1),
                vec![
                    Command::move_to(0.0, 0.0),
                    Command::line_to(10.0, 10.0),
                    Command::style(Some("red"), None, Some(1.0)),
                    Command::move_to(20.0, 20.0),
                    Command::line_to(40.0, 20.0),
                ],
            )],
            ..Dataset::default()
        })
    }

    fn drag_point(editor: &mut PointEditor, lib: &mut Library, from: Point, to: Point) {
        editor.handle(lib, &InputEvent::PointerDown { x: from.x, y: from.y, button: PointerButton::Primary });
        editor.handle(lib, &InputEvent::PointerDown { x: from.x, y: from.y, button: PointerButton::Primary });
        editor.handle(lib, &InputEvent::PointerMove { x: to.x, y: to.y });
        editor.handle(lib, &InputEvent::PointerUp { x: to.x, y: to.y });
    }

    #[test]
    fn requires_an_open_shape() {
        let mut lib = library();
        let mut editor = PointEditor::default();
        assert!(matches!(editor.layers(&lib), Err(SceneError::NoShapeSelected)));
        assert!(matches!(editor.open(&lib, CharId(9)), Err(SceneError::UnknownShape(_))));
        let out = editor.handle(&mut lib, &InputEvent::PointerMove { x: 1.0, y: 1.0 });
        assert_eq!(out, Outcome::Unchanged);
    }

    #[test]
    fn click_select_then_drag_edits_live_commands() {
        let mut lib = library();
        let mut editor = PointEditor::default();
        editor.open(&lib, CharId(1)).unwrap();
        drag_point(&mut editor, &mut lib, Point::new(40.0, 20.0), Point::new(45.0, 25.0));
        assert_eq!(lib.shape(CharId(1)).unwrap().commands[4], Command::line_to(45.0, 25.0));
    }

    #[test]
    fn layers_and_style_edits() {
        let mut lib = library();
        let mut editor = PointEditor::default();
        editor.open(&lib, CharId(1)).unwrap();

        let layers = editor.layers(&lib).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(!layers[0].styled);
        assert_eq!(layers[1].fill_color.as_deref(), Some("red"));

        assert!(matches!(
            editor.set_layer_fill(&mut lib, 0, Some("blue")),
            Err(SceneError::LayerWithoutStyle(0))
        ));
        assert!(matches!(
            editor.set_layer_visible(&lib, 5, false),
            Err(SceneError::LayerOutOfRange { index: 5, len: 2 })
        ));

        editor.save_version(&lib, None).unwrap();
        editor.set_layer_stroke(&mut lib, 1, Some("black")).unwrap();
        assert_eq!(editor.active_version(), None);
        assert_eq!(
            lib.shape(CharId(1)).unwrap().commands[2],
            Command::style(Some("red"), Some("black"), Some(1.0))
        );

        editor.set_layer_visible(&lib, 1, false).unwrap();
        assert!(!editor.layers(&lib).unwrap()[1].visible);
        let mut dl = DisplayList::new();
        editor.render(&mut dl, &lib, 100.0, 100.0).unwrap();
        assert!(!dl.fills().contains(&"red"));
    }

    #[test]
    fn versions_round_trip_and_revert() {
        let mut lib = library();
        let mut editor = PointEditor::default();
        editor.open(&lib, CharId(1)).unwrap();
        let original = lib.shape(CharId(1)).unwrap().commands.clone();

        drag_point(&mut editor, &mut lib, Point::new(40.0, 20.0), Point::new(50.0, 20.0));
        let v0 = editor.save_version(&lib, Some("longer")).unwrap();
        let saved = lib.shape(CharId(1)).unwrap().commands.clone();
        assert_eq!(editor.active_version(), Some(v0));

        drag_point(&mut editor, &mut lib, Point::new(50.0, 20.0), Point::new(60.0, 20.0));
        assert_eq!(editor.active_version(), None);

        editor.load_version(&mut lib, v0).unwrap();
        assert_eq!(lib.shape(CharId(1)).unwrap().commands, saved);
        assert_eq!(editor.active_version(), Some(v0));

        editor.save_version(&lib, None).unwrap();
        editor.revert_to_original(&mut lib).unwrap();
        assert_eq!(lib.shape(CharId(1)).unwrap().commands, original);
        assert_eq!(editor.active_version(), None);
        assert_eq!(editor.versions().len(), 2);

        // Reopening keeps the first captured original.
        drag_point(&mut editor, &mut lib, Point::new(40.0, 20.0), Point::new(70.0, 20.0));
        editor.close();
        editor.open(&lib, CharId(1)).unwrap();
        editor.revert_to_original(&mut lib).unwrap();
        assert_eq!(lib.shape(CharId(1)).unwrap().commands, original);
    }

    #[test]
    fn fit_view_centers_shape() {
        let lib = library();
        let mut editor = PointEditor::default();
        editor.open(&lib, CharId(1)).unwrap();
        editor.fit_view(&lib, 450.0, 250.0).unwrap();
        // Bounds 0..40 × 0..20 → zoom min(400/40, 200/20) = 10.
        assert_eq!(editor.session.view.zoom, 10.0);
        let center = editor.session.view.to_screen(Point::new(20.0, 10.0));
        assert_eq!(center, Point::new(225.0, 125.0));
    }

    #[test]
    fn normalized_export() {
        let lib = library();
        let mut editor = PointEditor::default();
        editor.open(&lib, CharId(1)).unwrap();
        let out = editor.export(&lib, Some(Size::new(40.0, 20.0))).unwrap();
        assert_eq!(out[4], Command::line_to(1.0, 1.0));
        assert_eq!(out[2], Command::style(Some("red"), None, Some(1.0)));
    }
}
