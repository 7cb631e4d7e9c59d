//! Host-level state: the loaded dataset and every view over it.
//!
//! A host (browser bridge, CLI) owns one `Workbench`. Loading replaces the
//! whole dataset at once; a failed load changes nothing.

use crate::editor::PointEditor;
use crate::input::InputEvent;
use crate::session::{EditorConfig, Outcome};
use kurbo::Point;
use vs_core::{CharId, Dataset, Library, Resolved, Result, SceneError};
use vs_render::{
    AtlasConfig, AtlasLayout, CameraConfig, RenderReport, SceneCompositor, Surface, render_atlas,
};

/// Where an atlas click should send the picked shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenIn {
    Compositor,
    Editor,
}

#[derive(Debug, Clone)]
pub struct Workbench {
    library: Library,
    atlas_config: AtlasConfig,
    atlas: AtlasLayout,
    pub compositor: SceneCompositor,
    pub editor: PointEditor,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(
            AtlasConfig::default(),
            CameraConfig::default(),
            EditorConfig::default(),
            800.0,
        )
    }
}

impl Workbench {
    pub fn new(
        atlas_config: AtlasConfig,
        camera: CameraConfig,
        editor: EditorConfig,
        viewport_width: f64,
    ) -> Self {
        let library = Library::new();
        let atlas = AtlasLayout::compute(library.shapes(), viewport_width, &atlas_config);
        Self {
            library,
            atlas_config,
            atlas,
            compositor: SceneCompositor::new(camera),
            editor: PointEditor::new(editor),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }

    /// Decode and install an upload response.
    ///
    /// On success returns the non-fatal diagnostics of the new dataset.
    /// On error the previous dataset and all view state stay as they were.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<SceneError>> {
        let dataset = Dataset::from_json(json).inspect_err(|e| log::warn!("upload rejected: {e}"))?;
        Ok(self.load_dataset(dataset))
    }

    pub fn load_dataset(&mut self, dataset: Dataset) -> Vec<SceneError> {
        let (library, diagnostics) = Library::ingest(dataset);
        self.library = library;
        self.compositor.reset();
        self.editor.reset();
        self.relayout(self.atlas.width);
        self.compositor.auto_select(&self.library);
        diagnostics
    }

    /// Recompute the atlas for a new viewport width.
    pub fn relayout(&mut self, viewport_width: f64) {
        self.atlas = AtlasLayout::compute(self.library.shapes(), viewport_width, &self.atlas_config);
    }

    pub fn atlas_hit(&self, p: Point) -> Option<CharId> {
        self.atlas.char_id_at(p)
    }

    /// Resolve an atlas click and open the shape there. Returns the picked id.
    pub fn click_atlas(&mut self, p: Point, target: OpenIn) -> Result<Option<CharId>> {
        let Some(id) = self.atlas_hit(p) else {
            return Ok(None);
        };
        match target {
            OpenIn::Compositor => {
                self.compositor.select(&self.library, id);
            }
            OpenIn::Editor => self.editor.open(&self.library, id)?,
        }
        Ok(Some(id))
    }

    /// Select any charId for playback, sprite or shape.
    pub fn select(&mut self, id: CharId) -> bool {
        self.compositor.select(&self.library, id)
    }

    /// Open a shape in the point editor.
    pub fn edit(&mut self, id: CharId) -> Result<()> {
        match self.library.resolve(id) {
            Resolved::Shape(_) => self.editor.open(&self.library, id),
            _ => Err(SceneError::UnknownShape(id)),
        }
    }

    pub fn next_frame(&mut self) -> usize {
        self.compositor.next_frame(&self.library)
    }

    pub fn prev_frame(&mut self) -> usize {
        self.compositor.prev_frame(&self.library)
    }

    pub fn render_atlas<S: Surface + ?Sized>(&self, surface: &mut S) {
        render_atlas(surface, &self.library, &self.atlas, &self.atlas_config);
    }

    pub fn render_frame<S: Surface + ?Sized>(&mut self, surface: &mut S, width: f64, height: f64) -> RenderReport {
        self.compositor.render(surface, &self.library, width, height)
    }

    pub fn render_editor<S: Surface + ?Sized>(&self, surface: &mut S, width: f64, height: f64) -> Result<()> {
        self.editor.render(surface, &self.library, width, height)
    }

    pub fn handle_editor_input(&mut self, event: &InputEvent) -> Outcome {
        self.editor.handle(&mut self.library, event)
    }

    /// Split borrow for editor operations that write the live shape.
    pub fn editor_mut(&mut self) -> (&mut PointEditor, &mut Library) {
        (&mut self.editor, &mut self.library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TINY: &str = r#"{
        "name": "tiny",
        "shapes": [
            {"charId": 1, "commands": [{"type": "MOVE", "x": 0, "y": 0}, {"type": "LINE", "x": 4, "y": 4}]},
            {"charId": 2, "commands": []}
        ],
        "sprites": [{"spriteId": 3, "frameCount": 1, "frames": [[{"charId": 1, "depth": 1}]]}]
    }"#;

    #[test]
    fn failed_load_keeps_previous_state() {
        let mut wb = Workbench::default();
        wb.load_json(TINY).unwrap();
        wb.edit(CharId(1)).unwrap();

        assert!(wb.load_json("{\"shapes\": 12}").is_err());
        assert_eq!(wb.library().name(), "tiny");
        assert_eq!(wb.editor.shape(), Some(CharId(1)));
        assert_eq!(wb.compositor.selected(), Some(CharId(3)));
    }

    #[test]
    fn successful_load_replaces_everything() {
        let mut wb = Workbench::default();
        wb.load_json(TINY).unwrap();
        wb.edit(CharId(1)).unwrap();

        let diagnostics = wb.load_json(r#"{"name": "other", "shapes": [{"charId": 9}]}"#).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(wb.library().name(), "other");
        assert_eq!(wb.editor.shape(), None);
        assert_eq!(wb.compositor.selected(), None);
        assert_eq!(wb.atlas().cells.len(), 1);
    }

    #[test]
    fn atlas_click_opens_editor() {
        let mut wb = Workbench::default();
        wb.load_json(TINY).unwrap();
        assert_eq!(wb.click_atlas(Point::new(160.0, 10.0), OpenIn::Editor).unwrap(), Some(CharId(2)));
        assert_eq!(wb.editor.shape(), Some(CharId(2)));
        assert_eq!(wb.click_atlas(Point::new(700.0, 10.0), OpenIn::Editor).unwrap(), None);

        wb.click_atlas(Point::new(10.0, 10.0), OpenIn::Compositor).unwrap();
        assert_eq!(wb.compositor.selected(), Some(CharId(1)));
        assert!(matches!(wb.edit(CharId(3)), Err(SceneError::UnknownShape(_))));
    }
}
