//! WASM bridge for the sprite workbench.
//!
//! Compiled via `wasm-pack build --target web`. The page owns three canvases
//! (atlas, frame viewer, point editor) and routes their events here; every
//! structured result crosses the boundary as a JSON string.

mod render2d;

use kurbo::{Point, Size};
use render2d::CanvasSurface;
use serde::Serialize;
use vs_core::{CharId, SceneError};
use vs_editor::{InputEvent, OpenIn, Workbench};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// One row of the sprite picker.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpriteEntry {
    id: CharId,
    name: String,
    frame_count: usize,
}

fn ok_json<T: Serialize>(key: &str, value: &T) -> String {
    let mut obj = serde_json::json!({ "ok": true });
    obj[key] = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
    obj.to_string()
}

fn error_json(e: &SceneError) -> String {
    serde_json::json!({ "ok": false, "error": e.to_string() }).to_string()
}

/// The browser-facing controller.
///
/// Holds the loaded dataset and all three views over it.
#[wasm_bindgen]
pub struct SpriteWorkbench {
    inner: Workbench,
}

#[wasm_bindgen]
impl SpriteWorkbench {
    /// Create an empty workbench whose atlas is `atlas_width` pixels wide.
    #[wasm_bindgen(constructor)]
    pub fn new(atlas_width: f64) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();

        let mut inner = Workbench::default();
        inner.relayout(atlas_width);
        Self { inner }
    }

    /// Install an upload response.
    ///
    /// Returns `{"ok":true,"diagnostics":[...]}` or `{"ok":false,"error":"..."}`.
    /// A failed load leaves the previous dataset in place.
    pub fn load(&mut self, json: &str) -> String {
        match self.inner.load_json(json) {
            Ok(diagnostics) => {
                let messages: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
                ok_json("diagnostics", &messages)
            }
            Err(e) => error_json(&e),
        }
    }

    pub fn dataset_name(&self) -> String {
        self.inner.library().name().to_string()
    }

    /// Sprites for the picker, as a JSON array of `{id, name, frameCount}`.
    pub fn sprites_json(&self) -> String {
        let library = self.inner.library();
        let entries: Vec<SpriteEntry> = library
            .sprites()
            .iter()
            .map(|s| SpriteEntry {
                id: s.sprite_id,
                name: library.sprite_display_name(s.sprite_id),
                frame_count: s.len(),
            })
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Atlas ───────────────────────────────────────────────────────────

    pub fn resize_atlas(&mut self, width: f64) {
        self.inner.relayout(width);
    }

    /// `[width, height]` the atlas canvas should be sized to.
    pub fn atlas_size(&self) -> js_sys::Float64Array {
        let atlas = self.inner.atlas();
        js_sys::Float64Array::from(&[atlas.width, atlas.height][..])
    }

    pub fn render_atlas(&self, ctx: &CanvasRenderingContext2d) {
        let atlas = self.inner.atlas();
        let mut surface = CanvasSurface::new(ctx);
        surface.clear(atlas.width, atlas.height);
        self.inner.render_atlas(&mut surface);
    }

    /// Resolve a click in atlas pixels. Opens the shape in the point editor
    /// when `edit` is set, in the frame viewer otherwise.
    pub fn atlas_click(&mut self, x: f64, y: f64, edit: bool) -> Option<u32> {
        let target = if edit { OpenIn::Editor } else { OpenIn::Compositor };
        match self.inner.click_atlas(Point::new(x, y), target) {
            Ok(id) => id.map(|id| id.0),
            Err(e) => {
                log::warn!("atlas click: {e}");
                None
            }
        }
    }

    // ─── Frame viewer ────────────────────────────────────────────────────

    pub fn select(&mut self, id: u32) -> bool {
        self.inner.select(CharId(id))
    }

    pub fn selected(&self) -> Option<u32> {
        self.inner.compositor.selected().map(|id| id.0)
    }

    pub fn current_frame(&self) -> usize {
        self.inner.compositor.current_frame()
    }

    pub fn frame_count(&self) -> usize {
        self.inner.compositor.frame_count(self.inner.library())
    }

    pub fn next_frame(&mut self) -> usize {
        self.inner.next_frame()
    }

    pub fn prev_frame(&mut self) -> usize {
        self.inner.prev_frame()
    }

    pub fn set_transforms_enabled(&mut self, enabled: bool) {
        self.inner.compositor.enable_transforms = enabled;
    }

    /// Draw the current frame. Returns the render report as JSON.
    pub fn render_frame(&mut self, ctx: &CanvasRenderingContext2d, width: f64, height: f64) -> String {
        let mut surface = CanvasSurface::new(ctx);
        surface.clear(width, height);
        let report = self.inner.render_frame(&mut surface, width, height);
        serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Point editor ────────────────────────────────────────────────────

    pub fn open_editor(&mut self, id: u32, width: f64, height: f64) -> String {
        let opened = self.inner.edit(CharId(id)).and_then(|()| {
            let (editor, library) = self.inner.editor_mut();
            editor.fit_view(library, width, height)
        });
        match opened {
            Ok(()) => ok_json("shape", &id),
            Err(e) => error_json(&e),
        }
    }

    pub fn close_editor(&mut self) {
        self.inner.editor.close();
    }

    /// Pointer down on the editor canvas. Returns true when a redraw is due.
    pub fn editor_pointer_down(&mut self, x: f64, y: f64, button: i16) -> bool {
        self.editor_input(InputEvent::from_pointer_down(x, y, button))
    }

    pub fn editor_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.editor_input(InputEvent::from_pointer_move(x, y))
    }

    pub fn editor_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.editor_input(InputEvent::from_pointer_up(x, y))
    }

    pub fn editor_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.editor_input(InputEvent::from_wheel(x, y, delta_y))
    }

    pub fn render_editor(&self, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
        let mut surface = CanvasSurface::new(ctx);
        surface.clear(width, height);
        if let Err(e) = self.inner.render_editor(&mut surface, width, height) {
            log::debug!("editor render skipped: {e}");
        }
    }

    pub fn layers_json(&self) -> String {
        match self.inner.editor.layers(self.inner.library()) {
            Ok(layers) => ok_json("layers", &layers),
            Err(e) => error_json(&e),
        }
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> bool {
        let (editor, library) = self.inner.editor_mut();
        editor.set_layer_visible(library, index, visible).is_ok()
    }

    /// Empty color clears the fill.
    pub fn set_layer_fill(&mut self, index: usize, color: &str) -> bool {
        let (editor, library) = self.inner.editor_mut();
        let color = (!color.is_empty()).then_some(color);
        editor.set_layer_fill(library, index, color).is_ok()
    }

    /// Empty color clears the stroke.
    pub fn set_layer_stroke(&mut self, index: usize, color: &str) -> bool {
        let (editor, library) = self.inner.editor_mut();
        let color = (!color.is_empty()).then_some(color);
        editor.set_layer_stroke(library, index, color).is_ok()
    }

    // ─── Versions ────────────────────────────────────────────────────────

    /// Save the live commands. Empty name picks the default `Version N`.
    pub fn save_version(&mut self, name: &str) -> String {
        let (editor, library) = self.inner.editor_mut();
        let name = (!name.is_empty()).then_some(name);
        match editor.save_version(library, name) {
            Ok(index) => ok_json("index", &index),
            Err(e) => error_json(&e),
        }
    }

    pub fn versions_json(&self) -> String {
        let names: Vec<&str> = self.inner.editor.versions().iter().map(|v| v.name.as_str()).collect();
        serde_json::json!({
            "versions": names,
            "active": self.inner.editor.active_version(),
        })
        .to_string()
    }

    pub fn load_version(&mut self, index: usize) -> bool {
        let (editor, library) = self.inner.editor_mut();
        editor.load_version(library, index).is_ok()
    }

    pub fn revert_to_original(&mut self) -> bool {
        let (editor, library) = self.inner.editor_mut();
        editor.revert_to_original(library).is_ok()
    }

    /// Export the open shape. A positive `ref_width`/`ref_height` pair
    /// normalizes coordinates against that canvas size.
    pub fn export_json(&self, ref_width: f64, ref_height: f64) -> String {
        let reference = (ref_width > 0.0 || ref_height > 0.0).then(|| Size::new(ref_width, ref_height));
        match self.inner.editor.export(self.inner.library(), reference) {
            Ok(commands) => ok_json("commands", &commands),
            Err(e) => error_json(&e),
        }
    }
}

impl SpriteWorkbench {
    fn editor_input(&mut self, event: InputEvent) -> bool {
        self.inner.handle_editor_input(&event).needs_redraw()
    }
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("vecsprite WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Routes `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        {
            let msg = wasm_bindgen::JsValue::from(format!("[{}] {}", record.target(), record.args()));
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&msg),
                log::Level::Warn => web_sys::console::warn_1(&msg),
                _ => web_sys::console::log_1(&msg),
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn console_logger_setup() {
    // Fails only when a logger is already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Check an upload response without building a workbench.
/// Returns `{"ok":true,"diagnostics":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match vs_core::Dataset::from_json(json) {
        Ok(dataset) => {
            let messages: Vec<String> = dataset.validate().iter().map(ToString::to_string).collect();
            ok_json("diagnostics", &messages)
        }
        Err(e) => error_json(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_reports_diagnostics() {
        let out: serde_json::Value = serde_json::from_str(&validate(
            r#"{"sprites": [{"spriteId": 1, "frameCount": 3, "frames": [[]]}]}"#,
        ))
        .unwrap();
        assert_eq!(out["ok"], true);
        assert_eq!(out["diagnostics"].as_array().unwrap().len(), 1);

        let bad: serde_json::Value = serde_json::from_str(&validate("[")).unwrap();
        assert_eq!(bad["ok"], false);
    }

    #[test]
    fn editor_round_trip_through_json() {
        let mut wb = SpriteWorkbench::new(600.0);
        let loaded: serde_json::Value = serde_json::from_str(&wb.load(
            r#"{"name": "t", "shapes": [{"charId": 4, "commands": [
                {"type": "STYLE", "fillColor": "red"},
                {"type": "MOVE", "x": 0, "y": 0},
                {"type": "LINE", "x": 50, "y": 25}
            ]}]}"#,
        ))
        .unwrap();
        assert_eq!(loaded["ok"], true);
        assert_eq!(wb.dataset_name(), "t");
        assert_eq!(wb.atlas_click(10.0, 10.0, true), Some(4));

        assert!(wb.set_layer_fill(0, ""));
        let layers: serde_json::Value = serde_json::from_str(&wb.layers_json()).unwrap();
        assert_eq!(layers["layers"][0]["fillColor"], serde_json::Value::Null);

        let saved: serde_json::Value = serde_json::from_str(&wb.save_version("")).unwrap();
        assert_eq!(saved["index"], 0);
        let versions: serde_json::Value = serde_json::from_str(&wb.versions_json()).unwrap();
        assert_eq!(versions, serde_json::json!({"versions": ["Version 1"], "active": 0}));

        let export: serde_json::Value = serde_json::from_str(&wb.export_json(100.0, 50.0)).unwrap();
        assert_eq!(export["commands"][2], serde_json::json!({"type": "LINE", "x": 0.5, "y": 0.5}));
        let bad: serde_json::Value = serde_json::from_str(&wb.export_json(100.0, 0.0)).unwrap();
        assert_eq!(bad["ok"], false);
    }

    #[test]
    fn failed_load_reports_error() {
        let mut wb = SpriteWorkbench::new(600.0);
        let out: serde_json::Value = serde_json::from_str(&wb.load("{\"shapes\": 1}")).unwrap();
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().starts_with("invalid dataset"));
        assert_eq!(wb.sprites_json(), "[]");
    }
}
