//! Sprite compositor: flattens nested sprite instances into one frame.
//!
//! Rendering a frame walks the selected sprite's instances in depth order,
//! pushing each instance's sanitized matrix onto the surface. Nested sprites
//! play at `(current_frame + depth_of_nesting) % frame_count`, so every level
//! of nesting runs one frame ahead of its parent.
//!
//! Whole-sprite bounds (the union over all of a sprite's frames) are
//! memoized per sprite id until [`SceneCompositor::clear_cache`].

use crate::paint::replay;
use crate::surface::Surface;
use kurbo::{Affine, Rect};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use vs_core::{Bounds, BoundsBuilder, CharId, IDENTITY, Instance, Library, Resolved, compose};

// ─── Camera ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Total margin (both sides) kept around the framed content.
    pub padding: f64,
    pub max_scale: f64,
    pub background: String,
    /// Framed instead of the content when it has no finite bounds.
    pub sentinel: Bounds,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            max_scale: 10.0,
            background: "#333".into(),
            sentinel: Bounds::SENTINEL,
        }
    }
}

/// Map `bounds` onto a `width`×`height` viewport, centered and uniformly
/// scaled to fit inside the padding.
pub fn camera_transform(bounds: &Bounds, width: f64, height: f64, config: &CameraConfig) -> Affine {
    let content_w = if bounds.width() == 0.0 { 1.0 } else { bounds.width() };
    let content_h = if bounds.height() == 0.0 { 1.0 } else { bounds.height() };
    let scale_x = (width - config.padding) / content_w;
    let scale_y = (height - config.padding) / content_h;

    let mut scale = scale_x.min(scale_y);
    // Negative when the viewport is smaller than the padding; never mirror.
    if !scale.is_finite() || scale <= 0.0 {
        scale = 1.0;
    }
    scale = scale.min(config.max_scale);

    Affine::translate((width / 2.0, height / 2.0))
        * Affine::scale(scale)
        * Affine::translate(-bounds.center().to_vec2())
}

// ─── Compositor ──────────────────────────────────────────────────────────

/// What one frame render touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderReport {
    /// Instances visited, at every nesting level.
    pub instances: usize,
    /// Shape replays issued.
    pub shapes: usize,
    /// charIds that resolved to nothing.
    pub missing: Vec<CharId>,
    /// Sprite instances skipped because they would recurse into themselves.
    pub cycles: Vec<CharId>,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone)]
pub struct SceneCompositor {
    selected: Option<CharId>,
    current_frame: usize,
    /// When off, instance matrices are ignored everywhere in the frame.
    pub enable_transforms: bool,
    pub config: CameraConfig,
    bounds_cache: HashMap<CharId, Option<Bounds>>,
}

impl Default for SceneCompositor {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl SceneCompositor {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            selected: None,
            current_frame: 0,
            enable_transforms: true,
            config,
            bounds_cache: HashMap::new(),
        }
    }

    pub fn selected(&self) -> Option<CharId> {
        self.selected
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Drop memoized sprite bounds. Needed whenever the dataset changes.
    pub fn clear_cache(&mut self) {
        self.bounds_cache.clear();
    }

    /// Forget selection and cache, ready for a new dataset.
    pub fn reset(&mut self) {
        self.clear_cache();
        self.selected = None;
        self.current_frame = 0;
    }

    /// Select a sprite (or a lone shape) and rewind to frame 0.
    ///
    /// Returns `false` and leaves the selection alone when `id` resolves to
    /// nothing.
    pub fn select(&mut self, library: &Library, id: CharId) -> bool {
        match library.resolve(id) {
            Resolved::Missing => {
                log::debug!("select: {id} is neither a sprite nor a shape");
                false
            }
            resolved => {
                self.selected = Some(id);
                self.current_frame = 0;
                if let Resolved::Sprite(sprite) = resolved {
                    log::debug!(
                        "selected {} with {} frames",
                        library.sprite_display_name(id),
                        sprite.len()
                    );
                    for inst in sprite.frame(0).unwrap_or_default() {
                        log_instance(library, inst);
                    }
                }
                true
            }
        }
    }

    /// Select the first sprite of the dataset if nothing is selected yet.
    pub fn auto_select(&mut self, library: &Library) -> Option<CharId> {
        if self.selected.is_none()
            && let Some(first) = library.sprites().first()
        {
            self.select(library, first.sprite_id);
        }
        self.selected
    }

    /// Frames of the selection: a sprite's frame list length, 1 for a shape.
    pub fn frame_count(&self, library: &Library) -> usize {
        match self.selected.map(|id| library.resolve(id)) {
            Some(Resolved::Sprite(sprite)) => sprite.len(),
            Some(Resolved::Shape(_)) => 1,
            _ => 0,
        }
    }

    pub fn max_frame_index(&self, library: &Library) -> usize {
        self.frame_count(library).saturating_sub(1)
    }

    pub fn next_frame(&mut self, library: &Library) -> usize {
        let count = self.frame_count(library).max(1);
        self.current_frame = (self.current_frame + 1) % count;
        self.current_frame
    }

    pub fn prev_frame(&mut self, library: &Library) -> usize {
        let count = self.frame_count(library).max(1);
        self.current_frame = (self.current_frame + count - 1) % count;
        self.current_frame
    }

    /// Jump to `frame`, wrapped into range.
    pub fn set_frame(&mut self, library: &Library, frame: usize) -> usize {
        self.current_frame = frame % self.frame_count(library).max(1);
        self.current_frame
    }

    /// Top-level instances of the current frame. A selected shape stands in
    /// as a single identity instance.
    pub fn frame_instances<'a>(&self, library: &'a Library) -> Option<Cow<'a, [Instance]>> {
        let id = self.selected?;
        match library.resolve(id) {
            Resolved::Sprite(sprite) => sprite.frame(self.current_frame).map(Cow::Borrowed),
            Resolved::Shape(_) => Some(Cow::Owned(vec![Instance::new(id, 0)])),
            Resolved::Missing => None,
        }
    }

    /// Union of the current frame's content, in frame space.
    pub fn frame_bounds(&mut self, library: &Library) -> Option<Bounds> {
        let instances = self.frame_instances(library)?;
        let mut stack = self.root_stack(library);
        self.recursive_bounds(library, &instances, IDENTITY, self.enable_transforms, &mut stack)
    }

    /// Render the current frame, framed by the camera, filling the viewport.
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        library: &Library,
        width: f64,
        height: f64,
    ) -> RenderReport {
        let mut report = RenderReport::default();
        surface.fill_rect(Rect::new(0.0, 0.0, width, height), &self.config.background);

        let Some(instances) = self.frame_instances(library) else {
            return report;
        };
        let mut stack = self.root_stack(library);
        let bounds = self
            .recursive_bounds(library, &instances, IDENTITY, self.enable_transforms, &mut stack)
            .filter(Bounds::is_finite)
            .unwrap_or(self.config.sentinel);
        report.bounds = Some(bounds);

        surface.save();
        surface.transform(camera_transform(&bounds, width, height, &self.config));
        self.draw_instances(surface, library, &instances, 0, &mut stack, &mut report);
        surface.restore();

        if !report.missing.is_empty() {
            log::trace!("frame {}: unresolved ids {:?}", self.current_frame, report.missing);
        }
        report
    }

    fn root_stack(&self, library: &Library) -> Vec<CharId> {
        match self.selected {
            Some(id) if library.sprite(id).is_some() && library.shape(id).is_none() => vec![id],
            _ => Vec::new(),
        }
    }

    fn draw_instances<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        library: &Library,
        instances: &[Instance],
        time_offset: usize,
        stack: &mut Vec<CharId>,
        report: &mut RenderReport,
    ) {
        let mut ordered: Vec<&Instance> = instances.iter().collect();
        ordered.sort_by_key(|inst| inst.depth);

        for inst in ordered {
            report.instances += 1;
            match library.resolve(inst.char_id) {
                Resolved::Missing => report.missing.push(inst.char_id),
                Resolved::Shape(shape) => {
                    surface.save();
                    if self.enable_transforms {
                        surface.transform(inst.transform());
                    }
                    replay(surface, &shape.commands);
                    surface.restore();
                    report.shapes += 1;
                }
                Resolved::Sprite(sprite) => {
                    if stack.contains(&sprite.sprite_id) {
                        log::warn!("sprite {} contains itself; skipped", sprite.sprite_id);
                        report.cycles.push(sprite.sprite_id);
                        continue;
                    }
                    if sprite.is_empty() {
                        continue;
                    }
                    let sub = (self.current_frame + time_offset) % sprite.len();
                    surface.save();
                    if self.enable_transforms {
                        surface.transform(inst.transform());
                    }
                    stack.push(sprite.sprite_id);
                    self.draw_instances(surface, library, &sprite.frames[sub], time_offset + 1, stack, report);
                    stack.pop();
                    surface.restore();
                }
            }
        }
    }

    /// Bounds of `instances` placed under `parent`.
    ///
    /// Shapes contribute their transformed points, nested sprites their
    /// transformed whole-sprite box. `apply_matrix` only governs this level;
    /// nested sprite bounds always include their own instance matrices.
    pub fn recursive_bounds(
        &mut self,
        library: &Library,
        instances: &[Instance],
        parent: Affine,
        apply_matrix: bool,
        stack: &mut Vec<CharId>,
    ) -> Option<Bounds> {
        let mut builder = BoundsBuilder::new();
        for inst in instances {
            let local = if apply_matrix { inst.transform() } else { IDENTITY };
            let m = compose(parent, local);
            match library.resolve(inst.char_id) {
                Resolved::Shape(shape) => builder.extend(shape.points().into_iter().map(|p| m * p)),
                Resolved::Sprite(sprite) => {
                    let inner = self.sprite_bounds(library, sprite.sprite_id, stack);
                    builder.merge(inner.and_then(|b| b.transform(m)));
                }
                Resolved::Missing => {}
            }
        }
        builder.finish()
    }

    /// Union of a sprite's bounds across all of its frames, memoized.
    pub fn sprite_bounds(&mut self, library: &Library, id: CharId, stack: &mut Vec<CharId>) -> Option<Bounds> {
        if let Some(cached) = self.bounds_cache.get(&id) {
            return *cached;
        }
        if stack.contains(&id) {
            log::warn!("sprite {id} contains itself; excluded from bounds");
            return None;
        }
        let sprite = library.sprite(id)?;

        stack.push(id);
        let mut builder = BoundsBuilder::new();
        for frame in &sprite.frames {
            builder.merge(self.recursive_bounds(library, frame, IDENTITY, true, stack));
        }
        stack.pop();

        let bounds = builder.finish();
        self.bounds_cache.insert(id, bounds);
        bounds
    }
}

fn log_instance(library: &Library, inst: &Instance) {
    let kind = match library.resolve(inst.char_id) {
        Resolved::Shape(_) => "shape",
        Resolved::Sprite(_) => "sprite",
        Resolved::Missing => "missing",
    };
    let raw = inst.raw_transform().as_coeffs();
    let fixed = inst.transform().as_coeffs();
    log::debug!(
        "  depth {:>3} id {:>5} {kind:<7} scale ({}, {}) -> ({}, {})",
        inst.depth,
        inst.char_id,
        raw[0],
        raw[3],
        fixed[0],
        fixed[3]
    );
}
