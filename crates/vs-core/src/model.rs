//! Shape / sprite data model and the registry built from an upload.
//!
//! An upload response ([`Dataset`]) carries every shape, every sprite and the
//! symbol names extracted upstream. It is turned into a [`Library`]: two typed
//! lookup maps plus the original ordering. Instances refer to shapes and
//! sprites by [`CharId`] only and are resolved through [`Library::resolve`].

use crate::command::{Command, Layer, extract_points, split_layers};
use crate::error::{Result, SceneError};
use crate::geometry::{Bounds, compute_bounds};
use crate::graph::sprite_cycles;
use crate::id::CharId;
use crate::transform::{from_coeffs, sanitize};
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ─── Shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub char_id: CharId,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Shape {
    pub fn new(char_id: CharId, commands: Vec<Command>) -> Self {
        Self { char_id, commands }
    }

    pub fn points(&self) -> Vec<Point> {
        extract_points(&self.commands)
    }

    pub fn bounds(&self) -> Bounds {
        compute_bounds(&self.points())
    }

    pub fn layers(&self) -> Vec<Layer> {
        split_layers(&self.commands)
    }
}

// ─── Sprites ─────────────────────────────────────────────────────────────

/// A placement of a shape or sprite inside a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub char_id: CharId,
    /// Paint order within the frame; higher paints over lower.
    #[serde(default)]
    pub depth: i32,
    /// `[a, b, c, d, tx, ty]`; absent means identity.
    #[serde(default)]
    pub matrix: Option<[f64; 6]>,
}

impl Instance {
    pub fn new(char_id: CharId, depth: i32) -> Self {
        Self {
            char_id,
            depth,
            matrix: None,
        }
    }

    pub fn with_matrix(mut self, matrix: [f64; 6]) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// The matrix as stored, identity if absent.
    pub fn raw_transform(&self) -> Affine {
        from_coeffs(self.matrix.as_ref())
    }

    /// The matrix with zeroed scale axes forced to 1.
    pub fn transform(&self) -> Affine {
        sanitize(self.raw_transform())
    }
}

/// One animation frame: instances in their original order.
pub type Frame = Vec<Instance>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    pub sprite_id: CharId,
    /// Informational; should equal `frames.len()`.
    #[serde(default)]
    pub frame_count: u32,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Sprite {
    pub fn new(sprite_id: CharId, frames: Vec<Frame>) -> Self {
        Self {
            sprite_id,
            frame_count: frames.len() as u32,
            frames,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&[Instance]> {
        self.frames.get(index).map(Vec::as_slice)
    }
}

/// Id → human readable symbol name. Purely cosmetic.
pub type SymbolMap = BTreeMap<CharId, String>;

// ─── Upload response ─────────────────────────────────────────────────────

/// The record produced by the upstream parser service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub sprites: Vec<Sprite>,
    #[serde(default)]
    pub symbol_map: SymbolMap,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Non-fatal problems worth reporting: frame count mismatches and
    /// sprite cycles. The dataset is usable either way.
    pub fn validate(&self) -> Vec<SceneError> {
        let mut problems: Vec<SceneError> = self
            .sprites
            .iter()
            .filter(|s| s.frame_count as usize != s.frames.len())
            .map(|s| SceneError::FrameCountMismatch {
                sprite: s.sprite_id,
                declared: s.frame_count,
                actual: s.frames.len(),
            })
            .collect();

        problems.extend(
            sprite_cycles(&self.shapes, &self.sprites)
                .into_iter()
                .map(|path| SceneError::SpriteCycle { path }),
        );
        problems
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// What a charId refers to.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Shape(&'a Shape),
    Sprite(&'a Sprite),
    Missing,
}

/// Typed lookup over everything one upload produced.
///
/// Built atomically from a [`Dataset`] and replaced wholesale by the next
/// one. The editor mutates shapes in place through [`Library::shape_mut`].
#[derive(Debug, Clone, Default)]
pub struct Library {
    name: String,
    shapes: Vec<Shape>,
    shape_index: HashMap<CharId, usize>,
    sprites: Vec<Sprite>,
    sprite_index: HashMap<CharId, usize>,
    symbols: SymbolMap,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::from_json(json)?))
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self::ingest(dataset).0
    }

    /// Validate once, log every diagnostic, and build the registry.
    /// The diagnostics are returned for callers that report them.
    pub fn ingest(dataset: Dataset) -> (Self, Vec<SceneError>) {
        let diagnostics = dataset.validate();
        for problem in &diagnostics {
            log::warn!("{}: {problem}", dataset.name);
        }

        let shape_index = dataset
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.char_id, i))
            .collect();
        let sprite_index = dataset
            .sprites
            .iter()
            .enumerate()
            .map(|(i, s)| (s.sprite_id, i))
            .collect();

        log::debug!(
            "loaded {:?}: {} shapes, {} sprites, {} symbols",
            dataset.name,
            dataset.shapes.len(),
            dataset.sprites.len(),
            dataset.symbol_map.len()
        );

        let library = Self {
            name: dataset.name,
            shapes: dataset.shapes,
            shape_index,
            sprites: dataset.sprites,
            sprite_index,
            symbols: dataset.symbol_map,
        };
        (library, diagnostics)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.sprites.is_empty()
    }

    /// Shapes in upload order (the atlas order).
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    pub fn shape(&self, id: CharId) -> Option<&Shape> {
        self.shape_index.get(&id).map(|&i| &self.shapes[i])
    }

    pub fn shape_mut(&mut self, id: CharId) -> Option<&mut Shape> {
        let i = *self.shape_index.get(&id)?;
        self.shapes.get_mut(i)
    }

    pub fn sprite(&self, id: CharId) -> Option<&Sprite> {
        self.sprite_index.get(&id).map(|&i| &self.sprites[i])
    }

    /// Resolve a charId. Shapes win when an id is registered as both.
    pub fn resolve(&self, id: CharId) -> Resolved<'_> {
        if let Some(shape) = self.shape(id) {
            Resolved::Shape(shape)
        } else if let Some(sprite) = self.sprite(id) {
            Resolved::Sprite(sprite)
        } else {
            Resolved::Missing
        }
    }

    pub fn symbol(&self, id: CharId) -> Option<&str> {
        self.symbols.get(&id).map(String::as_str)
    }

    /// Atlas cell label: the symbol name, else the numeric id.
    pub fn label(&self, id: CharId) -> String {
        self.symbol(id)
            .map_or_else(|| id.to_string(), str::to_owned)
    }

    pub fn sprite_display_name(&self, id: CharId) -> String {
        match self.symbol(id) {
            Some(name) => format!("{name} (ID: {id})"),
            None => format!("Sprite ID: {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const UPLOAD: &str = r#"{
        "name": "hero.swf",
        "shapes": [
            {"charId": 1, "commands": [
                {"type":"MOVE","x":0,"y":0},
                {"type":"LINE","x":10,"y":0},
                {"type":"LINE","x":10,"y":10},
                {"type":"STYLE","fillColor":"red"}
            ]},
            {"charId": 2, "commands": []}
        ],
        "sprites": [
            {"spriteId": 5, "frameCount": 2, "frames": [
                [{"charId": 1, "depth": 1, "matrix": [1,0,0,1,5,5]}],
                [{"charId": 1, "depth": 1, "matrix": null}, {"charId": 99, "depth": 2}]
            ]}
        ],
        "symbolMap": {"5": "Hero"}
    }"#;

    #[test]
    fn decodes_upload_response() {
        let ds = Dataset::from_json(UPLOAD).unwrap();
        assert_eq!(ds.name, "hero.swf");
        assert_eq!(ds.shapes.len(), 2);
        assert_eq!(ds.sprites[0].frames[0][0].matrix, Some([1.0, 0.0, 0.0, 1.0, 5.0, 5.0]));
        assert_eq!(ds.sprites[0].frames[1][0].matrix, None);
        assert_eq!(ds.symbol_map.get(&CharId(5)).map(String::as_str), Some("Hero"));
        assert!(ds.validate().is_empty());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let ds = Dataset::from_json(r#"{"name":"empty"}"#).unwrap();
        assert!(ds.shapes.is_empty() && ds.sprites.is_empty() && ds.symbol_map.is_empty());
        assert!(Dataset::from_json("not json").is_err());
    }

    #[test]
    fn scenario_shape_bounds() {
        let lib = Library::from_json(UPLOAD).unwrap();
        let shape = lib.shape(CharId(1)).unwrap();
        assert_eq!(shape.bounds(), Bounds::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(shape.bounds().width(), 10.0);
    }

    #[test]
    fn resolves_typed_kinds() {
        let lib = Library::from_json(UPLOAD).unwrap();
        assert!(matches!(lib.resolve(CharId(1)), Resolved::Shape(_)));
        assert!(matches!(lib.resolve(CharId(5)), Resolved::Sprite(_)));
        assert!(matches!(lib.resolve(CharId(99)), Resolved::Missing));
    }

    #[test]
    fn labels_fall_back_to_id() {
        let lib = Library::from_json(UPLOAD).unwrap();
        assert_eq!(lib.label(CharId(5)), "Hero");
        assert_eq!(lib.label(CharId(1)), "1");
        assert_eq!(lib.sprite_display_name(CharId(5)), "Hero (ID: 5)");
        assert_eq!(lib.sprite_display_name(CharId(7)), "Sprite ID: 7");
    }

    #[test]
    fn validate_reports_frame_count_mismatch() {
        let mut ds = Dataset::from_json(UPLOAD).unwrap();
        ds.sprites[0].frame_count = 3;
        let problems = ds.validate();
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            problems[0],
            SceneError::FrameCountMismatch { declared: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn ingest_returns_the_diagnostics_it_logged() {
        let mut ds = Dataset::from_json(UPLOAD).unwrap();
        ds.sprites[0].frame_count = 7;
        let (lib, problems) = Library::ingest(ds);
        assert_eq!(problems.len(), 1);
        assert!(matches!(problems[0], SceneError::FrameCountMismatch { declared: 7, .. }));
        assert!(lib.sprite(CharId(5)).is_some());
    }

    #[test]
    fn shape_precedence_applies_to_cycle_checks() {
        let ds = Dataset::from_json(
            r#"{"shapes": [{"charId": 5}], "sprites": [{"spriteId": 5, "frameCount": 1, "frames": [[{"charId": 5, "depth": 1}]]}]}"#,
        )
        .unwrap();
        assert!(ds.validate().is_empty());
        let lib = Library::from_dataset(ds);
        assert!(matches!(lib.resolve(CharId(5)), Resolved::Shape(_)));
    }

    #[test]
    fn instance_transform_is_sanitized() {
        let inst = Instance::new(CharId(1), 0).with_matrix([0.0, 0.0, 1.0, 0.0, 5.0, 5.0]);
        assert_eq!(inst.raw_transform().as_coeffs(), [0.0, 0.0, 1.0, 0.0, 5.0, 5.0]);
        assert_eq!(inst.transform().as_coeffs(), [1.0, 0.0, 1.0, 1.0, 5.0, 5.0]);
        assert_eq!(Instance::new(CharId(1), 0).transform(), Affine::IDENTITY);
    }

    #[test]
    fn shape_mut_edits_in_place() {
        let mut lib = Library::from_json(UPLOAD).unwrap();
        lib.shape_mut(CharId(1)).unwrap().commands.clear();
        assert!(lib.shape(CharId(1)).unwrap().commands.is_empty());
        assert!(lib.shape_mut(CharId(42)).is_none());
    }
}
