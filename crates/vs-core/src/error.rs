//! Error types shared across the vecsprite crates.
//!
//! Only conditions a caller can act on are errors. Unknown command types,
//! unresolved charIds, empty bounds and non-finite scales are handled in place
//! and never surface here.

use crate::id::CharId;
use thiserror::Error;

pub type Result<T, E = SceneError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SceneError {
    /// The upload response could not be decoded.
    #[error("invalid dataset: {0}")]
    Ingest(#[from] serde_json::Error),

    /// A sprite contains itself, directly or through other sprites.
    #[error("sprite cycle: {}", format_path(.path))]
    SpriteCycle { path: Vec<CharId> },

    #[error("sprite {sprite} declares {declared} frames but has {actual}")]
    FrameCountMismatch {
        sprite: CharId,
        declared: u32,
        actual: usize,
    },

    #[error("no shape with id {0}")]
    UnknownShape(CharId),

    #[error("no shape is being edited")]
    NoShapeSelected,

    #[error("version {index} out of range ({len} saved)")]
    VersionOutOfRange { index: usize, len: usize },

    #[error("layer {index} out of range ({len} layers)")]
    LayerOutOfRange { index: usize, len: usize },

    /// The leading run before the first STYLE command has no style to edit.
    #[error("layer {0} has no STYLE command")]
    LayerWithoutStyle(usize),

    #[error("reference size {width}x{height} must be positive")]
    InvalidReferenceSize { width: f64, height: f64 },
}

fn format_path(path: &[CharId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = SceneError::SpriteCycle {
            path: vec![CharId(3), CharId(5)],
        };
        assert_eq!(err.to_string(), "sprite cycle: 3 -> 5");
    }

    #[test]
    fn ingest_wraps_serde_error() {
        let err: SceneError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid dataset"));
    }
}
