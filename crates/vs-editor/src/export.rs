//! Shape export, optionally normalized against a reference canvas.
//!
//! Normalized coordinates are `x / width`, `y / height` rounded to four
//! decimals, so an exported shape can be replayed on a surface of any size.

use kurbo::Size;
use vs_core::{Command, Result, SceneError};

pub const EXPORT_DECIMALS: i32 = 4;

fn round4(v: f64) -> f64 {
    let scale = 10f64.powi(EXPORT_DECIMALS);
    (v * scale).round() / scale
}

/// Divide every coordinate by the reference size and round.
///
/// `STYLE` and unknown commands pass through unchanged.
pub fn normalize_commands(commands: &[Command], reference: Size) -> Result<Vec<Command>> {
    if !(reference.width > 0.0 && reference.height > 0.0) {
        return Err(SceneError::InvalidReferenceSize {
            width: reference.width,
            height: reference.height,
        });
    }
    let nx = |x: f64| round4(x / reference.width);
    let ny = |y: f64| round4(y / reference.height);

    Ok(commands
        .iter()
        .map(|cmd| match *cmd {
            Command::Move { x, y } => Command::Move { x: nx(x), y: ny(y) },
            Command::Line { x, y } => Command::Line { x: nx(x), y: ny(y) },
            Command::Curve { cx, cy, x, y } => Command::Curve {
                cx: nx(cx),
                cy: ny(cy),
                x: nx(x),
                y: ny(y),
            },
            _ => cmd.clone(),
        })
        .collect())
}

/// Export as-is, or normalized when a reference size is given.
pub fn export_commands(commands: &[Command], reference: Option<Size>) -> Result<Vec<Command>> {
    match reference {
        Some(size) => normalize_commands(commands, size),
        None => Ok(commands.to_vec()),
    }
}

/// The upstream command JSON for an export.
pub fn export_json(commands: &[Command], reference: Option<Size>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_commands(commands, reference)?)?)
}
