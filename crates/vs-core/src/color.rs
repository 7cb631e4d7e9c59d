//! CSS color strings used by STYLE commands.
//!
//! Colors travel through the data model as the CSS strings the upstream
//! parser produced (`rgba(255,0,0,1.00)` and friends), because a 2D canvas
//! accepts them verbatim. Surfaces that need numeric channels parse them here.

use serde::{Deserialize, Serialize};
use winnow::ascii::{Caseless, float, space0};
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a float alpha, the shape of CSS `rgba()`.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Parse a hex color: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        let (r, g, b, a) = match bytes.len() {
            3 => (short(0)?, short(1)?, short(2)?, 255),
            4 => (short(0)?, short(1)?, short(2)?, short(3)?),
            6 => (long(0)?, long(2)?, long(4)?, 255),
            8 => (long(0)?, long(2)?, long(4)?, long(6)?),
            _ => return None,
        };
        Some(Self::from_rgba8(r, g, b, a as f32 / 255.0))
    }

    /// 8-bit channels, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as `#RRGGBB`, ignoring alpha.
    pub fn to_hex_rgb(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Emit in the `rgba(r,g,b,a)` form the upstream parser produces.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r},{g},{b},{:.2})", self.a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// Parse any CSS color form a STYLE command may carry.
///
/// Accepts `#hex`, `rgb(r,g,b)`, `rgba(r,g,b,a)` and `transparent`.
/// Returns `None` for anything else (named colors are not supported).
pub fn parse_css_color(input: &str) -> Option<Color> {
    css_color.parse(input.trim()).ok()
}

/// The paint a STYLE field asks for, or `None` when it must not be painted.
///
/// Unset and `transparent` both mean "skip this fill/stroke".
pub fn paint_color(color: Option<&str>) -> Option<&str> {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("transparent"))
}

fn css_color(input: &mut &str) -> ModalResult<Color> {
    alt((parse_hex_color, parse_functional, parse_transparent)).parse_next(input)
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(|| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

fn parse_transparent(input: &mut &str) -> ModalResult<Color> {
    Caseless("transparent")
        .value(Color::TRANSPARENT)
        .parse_next(input)
}

/// `rgb(...)` / `rgba(...)` with 3 or 4 comma-separated numeric arguments.
fn parse_functional(input: &mut &str) -> ModalResult<Color> {
    let _ = preceded(Caseless("rgb"), opt(Caseless("a"))).parse_next(input)?;
    let args: Vec<f64> = delimited(
        ('(', space0),
        separated(3..=4, parse_arg, (space0, ',', space0)),
        (space0, ')'),
    )
    .parse_next(input)?;

    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    let alpha = args.get(3).copied().unwrap_or(1.0) as f32;
    Ok(Color::from_rgba8(
        channel(args[0]),
        channel(args[1]),
        channel(args[2]),
        alpha,
    ))
}

fn parse_arg(input: &mut &str) -> ModalResult<f64> {
    float.parse_next(input)
}
