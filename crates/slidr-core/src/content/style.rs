//! Style presets offered by the content editor.

use super::SerializableColor;
use std::ops::RangeInclusive;

/// A selectable font: display name and CSS family list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChoice {
    pub name: &'static str,
    pub family: &'static str,
}

pub const FONTS: [FontChoice; 10] = [
    FontChoice { name: "Inter", family: "Inter, sans-serif" },
    FontChoice { name: "Arial", family: "Arial, sans-serif" },
    FontChoice { name: "Times New Roman", family: "Times New Roman, serif" },
    FontChoice { name: "Georgia", family: "Georgia, serif" },
    FontChoice { name: "Courier New", family: "Courier New, monospace" },
    FontChoice { name: "Verdana", family: "Verdana, sans-serif" },
    FontChoice { name: "Trebuchet MS", family: "Trebuchet MS, sans-serif" },
    FontChoice { name: "Impact", family: "Impact, sans-serif" },
    FontChoice { name: "Comic Sans MS", family: "Comic Sans MS, cursive" },
    FontChoice { name: "Palatino", family: "Palatino Linotype, serif" },
];

/// Swatches shown for text, fill, border and background colors.
pub const PALETTE: [SerializableColor; 18] = [
    SerializableColor::rgb(0x00, 0x00, 0x00),
    SerializableColor::rgb(0xff, 0xff, 0xff),
    SerializableColor::rgb(0xf4, 0x43, 0x36),
    SerializableColor::rgb(0xe9, 0x1e, 0x63),
    SerializableColor::rgb(0x9c, 0x27, 0xb0),
    SerializableColor::rgb(0x67, 0x3a, 0xb7),
    SerializableColor::rgb(0x3f, 0x51, 0xb5),
    SerializableColor::rgb(0x21, 0x96, 0xf3),
    SerializableColor::rgb(0x00, 0xbc, 0xd4),
    SerializableColor::rgb(0x00, 0x96, 0x88),
    SerializableColor::rgb(0x4c, 0xaf, 0x50),
    SerializableColor::rgb(0x8b, 0xc3, 0x4a),
    SerializableColor::rgb(0xcd, 0xdc, 0x39),
    SerializableColor::rgb(0xff, 0xeb, 0x3b),
    SerializableColor::rgb(0xff, 0xc1, 0x07),
    SerializableColor::rgb(0xff, 0x98, 0x00),
    SerializableColor::rgb(0xff, 0x57, 0x22),
    SerializableColor::rgb(0x79, 0x55, 0x48),
];

pub const FONT_SIZE_RANGE: RangeInclusive<f64> = 8.0..=120.0;
pub const BORDER_WIDTH_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const BORDER_RADIUS_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Border width applied when a border color is picked on a borderless shape.
pub const DEFAULT_BORDER_WIDTH: f64 = 2.0;

/// Clamp `value` into `range`.
pub fn clamp_to(range: &RangeInclusive<f64>, value: f64) -> f64 {
    value.clamp(*range.start(), *range.end())
}

/// Look up a font by display name.
pub fn font_by_name(name: &str) -> Option<&'static FontChoice> {
    FONTS.iter().find(|font| font.name.eq_ignore_ascii_case(name))
}
