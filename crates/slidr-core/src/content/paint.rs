//! Colors and fills for slide content.
//!
//! Persisted slides store colors as CSS strings (`#rrggbb`, `rgba(...)`,
//! `transparent`, `linear-gradient(...)`). [`Paint`] parses those strings
//! into typed values and prints them back. Strings it does not understand
//! are kept verbatim in [`Paint::Other`].

use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Serializable RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`
    /// or `transparent`.
    pub fn parse_css(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |p: &str| p.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = match parts.get(3) {
            Some(alpha) => {
                let alpha = alpha.parse::<f64>().ok()?;
                (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self::new(r, g, b, a))
    }

    /// Format as CSS. Opaque colors print as `#rrggbb`.
    pub fn to_css(&self) -> String {
        match self.a {
            0 if self.r == 0 && self.g == 0 && self.b == 0 => "transparent".to_string(),
            255 => format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
            a => format!(
                "rgba({},{},{},{})",
                self.r,
                self.g,
                self.b,
                format_number(f64::from(a) / 255.0, 3)
            ),
        }
    }
}

fn parse_hex(hex: &str) -> Option<SerializableColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(SerializableColor::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(SerializableColor::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(SerializableColor::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(SerializableColor::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Print a number with at most `decimals` fraction digits and no trailing zeros.
fn format_number(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// One color stop of a gradient. `offset` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: SerializableColor,
    pub offset: f64,
}

/// A CSS linear gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub angle_deg: f64,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let body = s
            .strip_prefix("linear-gradient(")
            .or_else(|| s.strip_prefix("LINEAR-GRADIENT("))?
            .strip_suffix(')')?;
        let mut parts = split_top_level(body).into_iter().peekable();

        let mut angle_deg = 180.0;
        if let Some(first) = parts.peek() {
            if let Some(angle) = first.strip_suffix("deg") {
                angle_deg = angle.trim().parse().ok()?;
                parts.next();
            }
        }

        let raw: Vec<(SerializableColor, Option<f64>)> = parts
            .map(|stop| {
                let stop = stop.trim();
                match stop.rsplit_once(char::is_whitespace) {
                    Some((color, pct)) if pct.ends_with('%') => {
                        let offset = pct.trim_end_matches('%').parse().ok()?;
                        Some((SerializableColor::parse_css(color)?, Some(offset)))
                    }
                    _ => Some((SerializableColor::parse_css(stop)?, None)),
                }
            })
            .collect::<Option<_>>()?;
        if raw.len() < 2 {
            return None;
        }

        let last = (raw.len() - 1) as f64;
        let stops = raw
            .into_iter()
            .enumerate()
            .map(|(i, (color, offset))| GradientStop {
                color,
                offset: offset.unwrap_or(i as f64 * 100.0 / last),
            })
            .collect();
        Some(Self { angle_deg, stops })
    }

    fn to_css(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|stop| format!("{} {}%", stop.color.to_css(), stop.offset))
            .collect();
        format!("linear-gradient({}deg, {})", self.angle_deg, stops.join(", "))
    }
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

/// A fill: solid color, linear gradient, or an unrecognized CSS value.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(SerializableColor),
    LinearGradient(LinearGradient),
    Other(String),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(SerializableColor::white())
    }
}

impl Paint {
    pub const fn transparent() -> Self {
        Paint::Solid(SerializableColor::transparent())
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Paint::Solid(SerializableColor::rgb(r, g, b))
    }

    /// Parse a CSS value. Never fails.
    pub fn parse(input: &str) -> Self {
        if let Some(color) = SerializableColor::parse_css(input) {
            return Paint::Solid(color);
        }
        if let Some(gradient) = LinearGradient::parse(input) {
            return Paint::LinearGradient(gradient);
        }
        Paint::Other(input.to_string())
    }

    pub fn to_css(&self) -> String {
        match self {
            Paint::Solid(color) => color.to_css(),
            Paint::LinearGradient(gradient) => gradient.to_css(),
            Paint::Other(raw) => raw.clone(),
        }
    }

    /// The solid color, if this is one.
    pub fn solid(&self) -> Option<Color> {
        match self {
            Paint::Solid(color) => Some((*color).into()),
            _ => None,
        }
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, Paint::LinearGradient(_))
    }
}

impl From<SerializableColor> for Paint {
    fn from(color: SerializableColor) -> Self {
        Paint::Solid(color)
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Paint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Paint::parse(&raw))
    }
}
