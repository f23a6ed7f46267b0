//! Fitting text into a fixed box.

use super::style::{FONT_SIZE_RANGE, clamp_to};
use kurbo::Size;
use std::fmt;

/// Measures laid-out text height.
///
/// Hosts with a real text shaper implement this; [`ApproxTextMeasure`] is a
/// width-per-character estimate good enough for headless use and tests.
/// Install a host measurer with [`ContentEditor::set_measure`].
///
/// [`ContentEditor::set_measure`]: super::ContentEditor::set_measure
pub trait TextMeasure: fmt::Debug {
    /// Height of `text` wrapped to `max_width` at `font_size`.
    fn measure_height(&self, text: &str, font_size: f64, max_width: f64) -> f64;
}

/// Estimates layout from an average glyph width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub char_width: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            char_width: 0.55,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure_height(&self, text: &str, font_size: f64, max_width: f64) -> f64 {
        let glyph = (font_size * self.char_width).max(f64::EPSILON);
        let per_line = ((max_width / glyph).floor() as usize).max(1);
        let lines: usize = text
            .split('\n')
            .map(|paragraph| {
                let chars = paragraph.chars().count();
                chars.div_ceil(per_line).max(1)
            })
            .sum();
        lines as f64 * font_size * self.line_height
    }
}

/// Largest font size, stepping down by whole points from `preferred`, at
/// which `text` fits in `frame` (minus `padding` on each side).
///
/// `preferred` is first clamped to [`FONT_SIZE_RANGE`]. Never goes below
/// `floor`. Returns that size unchanged when the text already fits, so
/// shrunken text grows back once it is shortened.
pub fn fit_font_size(
    measure: &dyn TextMeasure,
    text: &str,
    preferred: f64,
    frame: Size,
    padding: f64,
    floor: f64,
) -> f64 {
    let inner_width = (frame.width - 2.0 * padding).max(1.0);
    let inner_height = (frame.height - 2.0 * padding).max(1.0);
    let preferred = clamp_to(&FONT_SIZE_RANGE, preferred);
    let mut size = preferred;
    while size > floor && measure.measure_height(text, size, inner_width) > inner_height {
        size -= 1.0;
    }
    size.max(floor.min(preferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_wraps_lines() {
        let measure = ApproxTextMeasure::default();
        // 10pt glyphs are 5.5 wide, so 56 units hold 10 characters per line.
        let one = measure.measure_height("abcdefghij", 10.0, 56.0);
        let two = measure.measure_height("abcdefghijk", 10.0, 56.0);
        assert!((one - 12.0).abs() < 1e-9);
        assert!((two - 24.0).abs() < 1e-9);
        assert!((measure.measure_height("a\nb", 10.0, 56.0) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_fitting_text_keeps_size() {
        let measure = ApproxTextMeasure::default();
        let size = fit_font_size(&measure, "Hi", 24.0, Size::new(300.0, 50.0), 0.0, 12.0);
        assert_eq!(size, 24.0);
    }

    #[test]
    fn test_overflow_shrinks_in_whole_steps() {
        let measure = ApproxTextMeasure::default();
        let text = "a".repeat(60);
        let size = fit_font_size(&measure, &text, 24.0, Size::new(300.0, 50.0), 0.0, 12.0);
        assert!(size < 24.0);
        assert_eq!(size.fract(), 0.0);
        assert!(measure.measure_height(&text, size, 300.0) <= 50.0);
    }

    #[test]
    fn test_huge_preferred_size_is_clamped() {
        let measure = ApproxTextMeasure::default();
        let size = fit_font_size(&measure, "Hi", 1e17, Size::new(300.0, 50.0), 0.0, 12.0);
        assert!(size <= *FONT_SIZE_RANGE.end());
        assert!(measure.measure_height("Hi", size, 300.0) <= 50.0);
    }

    #[test]
    fn test_floor_is_respected() {
        let measure = ApproxTextMeasure::default();
        let text = "word ".repeat(500);
        let size = fit_font_size(&measure, &text, 24.0, Size::new(100.0, 20.0), 0.0, 12.0);
        assert_eq!(size, 12.0);
    }
}
