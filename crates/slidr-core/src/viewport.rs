//! Display scaling for the fixed-size slide canvas.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Fits the slide's reference canvas into a container.
///
/// The slide is scaled uniformly by
/// `min(container.width / reference.width, container.height / reference.height, cap)`
/// and centered. The scale is recomputed whenever the container resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideViewport {
    reference: Size,
    cap: f64,
    container: Size,
    scale: f64,
}

impl SlideViewport {
    pub fn new(reference: Size, cap: f64) -> Self {
        Self {
            reference,
            cap,
            container: reference,
            scale: fit_scale(reference, reference, cap),
        }
    }

    /// Update the container size and recompute the scale.
    pub fn resize(&mut self, container: Size) {
        self.container = container;
        self.scale = fit_scale(self.reference, container, self.cap);
        log::debug!(
            "Viewport resized to {}x{}, scale {:.3}",
            container.width,
            container.height,
            self.scale
        );
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn reference(&self) -> Size {
        self.reference
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Offset that centers the scaled slide in the container.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(
            (self.container.width - self.reference.width * self.scale) / 2.0,
            (self.container.height - self.reference.height * self.scale) / 2.0,
        )
    }

    /// Slide-to-container transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    /// Convert a container point to slide coordinates.
    pub fn to_slide(&self, point: Point) -> Point {
        self.transform().inverse() * point
    }
}

/// Uniform scale that fits `reference` in `container`, capped at `cap`.
pub fn fit_scale(reference: Size, container: Size, cap: f64) -> f64 {
    if reference.width <= 0.0 || reference.height <= 0.0 {
        return 1.0;
    }
    let scale = (container.width / reference.width)
        .min(container.height / reference.height)
        .min(cap);
    scale.max(0.0)
}

/// Zoom level of the slide content editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    level: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(0.5, 2.0, 0.1)
    }
}

impl Zoom {
    /// Bounds are reordered if given backwards; a non-finite bound falls
    /// back to 1.0.
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 1.0 };
        let (min, max) = (finite(min), finite(max));
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            level: 1.0_f64.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Set the level, snapped to a multiple of the step and clamped.
    pub fn set(&mut self, level: f64) {
        if !level.is_finite() {
            return;
        }
        let snapped = if self.step.is_finite() && self.step > 0.0 {
            // Rounding to 1e-9 keeps repeated steps from drifting.
            (((level / self.step).round() * self.step) * 1e9).round() / 1e9
        } else {
            level
        };
        self.level = snapped.max(self.min).min(self.max);
    }

    pub fn zoom_in(&mut self) {
        self.set(self.level + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.level - self.step);
    }

    pub fn reset(&mut self) {
        self.set(1.0);
    }

    /// Convert a point relative to the zoomed canvas into canvas units.
    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(point.x / self.level, point.y / self.level)
    }

    /// Convert a pointer delta into canvas units.
    pub fn delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: Size = Size {
        width: 800.0,
        height: 500.0,
    };

    #[test]
    fn test_fit_scale_limited_by_height() {
        assert_eq!(fit_scale(REFERENCE, Size::new(1600.0, 500.0), 2.0), 1.0);
    }

    #[test]
    fn test_fit_scale_capped() {
        assert_eq!(fit_scale(REFERENCE, Size::new(4000.0, 4000.0), 2.0), 2.0);
    }

    #[test]
    fn test_resize_recomputes_and_centers() {
        let mut viewport = SlideViewport::new(REFERENCE, 2.0);
        viewport.resize(Size::new(400.0, 400.0));
        assert_eq!(viewport.scale(), 0.5);
        assert_eq!(viewport.offset(), Vec2::new(0.0, 75.0));

        let p = viewport.to_slide(Point::new(200.0, 200.0));
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_steps_and_bounds() {
        let mut zoom = Zoom::default();
        for _ in 0..20 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.level(), 2.0);
        for _ in 0..20 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.level(), 0.5);
        zoom.zoom_in();
        assert_eq!(zoom.level(), 0.6);
    }

    #[test]
    fn test_zoom_snaps_to_configured_step() {
        let mut zoom = Zoom::new(0.5, 2.0, 0.25);
        zoom.zoom_in();
        assert_eq!(zoom.level(), 1.25);
        zoom.set(1.3);
        assert_eq!(zoom.level(), 1.25);
        zoom.set(1.4);
        assert_eq!(zoom.level(), 1.5);
    }

    #[test]
    fn test_zoom_reversed_bounds() {
        let mut zoom = Zoom::new(3.0, 2.0, 0.1);
        assert_eq!(zoom.level(), 2.0);
        zoom.set(10.0);
        assert_eq!(zoom.level(), 3.0);
        let zoom = Zoom::new(f64::NAN, 2.0, 0.1);
        assert_eq!(zoom.level(), 1.0);
    }

    #[test]
    fn test_zoom_converts_points() {
        let mut zoom = Zoom::default();
        zoom.set(2.0);
        assert_eq!(zoom.screen_to_canvas(Point::new(100.0, 50.0)), Point::new(50.0, 25.0));
        assert_eq!(zoom.delta_to_canvas(Vec2::new(10.0, 4.0)), Vec2::new(5.0, 2.0));
    }
}
