//! Editor tunables.

use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Tunables shared by the editing session, the content editor and the
/// presentation engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo depth for node/edge edits.
    pub graph_history_capacity: usize,
    /// Undo depth inside the slide content editor.
    pub content_history_capacity: usize,
    /// Offset applied to pasted and duplicated items.
    pub paste_offset_x: f64,
    pub paste_offset_y: f64,
    /// Smallest width/height an element can be resized to.
    pub min_element_size: f64,
    /// Fixed slide canvas (reference) size.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Box used for node hit testing on the graph canvas.
    pub node_width: f64,
    pub node_height: f64,
    /// Quiescence delay before an autosave fires.
    pub autosave_delay_ms: u64,
    /// How long the edge menu stays open after an action.
    pub edge_menu_close_ms: u64,
    /// Lifetime of transient warnings.
    pub notice_ms: u64,
    /// Upper bound for the presentation scale factor.
    pub scale_cap: f64,
    /// Smallest font size the text fitter will shrink to.
    pub font_fit_floor: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    /// Maximum gap between two clicks of a double-click.
    pub double_click_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            graph_history_capacity: 40,
            content_history_capacity: 30,
            paste_offset_x: 20.0,
            paste_offset_y: 20.0,
            min_element_size: 20.0,
            canvas_width: 800.0,
            canvas_height: 500.0,
            node_width: 160.0,
            node_height: 90.0,
            autosave_delay_ms: 800,
            edge_menu_close_ms: 1000,
            notice_ms: 2500,
            scale_cap: 2.0,
            font_fit_floor: 12.0,
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.1,
            double_click_ms: 500,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the zoom settings describe a usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = [self.zoom_min, self.zoom_max, self.zoom_step];
        if zoom.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::Parse("zoom settings must be positive numbers".into()));
        }
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::Parse(format!(
                "zoom_min {} is greater than zoom_max {}",
                self.zoom_min, self.zoom_max
            )));
        }
        Ok(())
    }

    pub fn paste_offset(&self) -> Vec2 {
        Vec2::new(self.paste_offset_x, self.paste_offset_y)
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn edge_menu_close_delay(&self) -> Duration {
        Duration::from_millis(self.edge_menu_close_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}
