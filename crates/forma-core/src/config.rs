//! Toolkit-wide configuration.
//!
//! A process-wide default [`FormsConfig`] is available through
//! [`global_config`]. Each `Forms` instance takes a snapshot of it when it is
//! constructed, so changing the global value later only affects instances
//! created afterwards.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::targets;
use crate::units::CoordUnit;

/// Largest accepted border width (in either direction).
pub const MAX_BORDER_WIDTH: i32 = 10;

/// Tunable policy values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Border width given to new widgets. Negative values draw the border
    /// inside the box.
    pub border_width: i32,
    /// Unit of coordinates passed to the widget factory.
    pub coord_unit: CoordUnit,
    /// Screen resolution used for unit conversion.
    pub dpi: f64,
    /// Maximum interval between clicks of a double/triple click.
    pub click_timeout_ms: u64,
    /// Maximum pointer movement (per axis) between clicks of a multi-click.
    pub click_tolerance: i32,
    /// Delay before a tooltip appears.
    pub tooltip_delay_ms: u64,
    /// Upper bound on tooltip width and height.
    pub tooltip_max_size: i32,
    /// Auto-repeat interval for slider jumps and touch buttons.
    pub slider_repeat_ms: u64,
    /// Interval between STEP events for automatic widgets.
    pub step_interval_ms: u64,
    /// Frame interval of animated cursors.
    pub cursor_animation_ms: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            border_width: 1,
            coord_unit: CoordUnit::Pixel,
            dpi: 96.0,
            click_timeout_ms: 400,
            click_tolerance: 4,
            tooltip_delay_ms: 600,
            tooltip_max_size: 800,
            slider_repeat_ms: 100,
            step_interval_ms: 50,
            cursor_animation_ms: 20,
        }
    }
}

impl FormsConfig {
    /// Parse a configuration from TOML text. Missing keys keep their default.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FormsConfig = toml::from_str(text)?;
        tracing::debug!(target: targets::CONFIG, ?config, "configuration parsed");
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// The border width new widgets get. Zero selects the default of 1,
    /// anything else is clamped.
    pub fn effective_border_width(&self) -> i32 {
        if self.border_width == 0 {
            return 1;
        }
        clamp_border_width(self.border_width)
    }

    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    pub fn tooltip_delay(&self) -> Duration {
        Duration::from_millis(self.tooltip_delay_ms)
    }

    pub fn slider_repeat(&self) -> Duration {
        Duration::from_millis(self.slider_repeat_ms)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn cursor_animation(&self) -> Duration {
        Duration::from_millis(self.cursor_animation_ms)
    }
}

/// Clamp a border width to `±MAX_BORDER_WIDTH`. Zero becomes -1.
pub fn clamp_border_width(bw: i32) -> i32 {
    let clamped = bw.clamp(-MAX_BORDER_WIDTH, MAX_BORDER_WIDTH);
    if clamped != bw {
        tracing::warn!(target: targets::CONFIG, bw, clamped, "border width out of range");
    }
    if clamped == 0 { -1 } else { clamped }
}

fn global() -> &'static RwLock<FormsConfig> {
    static GLOBAL: OnceLock<RwLock<FormsConfig>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(FormsConfig::default()))
}

/// A copy of the process-wide default configuration.
pub fn global_config() -> FormsConfig {
    global().read().clone()
}

/// Replace the process-wide default configuration.
pub fn set_global_config(config: FormsConfig) {
    *global().write() = config;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = FormsConfig::default();
        assert_eq!(c.click_timeout(), Duration::from_millis(400));
        assert_eq!(c.click_tolerance, 4);
        assert_eq!(c.effective_border_width(), 1);

        let zero = FormsConfig {
            border_width: 0,
            ..FormsConfig::default()
        };
        assert_eq!(zero.effective_border_width(), 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = FormsConfig::from_toml_str("click_timeout_ms = 250\ncoord_unit = \"mm\"\n").unwrap();
        assert_eq!(c.click_timeout_ms, 250);
        assert_eq!(c.coord_unit, CoordUnit::Mm);
        assert_eq!(c.tooltip_delay_ms, 600);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = FormsConfig::from_toml_str("click_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FormsConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_border_width_clamp() {
        assert_eq!(clamp_border_width(25), 10);
        assert_eq!(clamp_border_width(-25), -10);
        assert_eq!(clamp_border_width(0), -1);
        assert_eq!(clamp_border_width(3), 3);
    }
}
