//! Overlay configuration.
//!
//! Numeric bounds for the adjustment sliders and the minimap display size.
//! Fixed when an overlay is created; nothing re-derives them afterwards.

use crate::OverlayError;
use serde::{Deserialize, Serialize};

/// Default slider step for contrast.
pub const DEFAULT_CONTRAST_STEP: f64 = 0.05;

/// Default brightness upper bound. Also the divisor of the brightness multiplier.
pub const DEFAULT_MAX_BRIGHTNESS: f64 = 150.0;

/// Default brightness lower bound.
pub const DEFAULT_MIN_BRIGHTNESS: f64 = -100.0;

/// Default contrast upper bound.
pub const DEFAULT_MAX_CONTRAST: f64 = 3.0;

/// Default contrast lower bound. Negative contrast inverts around mid-gray.
pub const DEFAULT_MIN_CONTRAST: f64 = -1.0;

/// Default minimap side length in pixels.
pub const DEFAULT_MAP_SIZE: u32 = 200;

/// Default viewbox border width in pixels.
pub const DEFAULT_VIEWBOX_BORDER: f64 = 1.0;

/// Configuration for one overlay instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Step of the contrast range input.
    pub contrast_step: f64,
    pub max_brightness: f64,
    pub max_contrast: f64,
    pub min_brightness: f64,
    pub min_contrast: f64,
    /// Side length of the square minimap in pixels.
    pub map_size: u32,
    /// Border width of the viewbox indicator drawn on the minimap.
    pub viewbox_border: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            contrast_step: DEFAULT_CONTRAST_STEP,
            max_brightness: DEFAULT_MAX_BRIGHTNESS,
            max_contrast: DEFAULT_MAX_CONTRAST,
            min_brightness: DEFAULT_MIN_BRIGHTNESS,
            min_contrast: DEFAULT_MIN_CONTRAST,
            map_size: DEFAULT_MAP_SIZE,
            viewbox_border: DEFAULT_VIEWBOX_BORDER,
        }
    }
}

impl OverlayConfig {
    /// Parse a JSON configuration. Missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| OverlayError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the bounds are usable.
    ///
    /// The identity levels (contrast 1, brightness 0) must lie inside their
    /// ranges so that a reset always lands on a valid state.
    pub fn validate(&self) -> Result<(), OverlayError> {
        let invalid = |msg: String| Err(OverlayError::InvalidConfig(msg));

        let finite = [
            self.contrast_step,
            self.max_brightness,
            self.max_contrast,
            self.min_brightness,
            self.min_contrast,
            self.viewbox_border,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return invalid("all bounds must be finite".to_string());
        }
        if self.max_brightness <= 0.0 {
            return invalid(format!(
                "maxBrightness must be positive, got {}",
                self.max_brightness
            ));
        }
        if !(self.min_brightness..=self.max_brightness).contains(&0.0) {
            return invalid(format!(
                "brightness range [{}, {}] must contain 0",
                self.min_brightness, self.max_brightness
            ));
        }
        if !(self.min_contrast..=self.max_contrast).contains(&1.0) {
            return invalid(format!(
                "contrast range [{}, {}] must contain 1",
                self.min_contrast, self.max_contrast
            ));
        }
        if self.min_contrast >= self.max_contrast {
            return invalid("minContrast must be below maxContrast".to_string());
        }
        if self.contrast_step <= 0.0 {
            return invalid(format!(
                "contrastStep must be positive, got {}",
                self.contrast_step
            ));
        }
        if self.map_size == 0 {
            return invalid("mapSize must be positive".to_string());
        }
        if self.viewbox_border < 0.0 {
            return invalid(format!(
                "viewboxBorder must not be negative, got {}",
                self.viewbox_border
            ));
        }
        Ok(())
    }
}
