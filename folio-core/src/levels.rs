//! Adjustment levels: contrast, brightness and rotation.

use crate::{OverlayConfig, OverlayError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Angles offered as quick-rotate presets.
pub const ROTATION_PRESETS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Largest value the rotation range input produces.
pub const MAX_ROTATION_INPUT: f64 = 359.0;

/// One of the three user-adjustable parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "c")]
    Contrast,
    #[serde(alias = "b")]
    Brightness,
    #[serde(alias = "r")]
    Rotation,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Contrast, Level::Brightness, Level::Rotation];

    /// Value that leaves the source image unchanged.
    pub fn identity(self) -> f64 {
        match self {
            Level::Contrast => 1.0,
            Level::Brightness => 0.0,
            Level::Rotation => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Contrast => "contrast",
            Level::Brightness => "brightness",
            Level::Rotation => "rotation",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = OverlayError;

    /// Accepts full names and the single-letter slider keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contrast" | "c" => Ok(Level::Contrast),
            "brightness" | "b" => Ok(Level::Brightness),
            "rotation" | "r" => Ok(Level::Rotation),
            other => Err(OverlayError::UnknownLevel(other.to_string())),
        }
    }
}

/// Range input description for one level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Result of a successful level update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelChange {
    pub level: Level,
    pub old_value: f64,
    pub new_value: f64,
}

impl LevelChange {
    /// Rotation changes redraw the rotated base rasters; the others only re-adjust pixels.
    pub fn needs_rotation(&self) -> bool {
        self.level == Level::Rotation
    }
}

/// Current adjustment parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    /// Contrast multiplier around mid-gray (1 = unchanged)
    pub contrast: f64,
    /// Brightness offset (0 = unchanged)
    pub brightness: f64,
    /// Rotation in degrees, clockwise on screen, in [0, 360)
    pub rotation: f64,
}

impl Default for LevelState {
    fn default() -> Self {
        Self::identity()
    }
}

impl LevelState {
    pub fn identity() -> Self {
        Self {
            contrast: Level::Contrast.identity(),
            brightness: Level::Brightness.identity(),
            rotation: Level::Rotation.identity(),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn get(&self, level: Level) -> f64 {
        match level {
            Level::Contrast => self.contrast,
            Level::Brightness => self.brightness,
            Level::Rotation => self.rotation,
        }
    }

    fn slot(&mut self, level: Level) -> &mut f64 {
        match level {
            Level::Contrast => &mut self.contrast,
            Level::Brightness => &mut self.brightness,
            Level::Rotation => &mut self.rotation,
        }
    }

    /// Validate and apply a new value.
    ///
    /// Returns `Ok(None)` when the value equals the current one. Out-of-range
    /// values are rejected rather than clamped, leaving the state untouched.
    pub fn set(
        &mut self,
        level: Level,
        value: f64,
        config: &OverlayConfig,
    ) -> Result<Option<LevelChange>, OverlayError> {
        check_range(level, value, config)?;
        Ok(self.write(level, value))
    }

    /// Put a level back to its identity value. Never range-checked.
    pub fn reset(&mut self, level: Level) -> Option<LevelChange> {
        self.write(level, level.identity())
    }

    fn write(&mut self, level: Level, value: f64) -> Option<LevelChange> {
        let slot = self.slot(level);
        if *slot == value {
            return None;
        }
        let old_value = *slot;
        *slot = value;
        Some(LevelChange {
            level,
            old_value,
            new_value: value,
        })
    }
}

/// Slider range for a level under the given configuration.
pub fn level_range(level: Level, config: &OverlayConfig) -> LevelRange {
    match level {
        Level::Contrast => LevelRange {
            min: config.min_contrast,
            max: config.max_contrast,
            step: config.contrast_step,
        },
        Level::Brightness => LevelRange {
            min: config.min_brightness,
            max: config.max_brightness,
            step: 1.0,
        },
        Level::Rotation => LevelRange {
            min: 0.0,
            max: MAX_ROTATION_INPUT,
            step: 1.0,
        },
    }
}

fn check_range(level: Level, value: f64, config: &OverlayConfig) -> Result<(), OverlayError> {
    // Rotation accepts any angle in [0, 360), not just slider positions.
    let (min, max, in_range) = match level {
        Level::Rotation => (0.0, 360.0, (0.0..360.0).contains(&value)),
        _ => {
            let range = level_range(level, config);
            (range.min, range.max, (range.min..=range.max).contains(&value))
        }
    };

    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(OverlayError::OutOfRangeLevel {
            level,
            value,
            min,
            max,
        })
    }
}
