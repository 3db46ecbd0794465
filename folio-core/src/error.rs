//! Overlay error types.

use crate::levels::Level;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("{level} value {value} is outside [{min}, {max}]")]
    OutOfRangeLevel {
        level: Level,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Cannot build a surface for a {width}x{height} image")]
    DegenerateSurface { width: u32, height: u32 },

    #[error("Overlay is not open")]
    NotOpen,

    #[error("Invalid overlay configuration: {0}")]
    InvalidConfig(String),

    #[error("Surface operation failed: {0}")]
    Surface(String),

    #[error("Unknown level parameter: {0}")]
    UnknownLevel(String),

    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}
