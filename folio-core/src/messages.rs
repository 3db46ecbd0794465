use crate::levels::{Level, LevelChange};
use crate::minimap::Viewbox;
use crate::points::Point;
use serde::{Deserialize, Serialize};

/// Discrete commands sent from the host to an overlay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum OverlayCommand {
    /// A range input was released at `value`.
    CommitLevel { level: Level, value: f64 },

    /// Reset button for one level.
    ResetLevel { level: Level },

    /// The host's scroll container moved.
    Scroll { x: f64, y: f64 },

    /// The visible window changed size.
    Resize { width: f64, height: f64 },

    /// Click on the minimap. Both points are in page pixels.
    MinimapClick {
        x: f64,
        y: f64,
        origin_x: f64,
        origin_y: f64,
    },

    /// Hide the overlay and release its buffers.
    Close,
}

/// What the host has to do with the viewbox indicator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "state")]
pub enum ViewboxUpdate {
    #[default]
    Unchanged,
    Show(Viewbox),
    Hidden,
}

/// Outbound effects of one processed command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FrameUpdate {
    /// The canvas raster was replaced.
    pub canvas_changed: bool,
    /// The minimap raster was replaced.
    pub map_changed: bool,
    pub viewbox: ViewboxUpdate,
    /// Scroll the host container here.
    pub scroll: Option<Point>,
    /// Level that changed, if any.
    pub level_change: Option<LevelChange>,
}

impl FrameUpdate {
    /// True when the host has nothing to do.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
