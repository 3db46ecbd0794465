pub mod adjust;
pub mod config;
pub mod error;
pub mod geometry;
pub mod levels;
pub mod messages;
pub mod minimap;
pub mod overlay;
pub mod points;
pub mod raster;
pub mod rotation;
pub mod surface;
pub mod transforms;

pub use adjust::{adjust, adjust_channel, brightness_multiplier};
pub use config::OverlayConfig;
pub use error::OverlayError;
pub use geometry::SurfaceGeometry;
pub use levels::{level_range, Level, LevelChange, LevelRange, LevelState, ROTATION_PRESETS};
pub use messages::{FrameUpdate, OverlayCommand, ViewboxUpdate};
pub use minimap::{clamp_scroll, scroll_from_minimap_click, update_viewbox, Viewbox};
pub use overlay::{Overlay, OverlayState};
pub use points::{Point, ViewportSize};
pub use raster::Raster;
pub use rotation::{rotate_focal_point, OverlaySurface};
pub use surface::{DrawRect, RasterSurface, SoftwareSurface};
pub use transforms::{compose_affine_transformations, Mat3, Transform};
