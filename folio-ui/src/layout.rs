//! Page layout of the overlay: viewport size and minimap placement.

use folio_core::{OverlayConfig, OverlayError, Point, ViewportSize};
use serde::{Deserialize, Serialize};

/// Default gap between the minimap and the top-right corner of the viewport.
pub const DEFAULT_MINIMAP_MARGIN: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of the page scrollbar. Measured from the document when absent.
    pub scrollbar_width: Option<f64>,
    /// Offset of the minimap from the top and right edges of the viewport
    pub minimap_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            scrollbar_width: None,
            minimap_margin: DEFAULT_MINIMAP_MARGIN,
        }
    }
}

/// Everything a host passes when creating an overlay, as one flat object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(flatten)]
    pub overlay: OverlayConfig,
    #[serde(flatten)]
    pub layout: LayoutConfig,
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        let config: HostConfig =
            serde_json::from_str(json).map_err(|e| OverlayError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        self.overlay.validate()?;
        if !(self.layout.minimap_margin >= 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "minimapMargin must be non-negative, got {}",
                self.layout.minimap_margin
            )));
        }
        if let Some(width) = self.layout.scrollbar_width {
            if !(width >= 0.0) {
                return Err(OverlayError::InvalidConfig(format!(
                    "scrollbarWidth must be non-negative, got {}",
                    width
                )));
            }
        }
        Ok(())
    }
}

/// Visible area for a window of the given size, minus the scrollbar on both axes.
pub fn viewport_for_window(window_width: f64, window_height: f64, scrollbar: f64) -> ViewportSize {
    ViewportSize::new(
        (window_width - scrollbar).max(0.0),
        (window_height - scrollbar).max(0.0),
    )
}

/// Top-left corner of the minimap in page pixels.
pub fn minimap_origin(viewport: ViewportSize, map_size: u32, margin: f64) -> Point {
    Point::new(viewport.width - map_size as f64 - margin, margin)
}

/// Window inner size and the scrollbar width taken from the live document.
#[cfg(target_arch = "wasm32")]
pub fn measure_window() -> Option<(f64, f64, f64)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    let client_width = window.document()?.document_element()?.client_width() as f64;
    Some((width, height, (width - client_width).max(0.0)))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn measure_window() -> Option<(f64, f64, f64)> {
    None
}
