//! JavaScript-facing overlay handle.
//!
//! Commands and results cross the boundary as plain JS objects (through
//! serde) or as JSON strings for hosts that prefer to post messages.

use crate::canvas_surface::CanvasSurface;
use crate::image_loader;
use crate::layout::{measure_window, minimap_origin, viewport_for_window, HostConfig};
use folio_core::{
    level_range, FrameUpdate, Level, Overlay, OverlayCommand, OverlayError, Point, Raster,
    ViewportSize,
};
use gloo_utils::format::JsValueSerdeExt;
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

fn to_js(err: OverlayError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn serde_to_js(err: serde_json::Error) -> JsValue {
    js_sys::Error::new(&format!("Serialization error: {}", err)).into()
}

fn update_to_js(update: FrameUpdate) -> Result<JsValue, JsValue> {
    JsValue::from_serde(&update).map_err(serde_to_js)
}

/// Decoded image waiting to be shown.
#[wasm_bindgen]
pub struct LoadedImage {
    raster: Raster,
}

#[wasm_bindgen]
impl LoadedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Load the image at `url`. Resolves once the pixels are readable.
#[wasm_bindgen(js_name = loadImage)]
pub async fn load_image(url: String) -> Result<LoadedImage, JsValue> {
    image_loader::load_image(&url)
        .await
        .map(|raster| LoadedImage { raster })
        .map_err(to_js)
}

/// Image adjustment overlay bound to two canvases.
#[wasm_bindgen]
pub struct FolioOverlay {
    overlay: Overlay<CanvasSurface>,
    config: HostConfig,
}

#[wasm_bindgen]
impl FolioOverlay {
    /// `config` is an optional flat object of overlay and layout settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        map: HtmlCanvasElement,
        config: JsValue,
    ) -> Result<FolioOverlay, JsValue> {
        let config: HostConfig = if config.is_undefined() || config.is_null() {
            HostConfig::default()
        } else {
            config
                .into_serde()
                .map_err(|e| to_js(OverlayError::InvalidConfig(e.to_string())))?
        };
        config.validate().map_err(to_js)?;

        let overlay = Overlay::new(
            config.overlay,
            ViewportSize::default(),
            CanvasSurface::new(canvas).map_err(to_js)?,
            CanvasSurface::new(map).map_err(to_js)?,
        )
        .map_err(to_js)?;

        let mut handle = FolioOverlay { overlay, config };
        handle.refit().map_err(to_js)?;
        Ok(handle)
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    /// Show a loaded image. Levels start from identity.
    pub fn open(&mut self, image: LoadedImage) -> Result<JsValue, JsValue> {
        let update = self.overlay.open(image.raster).map_err(to_js)?;
        update_to_js(update)
    }

    /// Apply a released range input. `level` accepts full names or `c`/`b`/`r`.
    #[wasm_bindgen(js_name = commitLevel)]
    pub fn commit_level(&mut self, level: &str, value: f64) -> Result<JsValue, JsValue> {
        let level = Level::from_str(level).map_err(to_js)?;
        let update = self.overlay.commit_level(level, value).map_err(to_js)?;
        update_to_js(update)
    }

    #[wasm_bindgen(js_name = resetLevel)]
    pub fn reset_level(&mut self, level: &str) -> Result<JsValue, JsValue> {
        let level = Level::from_str(level).map_err(to_js)?;
        let update = self.overlay.reset_level(level).map_err(to_js)?;
        update_to_js(update)
    }

    /// Report the scroll container's position.
    pub fn scroll(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let update = self.overlay.scroll(Point::new(x, y)).map_err(to_js)?;
        update_to_js(update)
    }

    /// Report an explicit viewport size.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let update = self
            .overlay
            .resize(ViewportSize::new(width, height))
            .map_err(to_js)?;
        update_to_js(update)
    }

    /// Re-measure the window and resize the viewport to match.
    #[wasm_bindgen(js_name = fitToWindow)]
    pub fn fit_to_window(&mut self) -> Result<JsValue, JsValue> {
        let update = self.refit().map_err(to_js)?;
        update_to_js(update)
    }

    /// Handle a click on the minimap, given in page coordinates.
    #[wasm_bindgen(js_name = minimapClick)]
    pub fn minimap_click(&mut self, page_x: f64, page_y: f64) -> Result<JsValue, JsValue> {
        let origin = self.minimap_origin();
        let update = self
            .overlay
            .minimap_click(Point::new(page_x, page_y), origin)
            .map_err(to_js)?;
        update_to_js(update)
    }

    pub fn close(&mut self) -> Result<JsValue, JsValue> {
        let update = self.overlay.close().map_err(to_js)?;
        update_to_js(update)
    }

    /// Process a command object such as `{type: "CommitLevel", level: "contrast", value: 2}`.
    pub fn dispatch(&mut self, command: JsValue) -> Result<JsValue, JsValue> {
        let command: OverlayCommand = command.into_serde().map_err(serde_to_js)?;
        let update = self.overlay.dispatch(command).map_err(to_js)?;
        update_to_js(update)
    }

    /// JSON-string variant of [`FolioOverlay::dispatch`].
    #[wasm_bindgen(js_name = dispatchJson)]
    pub fn dispatch_json(&mut self, message: &str) -> Result<String, JsValue> {
        let command: OverlayCommand = serde_json::from_str(message)
            .map_err(|e| JsValue::from_str(&format!("Parse error: {}", e)))?;
        let update = self.overlay.dispatch(command).map_err(to_js)?;
        serde_json::to_string(&update).map_err(serde_to_js)
    }

    /// Current `{contrast, brightness, rotation}`.
    pub fn levels(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(self.overlay.levels()).map_err(serde_to_js)
    }

    /// `{min, max, step}` for a range input.
    #[wasm_bindgen(js_name = levelRange)]
    pub fn level_range(&self, level: &str) -> Result<JsValue, JsValue> {
        let level = Level::from_str(level).map_err(to_js)?;
        JsValue::from_serde(&level_range(level, self.overlay.config())).map_err(serde_to_js)
    }

    /// Quick-rotate angles for preset buttons.
    #[wasm_bindgen(js_name = rotationPresets)]
    pub fn rotation_presets(&self) -> Vec<f64> {
        folio_core::ROTATION_PRESETS.to_vec()
    }

    #[wasm_bindgen(getter, js_name = minimapX)]
    pub fn minimap_x(&self) -> f64 {
        self.minimap_origin().x
    }

    #[wasm_bindgen(getter, js_name = minimapY)]
    pub fn minimap_y(&self) -> f64 {
        self.minimap_origin().y
    }
}

impl FolioOverlay {
    fn refit(&mut self) -> Result<FrameUpdate, OverlayError> {
        let Some((width, height, measured_scrollbar)) = measure_window() else {
            return Ok(FrameUpdate::default());
        };
        let scrollbar = self
            .config
            .layout
            .scrollbar_width
            .unwrap_or(measured_scrollbar);
        self.overlay
            .resize(viewport_for_window(width, height, scrollbar))
    }

    fn minimap_origin(&self) -> Point {
        minimap_origin(
            self.overlay.viewport(),
            self.overlay.config().map_size,
            self.config.layout.minimap_margin,
        )
    }
}
