//! `<canvas>`-backed raster surface.

use folio_core::{DrawRect, Mat3, OverlayError, Raster, RasterSurface};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, ContextAttributes2d, HtmlCanvasElement, ImageData};

/// Turn a thrown JS value into a surface error.
pub(crate) fn surface_error(err: JsValue) -> OverlayError {
    OverlayError::Surface(describe_js_error(&err))
}

pub(crate) fn describe_js_error(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Get a 2D context tuned for frequent pixel readback.
pub fn get_2d_context(
    canvas: &HtmlCanvasElement,
) -> Result<CanvasRenderingContext2d, JsValue> {
    let attrs = ContextAttributes2d::new();
    attrs.set_will_read_frequently(true);

    canvas
        .get_context_with_context_options("2d", &attrs)?
        .ok_or_else(|| JsValue::from_str("No 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Detached canvas, never inserted into the document.
pub fn create_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

/// Read the full contents of a canvas.
pub(crate) fn read_pixels(
    context: &CanvasRenderingContext2d,
    width: u32,
    height: u32,
) -> Result<Raster, OverlayError> {
    if width == 0 || height == 0 {
        return Ok(Raster::blank(width, height));
    }
    let image_data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(surface_error)?;
    Raster::from_rgba(width, height, image_data.data().0)
}

/// Drawing target for the overlay canvas or the minimap.
///
/// Sources are staged on a detached scratch canvas and drawn with the
/// context's transform, so rotation and scaling are done by the browser.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    scratch: HtmlCanvasElement,
    scratch_context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, OverlayError> {
        let context = get_2d_context(&canvas).map_err(surface_error)?;
        let scratch = create_canvas(0, 0).map_err(surface_error)?;
        let scratch_context = get_2d_context(&scratch).map_err(surface_error)?;
        Ok(Self {
            canvas,
            context,
            scratch,
            scratch_context,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn stage(&self, source: &Raster) -> Result<(), JsValue> {
        self.scratch.set_width(source.width());
        self.scratch.set_height(source.height());
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(source.data()),
            source.width(),
            source.height(),
        )?;
        self.scratch_context.put_image_data(&image_data, 0.0, 0.0)
    }

    fn draw_staged(&self, dest: DrawRect, transform: &Mat3) -> Result<(), JsValue> {
        let [a, b, c, d, e, f] = transform.to_canvas_coefficients();
        self.context.set_transform(a, b, c, d, e, f)?;
        let drawn = self
            .context
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.scratch,
                dest.x,
                dest.y,
                dest.width,
                dest.height,
            );
        self.context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        drawn
    }
}

impl RasterSurface for CanvasSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), OverlayError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), OverlayError> {
        self.context
            .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
            .map_err(surface_error)?;
        let (width, height) = self.dimensions();
        self.context
            .clear_rect(0.0, 0.0, width as f64, height as f64);
        Ok(())
    }

    fn draw_image(
        &mut self,
        source: &Raster,
        dest: DrawRect,
        transform: &Mat3,
    ) -> Result<(), OverlayError> {
        if source.is_empty() {
            return Ok(());
        }
        let result = self
            .stage(source)
            .and_then(|_| self.draw_staged(dest, transform));
        // Release the staged copy of the source
        self.scratch.set_width(0);
        self.scratch.set_height(0);
        result.map_err(surface_error)
    }

    fn get_pixels(&self) -> Result<Raster, OverlayError> {
        let (width, height) = self.dimensions();
        read_pixels(&self.context, width, height)
    }

    fn put_pixels(&mut self, raster: &Raster) -> Result<(), OverlayError> {
        let (width, height) = self.dimensions();
        if raster.dimensions() != (width, height) {
            return Err(OverlayError::Surface(format!(
                "cannot put {}x{} pixels on a {}x{} canvas",
                raster.width(),
                raster.height(),
                width,
                height
            )));
        }
        if raster.is_empty() {
            return Ok(());
        }
        let image_data =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(raster.data()), width, height)
                .map_err(surface_error)?;
        self.context
            .put_image_data(&image_data, 0.0, 0.0)
            .map_err(surface_error)
    }
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .finish()
    }
}
