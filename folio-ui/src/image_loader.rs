//! Asynchronous image loading.

use crate::canvas_surface::{create_canvas, describe_js_error, get_2d_context, read_pixels};
use folio_core::{OverlayError, Raster};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

type LoadSender = Rc<RefCell<Option<oneshot::Sender<Result<(), String>>>>>;

fn image_load_error(err: JsValue) -> OverlayError {
    OverlayError::ImageLoad(describe_js_error(&err))
}

/// Fetch and decode the image at `url` into RGBA pixels.
///
/// Images from other origins must be served with CORS headers, otherwise the
/// decoded pixels cannot be read back.
pub async fn load_image(url: &str) -> Result<Raster, OverlayError> {
    let image = HtmlImageElement::new().map_err(image_load_error)?;
    image.set_cross_origin(Some("anonymous"));

    let (sender, receiver) = oneshot::channel();
    let sender: LoadSender = Rc::new(RefCell::new(Some(sender)));

    let on_load = {
        let sender = sender.clone();
        Closure::once(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(Ok(()));
            }
        })
    };
    let on_error = {
        let sender = sender.clone();
        let url = url.to_string();
        Closure::once(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(Err(format!("failed to load {}", url)));
            }
        })
    };

    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    image.set_src(url);

    let outcome = receiver.await;
    image.set_onload(None);
    image.set_onerror(None);
    drop(on_load);
    drop(on_error);

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(message)) => return Err(OverlayError::ImageLoad(message)),
        Err(_) => return Err(OverlayError::ImageLoad("image load was cancelled".to_string())),
    }

    let (width, height) = (image.natural_width(), image.natural_height());
    log::debug!("Loaded {} ({}x{})", url, width, height);
    decode_pixels(&image, width, height)
}

fn decode_pixels(image: &HtmlImageElement, width: u32, height: u32) -> Result<Raster, OverlayError> {
    if width == 0 || height == 0 {
        return Err(OverlayError::DegenerateSurface { width, height });
    }
    let canvas = create_canvas(width, height).map_err(image_load_error)?;
    let context = get_2d_context(&canvas).map_err(image_load_error)?;
    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(image_load_error)?;

    // A tainted canvas refuses readback; report it as a load failure
    read_pixels(&context, width, height).map_err(|e| match e {
        OverlayError::Surface(message) => OverlayError::ImageLoad(message),
        other => other,
    })
}
