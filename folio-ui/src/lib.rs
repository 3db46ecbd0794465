pub mod bindings;
pub mod canvas_surface;
pub mod image_loader;
pub mod layout;

pub use bindings::{FolioOverlay, LoadedImage};
pub use canvas_surface::CanvasSurface;
pub use image_loader::load_image;
pub use layout::{minimap_origin, viewport_for_window, HostConfig, LayoutConfig};

use wasm_bindgen::prelude::*;

/// Install the panic hook and console logger. Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);
}
