//! Brightness/contrast remapping of RGBA rasters.

use crate::raster::CHANNELS;
use crate::{LevelState, OverlayConfig, Raster};

/// Mid-gray pivot for contrast.
const CONTRAST_PIVOT: f64 = 128.0;

/// Brightness as a channel multiplier.
///
/// The brightness value is clamped to its configured range first, so the
/// multiplier stays within `[1 + min/max, 2]`.
pub fn brightness_multiplier(brightness: f64, config: &OverlayConfig) -> f64 {
    1.0 + brightness.clamp(config.min_brightness, config.max_brightness) / config.max_brightness
}

/// Remap one colour channel.
#[inline]
pub fn adjust_channel(value: u8, bright_mul: f64, contrast: f64) -> u8 {
    let v = value as f64 * bright_mul * contrast + CONTRAST_PIVOT - contrast * CONTRAST_PIVOT;
    let v = if v > 0.0 { v.min(255.0) } else { 0.0 };
    // 8-bit canvas buffers round to nearest, ties to even
    v.round_ties_even() as u8
}

/// Apply brightness and contrast to a raster, returning a new raster.
///
/// Pure black pixels (R+G+B == 0) are copied through untouched so the
/// transparent padding around a rotated image stays black. Alpha is never
/// modified. Rotation in `levels` is ignored here.
pub fn adjust(raster: &Raster, levels: &LevelState, config: &OverlayConfig) -> Raster {
    let mut output = raster.clone();
    if levels.contrast == 1.0 && levels.brightness == 0.0 {
        return output;
    }

    let bright_mul = brightness_multiplier(levels.brightness, config);
    let contrast = levels.contrast;

    for pixel in output.data_mut().chunks_exact_mut(CHANNELS) {
        let sum = pixel[0] as u32 + pixel[1] as u32 + pixel[2] as u32;
        if sum == 0 {
            continue;
        }
        for channel in &mut pixel[..3] {
            *channel = adjust_channel(*channel, bright_mul, contrast);
        }
    }

    output
}
