//! Mapping between canvas scroll offsets and the minimap viewbox.
//!
//! The minimap shows the whole rotated canvas at `scale_factor = map_size /
//! canvas_size`. The viewbox is the visible part of the canvas drawn on top
//! of it; clicking the minimap scrolls the canvas so the clicked point ends
//! up in the middle of the viewport.

use crate::points::{Point, ViewportSize};
use serde::{Deserialize, Serialize};

/// Visible-region indicator in minimap pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewbox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewbox {
    /// Minimap point under the middle of the viewport.
    ///
    /// The border inset on the position and the border allowance on the size
    /// cancel out, so this is exactly `scroll * scale + viewport * scale / 2`
    /// while the viewbox is not capped by the minimap size.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Place the viewbox for the current scroll offset.
///
/// `border` is the indicator's own border width: the box is shifted in by it
/// and shrunk by twice it so the outline stays inside the minimap.
pub fn update_viewbox(
    scroll: Point,
    viewport: ViewportSize,
    scale_factor: f64,
    map_size: u32,
    border: f64,
) -> Viewbox {
    let map_size = map_size as f64;
    Viewbox {
        x: scroll.x * scale_factor + border,
        y: scroll.y * scale_factor + border,
        width: (viewport.width * scale_factor).min(map_size) - 2.0 * border,
        height: (viewport.height * scale_factor).min(map_size) - 2.0 * border,
    }
}

/// Scroll offset that centers the viewport on a clicked minimap point.
///
/// `click` and `minimap_origin` share a coordinate space (page pixels);
/// the difference is scaled up to canvas pixels.
pub fn scroll_from_minimap_click(
    click: Point,
    minimap_origin: Point,
    scale_factor: f64,
    viewport: ViewportSize,
) -> Point {
    (click - minimap_origin).scale(1.0 / scale_factor) - viewport.half()
}

/// Confine a scroll offset to what a scroll container of `canvas_size` accepts.
pub fn clamp_scroll(scroll: Point, canvas_size: u32, viewport: ViewportSize) -> Point {
    let size = canvas_size as f64;
    let max_x = (size - viewport.width).max(0.0);
    let max_y = (size - viewport.height).max(0.0);
    Point::new(scroll.x.clamp(0.0, max_x), scroll.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: f64 = 200.0 / 1281.0;

    #[test]
    fn viewbox_at_origin_is_inset_by_border() {
        let viewbox = update_viewbox(Point::ORIGIN, ViewportSize::new(640.5, 320.25), SCALE, 200, 1.0);
        assert_eq!(viewbox.x, 1.0);
        assert_eq!(viewbox.y, 1.0);
        assert!((viewbox.width - (640.5 * SCALE - 2.0)).abs() < 1e-9);
        assert!((viewbox.height - (320.25 * SCALE - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn viewbox_follows_scroll() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let viewbox = update_viewbox(Point::new(300.0, 150.0), viewport, 0.5, 200, 1.0);
        assert_eq!(viewbox.x, 151.0);
        assert_eq!(viewbox.y, 76.0);
        assert_eq!(viewbox.width, 198.0);
        assert_eq!(viewbox.height, 198.0);
    }

    #[test]
    fn viewbox_is_capped_at_map_size() {
        // Viewport larger than the whole canvas
        let viewport = ViewportSize::new(4000.0, 3000.0);
        let viewbox = update_viewbox(Point::ORIGIN, viewport, SCALE, 200, 1.0);
        assert_eq!(viewbox.width, 198.0);
        assert_eq!(viewbox.height, 198.0);
    }

    #[test]
    fn click_centers_viewport_on_clicked_point() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let origin = Point::new(1000.0, 30.0);
        // 50 minimap pixels right and 20 down at scale 0.25 -> canvas (200, 80)
        let scroll = scroll_from_minimap_click(Point::new(1050.0, 50.0), origin, 0.25, viewport);
        assert_eq!(scroll, Point::new(200.0 - 400.0, 80.0 - 300.0));
    }

    #[test]
    fn clicking_viewbox_center_recovers_scroll() {
        let origin = Point::new(870.0, 30.0);
        let viewports = [
            ViewportSize::new(800.0, 600.0),
            ViewportSize::new(1280.0, 720.0),
            ViewportSize::new(333.0, 901.0),
        ];
        let scales = [SCALE, 0.1, 0.37, 1.0];
        let scrolls = [
            Point::new(0.0, 0.0),
            Point::new(120.0, 45.0),
            Point::new(640.0, 333.0),
            Point::new(17.5, 980.25),
        ];

        for viewport in viewports {
            for scale in scales {
                for scroll in scrolls {
                    // Large map so the viewbox is never capped
                    let viewbox = update_viewbox(scroll, viewport, scale, 10_000, 1.0);
                    let click = origin + viewbox.center();
                    let recovered = scroll_from_minimap_click(click, origin, scale, viewport);
                    assert!(
                        recovered.distance(&scroll) <= 1.0,
                        "scroll {:?} viewport {:?} scale {}: got {:?}",
                        scroll,
                        viewport,
                        scale,
                        recovered
                    );
                }
            }
        }
    }

    #[test]
    fn clamp_scroll_keeps_offset_inside_canvas() {
        let viewport = ViewportSize::new(800.0, 600.0);
        assert_eq!(
            clamp_scroll(Point::new(-50.0, 2000.0), 1281, viewport),
            Point::new(0.0, 681.0)
        );
        assert_eq!(
            clamp_scroll(Point::new(200.0, 300.0), 1281, viewport),
            Point::new(200.0, 300.0)
        );
    }

    #[test]
    fn clamp_scroll_pins_to_zero_when_viewport_exceeds_canvas() {
        let viewport = ViewportSize::new(2000.0, 2000.0);
        assert_eq!(
            clamp_scroll(Point::new(100.0, 100.0), 1281, viewport),
            Point::ORIGIN
        );
    }
}
