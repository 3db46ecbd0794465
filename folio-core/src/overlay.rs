//! The overlay coordinator.
//!
//! Owns the level state, both surfaces and the scroll/viewbox geometry, and
//! runs one complete recomputation pass per command. A pass either finishes
//! and replaces every output, or fails and leaves the previous outputs shown.

use crate::adjust::adjust;
use crate::geometry::SurfaceGeometry;
use crate::levels::{Level, LevelChange, LevelState};
use crate::messages::{FrameUpdate, OverlayCommand, ViewboxUpdate};
use crate::minimap::{clamp_scroll, scroll_from_minimap_click, update_viewbox, Viewbox};
use crate::points::{Point, ViewportSize};
use crate::rotation::{rotate_focal_point, OverlaySurface};
use crate::surface::RasterSurface;
use crate::{OverlayConfig, OverlayError, Raster};

/// Lifecycle state of an overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayState {
    /// Hidden, no buffers held, levels at identity
    Closed,
    /// Visible and processing commands
    Open,
}

/// Data that only exists while the overlay is open.
#[derive(Debug)]
struct Session {
    source: Raster,
    scroll: Point,
    viewbox: Viewbox,
}

/// Base and displayed rasters produced for one surface by a pass.
type SurfaceFrame = (Raster, Raster);

/// Image adjustment overlay over two drawing backends.
#[derive(Debug)]
pub struct Overlay<S> {
    config: OverlayConfig,
    viewport: ViewportSize,
    levels: LevelState,
    canvas: OverlaySurface<S>,
    map: OverlaySurface<S>,
    session: Option<Session>,
}

impl<S: RasterSurface> Overlay<S> {
    /// Create a closed overlay. `canvas` and `map` are the host's drawing targets.
    pub fn new(
        config: OverlayConfig,
        viewport: ViewportSize,
        canvas: S,
        map: S,
    ) -> Result<Self, OverlayError> {
        config.validate()?;
        viewport.validate()?;
        Ok(Self {
            config,
            viewport,
            levels: LevelState::identity(),
            canvas: OverlaySurface::new(canvas),
            map: OverlaySurface::new(map),
            session: None,
        })
    }

    pub fn state(&self) -> OverlayState {
        if self.session.is_some() {
            OverlayState::Open
        } else {
            OverlayState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn levels(&self) -> &LevelState {
        &self.levels
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn canvas(&self) -> &OverlaySurface<S> {
        &self.canvas
    }

    pub fn map(&self) -> &OverlaySurface<S> {
        &self.map
    }

    /// Adjusted canvas pixels currently shown.
    pub fn canvas_raster(&self) -> Option<&Raster> {
        self.canvas.displayed()
    }

    /// Adjusted minimap pixels currently shown.
    pub fn map_raster(&self) -> Option<&Raster> {
        self.map.displayed()
    }

    pub fn scroll_offset(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.scroll)
    }

    pub fn viewbox(&self) -> Option<Viewbox> {
        self.session.as_ref().map(|s| s.viewbox)
    }

    /// Minimap pixels per canvas pixel.
    pub fn scale_factor(&self) -> Option<f64> {
        self.canvas
            .geometry()
            .map(|g| g.scale_factor_to(self.config.map_size))
    }

    /// Show a freshly loaded image.
    ///
    /// Levels go back to identity and the scroll offset to the top-left
    /// corner. A zero-sized image is refused before anything is touched;
    /// any later failure puts the previous image (or the closed state) back.
    pub fn open(&mut self, image: Raster) -> Result<FrameUpdate, OverlayError> {
        let geometry = SurfaceGeometry::for_image(image.width(), image.height())?;
        let map_geometry = geometry.minimap(self.config.map_size);
        log::debug!(
            "Opening {}x{} image on a {}px canvas",
            image.width(),
            image.height(),
            geometry.size
        );

        let levels = LevelState::identity();
        let canvas_before = self.canvas.take_snapshot();
        let map_before = self.map.take_snapshot();
        let frames = self.canvas.layout(geometry).and_then(|_| {
            self.map.layout(map_geometry)?;
            render_both(&mut self.canvas, &mut self.map, &image, &levels, &self.config)
        });
        let (canvas_frame, map_frame) = match frames {
            Ok(frames) => frames,
            Err(e) => {
                log::warn!("Failed to open image, keeping previous state: {}", e);
                self.canvas.reinstate(canvas_before);
                self.map.reinstate(map_before);
                return Err(e);
            }
        };

        self.canvas.commit(canvas_frame.0, canvas_frame.1, levels.rotation);
        self.map.commit(map_frame.0, map_frame.1, levels.rotation);
        self.levels = levels;

        let scroll = Point::ORIGIN;
        let viewbox = self.compute_viewbox(scroll, &geometry);
        self.session = Some(Session {
            source: image,
            scroll,
            viewbox,
        });

        Ok(FrameUpdate {
            canvas_changed: true,
            map_changed: true,
            viewbox: ViewboxUpdate::Show(viewbox),
            scroll: Some(scroll),
            level_change: None,
        })
    }

    /// Apply a committed range-input value.
    pub fn commit_level(&mut self, level: Level, value: f64) -> Result<FrameUpdate, OverlayError> {
        self.ensure_open()?;
        let mut levels = self.levels;
        let change = levels.set(level, value, &self.config).inspect_err(|e| {
            log::warn!("Rejected level update: {}", e);
        })?;
        match change {
            Some(change) => self.apply_levels(levels, change),
            None => Ok(FrameUpdate::default()),
        }
    }

    /// Put one level back to its identity value.
    pub fn reset_level(&mut self, level: Level) -> Result<FrameUpdate, OverlayError> {
        self.ensure_open()?;
        let mut levels = self.levels;
        match levels.reset(level) {
            Some(change) => self.apply_levels(levels, change),
            None => Ok(FrameUpdate::default()),
        }
    }

    /// Record the host container's scroll position.
    pub fn scroll(&mut self, offset: Point) -> Result<FrameUpdate, OverlayError> {
        let geometry = self.open_geometry()?;
        let viewbox = self.compute_viewbox(offset, &geometry);
        if let Some(session) = self.session.as_mut() {
            session.scroll = offset;
            session.viewbox = viewbox;
        }
        Ok(FrameUpdate {
            viewbox: ViewboxUpdate::Show(viewbox),
            ..FrameUpdate::default()
        })
    }

    /// Record a new viewport size. Accepted in both states; only sizes that
    /// are finite and non-negative are stored.
    pub fn resize(&mut self, viewport: ViewportSize) -> Result<FrameUpdate, OverlayError> {
        viewport.validate()?;
        self.viewport = viewport;
        let Ok(geometry) = self.open_geometry() else {
            return Ok(FrameUpdate::default());
        };
        let Some(scroll) = self.scroll_offset() else {
            return Ok(FrameUpdate::default());
        };
        let viewbox = self.compute_viewbox(scroll, &geometry);
        if let Some(session) = self.session.as_mut() {
            session.viewbox = viewbox;
        }
        Ok(FrameUpdate {
            viewbox: ViewboxUpdate::Show(viewbox),
            ..FrameUpdate::default()
        })
    }

    /// Center the viewport on a clicked minimap point.
    pub fn minimap_click(
        &mut self,
        click: Point,
        minimap_origin: Point,
    ) -> Result<FrameUpdate, OverlayError> {
        let geometry = self.open_geometry()?;
        let scale = geometry.scale_factor_to(self.config.map_size);
        let target = scroll_from_minimap_click(click, minimap_origin, scale, self.viewport);
        let scroll = clamp_scroll(target, geometry.size, self.viewport);
        let viewbox = self.compute_viewbox(scroll, &geometry);
        if let Some(session) = self.session.as_mut() {
            session.scroll = scroll;
            session.viewbox = viewbox;
        }
        Ok(FrameUpdate {
            viewbox: ViewboxUpdate::Show(viewbox),
            scroll: Some(scroll),
            ..FrameUpdate::default()
        })
    }

    /// Hide the overlay: clear both surfaces, drop buffers, reset levels.
    pub fn close(&mut self) -> Result<FrameUpdate, OverlayError> {
        self.ensure_open()?;
        log::debug!("Closing overlay");
        self.session = None;
        self.levels = LevelState::identity();
        self.release_surfaces();
        Ok(FrameUpdate {
            canvas_changed: true,
            map_changed: true,
            viewbox: ViewboxUpdate::Hidden,
            ..FrameUpdate::default()
        })
    }

    /// Process one host command.
    pub fn dispatch(&mut self, command: OverlayCommand) -> Result<FrameUpdate, OverlayError> {
        match command {
            OverlayCommand::CommitLevel { level, value } => self.commit_level(level, value),
            OverlayCommand::ResetLevel { level } => self.reset_level(level),
            OverlayCommand::Scroll { x, y } => self.scroll(Point::new(x, y)),
            OverlayCommand::Resize { width, height } => {
                self.resize(ViewportSize::new(width, height))
            }
            OverlayCommand::MinimapClick {
                x,
                y,
                origin_x,
                origin_y,
            } => self.minimap_click(Point::new(x, y), Point::new(origin_x, origin_y)),
            OverlayCommand::Close => self.close(),
        }
    }

    /// Run a pass for new levels and commit it.
    fn apply_levels(
        &mut self,
        levels: LevelState,
        change: LevelChange,
    ) -> Result<FrameUpdate, OverlayError> {
        let geometry = self.open_geometry()?;
        let Some(session) = self.session.as_ref() else {
            return Err(OverlayError::NotOpen);
        };
        log::debug!(
            "{} {} -> {}",
            change.level,
            change.old_value,
            change.new_value
        );

        let frames = render_both(
            &mut self.canvas,
            &mut self.map,
            &session.source,
            &levels,
            &self.config,
        );
        let (canvas_frame, map_frame) = match frames {
            Ok(frames) => frames,
            Err(e) => {
                log::warn!("Recomputation failed, keeping previous frame: {}", e);
                self.canvas.restore();
                self.map.restore();
                return Err(e);
            }
        };

        self.canvas.commit(canvas_frame.0, canvas_frame.1, levels.rotation);
        self.map.commit(map_frame.0, map_frame.1, levels.rotation);
        self.levels = levels;

        let mut update = FrameUpdate {
            canvas_changed: true,
            map_changed: true,
            level_change: Some(change),
            ..FrameUpdate::default()
        };

        if change.needs_rotation() {
            let scroll = self.refocus(&geometry, change.old_value, change.new_value);
            let viewbox = self.compute_viewbox(scroll, &geometry);
            if let Some(session) = self.session.as_mut() {
                session.scroll = scroll;
                session.viewbox = viewbox;
            }
            update.scroll = Some(scroll);
            update.viewbox = ViewboxUpdate::Show(viewbox);
        }

        Ok(update)
    }

    /// Scroll offset that keeps the viewport's focal point in place across a turn.
    fn refocus(&self, geometry: &SurfaceGeometry, old_degrees: f64, new_degrees: f64) -> Point {
        let half = self.viewport.half();
        let scroll = self.scroll_offset().unwrap_or(Point::ORIGIN);
        let focal = scroll + half;
        let moved = rotate_focal_point(focal, geometry.center(), old_degrees, new_degrees);
        clamp_scroll(moved - half, geometry.size, self.viewport)
    }

    fn compute_viewbox(&self, scroll: Point, geometry: &SurfaceGeometry) -> Viewbox {
        update_viewbox(
            scroll,
            self.viewport,
            geometry.scale_factor_to(self.config.map_size),
            self.config.map_size,
            self.config.viewbox_border,
        )
    }

    fn ensure_open(&self) -> Result<(), OverlayError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(OverlayError::NotOpen)
        }
    }

    fn open_geometry(&self) -> Result<SurfaceGeometry, OverlayError> {
        self.ensure_open()?;
        self.canvas.geometry().copied().ok_or(OverlayError::NotOpen)
    }

    fn release_surfaces(&mut self) {
        for surface in [&mut self.canvas, &mut self.map] {
            if let Err(e) = surface.release() {
                log::warn!("Failed to release surface: {}", e);
            }
        }
    }
}

/// Rotate (if needed), adjust and show both surfaces. Nothing is committed.
fn render_both<S: RasterSurface>(
    canvas: &mut OverlaySurface<S>,
    map: &mut OverlaySurface<S>,
    source: &Raster,
    levels: &LevelState,
    config: &OverlayConfig,
) -> Result<(SurfaceFrame, SurfaceFrame), OverlayError> {
    let canvas_frame = render_surface(canvas, source, levels, config)?;
    let map_frame = render_surface(map, source, levels, config)?;
    canvas.show(&canvas_frame.1)?;
    map.show(&map_frame.1)?;
    Ok((canvas_frame, map_frame))
}

fn render_surface<S: RasterSurface>(
    surface: &mut OverlaySurface<S>,
    source: &Raster,
    levels: &LevelState,
    config: &OverlayConfig,
) -> Result<SurfaceFrame, OverlayError> {
    let base = surface.rotate(source, levels.rotation)?;
    let displayed = adjust(&base, levels, config);
    Ok((base, displayed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawRect, SoftwareSurface};
    use crate::transforms::Mat3;

    fn open_overlay(width: u32, height: u32) -> Overlay<SoftwareSurface> {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(400.0, 300.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        )
        .unwrap();
        overlay
            .open(Raster::filled(width, height, [200, 150, 100, 255]))
            .unwrap();
        overlay
    }

    /// Backend that can be told to fail on the next draw.
    #[derive(Debug, Default)]
    struct FlakySurface {
        inner: SoftwareSurface,
        fail_draws: bool,
    }

    impl RasterSurface for FlakySurface {
        fn dimensions(&self) -> (u32, u32) {
            self.inner.dimensions()
        }

        fn resize(&mut self, width: u32, height: u32) -> Result<(), OverlayError> {
            self.inner.resize(width, height)
        }

        fn clear(&mut self) -> Result<(), OverlayError> {
            self.inner.clear()
        }

        fn draw_image(
            &mut self,
            source: &Raster,
            dest: DrawRect,
            transform: &Mat3,
        ) -> Result<(), OverlayError> {
            if self.fail_draws {
                return Err(OverlayError::Surface("context lost".to_string()));
            }
            self.inner.draw_image(source, dest, transform)
        }

        fn get_pixels(&self) -> Result<Raster, OverlayError> {
            self.inner.get_pixels()
        }

        fn put_pixels(&mut self, raster: &Raster) -> Result<(), OverlayError> {
            self.inner.put_pixels(raster)
        }
    }

    #[test]
    fn new_overlay_is_closed() {
        let overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(800.0, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        )
        .unwrap();
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(overlay.canvas_raster().is_none());
        assert!(overlay.viewbox().is_none());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = OverlayConfig {
            map_size: 0,
            ..OverlayConfig::default()
        };
        let result = Overlay::new(
            config,
            ViewportSize::new(800.0, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        );
        assert!(matches!(result, Err(OverlayError::InvalidConfig(_))));
    }

    #[test]
    fn open_builds_both_surfaces() {
        let overlay = open_overlay(60, 80);
        assert_eq!(overlay.state(), OverlayState::Open);
        assert_eq!(overlay.canvas_raster().unwrap().dimensions(), (100, 100));
        assert_eq!(overlay.map_raster().unwrap().dimensions(), (200, 200));
        assert_eq!(overlay.canvas().angle(), Some(0.0));
        assert_eq!(overlay.scroll_offset(), Some(Point::ORIGIN));
    }

    #[test]
    fn open_refuses_degenerate_image() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(800.0, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        )
        .unwrap();
        let result = overlay.open(Raster::blank(0, 10));
        assert_eq!(
            result,
            Err(OverlayError::DegenerateSurface {
                width: 0,
                height: 10
            })
        );
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(overlay.canvas_raster().is_none());
    }

    #[test]
    fn commands_require_open_overlay() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(800.0, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        )
        .unwrap();
        assert_eq!(
            overlay.commit_level(Level::Contrast, 2.0),
            Err(OverlayError::NotOpen)
        );
        assert_eq!(overlay.scroll(Point::ORIGIN), Err(OverlayError::NotOpen));
        assert_eq!(overlay.close(), Err(OverlayError::NotOpen));
        assert_eq!(
            overlay.minimap_click(Point::ORIGIN, Point::ORIGIN),
            Err(OverlayError::NotOpen)
        );
    }

    #[test]
    fn resize_while_closed_only_stores_viewport() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(800.0, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        )
        .unwrap();
        let update = overlay.resize(ViewportSize::new(1024.0, 768.0)).unwrap();
        assert!(update.is_empty());
        assert_eq!(overlay.viewport(), ViewportSize::new(1024.0, 768.0));
    }

    #[test]
    fn brightness_change_does_not_move_scroll() {
        let mut overlay = open_overlay(600, 800);
        overlay.scroll(Point::new(120.0, 90.0)).unwrap();

        let update = overlay.commit_level(Level::Brightness, 30.0).unwrap();
        assert!(update.canvas_changed);
        assert_eq!(update.scroll, None);
        assert_eq!(update.viewbox, ViewboxUpdate::Unchanged);
        assert_eq!(overlay.scroll_offset(), Some(Point::new(120.0, 90.0)));
        assert_eq!(overlay.canvas().angle(), Some(0.0));
    }

    #[test]
    fn same_value_commit_is_noop() {
        let mut overlay = open_overlay(60, 80);
        let update = overlay.commit_level(Level::Contrast, 1.0).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn out_of_range_commit_leaves_state_unchanged() {
        let mut overlay = open_overlay(60, 80);
        overlay.commit_level(Level::Contrast, 2.0).unwrap();
        let before = overlay.canvas_raster().cloned();

        let result = overlay.commit_level(Level::Brightness, 151.0);
        assert!(matches!(result, Err(OverlayError::OutOfRangeLevel { .. })));
        assert_eq!(overlay.levels().brightness, 0.0);
        assert_eq!(overlay.levels().contrast, 2.0);
        assert_eq!(overlay.canvas_raster().cloned(), before);
    }

    #[test]
    fn rotation_keeps_focal_point_centered() {
        let mut overlay = open_overlay(600, 800);
        // canvas is 1000px; viewport 400x300
        overlay.scroll(Point::new(100.0, 200.0)).unwrap();
        let focal = Point::new(300.0, 350.0);

        let update = overlay.commit_level(Level::Rotation, 90.0).unwrap();
        let scroll = update.scroll.unwrap();
        let expected = rotate_focal_point(focal, Point::new(500.0, 500.0), 0.0, 90.0);
        assert!((scroll + Point::new(200.0, 150.0)).distance(&expected) < 1e-9);
        assert!(scroll.distance(&Point::new(450.0, 150.0)) < 1e-9);
        assert_eq!(overlay.scroll_offset(), Some(scroll));
        assert!(matches!(update.viewbox, ViewboxUpdate::Show(_)));
    }

    #[test]
    fn rotation_scroll_is_clamped_to_canvas() {
        let mut overlay = open_overlay(600, 800);
        // Top-left corner view; a quarter turn swings it off the left edge
        let update = overlay.commit_level(Level::Rotation, 270.0).unwrap();
        let scroll = update.scroll.unwrap();
        assert!(scroll.x >= 0.0 && scroll.y >= 0.0);
        assert!(scroll.x <= 600.0 && scroll.y <= 700.0);
    }

    #[test]
    fn reset_rotation_restores_base_raster() {
        let mut overlay = open_overlay(60, 80);
        let original = overlay.canvas().base().cloned();

        overlay.commit_level(Level::Rotation, 45.0).unwrap();
        assert_ne!(overlay.canvas().base().cloned(), original);

        let update = overlay.reset_level(Level::Rotation).unwrap();
        assert_eq!(update.level_change.unwrap().new_value, 0.0);
        assert_eq!(overlay.canvas().base().cloned(), original);
    }

    #[test]
    fn minimap_click_scrolls_and_moves_viewbox() {
        let mut overlay = open_overlay(600, 800);
        // canvas 1000, map 200 -> scale 0.2; click 100 map px right/down of origin
        let origin = Point::new(500.0, 30.0);
        let update = overlay
            .minimap_click(Point::new(600.0, 130.0), origin)
            .unwrap();

        assert_eq!(update.scroll, Some(Point::new(300.0, 350.0)));
        match update.viewbox {
            ViewboxUpdate::Show(viewbox) => {
                assert!((viewbox.x - 61.0).abs() < 1e-9);
                assert!((viewbox.y - 71.0).abs() < 1e-9);
            }
            other => panic!("expected a viewbox, got {:?}", other),
        }
    }

    #[test]
    fn resize_while_open_recomputes_viewbox() {
        let mut overlay = open_overlay(600, 800);
        let update = overlay.resize(ViewportSize::new(800.0, 500.0)).unwrap();
        match update.viewbox {
            ViewboxUpdate::Show(viewbox) => {
                assert!((viewbox.width - 158.0).abs() < 1e-9);
                assert!((viewbox.height - 98.0).abs() < 1e-9);
            }
            other => panic!("expected a viewbox, got {:?}", other),
        }
    }

    #[test]
    fn close_resets_everything() {
        let mut overlay = open_overlay(60, 80);
        overlay.commit_level(Level::Rotation, 90.0).unwrap();
        overlay.commit_level(Level::Contrast, 2.0).unwrap();

        let update = overlay.close().unwrap();
        assert_eq!(update.viewbox, ViewboxUpdate::Hidden);
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(overlay.levels().is_identity());
        assert!(overlay.canvas_raster().is_none());
        assert!(overlay.map_raster().is_none());
        assert!(overlay.viewbox().is_none());
        assert_eq!(overlay.canvas().backend().dimensions(), (0, 0));
    }

    #[test]
    fn reopening_replaces_image_and_resets_levels() {
        let mut overlay = open_overlay(60, 80);
        overlay.commit_level(Level::Brightness, 40.0).unwrap();

        overlay
            .open(Raster::filled(30, 40, [10, 10, 10, 255]))
            .unwrap();
        assert!(overlay.levels().is_identity());
        assert_eq!(overlay.canvas_raster().unwrap().dimensions(), (50, 50));
    }

    #[test]
    fn failed_rotation_keeps_previous_frame() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(400.0, 300.0),
            FlakySurface::default(),
            FlakySurface::default(),
        )
        .unwrap();
        overlay
            .open(Raster::filled(60, 80, [200, 150, 100, 255]))
            .unwrap();
        let shown = overlay.canvas_raster().cloned().unwrap();

        overlay.map.backend_mut().fail_draws = true;
        let result = overlay.commit_level(Level::Rotation, 90.0);

        assert!(matches!(result, Err(OverlayError::Surface(_))));
        assert_eq!(overlay.levels().rotation, 0.0);
        assert_eq!(overlay.canvas().angle(), Some(0.0));
        assert_eq!(overlay.canvas_raster(), Some(&shown));
        assert_eq!(overlay.canvas().backend().inner.raster(), &shown);
    }

    #[test]
    fn failed_reopen_keeps_previous_image() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(400.0, 300.0),
            FlakySurface::default(),
            FlakySurface::default(),
        )
        .unwrap();
        overlay
            .open(Raster::filled(60, 80, [200, 150, 100, 255]))
            .unwrap();
        overlay.commit_level(Level::Contrast, 2.0).unwrap();
        overlay.scroll(Point::new(5.0, 7.0)).unwrap();
        let shown = overlay.canvas_raster().cloned().unwrap();
        let map_shown = overlay.map_raster().cloned().unwrap();

        overlay.map.backend_mut().fail_draws = true;
        let result = overlay.open(Raster::filled(30, 40, [10, 10, 10, 255]));

        assert!(matches!(result, Err(OverlayError::Surface(_))));
        assert_eq!(overlay.state(), OverlayState::Open);
        assert_eq!(overlay.levels().contrast, 2.0);
        assert_eq!(overlay.scroll_offset(), Some(Point::new(5.0, 7.0)));
        assert_eq!(overlay.canvas().geometry().map(|g| g.size), Some(100));
        assert_eq!(overlay.canvas_raster(), Some(&shown));
        assert_eq!(overlay.canvas().backend().inner.raster(), &shown);
        assert_eq!(overlay.map().backend().inner.raster(), &map_shown);

        // The old image keeps working once the backend recovers
        overlay.map.backend_mut().fail_draws = false;
        overlay.commit_level(Level::Rotation, 90.0).unwrap();
        assert_eq!(overlay.canvas_raster().unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn failed_first_open_stays_closed() {
        let mut overlay = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(400.0, 300.0),
            FlakySurface::default(),
            FlakySurface {
                fail_draws: true,
                ..FlakySurface::default()
            },
        )
        .unwrap();

        let result = overlay.open(Raster::filled(60, 80, [200, 150, 100, 255]));
        assert!(matches!(result, Err(OverlayError::Surface(_))));
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(overlay.canvas_raster().is_none());
        assert_eq!(overlay.canvas().backend().dimensions(), (0, 0));
    }

    #[test]
    fn resize_rejects_unusable_viewport() {
        let mut overlay = open_overlay(600, 800);
        let before = overlay.viewbox();

        for (w, h) in [(f64::NAN, 300.0), (-10.0, 300.0), (400.0, f64::INFINITY)] {
            let result = overlay.resize(ViewportSize::new(w, h));
            assert!(matches!(result, Err(OverlayError::InvalidViewport { .. })));
        }
        assert_eq!(overlay.viewport(), ViewportSize::new(400.0, 300.0));
        assert_eq!(overlay.viewbox(), before);

        let result = overlay.dispatch(OverlayCommand::Resize {
            width: -1.0,
            height: 10.0,
        });
        assert!(matches!(result, Err(OverlayError::InvalidViewport { .. })));
    }

    #[test]
    fn new_rejects_unusable_viewport() {
        let result = Overlay::new(
            OverlayConfig::default(),
            ViewportSize::new(f64::NAN, 600.0),
            SoftwareSurface::default(),
            SoftwareSurface::default(),
        );
        assert!(matches!(result, Err(OverlayError::InvalidViewport { .. })));
    }

    #[test]
    fn dispatch_routes_commands() {
        let mut overlay = open_overlay(60, 80);
        overlay
            .dispatch(OverlayCommand::CommitLevel {
                level: Level::Contrast,
                value: 1.5,
            })
            .unwrap();
        assert_eq!(overlay.levels().contrast, 1.5);

        overlay
            .dispatch(OverlayCommand::ResetLevel {
                level: Level::Contrast,
            })
            .unwrap();
        assert_eq!(overlay.levels().contrast, 1.0);

        overlay
            .dispatch(OverlayCommand::Scroll { x: 3.0, y: 4.0 })
            .unwrap();
        assert_eq!(overlay.scroll_offset(), Some(Point::new(3.0, 4.0)));

        overlay.dispatch(OverlayCommand::Close).unwrap();
        assert!(!overlay.is_open());
    }
}
