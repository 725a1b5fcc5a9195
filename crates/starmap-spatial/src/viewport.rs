//! The pan/zoom transform between screen pixels and world coordinates.
//!
//! In the galaxy view the world is scaled so the stars (plus a display
//! buffer) fit the screen, then multiplied by the user's zoom; the offset is
//! measured from the screen's top-left. In the system view one world unit is
//! [`SYSTEM_UNIT_SCALE`] pixels at zoom 1 and the offset is measured from
//! the screen centre, where the system's star sits.

use starmap_core::config::ViewportConfig;
use starmap_types::{Star, ViewMode};
use tracing::debug;

use crate::error::SpatialError;
use crate::geometry::{Bounds, Point};

/// Pixels per world unit in the system view at zoom 1.
pub const SYSTEM_UNIT_SCALE: f64 = 10.0;

/// Largest zoom chosen when fitting a system.
const SYSTEM_FIT_MAX_ZOOM: f64 = 1.0;

/// Drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    width: f64,
    height: f64,
}

impl ScreenSize {
    /// A screen of `width` by `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DegenerateScreen`] unless both sides are
    /// finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, SpatialError> {
        let drawable = |v: f64| v.is_finite() && v > 0.0;
        if drawable(width) && drawable(height) {
            Ok(Self { width, height })
        } else {
            Err(SpatialError::DegenerateScreen { width, height })
        }
    }

    /// Width in pixels.
    pub const fn width(self) -> f64 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(self) -> f64 {
        self.height
    }

    /// The centre pixel.
    pub const fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// An in-progress pointer drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    start: Point,
    start_offset: Point,
    moved: bool,
}

impl Drag {
    /// Whether the pointer travelled past the click threshold.
    pub const fn moved(&self) -> bool {
        self.moved
    }
}

/// Pan offset and zoom for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    config: ViewportConfig,
    size: ScreenSize,
    mode: ViewMode,
    display: Option<Bounds>,
    base_scale: f64,
    zoom: f64,
    offset: Point,
    saved_galaxy_zoom: f64,
}

impl Viewport {
    /// A galaxy view at zoom 1 with nothing fitted yet.
    pub const fn new(size: ScreenSize, config: ViewportConfig) -> Self {
        Self {
            config,
            size,
            mode: ViewMode::Galaxy,
            display: None,
            base_scale: 1.0,
            zoom: 1.0,
            offset: Point::ZERO,
            saved_galaxy_zoom: 1.0,
        }
    }

    /// The tolerances and limits in use.
    pub const fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Which view is showing.
    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Screen size.
    pub const fn size(&self) -> ScreenSize {
        self.size
    }

    /// The user's zoom factor.
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pan offset in pixels.
    pub const fn offset(&self) -> Point {
        self.offset
    }

    /// Star bounds plus the display buffer, as last fitted.
    pub const fn display_bounds(&self) -> Option<Bounds> {
        self.display
    }

    /// Pixels per world unit.
    pub const fn scale(&self) -> f64 {
        match self.mode {
            ViewMode::Galaxy => self.base_scale * self.zoom,
            ViewMode::System => SYSTEM_UNIT_SCALE * self.zoom,
        }
    }

    /// Screen point the offset is measured from.
    const fn origin(&self) -> Point {
        match self.mode {
            ViewMode::Galaxy => Point::ZERO,
            ViewMode::System => self.size.center(),
        }
    }

    /// World point under screen point `screen`.
    pub const fn to_world(&self, screen: Point) -> Point {
        screen
            .minus(self.origin())
            .minus(self.offset)
            .scaled(1.0 / self.scale())
    }

    /// Screen point showing world point `world`.
    pub const fn to_screen(&self, world: Point) -> Point {
        world
            .scaled(self.scale())
            .plus(self.offset)
            .plus(self.origin())
    }

    /// Star/lane pick radius in world units at the current scale.
    pub const fn pick_tolerance(&self) -> f64 {
        self.config.pick_tolerance_px / self.scale()
    }

    /// Body pick radius in world units at the current scale.
    pub const fn body_tolerance(&self) -> f64 {
        self.config.body_tolerance_px / self.scale()
    }

    fn zoom_limits(&self) -> (f64, f64) {
        let min = match self.mode {
            ViewMode::Galaxy => self.config.galaxy_min_zoom,
            ViewMode::System => self.config.system_min_zoom,
        };
        (min, self.config.max_zoom.max(min))
    }

    /// Fit the galaxy view to `stars`. The offset is re-centred only when
    /// the star bounds changed, so polling the same galaxy keeps the pan.
    /// Returns whether anything moved.
    pub fn fit_galaxy(&mut self, stars: &[Star]) -> bool {
        let display = Bounds::of_stars(stars).map(|b| b.expanded(self.config.display_buffer));
        if display == self.display {
            return false;
        }
        self.display = display;
        self.recenter();
        true
    }

    /// Change the screen size and refit.
    pub fn resize(&mut self, size: ScreenSize) {
        self.size = size;
        self.recenter();
    }

    fn recenter(&mut self) {
        let Some(bounds) = self.display else {
            self.base_scale = 1.0;
            if self.mode == ViewMode::Galaxy {
                self.offset = Point::ZERO;
            }
            return;
        };
        let (bw, bh) = (bounds.width(), bounds.height());
        self.base_scale = if bw > 0.0 && bh > 0.0 {
            (self.size.width / bw).min(self.size.height / bh)
        } else {
            1.0
        };
        if self.mode != ViewMode::Galaxy {
            return;
        }
        let scaled = self.scale();
        self.offset = Point::new(
            (self.size.width - bw * scaled) / 2.0 - bounds.min_x * scaled,
            (self.size.height - bh * scaled) / 2.0 - bounds.min_y * scaled,
        );
        debug!(
            base_scale = self.base_scale,
            zoom = self.zoom,
            "galaxy view centred"
        );
    }

    /// Switch to the system view of `star`, remembering the galaxy zoom and
    /// zooming so the outermost orbit fits half the shorter screen side.
    pub fn enter_system(&mut self, star: &Star) {
        if self.mode == ViewMode::Galaxy {
            self.saved_galaxy_zoom = self.zoom;
        }
        self.mode = ViewMode::System;
        self.offset = Point::ZERO;

        let farthest = star
            .bodies
            .iter()
            .map(|b| b.distance_au)
            .fold(0.0_f64, f64::max);
        let farthest = if farthest > 0.0 { farthest } else { 1.0 };
        let half_side = self.size.width.min(self.size.height) / 2.0;
        self.zoom = (half_side / (farthest * SYSTEM_UNIT_SCALE))
            .min(SYSTEM_FIT_MAX_ZOOM)
            .max(self.config.system_min_zoom);
        debug!(star = %star.name, zoom = self.zoom, "entered system view");
    }

    /// Return to the galaxy view at the zoom it was left with.
    pub fn exit_system(&mut self) {
        if self.mode == ViewMode::Galaxy {
            return;
        }
        self.mode = ViewMode::Galaxy;
        self.zoom = self.saved_galaxy_zoom;
        self.recenter();
    }

    /// Apply a wheel step of `delta_y` at `screen`, keeping the world point
    /// under the pointer fixed. Returns whether the zoom changed.
    pub fn zoom_at(&mut self, screen: Point, delta_y: f64) -> bool {
        let (min, max) = self.zoom_limits();
        let next = (self.zoom * (1.0 - delta_y * self.config.wheel_sensitivity))
            .min(max)
            .max(min);
        if !next.is_finite() || (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let ratio = next / self.zoom;
        let focus = screen.minus(self.origin());
        self.offset = focus.minus(focus.minus(self.offset).scaled(ratio));
        self.zoom = next;
        true
    }

    /// Start a drag at `screen`.
    pub const fn begin_drag(&self, screen: Point) -> Drag {
        Drag {
            start: screen,
            start_offset: self.offset,
            moved: false,
        }
    }

    /// Pan along with the pointer. Once travel (`|dx| + |dy|`) exceeds the
    /// threshold the drag no longer counts as a click.
    pub fn drag_to(&mut self, drag: &mut Drag, screen: Point) {
        let delta = screen.minus(drag.start);
        if delta.x.abs() + delta.y.abs() > self.config.drag_threshold_px {
            drag.moved = true;
        }
        self.offset = drag.start_offset.plus(delta);
    }
}
