#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use frames::model::clamp_scale;
use frames::{Point as BoardPoint, Viewport};

use crate::consts::{SUPERSAMPLE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_PERCENT_MAX, ZOOM_PERCENT_MIN};

/// A point in screen space (CSS pixels, relative to the canvas origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Backing-store resolution for both surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Device pixels per CSS pixel, including supersampling.
    pub backing_scale: f64,
    pub width_px: u32,
    pub height_px: u32,
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// Wraps the board [`Viewport`] together with the canvas element size and
/// device pixel ratio, which together decide the backing resolution.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub viewport: Viewport,
    pub width_css: f64,
    pub height_css: f64,
    pub dpr: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { viewport: Viewport::default(), width_css: 0.0, height_css: 0.0, dpr: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space sample into a board point carrying `pressure`.
    #[must_use]
    pub fn screen_to_board(&self, screen: Point, pressure: f64) -> BoardPoint {
        let (x, y) = self.viewport.to_board(screen.x, screen.y);
        BoardPoint::new(x, y, pressure)
    }

    /// Convert a board position to screen space (CSS pixels).
    #[must_use]
    pub fn board_to_screen(&self, x: f64, y: f64) -> Point {
        let (sx, sy) = self.viewport.to_screen(x, y);
        Point::new(sx, sy)
    }

    /// Center of the canvas element in screen space.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width_css / 2.0, self.height_css / 2.0)
    }

    /// Pan by a raw screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    /// Zoom to `scale` around `anchor`, or around the canvas center if `None`.
    pub fn zoom_at(&mut self, scale: f64, anchor: Option<Point>) {
        let anchor = anchor.unwrap_or_else(|| self.center());
        self.viewport.zoom_at(scale, anchor.x, anchor.y);
    }

    /// Zoom one wheel notch around the pointer. Positive `delta_y` zooms out.
    pub fn wheel_zoom(&mut self, delta_y: f64, anchor: Point) {
        let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        self.zoom_at(clamp_scale(self.viewport.scale * factor), Some(anchor));
    }

    /// Zoom to a percentage typed by the user (clamped to 10%..1000%),
    /// centered on the canvas.
    pub fn zoom_to_percent(&mut self, percent: f64) {
        if percent.is_nan() {
            return;
        }
        let percent = percent.clamp(ZOOM_PERCENT_MIN, ZOOM_PERCENT_MAX);
        self.zoom_at(percent / 100.0, None);
    }

    /// Current zoom as a rounded percentage, for the zoom indicator.
    #[must_use]
    pub fn zoom_percent(&self) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let percent = (self.viewport.scale * 100.0).round() as i64;
        percent
    }

    /// Device pixels per CSS pixel. Supersampled at or below 100% zoom so
    /// strokes stay sharp once the user zooms back in.
    #[must_use]
    pub fn backing_scale(&self) -> f64 {
        let supersample = if self.viewport.scale <= 1.0 { SUPERSAMPLE } else { 1.0 };
        self.dpr * supersample
    }

    /// Backing-store size of both surfaces.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        let backing_scale = self.backing_scale();
        Resolution {
            backing_scale,
            width_px: to_px(self.width_css * backing_scale),
            height_px: to_px(self.height_css * backing_scale),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_px(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 { v.floor().min(f64::from(u32::MAX)) as u32 } else { 0 }
}
