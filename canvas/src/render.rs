//! Rendering: paints strokes onto the base and preview surfaces.
//!
//! All drawing goes through the [`Painter`] trait, the subset of a 2D canvas
//! context this pipeline needs. The browser backend is the impl for
//! [`web_sys::CanvasRenderingContext2d`] at the bottom of this module, which
//! is the only place that touches the DOM API. Functions here receive
//! read-only views of strokes and camera state and produce pixels; they do not
//! mutate application state.
//!
//! Geometry is issued in board space: each paint resets the backing-scale
//! transform, then translates by the pan and scales by the zoom, so stroke
//! coordinates are never multiplied by the scale by hand.
//!
//! All fallible calls propagate errors via `Result<(), P::Error>`; the
//! top-level caller ([`crate::engine::Engine`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use frames::{Point, Stroke, Tool};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::consts::{BACKGROUND, MIN_WIDTH};

/// Compositing mode for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Standard over-compositing.
    SourceOver,
    /// Coverage removes whatever was painted earlier, background included.
    DestinationOut,
}

impl Composite {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }

    #[must_use]
    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::Pen => Self::SourceOver,
            Tool::Eraser => Self::DestinationOut,
        }
    }
}

/// Drawing surface abstraction shaped after the 2D canvas API.
pub trait Painter {
    type Error;

    fn save(&self);
    fn restore(&self);
    /// Replace the current transform with a uniform `scale`.
    fn reset_transform(&self, scale: f64) -> Result<(), Self::Error>;
    fn translate(&self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn scale(&self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn set_global_alpha(&self, alpha: f64);
    fn set_composite(&self, composite: Composite) -> Result<(), Self::Error>;
    fn set_fill_color(&self, color: &str);
    fn set_stroke_color(&self, color: &str);
    fn set_line_width(&self, width: f64);
    /// Round caps and round joins.
    fn set_round_line(&self);
    fn begin_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn quadratic_curve_to(&self, cpx: f64, cpy: f64, x: f64, y: f64);
    fn arc(&self, x: f64, y: f64, radius: f64) -> Result<(), Self::Error>;
    fn fill(&self);
    fn stroke(&self);
}

// =============================================================
// Width
// =============================================================

/// Pressure-to-width mapping: `lerp(MIN_WIDTH, max(MIN_WIDTH, base_width), pressure)`.
#[must_use]
pub fn stroke_width(base_width: f64, pressure: f64) -> f64 {
    let max_width = base_width.max(MIN_WIDTH);
    MIN_WIDTH + (max_width - MIN_WIDTH) * pressure
}

fn segment_width(base_width: f64, a: Point, b: Point) -> f64 {
    stroke_width(base_width, (a.pressure + b.pressure) / 2.0)
}

fn midpoint(a: Point, b: Point) -> (f64, f64) {
    ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

// =============================================================
// Surfaces
// =============================================================

/// Repaint the base surface: clear, background, then every committed stroke
/// in commit order so later strokes (erasers included) land on top.
///
/// # Errors
///
/// Returns `Err` if any painter call fails.
pub fn paint_base<'a, P: Painter>(
    painter: &P,
    strokes: impl IntoIterator<Item = &'a Stroke>,
    camera: &Camera,
) -> Result<(), P::Error> {
    painter.reset_transform(camera.backing_scale())?;
    painter.clear_rect(0.0, 0.0, camera.width_css, camera.height_css);
    painter.set_fill_color(BACKGROUND);
    painter.fill_rect(0.0, 0.0, camera.width_css, camera.height_css);

    painter.save();
    apply_view(painter, camera)?;
    for stroke in strokes {
        paint_stroke(painter, stroke)?;
    }
    painter.restore();
    Ok(())
}

/// Repaint the preview surface with the given in-progress strokes.
///
/// # Errors
///
/// Returns `Err` if any painter call fails.
pub fn paint_preview<'a, P: Painter>(
    painter: &P,
    strokes: impl IntoIterator<Item = &'a Stroke>,
    camera: &Camera,
) -> Result<(), P::Error> {
    painter.reset_transform(camera.backing_scale())?;
    painter.clear_rect(0.0, 0.0, camera.width_css, camera.height_css);

    painter.save();
    apply_view(painter, camera)?;
    for stroke in strokes {
        paint_stroke(painter, stroke)?;
    }
    painter.restore();
    Ok(())
}

/// Paint only the newest part of a live stroke: the first sample's disc, or
/// a straight segment from the previous sample to the newest one.
///
/// Used for the local eraser, which draws straight onto the base surface so
/// erasure is visible while dragging.
///
/// # Errors
///
/// Returns `Err` if any painter call fails.
pub fn paint_live_segment<P: Painter>(painter: &P, stroke: &Stroke, camera: &Camera) -> Result<(), P::Error> {
    let n = stroke.points.len();
    if n == 0 {
        return Ok(());
    }

    painter.reset_transform(camera.backing_scale())?;
    painter.save();
    apply_view(painter, camera)?;
    begin_stroke_style(painter, stroke)?;
    if n == 1 {
        paint_disc(painter, stroke.base_width, stroke.points[0])?;
    } else {
        let (from, to) = (stroke.points[n - 2], stroke.points[n - 1]);
        painter.set_line_width(segment_width(stroke.base_width, from, to));
        painter.begin_path();
        painter.move_to(from.x, from.y);
        painter.line_to(to.x, to.y);
        painter.stroke();
    }
    painter.restore();
    Ok(())
}

// =============================================================
// Stroke
// =============================================================

/// Paint one stroke in board space.
///
/// A single sample becomes a filled disc. Otherwise each consecutive pair is
/// a round-capped segment whose width follows the pair's mean pressure; all
/// but the last segment curve through the sample toward the midpoint of the
/// next pair, which hides the faceting of raw samples without resampling.
///
/// # Errors
///
/// Returns `Err` if any painter call fails.
pub fn paint_stroke<P: Painter>(painter: &P, stroke: &Stroke) -> Result<(), P::Error> {
    let points = &stroke.points;
    let Some(&first) = points.first() else {
        return Ok(());
    };

    painter.save();
    begin_stroke_style(painter, stroke)?;

    if points.len() == 1 {
        paint_disc(painter, stroke.base_width, first)?;
    } else {
        let last = points.len() - 1;
        for i in 1..=last {
            let (prev, cur) = (points[i - 1], points[i]);
            painter.set_line_width(segment_width(stroke.base_width, prev, cur));
            painter.begin_path();
            painter.move_to(prev.x, prev.y);
            if i < last {
                let (mx, my) = midpoint(cur, points[i + 1]);
                painter.quadratic_curve_to(cur.x, cur.y, mx, my);
            } else {
                painter.line_to(cur.x, cur.y);
            }
            painter.stroke();
        }
    }

    painter.restore();
    Ok(())
}

fn begin_stroke_style<P: Painter>(painter: &P, stroke: &Stroke) -> Result<(), P::Error> {
    painter.set_global_alpha(stroke.opacity);
    painter.set_composite(Composite::for_tool(stroke.tool))?;
    let color = stroke.color.to_string();
    painter.set_fill_color(&color);
    painter.set_stroke_color(&color);
    painter.set_round_line();
    Ok(())
}

fn paint_disc<P: Painter>(painter: &P, base_width: f64, p: Point) -> Result<(), P::Error> {
    painter.begin_path();
    painter.arc(p.x, p.y, stroke_width(base_width, p.pressure) / 2.0)?;
    painter.fill();
    Ok(())
}

fn apply_view<P: Painter>(painter: &P, camera: &Camera) -> Result<(), P::Error> {
    let v = camera.viewport;
    painter.translate(v.pan_x, v.pan_y)?;
    painter.scale(v.scale, v.scale)
}

// =============================================================
// Browser backend
// =============================================================

impl Painter for CanvasRenderingContext2d {
    type Error = JsValue;

    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn reset_transform(&self, scale: f64) -> Result<(), JsValue> {
        self.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)
    }

    fn translate(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::translate(self, x, y)
    }

    fn scale(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::scale(self, x, y)
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn set_global_alpha(&self, alpha: f64) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha);
    }

    fn set_composite(&self, composite: Composite) -> Result<(), JsValue> {
        self.set_global_composite_operation(composite.as_str())
    }

    fn set_fill_color(&self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_color(&self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_round_line(&self) {
        self.set_line_cap("round");
        self.set_line_join("round");
    }

    fn begin_path(&self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn quadratic_curve_to(&self, cpx: f64, cpy: f64, x: f64, y: f64) {
        CanvasRenderingContext2d::quadratic_curve_to(self, cpx, cpy, x, y);
    }

    fn arc(&self, x: f64, y: f64, radius: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::arc(self, x, y, radius, 0.0, TAU)
    }

    fn fill(&self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&self) {
        CanvasRenderingContext2d::stroke(self);
    }
}
