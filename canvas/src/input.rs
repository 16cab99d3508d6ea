//! Input model: tools, brush settings, pointer samples, and the gesture state.
//!
//! `Tool` and `Brush` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up; while drawing it owns the live [`Stroke`], which is never
//! reachable from the committed list until pointer-up, so a remote snapshot
//! arriving mid-gesture cannot disturb it.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{Color, Stroke, Tool as StrokeTool};

use crate::camera::Point;
use crate::consts::FALLBACK_PRESSURE;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Freehand pen (default).
    #[default]
    Pen,
    /// Freehand eraser; removes pixels painted before it.
    Eraser,
    /// Drag to pan the viewport.
    Pan,
}

impl Tool {
    /// The stroke tool this input tool draws with, if it draws at all.
    #[must_use]
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            Self::Pen => Some(StrokeTool::Pen),
            Self::Eraser => Some(StrokeTool::Eraser),
            Self::Pan => None,
        }
    }
}

/// Brush parameters applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
    /// Width at full pressure, in board units.
    pub size: f64,
    pub opacity: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { color: Color::BLACK, size: 5.0, opacity: 1.0 }
    }
}

/// One raw pointer event as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position relative to the canvas origin, in CSS pixels.
    pub screen: Point,
    /// Hardware pressure in `[0, 1]`; `0.0` when the device reports none.
    pub pressure: f64,
    /// Whether any pointer button is held.
    pub buttons_down: bool,
}

impl PointerSample {
    #[must_use]
    pub fn new(x: f64, y: f64, pressure: f64, buttons_down: bool) -> Self {
        Self { screen: Point::new(x, y), pressure, buttons_down }
    }

    /// Pressure used for stroke width.
    ///
    /// A held button with zero reported pressure maps to a small fallback so
    /// the stroke stays visible.
    #[must_use]
    pub fn effective_pressure(&self) -> f64 {
        let raw = if self.pressure.is_finite() { self.pressure.clamp(0.0, 1.0) } else { 0.0 };
        if raw == 0.0 && self.buttons_down { FALLBACK_PRESSURE } else { raw }
    }
}

/// The gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Authoring a stroke.
    Drawing {
        /// The live stroke, full point list so far.
        stroke: Stroke,
    },
}

impl InputState {
    /// The stroke being authored, if any.
    #[must_use]
    pub fn live_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Drawing { stroke } => Some(stroke),
            _ => None,
        }
    }
}
