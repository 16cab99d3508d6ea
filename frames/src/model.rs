//! Board data model shared by the server, the canvas engine, and the CLI.
//!
//! All coordinates here are in board space (logical units). Conversion from
//! screen pixels happens once, at input time, through [`Viewport::to_board`],
//! so stored strokes can be repainted identically at any zoom level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest allowed viewport scale (10%).
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed viewport scale (1000%).
pub const MAX_SCALE: f64 = 10.0;

/// Validation failure for a stroke or color.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("stroke has no points")]
    EmptyStroke,
    #[error("point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
    #[error("point {index} pressure {pressure} outside [0, 1]")]
    PressureOutOfRange { index: usize, pressure: f64 },
    #[error("stroke width {0} must be finite and positive")]
    InvalidWidth(f64),
    #[error("stroke opacity {0} outside [0, 1]")]
    InvalidOpacity(f64),
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

// =============================================================================
// POINT
// =============================================================================

/// One recorded pointer sample in board space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Normalized pen pressure in `[0, 1]`.
    pub pressure: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }
}

// =============================================================================
// TOOL / COLOR
// =============================================================================

/// Drawing tool a stroke was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    #[serde(alias = "brush")]
    Pen,
    Eraser,
}

/// An opaque RGB color. Serialized as a CSS hex string (`"#1e90ff"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ModelError;

    /// Parse `#rrggbb` or the `#rgb` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        // `from_str_radix` alone would accept a leading `+`.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let expand = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

// =============================================================================
// STROKE
// =============================================================================

/// One continuous pointer-down-to-up freehand path.
///
/// Points are append-only while the stroke is live. Width and curve geometry
/// are never baked in; the renderer derives them from `base_width` and the
/// per-point pressure on every paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: Tool,
    pub color: Color,
    /// Width at full pressure, in board units. The wire name is `size`.
    #[serde(rename = "size")]
    pub base_width: f64,
    pub opacity: f64,
    pub points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke at its first sample.
    #[must_use]
    pub fn begin(tool: Tool, color: Color, base_width: f64, opacity: f64, first: Point) -> Self {
        Self { tool, color, base_width, opacity, points: vec![first] }
    }

    /// Append a sample. Earlier samples are never touched.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Close the stroke for commit. A stroke without points is discarded.
    #[must_use]
    pub fn finalize(self) -> Option<Self> {
        if self.points.is_empty() { None } else { Some(self) }
    }

    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.tool == Tool::Eraser
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Check the invariants a stored or relayed stroke must hold.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] found.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.points.is_empty() {
            return Err(ModelError::EmptyStroke);
        }
        if !self.base_width.is_finite() || self.base_width <= 0.0 {
            return Err(ModelError::InvalidWidth(self.base_width));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ModelError::InvalidOpacity(self.opacity));
        }
        for (index, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(ModelError::NonFinitePoint { index });
            }
            if !(0.0..=1.0).contains(&p.pressure) {
                return Err(ModelError::PressureOutOfRange { index, pressure: p.pressure });
            }
        }
        Ok(())
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// Pan + scale mapping between screen pixels and board space.
///
/// `pan_x` / `pan_y` are in CSS pixels. Wire names are `x` / `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(rename = "x")]
    pub pan_x: f64,
    #[serde(rename = "y")]
    pub pan_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    /// Screen position (CSS pixels) to board coordinates.
    #[must_use]
    pub fn to_board(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.pan_x) / self.scale, (sy - self.pan_y) / self.scale)
    }

    /// Board coordinates to screen position (CSS pixels).
    #[must_use]
    pub fn to_screen(&self, bx: f64, by: f64) -> (f64, f64) {
        (bx * self.scale + self.pan_x, by * self.scale + self.pan_y)
    }

    /// Pan by a screen-space delta. Unaffected by scale.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Zoom to `new_scale` keeping the screen point `(ax, ay)` fixed.
    ///
    /// Out-of-range scales are clamped to [`MIN_SCALE`, `MAX_SCALE`].
    pub fn zoom_at(&mut self, new_scale: f64, ax: f64, ay: f64) {
        let new_scale = clamp_scale(new_scale);
        let ratio = new_scale / self.scale;
        self.pan_x += (1.0 - ratio) * (ax - self.pan_x);
        self.pan_y += (1.0 - ratio) * (ay - self.pan_y);
        self.scale = new_scale;
    }

    /// Copy with the scale clamped and non-finite pans reset to zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            pan_x: finite_or_zero(self.pan_x),
            pan_y: finite_or_zero(self.pan_y),
            scale: clamp_scale(self.scale),
        }
    }
}

/// Clamp a requested scale into the valid range. NaN falls back to 1.0.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() { 1.0 } else { scale.clamp(MIN_SCALE, MAX_SCALE) }
}

// =============================================================================
// BOARD
// =============================================================================

/// The complete persisted state of one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub viewport: Viewport,
    /// Milliseconds since the Unix epoch of the last save.
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
}

impl Board {
    /// An empty board with the identity viewport.
    #[must_use]
    pub fn empty(id: impl Into<String>, last_modified: i64) -> Self {
        Self { id: id.into(), strokes: Vec::new(), viewport: Viewport::default(), last_modified }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;
