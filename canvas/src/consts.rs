//! Shared numeric constants for the canvas crate.

// ── Stroke width ────────────────────────────────────────────────

/// Width of a stroke at zero pressure, in board units. Taps stay visible.
pub const MIN_WIDTH: f64 = 1.0;

/// Pressure substituted for a reported `0.0` while a button is held
/// (mice and pens without pressure support).
pub const FALLBACK_PRESSURE: f64 = 0.05;

// ── Zoom ────────────────────────────────────────────────────────

/// Scale multiplier per wheel notch when zooming in.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Scale multiplier per wheel notch when zooming out.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Bounds for the zoom percentage typed into the zoom field.
pub const ZOOM_PERCENT_MIN: f64 = 10.0;
pub const ZOOM_PERCENT_MAX: f64 = 1000.0;

/// Backing-store multiplier applied at or below 100% zoom.
pub const SUPERSAMPLE: f64 = 2.0;

// ── Surfaces ────────────────────────────────────────────────────

/// Base surface background, painted before any stroke.
pub const BACKGROUND: &str = "#ffffff";

// ── Saving ──────────────────────────────────────────────────────

/// Auto-save period the host timer should tick at, in milliseconds.
pub const AUTOSAVE_INTERVAL_MS: u32 = 30_000;
