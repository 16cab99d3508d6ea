//! Drawing client core for the collaborative infinite canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! client side of a board: turning pointer samples into pressure-sensitive
//! strokes, maintaining camera state for pan/zoom, the local undo/redo
//! history, and painting onto two stacked surfaces (committed strokes below,
//! in-progress strokes above). The host JavaScript layer wires DOM events and
//! the WebSocket to [`engine::Engine`] and carries out the
//! [`engine::Action`]s it returns (sending frames, saving over REST).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`camera`] | Pan/zoom camera, coordinate conversions, backing resolution |
//! | [`input`] | Tools, brush settings, pointer samples, gesture state |
//! | [`history`] | Undo/redo over the committed stroke list |
//! | [`render`] | Stroke painting behind the [`render::Painter`] trait |
//! | [`consts`] | Shared numeric constants (zoom steps, widths, intervals) |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod history;
pub mod input;
pub mod render;
