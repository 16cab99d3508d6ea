//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own board logic so route handlers can stay focused on
//! protocol translation.

pub mod board;
