//! Shared board model and JSON wire protocol for the realtime channel.
//!
//! This crate owns the representation used by `server`, `canvas`, and `cli`.
//! Messages are a closed set of tagged variants, decoded exhaustively at the
//! channel boundary: an unknown `type`, a missing field, or a stroke that
//! breaks the model invariants is rejected here rather than downstream.
//!
//! | Direction | `type` | Payload |
//! |-----------|--------|---------|
//! | server → client | `init` | `board` |
//! | server → client | `board-updated` | `board` |
//! | both | `stroke-preview` | `userId`, `stroke` |
//! | both | `cursor` | `userId`, `x`, `y` |

pub mod model;

use serde::{Deserialize, Serialize};

pub use model::{Board, Color, MAX_SCALE, MIN_SCALE, ModelError, Point, Stroke, Tool, Viewport};

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not valid JSON, or does not match any known message shape.
    #[error("failed to decode frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The message parsed but carries a stroke that breaks the model invariants.
    #[error("invalid stroke: {0}")]
    Invalid(#[from] ModelError),
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Messages a client may send on the realtime channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// The sender's in-progress stroke, full point list so far.
    StrokePreview {
        #[serde(rename = "userId")]
        user_id: String,
        stroke: Stroke,
    },
    /// Best-effort pointer presence, in board space.
    Cursor {
        #[serde(rename = "userId")]
        user_id: String,
        x: f64,
        y: f64,
    },
}

/// Messages the server sends on the realtime channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// Authoritative snapshot, sent once immediately after connect.
    Init { board: Board },
    /// Authoritative snapshot after a save. Receivers replace their strokes wholesale.
    BoardUpdated { board: Board },
    /// Relayed in-progress stroke from another session.
    StrokePreview {
        #[serde(rename = "userId")]
        user_id: String,
        stroke: Stroke,
    },
    /// Relayed pointer presence from another session.
    Cursor {
        #[serde(rename = "userId")]
        user_id: String,
        x: f64,
        y: f64,
    },
}

impl From<ClientFrame> for ServerFrame {
    fn from(frame: ClientFrame) -> Self {
        match frame {
            ClientFrame::StrokePreview { user_id, stroke } => Self::StrokePreview { user_id, stroke },
            ClientFrame::Cursor { user_id, x, y } => Self::Cursor { user_id, x, y },
        }
    }
}

// =============================================================================
// REST PAYLOADS
// =============================================================================

/// Body of `POST /api/board/{id}/save`. Absent fields keep the stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

impl SaveRequest {
    /// Check every carried stroke.
    ///
    /// # Errors
    ///
    /// Returns the first stroke's [`ModelError`].
    pub fn validate(&self) -> Result<(), ModelError> {
        self.strokes.iter().flatten().try_for_each(Stroke::validate)
    }
}

/// Response of `POST /api/board/{id}/save`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails (non-string map keys
/// cannot occur in these types, so this is not expected in practice).
pub fn encode<T: Serialize>(frame: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode and validate a client message.
///
/// # Errors
///
/// Returns [`CodecError`] for malformed JSON, unknown variants, or invalid strokes.
pub fn decode_client_frame(text: &str) -> Result<ClientFrame, CodecError> {
    let frame: ClientFrame = serde_json::from_str(text)?;
    if let ClientFrame::StrokePreview { stroke, .. } = &frame {
        stroke.validate()?;
    }
    Ok(frame)
}

/// Decode and validate a server message.
///
/// Snapshot viewports are normalized so a bad scale can never reach a divide.
///
/// # Errors
///
/// Returns [`CodecError`] for malformed JSON, unknown variants, or invalid strokes.
pub fn decode_server_frame(text: &str) -> Result<ServerFrame, CodecError> {
    let mut frame: ServerFrame = serde_json::from_str(text)?;
    match &mut frame {
        ServerFrame::Init { board } | ServerFrame::BoardUpdated { board } => {
            board.strokes.iter().try_for_each(Stroke::validate)?;
            board.viewport = board.viewport.normalized();
        }
        ServerFrame::StrokePreview { stroke, .. } => stroke.validate()?,
        ServerFrame::Cursor { .. } => {}
    }
    Ok(frame)
}
