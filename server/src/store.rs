//! Board persistence behind a get/put interface.
//!
//! DESIGN
//! ======
//! The relay only ever needs two operations on stored boards: fetch the whole
//! snapshot, and overwrite it on save. `BoardStore` is that seam; handlers
//! hold it as `Arc<dyn BoardStore>` so a durable backend can replace
//! `MemoryBoardStore` without touching routes.
//!
//! Boards are created lazily: fetching an unknown id yields (and records) an
//! empty board with the identity viewport.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use frames::{Board, Stroke, Viewport};
use tokio::sync::RwLock;

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("board store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait BoardStore: Send + Sync {
    /// Fetch a board, creating an empty one if it does not exist yet.
    async fn get(&self, board_id: &str) -> Result<Board, StoreError>;

    /// Overwrite the fields that are present and stamp `last_modified`.
    /// Returns the board as stored.
    async fn put(
        &self,
        board_id: &str,
        strokes: Option<Vec<Stroke>>,
        viewport: Option<Viewport>,
    ) -> Result<Board, StoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryBoardStore {
    boards: RwLock<HashMap<String, Board>>,
}

impl MemoryBoardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BoardStore for MemoryBoardStore {
    async fn get(&self, board_id: &str) -> Result<Board, StoreError> {
        if let Some(board) = self.boards.read().await.get(board_id) {
            return Ok(board.clone());
        }
        let mut boards = self.boards.write().await;
        let board = boards
            .entry(board_id.to_owned())
            .or_insert_with(|| Board::empty(board_id, now_millis()));
        Ok(board.clone())
    }

    async fn put(
        &self,
        board_id: &str,
        strokes: Option<Vec<Stroke>>,
        viewport: Option<Viewport>,
    ) -> Result<Board, StoreError> {
        let mut boards = self.boards.write().await;
        let board = boards
            .entry(board_id.to_owned())
            .or_insert_with(|| Board::empty(board_id, 0));
        if let Some(strokes) = strokes {
            board.strokes = strokes;
        }
        if let Some(viewport) = viewport {
            board.viewport = viewport.normalized();
        }
        board.last_modified = next_modified(board.last_modified, now_millis());
        Ok(board.clone())
    }
}

/// Wall-clock timestamps can repeat or step backwards; saves must still be
/// strictly ordered per board.
fn next_modified(previous: i64, now: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
