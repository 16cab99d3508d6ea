//! Live connections partitioned by board.
//!
//! DESIGN
//! ======
//! A `DashMap` keyed by board id; each entry maps a connection id to that
//! connection's bounded outbound queue. Unrelated boards hash to different
//! shards, so joins and broadcasts on one board never wait on another.
//!
//! Broadcast is `try_send` only and never awaits a peer:
//! - a closed queue means the connection is gone, so it is evicted;
//! - a full queue drops that one frame for that connection.
//!
//! Delivery is best-effort and at-most-once per frame.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use frames::ServerFrame;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};
use uuid::Uuid;

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

type Connections = HashMap<Uuid, mpsc::Sender<ServerFrame>>;

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    boards: Arc<DashMap<String, Connections>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection on a board. Returns the board's connection count.
    pub fn join(&self, board_id: &str, conn_id: Uuid, tx: mpsc::Sender<ServerFrame>) -> usize {
        let mut conns = self.boards.entry(board_id.to_owned()).or_default();
        conns.insert(conn_id, tx);
        conns.len()
    }

    /// Remove a connection. The board entry goes away with its last connection.
    pub fn part(&self, board_id: &str, conn_id: Uuid) {
        let remaining = match self.boards.get_mut(board_id) {
            Some(mut conns) => {
                conns.remove(&conn_id);
                conns.len()
            }
            None => return,
        };
        if remaining == 0 {
            self.boards.remove_if(board_id, |_, conns| conns.is_empty());
        }
    }

    /// Queue `frame` for every connection on the board except `exclude`.
    /// Returns how many connections accepted it.
    pub fn broadcast(&self, board_id: &str, frame: &ServerFrame, exclude: Option<Uuid>) -> usize {
        let mut delivered = 0;
        let remaining = {
            let Some(mut conns) = self.boards.get_mut(board_id) else {
                return 0;
            };
            conns.retain(|conn_id, tx| {
                if exclude == Some(*conn_id) {
                    return true;
                }
                match tx.try_send(frame.clone()) {
                    Ok(()) => {
                        delivered += 1;
                        true
                    }
                    Err(TrySendError::Full(_)) => {
                        warn!(%board_id, %conn_id, "outbound queue full; frame dropped");
                        true
                    }
                    Err(TrySendError::Closed(_)) => {
                        info!(%board_id, %conn_id, "evicting closed connection");
                        false
                    }
                }
            });
            conns.len()
        };
        if remaining == 0 {
            self.boards.remove_if(board_id, |_, conns| conns.is_empty());
        }
        delivered
    }

    /// Number of live connections on a board.
    #[must_use]
    pub fn peer_count(&self, board_id: &str) -> usize {
        self.boards.get(board_id).map_or(0, |conns| conns.len())
    }

    /// Number of boards with at least one connection.
    #[must_use]
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }
}
