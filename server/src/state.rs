//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the board store, the live connection registry, and the loaded
//! configuration. There are no globals; tests build their own state.

use std::sync::Arc;

use crate::config::Config;
use crate::registry::ConnectionRegistry;
use crate::store::{BoardStore, MemoryBoardStore};

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BoardStore>,
    pub registry: ConnectionRegistry,
    pub config: Config,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn BoardStore>, config: Config) -> Self {
        Self { store, registry: ConnectionRegistry::new(), config }
    }

    /// State backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(config: Config) -> Self {
        Self::new(Arc::new(MemoryBoardStore::new()), config)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
