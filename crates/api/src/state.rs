//! Shared application state for the Axum API server.

use cripto_common::config::QueryDefaults;
use cripto_engine::store::QueryStore;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: QueryStore,
    pub defaults: QueryDefaults,
}

impl AppState {
    pub fn new(store: QueryStore, defaults: QueryDefaults) -> Self {
        Self { store, defaults }
    }
}
