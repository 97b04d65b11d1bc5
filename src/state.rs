//! Application state management
//!
//! Contains shared state accessible across all handlers. All storage is
//! backed by PostgreSQL; the gateway owns the pool handle and acquires a
//! client per operation.

use crate::gateway::RecordGateway;
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Record store gateway for the cinema tables
    pub records: RecordGateway,
}

impl AppState {
    /// Create new application state from an established pool
    pub fn new(pool: Pool) -> Self {
        Self {
            records: RecordGateway::new(pool),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
