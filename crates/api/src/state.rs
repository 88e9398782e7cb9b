use spotbridge_core::Exchange;
use std::sync::Arc;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    /// Read-only after startup; no locking needed.
    pub exchange: Arc<dyn Exchange>,
}

impl AppState {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }
}
