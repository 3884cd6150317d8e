//! Application state for the web layer.

use std::sync::Arc;

use crate::lookup::AqiLookup;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Station lookup and scrape pipeline
    pub lookup: Arc<AqiLookup>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(lookup: AqiLookup) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}
