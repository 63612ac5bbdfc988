//! Application state for shared services

use std::sync::Arc;

use crate::domain::KeyValueStore;
use crate::infrastructure::services::SearchServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub search_service: Arc<dyn SearchServiceTrait>,
    /// Shared store, probed by the readiness check
    pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
    pub fn new(search_service: Arc<dyn SearchServiceTrait>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            search_service,
            store,
        }
    }
}
