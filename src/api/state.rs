use std::sync::Arc;

use crate::{config::Config, db::Store, services::MetadataProvider};

/// Shared application state
///
/// Everything here is immutable after startup; mutable data lives in the store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub metadata: Arc<dyn MetadataProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            metadata,
        }
    }

    /// Lifetime given to newly created login sessions
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.session_ttl_hours)
    }
}
