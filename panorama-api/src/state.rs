//! Shared application state for Axum routers.

use std::sync::Arc;

use panorama_storage::{CacheConfig, MemoryStore, SessionListCache};

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::uploads::UploadStore;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The entity store. All reads and constraint-checked writes go here.
    pub store: Arc<MemoryStore>,
    /// Session-list cache fronting the store's session table.
    pub cache: Arc<SessionListCache>,
    /// Token signing configuration.
    pub auth: Arc<AuthConfig>,
    /// Avatar/resume file storage.
    pub uploads: Arc<UploadStore>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state from configuration with a fresh store.
    pub fn new(config: &ApiConfig, auth: AuthConfig) -> Self {
        let cache_config = CacheConfig::new()
            .with_key(&config.cache_key)
            .with_ttl(config.cache_ttl);
        Self {
            store: Arc::new(MemoryStore::new()),
            cache: Arc::new(SessionListCache::new(cache_config)),
            auth: Arc::new(auth),
            uploads: Arc::new(UploadStore::new(config.upload_root.clone())),
            start_time: std::time::Instant::now(),
        }
    }
}
