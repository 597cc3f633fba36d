//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP server.
    pub bind_host: String,

    /// Bind port for the HTTP server.
    pub bind_port: u16,

    /// Root directory for uploaded avatars and resumes.
    pub upload_root: PathBuf,

    /// Cache key for the session-list cache.
    pub cache_key: String,

    /// TTL for the session-list cache.
    pub cache_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            upload_root: PathBuf::from("uploads"),
            cache_key: "cached_sessions".to_string(),
            cache_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PANORAMA_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` / `PANORAMA_API_PORT`: bind port (default: 3000)
    /// - `PANORAMA_UPLOAD_ROOT`: upload directory (default: uploads)
    /// - `PANORAMA_CACHE_KEY`: session cache key (default: cached_sessions)
    /// - `PANORAMA_CACHE_TTL_SECS`: session cache TTL (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host = std::env::var("PANORAMA_API_BIND").unwrap_or(defaults.bind_host);

        let bind_port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("PANORAMA_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bind_port);

        let upload_root = std::env::var("PANORAMA_UPLOAD_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_root);

        let cache_key = std::env::var("PANORAMA_CACHE_KEY").unwrap_or(defaults.cache_key);

        let cache_ttl = std::env::var("PANORAMA_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        Self {
            bind_host,
            bind_port,
            upload_root,
            cache_key,
            cache_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_port, 3000);
        assert_eq!(config.cache_key, "cached_sessions");
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }
}
