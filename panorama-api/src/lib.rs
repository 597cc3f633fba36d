//! Panorama API - REST API Layer
//!
//! This crate provides the HTTP surface for the Panorama assessment
//! service: REST collections for profiles, sessions, competencies,
//! assessments, and projects, page-level JSON routes (dashboard, auth,
//! visit log), the session-list cache endpoints, and the visit audit
//! middleware.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod types;
pub mod uploads;
pub mod validation;

// Re-export commonly used types
pub use auth::{
    generate_token, hash_password, validate_token, verify_password, AuthConfig, AuthContext,
    Claims,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{record_visit, require_auth, visit_log_layer};
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
pub use uploads::{UploadKind, UploadStore};
