//! REST API Routes Module
//!
//! This module contains all route handlers organized by entity type.
//!
//! Includes:
//! - Entity CRUD routes (profiles, sessions, competencies, assessments,
//!   projects)
//! - Page-level JSON routes (dashboard, auth, profile pages, listings,
//!   visit log)
//! - Health check endpoint
//! - CORS support for browser-based clients

pub mod assessment;
pub mod competency;
pub mod health;
pub mod pages;
pub mod project;
pub mod session;
pub mod user;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::visit_log_layer;
use crate::state::AppState;

/// Build the full application router.
///
/// REST collections live under `/api/v1`, the session-count endpoint under
/// `/api`, and the page-level surface at the root. The visit-log layer wraps
/// everything so each authenticated request appends exactly one row.
pub fn create_api_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", user::create_router())
        .nest("/sessions", session::create_router())
        .nest("/competencies", competency::create_router())
        .nest("/assessments", assessment::create_router())
        .nest("/projects", project::create_router());

    let router = Router::new()
        .merge(pages::create_router(state.clone()))
        .nest("/api/v1", api)
        .route("/api/get_session_count", get(session::get_session_count))
        .route("/health", get(health::health))
        .layer(from_fn_with_state(state.clone(), visit_log_layer))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger").url(
            "/api-docs/openapi.json",
            <crate::openapi::ApiDoc as utoipa::OpenApi>::openapi(),
        ),
    );

    router.with_state(state)
}
