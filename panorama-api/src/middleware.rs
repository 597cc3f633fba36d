//! Axum middleware: authentication and the visit audit log.
//!
//! `require_auth` guards state-changing page routes and injects
//! [`AuthContext`] into request extensions. `visit_log_layer` is the
//! request-handling boundary's post-response hook: it resolves the caller
//! identity up front, lets the inner service produce the response, and only
//! then appends one visit row. A failure to log is traced and swallowed -
//! it must never block or alter the response.

use crate::auth::{extract_bearer, validate_token, AuthContext};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use panorama_core::{PanoramaResult, VisitLog};
use panorama_storage::StorageTrait;

// ============================================================================
// AUTH MIDDLEWARE
// ============================================================================

/// Reject unauthenticated requests; inject `AuthContext` otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let ctx = validate_token(&state.auth, token)?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Extract the authenticated caller from request extensions.
///
/// Handlers behind `require_auth` take `AuthContext` as an argument; a
/// missing context means the route was mounted without the middleware.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// ============================================================================
// VISIT AUDIT LOG
// ============================================================================

/// Append one visit row for an authenticated request.
///
/// Explicit so the audit write is testable on its own, outside the
/// middleware stack.
pub fn record_visit(
    store: &dyn StorageTrait,
    ctx: &AuthContext,
    path: &str,
    method: &str,
) -> PanoramaResult<()> {
    store.visit_append(&VisitLog::new(ctx.user_id, path, method))
}

/// Post-response hook appending a visit row for every authenticated request.
///
/// Unauthenticated requests pass through untouched. The row is written
/// after the response is computed; logging failure never fails the request.
pub async fn visit_log_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let caller = extract_bearer(request.headers())
        .and_then(|token| validate_token(&state.auth, token).ok());
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let response = next.run(request).await;

    if let Some(ctx) = caller {
        if let Err(err) = record_visit(state.store.as_ref(), &ctx, &path, &method) {
            tracing::warn!(error = %err, %path, %method, "failed to record visit");
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use panorama_core::User;
    use panorama_storage::MemoryStore;

    #[test]
    fn test_record_visit_appends_one_row() {
        let store = MemoryStore::new();
        let user = User::new("alice", "0f", "ab");
        store.user_insert(&user).unwrap();

        let ctx = AuthContext {
            user_id: user.user_id,
            username: "alice".to_string(),
        };
        record_visit(&store, &ctx, "/sessions", "GET").unwrap();

        let visits = store.visit_list().unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].path, "/sessions");
        assert_eq!(visits[0].method, "GET");
        assert_eq!(visits[0].user_id, user.user_id);
    }
}
