//! Session REST API Routes
//!
//! CRUD over sessions plus the cache-fronted listing, the average-score
//! aggregation, cache debug/clear operations, and the nested routes for
//! attaching competencies, registering evaluators, and adding assessments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use panorama_core::{ActiveFilter, Assessment, Evaluator, Session, SessionCompetency};
use panorama_storage::{SessionUpdate, StorageTrait};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{
        AddEvaluatorRequest, AssessmentResponse, AttachCompetencyRequest, CacheDebugResponse,
        CreateSessionAssessmentRequest, CreateSessionRequest, EvaluatorResponse,
        ListSessionsRequest, ListSessionsResponse, SessionAverageResponse,
        SessionCompetencyResponse, SessionCountResponse, SessionResponse, StatusMessageResponse,
        UpdateSessionRequest,
    },
    validation::{validate_score, ValidateNonEmpty},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/sessions - Create a new session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created successfully", body = SessionResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Evaluated user not found", body = ApiError),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    req.title.validate_non_empty("title")?;

    let mut session = Session::new(&req.title, req.evaluated);
    if req.is_active == Some(false) {
        session = session.inactive();
    }
    state.store.session_insert(&session)?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// GET /api/v1/sessions - List sessions through the cache
///
/// The candidate identifier set comes from the cache (bounded staleness up
/// to the TTL); rows and the active/inactive filter are always fresh.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    params(
        ("status" = Option<String>, Query, description = "active | inactive; anything else selects all"),
    ),
    responses(
        (status = 200, description = "List of sessions", body = ListSessionsResponse),
    )
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListSessionsRequest>,
) -> ApiResult<impl IntoResponse> {
    let filter = ActiveFilter::from_status_param(params.status.as_deref());
    let sessions = state.cache.read(state.store.as_ref(), filter)?;

    let total = sessions.len() as i32;
    let response = ListSessionsResponse {
        sessions: sessions.into_iter().map(SessionResponse::from).collect(),
        total,
    };
    Ok(Json(response))
}

/// GET /api/v1/sessions/average_score - Average score per session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/average_score",
    tag = "Sessions",
    responses(
        (status = 200, description = "Average score per session", body = [SessionAverageResponse]),
        (status = 500, description = "Aggregation failed", body = ApiError),
    )
)]
pub async fn average_score(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let averages = state.store.session_average_scores().map_err(|e| {
        tracing::error!(error = %e, "average score aggregation failed");
        ApiError::internal_error("An error occurred")
    })?;

    let response: Vec<SessionAverageResponse> = averages
        .into_iter()
        .map(SessionAverageResponse::from)
        .collect();
    Ok(Json(response))
}

/// GET /api/v1/sessions/debug_cache - Inspect the session-list cache
///
/// Never fills the cache: a cold cache reports "Cache is empty".
#[utoipa::path(
    get,
    path = "/api/v1/sessions/debug_cache",
    tag = "Sessions",
    responses(
        (status = 200, description = "Cache contents or empty-cache message", body = CacheDebugResponse),
    )
)]
pub async fn debug_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let snapshot = state.cache.peek()?;
    Ok(Json(CacheDebugResponse::from_snapshot(snapshot)))
}

/// POST /api/v1/sessions/clear_cache - Clear the session-list cache
#[utoipa::path(
    post,
    path = "/api/v1/sessions/clear_cache",
    tag = "Sessions",
    responses(
        (status = 200, description = "Cache cleared", body = StatusMessageResponse),
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.cache.clear()?;
    Ok(Json(StatusMessageResponse {
        message: "Cache cleared successfully".to_string(),
    }))
}

/// GET /api/v1/sessions/{id} - Get session by ID
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .store
        .session_get(id)?
        .ok_or_else(|| ApiError::session_not_found(id))?;
    Ok(Json(SessionResponse::from(session)))
}

/// PATCH /api/v1/sessions/{id} - Update session
#[utoipa::path(
    patch,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.title.is_none() && req.is_active.is_none() {
        return Err(ApiError::invalid_input(
            "At least one field must be provided for update",
        ));
    }
    if let Some(ref title) = req.title {
        title.validate_non_empty("title")?;
    }

    let session = state.store.session_update(
        id,
        SessionUpdate {
            title: req.title,
            is_active: req.is_active,
        },
    )?;
    Ok(Json(SessionResponse::from(session)))
}

/// DELETE /api/v1/sessions/{id} - Delete session and its dependent rows
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.session_delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/{id}/competencies - Attach a competency
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/competencies",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = AttachCompetencyRequest,
    responses(
        (status = 201, description = "Competency attached", body = SessionCompetencyResponse),
        (status = 404, description = "Session or competency not found", body = ApiError),
        (status = 409, description = "Pair already linked", body = ApiError),
    )
)]
pub async fn attach_competency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttachCompetencyRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut link = SessionCompetency::new(id, req.competency_id);
    if let Some(ref note) = req.note {
        link = link.with_note(note);
    }
    state.store.session_competency_add(&link)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCompetencyResponse::from(link)),
    ))
}

/// POST /api/v1/sessions/{id}/evaluators - Register an evaluator
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/evaluators",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = AddEvaluatorRequest,
    responses(
        (status = 201, description = "Evaluator registered", body = EvaluatorResponse),
        (status = 404, description = "Session or user not found", body = ApiError),
        (status = 409, description = "User already registered on this session", body = ApiError),
    )
)]
pub async fn add_evaluator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddEvaluatorRequest>,
) -> ApiResult<impl IntoResponse> {
    let evaluator = Evaluator::new(id, req.user_id);
    state.store.evaluator_add(&evaluator)?;
    Ok((StatusCode::CREATED, Json(EvaluatorResponse::from(evaluator))))
}

/// POST /api/v1/sessions/{id}/assessments - Add an assessment to a session
///
/// The payload is validated before anything persists.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/assessments",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = CreateSessionAssessmentRequest,
    responses(
        (status = 201, description = "Assessment created", body = AssessmentResponse),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 404, description = "Session, competency, or evaluator not found", body = ApiError),
        (status = 409, description = "Evaluator already scored this competency here", body = ApiError),
    )
)]
pub async fn add_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateSessionAssessmentRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_score(req.score)?;

    let mut assessment = Assessment::new(id, req.competency_id, req.evaluator, req.score);
    if let Some(ref comment) = req.comment {
        assessment = assessment.with_comment(comment);
    }
    state.store.assessment_insert(&assessment)?;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse::from(assessment)),
    ))
}

/// GET /api/get_session_count - Total number of sessions
#[utoipa::path(
    get,
    path = "/api/get_session_count",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session count", body = SessionCountResponse),
    )
)]
pub async fn get_session_count(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let count = state.store.session_count()?;
    Ok(Json(SessionCountResponse {
        session_count: count as i64,
    }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the session routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_session))
        .route("/", axum::routing::get(list_sessions))
        .route("/average_score", axum::routing::get(average_score))
        .route("/debug_cache", axum::routing::get(debug_cache))
        .route("/clear_cache", axum::routing::post(clear_cache))
        .route("/:id", axum::routing::get(get_session))
        .route("/:id", axum::routing::patch(update_session))
        .route("/:id", axum::routing::delete(delete_session))
        .route("/:id/competencies", axum::routing::post(attach_competency))
        .route("/:id/evaluators", axum::routing::post(add_evaluator))
        .route("/:id/assessments", axum::routing::post(add_assessment))
}
