//! Assessment REST API Routes
//!
//! CRUD with exact-score and session filters (AND-composed), limit/offset
//! pagination, and the by-evaluator filter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use panorama_core::{Assessment, AssessmentFilter};
use panorama_storage::{AssessmentUpdate, StorageTrait};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{
        AssessmentResponse, ByUserQuery, CreateAssessmentRequest, ListAssessmentsRequest,
        ListAssessmentsResponse, UpdateAssessmentRequest,
    },
    validation::validate_score,
};

/// Default page size for assessment listings.
const DEFAULT_PAGE_SIZE: usize = 10;
/// Hard cap on requested page size.
const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/assessments - Create a new assessment
#[utoipa::path(
    post,
    path = "/api/v1/assessments",
    tag = "Assessments",
    request_body = CreateAssessmentRequest,
    responses(
        (status = 201, description = "Assessment created", body = AssessmentResponse),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 404, description = "Session, competency, or evaluator not found", body = ApiError),
        (status = 409, description = "Evaluator already scored this competency here", body = ApiError),
    )
)]
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(req): Json<CreateAssessmentRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_score(req.score)?;

    let mut assessment = Assessment::new(
        req.session_id,
        req.competency_id,
        req.evaluator,
        req.score,
    );
    if let Some(ref comment) = req.comment {
        assessment = assessment.with_comment(comment);
    }
    state.store.assessment_insert(&assessment)?;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse::from(assessment)),
    ))
}

/// GET /api/v1/assessments - List assessments with filters, newest first
///
/// `score` and `session` filters compose with logical AND.
#[utoipa::path(
    get,
    path = "/api/v1/assessments",
    tag = "Assessments",
    params(
        ("score" = Option<i16>, Query, description = "Exact score filter"),
        ("session" = Option<String>, Query, description = "Owning session ID filter"),
        ("limit" = Option<i32>, Query, description = "Page size (default 10, max 100)"),
        ("offset" = Option<i32>, Query, description = "Offset for pagination"),
    ),
    responses(
        (status = 200, description = "List of assessments", body = ListAssessmentsResponse),
    )
)]
pub async fn list_assessments(
    State(state): State<AppState>,
    Query(params): Query<ListAssessmentsRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut filter = AssessmentFilter::default();
    if let Some(score) = params.score {
        filter = filter.with_score(score);
    }
    if let Some(session) = params.session {
        filter = filter.with_session(session);
    }

    let assessments = state.store.assessment_list(filter)?;
    let total = assessments.len() as i32;

    let offset = params.offset.unwrap_or(0).max(0) as usize;
    let limit = params
        .limit
        .map(|l| l.max(0) as usize)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let page: Vec<AssessmentResponse> = assessments
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(AssessmentResponse::from)
        .collect();

    Ok(Json(ListAssessmentsResponse {
        assessments: page,
        total,
    }))
}

/// GET /api/v1/assessments/by_user - Assessments authored by a user
#[utoipa::path(
    get,
    path = "/api/v1/assessments/by_user",
    tag = "Assessments",
    params(("user_id" = String, Query, description = "Evaluator user ID")),
    responses(
        (status = 200, description = "Assessments given by the user", body = ListAssessmentsResponse),
        (status = 400, description = "Missing user_id parameter", body = ApiError),
    )
)]
pub async fn by_user(
    State(state): State<AppState>,
    Query(params): Query<ByUserQuery>,
) -> ApiResult<impl IntoResponse> {
    let user_id = params
        .user_id
        .ok_or_else(|| ApiError::missing_param("user_id"))?;

    let assessments = state.store.assessments_by_evaluator(user_id)?;
    let total = assessments.len() as i32;
    Ok(Json(ListAssessmentsResponse {
        assessments: assessments
            .into_iter()
            .map(AssessmentResponse::from)
            .collect(),
        total,
    }))
}

/// GET /api/v1/assessments/{id} - Get assessment by ID
#[utoipa::path(
    get,
    path = "/api/v1/assessments/{id}",
    tag = "Assessments",
    params(("id" = Uuid, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Assessment details", body = AssessmentResponse),
        (status = 404, description = "Assessment not found", body = ApiError),
    )
)]
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let assessment = state
        .store
        .assessment_get(id)?
        .ok_or_else(|| ApiError::assessment_not_found(id))?;
    Ok(Json(AssessmentResponse::from(assessment)))
}

/// PATCH /api/v1/assessments/{id} - Update score or comment
#[utoipa::path(
    patch,
    path = "/api/v1/assessments/{id}",
    tag = "Assessments",
    params(("id" = Uuid, Path, description = "Assessment ID")),
    request_body = UpdateAssessmentRequest,
    responses(
        (status = 200, description = "Assessment updated", body = AssessmentResponse),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 404, description = "Assessment not found", body = ApiError),
    )
)]
pub async fn update_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssessmentRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.score.is_none() && req.comment.is_none() {
        return Err(ApiError::invalid_input(
            "At least one field must be provided for update",
        ));
    }
    if let Some(score) = req.score {
        validate_score(score)?;
    }

    let assessment = state.store.assessment_update(
        id,
        AssessmentUpdate {
            score: req.score,
            comment: req.comment,
        },
    )?;
    Ok(Json(AssessmentResponse::from(assessment)))
}

/// DELETE /api/v1/assessments/{id} - Delete assessment
#[utoipa::path(
    delete,
    path = "/api/v1/assessments/{id}",
    tag = "Assessments",
    params(("id" = Uuid, Path, description = "Assessment ID")),
    responses(
        (status = 204, description = "Assessment deleted"),
        (status = 404, description = "Assessment not found", body = ApiError),
    )
)]
pub async fn delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.assessment_delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the assessment routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_assessment))
        .route("/", axum::routing::get(list_assessments))
        .route("/by_user", axum::routing::get(by_user))
        .route("/:id", axum::routing::get(get_assessment))
        .route("/:id", axum::routing::patch(update_assessment))
        .route("/:id", axum::routing::delete(delete_assessment))
}
