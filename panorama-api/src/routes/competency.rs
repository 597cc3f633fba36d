//! Competency REST API Routes
//!
//! CRUD plus the name-filter family: `filter_by_name` (case-insensitive),
//! `filter_contains` (case-sensitive), `list_names`, `count`, `exists`, and
//! the combined name+department filter. The two substring filters are
//! independent operations, not aliases.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use panorama_core::Competency;
use panorama_storage::{CompetencyUpdate, StorageTrait};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{
        CompetencyCountResponse, CompetencyExistsResponse, CompetencyResponse,
        CreateCompetencyRequest, ListCompetenciesResponse, NameDepartmentQuery, NameQuery,
        StatusMessageResponse, UpdateCompetencyRequest,
    },
    validation::ValidateNonEmpty,
};

fn list_response(competencies: Vec<Competency>) -> ListCompetenciesResponse {
    let total = competencies.len() as i32;
    ListCompetenciesResponse {
        competencies: competencies
            .into_iter()
            .map(CompetencyResponse::from)
            .collect(),
        total,
    }
}

/// The `name` parameter is required on the filter endpoints.
fn required_name(params: &NameQuery) -> ApiResult<&str> {
    params
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::missing_param("name"))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/competencies - Create a new competency
#[utoipa::path(
    post,
    path = "/api/v1/competencies",
    tag = "Competencies",
    request_body = CreateCompetencyRequest,
    responses(
        (status = 201, description = "Competency created", body = CompetencyResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_competency(
    State(state): State<AppState>,
    Json(req): Json<CreateCompetencyRequest>,
) -> ApiResult<impl IntoResponse> {
    req.name.validate_non_empty("name")?;

    let mut competency = Competency::new(&req.name);
    if let Some(ref description) = req.description {
        competency = competency.with_description(description);
    }
    if let Some(ref department) = req.department {
        competency = competency.with_department(department);
    }
    state.store.competency_insert(&competency)?;

    Ok((
        StatusCode::CREATED,
        Json(CompetencyResponse::from(competency)),
    ))
}

/// GET /api/v1/competencies - List competencies
#[utoipa::path(
    get,
    path = "/api/v1/competencies",
    tag = "Competencies",
    responses(
        (status = 200, description = "List of competencies", body = ListCompetenciesResponse),
    )
)]
pub async fn list_competencies(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(list_response(state.store.competency_list()?)))
}

/// GET /api/v1/competencies/filter_by_name - Case-insensitive name filter
#[utoipa::path(
    get,
    path = "/api/v1/competencies/filter_by_name",
    tag = "Competencies",
    params(("name" = String, Query, description = "Substring to match, case-insensitively")),
    responses(
        (status = 200, description = "Matching competencies", body = ListCompetenciesResponse),
        (status = 400, description = "Missing name parameter", body = ApiError),
    )
)]
pub async fn filter_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> ApiResult<impl IntoResponse> {
    let name = required_name(&params)?;
    Ok(Json(list_response(
        state.store.competency_search_icontains(name)?,
    )))
}

/// GET /api/v1/competencies/filter_contains - Case-sensitive name filter
#[utoipa::path(
    get,
    path = "/api/v1/competencies/filter_contains",
    tag = "Competencies",
    params(("name" = String, Query, description = "Substring to match, case-sensitively")),
    responses(
        (status = 200, description = "Matching competencies", body = ListCompetenciesResponse),
        (status = 400, description = "Missing name parameter", body = ApiError),
    )
)]
pub async fn filter_contains(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> ApiResult<impl IntoResponse> {
    let name = required_name(&params)?;
    Ok(Json(list_response(
        state.store.competency_search_contains(name)?,
    )))
}

/// GET /api/v1/competencies/list_names - All competency names
#[utoipa::path(
    get,
    path = "/api/v1/competencies/list_names",
    tag = "Competencies",
    responses(
        (status = 200, description = "Competency names", body = [String]),
    )
)]
pub async fn list_names(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.competency_names()?))
}

/// GET /api/v1/competencies/count - Number of competencies
#[utoipa::path(
    get,
    path = "/api/v1/competencies/count",
    tag = "Competencies",
    responses(
        (status = 200, description = "Competency count", body = CompetencyCountResponse),
    )
)]
pub async fn competency_count(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let count = state.store.competency_count()?;
    Ok(Json(CompetencyCountResponse {
        competency_count: count as i64,
    }))
}

/// GET /api/v1/competencies/exists - Whether a competency name exists
#[utoipa::path(
    get,
    path = "/api/v1/competencies/exists",
    tag = "Competencies",
    params(("name" = String, Query, description = "Exact name to check")),
    responses(
        (status = 200, description = "Existence flag", body = CompetencyExistsResponse),
        (status = 400, description = "Missing name parameter", body = ApiError),
    )
)]
pub async fn competency_exists(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> ApiResult<impl IntoResponse> {
    let name = required_name(&params)?;
    Ok(Json(CompetencyExistsResponse {
        exists: state.store.competency_exists(name)?,
    }))
}

/// GET /api/v1/competencies/filter_by_multiple - Name AND department filter
#[utoipa::path(
    get,
    path = "/api/v1/competencies/filter_by_multiple",
    tag = "Competencies",
    params(
        ("name" = String, Query, description = "Substring to match against names"),
        ("department" = String, Query, description = "Substring to match against departments"),
    ),
    responses(
        (status = 200, description = "Matching competencies", body = ListCompetenciesResponse),
        (status = 400, description = "Missing parameters", body = ApiError),
    )
)]
pub async fn filter_by_multiple(
    State(state): State<AppState>,
    Query(params): Query<NameDepartmentQuery>,
) -> ApiResult<impl IntoResponse> {
    let (name, department) = match (params.name.as_deref(), params.department.as_deref()) {
        (Some(name), Some(department)) if !name.is_empty() && !department.is_empty() => {
            (name, department)
        }
        _ => {
            return Err(ApiError::new(
                crate::error::ErrorCode::MissingField,
                "Both 'name' and 'department' query parameters are required",
            ))
        }
    };
    Ok(Json(list_response(
        state
            .store
            .competency_filter_by_name_department(name, department)?,
    )))
}

/// GET /api/v1/competencies/{id} - Get competency by ID
#[utoipa::path(
    get,
    path = "/api/v1/competencies/{id}",
    tag = "Competencies",
    params(("id" = Uuid, Path, description = "Competency ID")),
    responses(
        (status = 200, description = "Competency details", body = CompetencyResponse),
        (status = 404, description = "Competency not found", body = ApiError),
    )
)]
pub async fn get_competency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let competency = state
        .store
        .competency_get(id)?
        .ok_or_else(|| ApiError::competency_not_found(id))?;
    Ok(Json(CompetencyResponse::from(competency)))
}

/// POST /api/v1/competencies/{id}/update - Update with a partial field set
#[utoipa::path(
    post,
    path = "/api/v1/competencies/{id}/update",
    tag = "Competencies",
    params(("id" = Uuid, Path, description = "Competency ID")),
    request_body = UpdateCompetencyRequest,
    responses(
        (status = 200, description = "Competency updated", body = StatusMessageResponse),
        (status = 400, description = "No fields provided", body = ApiError),
        (status = 404, description = "Competency not found", body = ApiError),
    )
)]
pub async fn update_competency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompetencyRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.is_empty() {
        return Err(ApiError::invalid_input("No fields provided for update"));
    }

    state.store.competency_update(
        id,
        CompetencyUpdate {
            name: req.name,
            description: req.description,
            department: req.department,
        },
    )?;

    Ok(Json(StatusMessageResponse {
        message: "Competency updated successfully".to_string(),
    }))
}

/// DELETE /api/v1/competencies/{id} - Delete competency and its dependents
#[utoipa::path(
    delete,
    path = "/api/v1/competencies/{id}",
    tag = "Competencies",
    params(("id" = Uuid, Path, description = "Competency ID")),
    responses(
        (status = 204, description = "Competency deleted"),
        (status = 404, description = "Competency not found", body = ApiError),
    )
)]
pub async fn delete_competency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.competency_delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the competency routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_competency))
        .route("/", axum::routing::get(list_competencies))
        .route("/filter_by_name", axum::routing::get(filter_by_name))
        .route("/filter_contains", axum::routing::get(filter_contains))
        .route("/list_names", axum::routing::get(list_names))
        .route("/count", axum::routing::get(competency_count))
        .route("/exists", axum::routing::get(competency_exists))
        .route("/filter_by_multiple", axum::routing::get(filter_by_multiple))
        .route("/:id", axum::routing::get(get_competency))
        .route("/:id/update", axum::routing::post(update_competency))
        .route("/:id", axum::routing::delete(delete_competency))
}
