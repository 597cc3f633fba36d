//! Project REST API Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use panorama_core::Project;
use panorama_storage::StorageTrait;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{CreateProjectRequest, ListProjectsResponse, ProjectResponse},
    validation::ValidateNonEmpty,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/projects - Create a new project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    req.name.validate_non_empty("name")?;

    let mut project = Project::new(&req.name, req.start_date);
    if let Some(ref description) = req.description {
        project = project.with_description(description);
    }
    if let Some(end_date) = req.end_date {
        project = project.with_end_date(end_date);
    }
    state.store.project_insert(&project)?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// GET /api/v1/projects - List projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "List of projects", body = ListProjectsResponse),
    )
)]
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.store.project_list()?;
    let total = projects.len() as i32;
    Ok(Json(ListProjectsResponse {
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
        total,
    }))
}

/// GET /api/v1/projects/{id} - Get project by ID
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "Project not found", body = ApiError),
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .store
        .project_get(id)?
        .ok_or_else(|| ApiError::project_not_found(id))?;
    Ok(Json(ProjectResponse::from(project)))
}

/// DELETE /api/v1/projects/{id} - Delete project
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found", body = ApiError),
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.project_delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the project routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_project))
        .route("/", axum::routing::get(list_projects))
        .route("/:id", axum::routing::get(get_project))
        .route("/:id", axum::routing::delete(delete_project))
}
