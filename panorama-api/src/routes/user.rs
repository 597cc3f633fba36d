//! User Profile REST API Routes
//!
//! The `/users` collection serves profiles: the organizational record for
//! each account. User accounts themselves are created through registration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use panorama_core::{Profile, StaffRole};
use panorama_storage::{ProfileUpdate, StorageTrait};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{
        CreateProfileRequest, ListProfilesResponse, ProfileResponse, UpdateProfileRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/users - Create a profile for an existing user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 404, description = "Owning user not found", body = ApiError),
        (status = 409, description = "User already has a profile", body = ApiError),
    )
)]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut profile = Profile::new(req.user_id, req.role.unwrap_or(StaffRole::Employee));
    if let Some(ref full_name) = req.full_name {
        profile = profile.with_full_name(full_name);
    }
    if let Some(ref department) = req.department {
        profile = profile.with_department(department);
    }
    if let Some(hire_date) = req.hire_date {
        profile = profile.with_hire_date(hire_date);
    }
    if let Some(project_ids) = req.project_ids {
        profile = profile.with_projects(project_ids);
    }
    profile.portfolio = req.portfolio;

    // The store may fill full_name from the owning user on first save.
    let stored = state.store.profile_insert(&profile)?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(stored))))
}

/// GET /api/v1/users - List profiles
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of profiles", body = ListProfilesResponse),
    )
)]
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let profiles = state.store.profile_list()?;
    let total = profiles.len() as i32;
    Ok(Json(ListProfilesResponse {
        profiles: profiles.into_iter().map(ProfileResponse::from).collect(),
        total,
    }))
}

/// GET /api/v1/users/{id} - Get profile by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile details", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .store
        .profile_get(id)?
        .ok_or_else(|| ApiError::profile_not_found(id))?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// PATCH /api/v1/users/{id} - Update profile
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.store.profile_update(
        id,
        ProfileUpdate {
            full_name: req.full_name,
            department: req.department,
            role: req.role,
            hire_date: req.hire_date,
            is_active: req.is_active,
            portfolio: req.portfolio,
            project_ids: req.project_ids,
            ..Default::default()
        },
    )?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// DELETE /api/v1/users/{id} - Delete profile
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.profile_delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the user profile routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_profile))
        .route("/", axum::routing::get(list_profiles))
        .route("/:id", axum::routing::get(get_profile))
        .route("/:id", axum::routing::patch(update_profile))
        .route("/:id", axum::routing::delete(delete_profile))
}
