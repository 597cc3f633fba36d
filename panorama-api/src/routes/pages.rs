//! Page-level routes: dashboard, auth, profile pages, listings, visit log.
//!
//! These are the JSON counterparts of the server-rendered surface: each
//! handler returns the page's context data. Session deletion and avatar
//! editing require an authenticated caller.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use panorama_core::{PanoramaError, StorageError, User};
use panorama_storage::{ProfileUpdate, StorageTrait};
use uuid::Uuid;

use crate::{
    auth::{generate_salt, generate_token, hash_password, verify_password, AuthContext},
    error::{ApiError, ApiResult},
    middleware::require_auth,
    state::AppState,
    types::{
        CompetencyResponse, EditProfileRequest, HomeQuery, HomeResponse, ListVisitLogsResponse,
        LoginRequest, ProfileResponse, ProjectResponse, RegisterRequest, SessionResponse,
        StatusMessageResponse, TokenResponse, UserResponse, VisitLogResponse,
    },
    uploads::UploadKind,
    validation::{validate_password, ValidateNonEmpty},
};

/// How many entries each dashboard list carries when no query is given.
const DASHBOARD_LIMIT: usize = 5;

// ============================================================================
// DASHBOARD
// ============================================================================

/// GET / - Dashboard
///
/// With `query`, searches sessions, projects, and competencies
/// simultaneously (case-insensitive). Without it, returns the five most
/// recent active sessions, five current projects, and the five most used
/// competencies.
#[utoipa::path(
    get,
    path = "/",
    tag = "Pages",
    params(("query" = Option<String>, Query, description = "Free-text search")),
    responses(
        (status = 200, description = "Dashboard data", body = HomeResponse),
    )
)]
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeQuery>,
) -> ApiResult<impl IntoResponse> {
    let query = params.query.filter(|q| !q.trim().is_empty());

    let (sessions, projects, competencies) = match query.as_deref() {
        Some(q) => (
            state.store.session_search_title(q)?,
            state.store.project_search_name(q)?,
            state.store.competency_search_icontains(q)?,
        ),
        None => (
            state.store.sessions_recent_active(DASHBOARD_LIMIT)?,
            state.store.projects_current(DASHBOARD_LIMIT)?,
            state
                .store
                .competency_session_counts()?
                .into_iter()
                .take(DASHBOARD_LIMIT)
                .map(|(competency, _count)| competency)
                .collect(),
        ),
    };

    Ok(Json(HomeResponse {
        query,
        active_sessions: sessions.into_iter().map(SessionResponse::from).collect(),
        current_projects: projects.into_iter().map(ProjectResponse::from).collect(),
        top_competencies: competencies
            .into_iter()
            .map(CompetencyResponse::from)
            .collect(),
    }))
}

// ============================================================================
// AUTH PAGES
// ============================================================================

/// POST /register - Register a new account
///
/// A duplicate username is rejected and the existing account is untouched.
/// Success logs the caller in by returning a bearer token.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Pages",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid form data", body = ApiError),
        (status = 409, description = "Username already exists", body = ApiError),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.username.validate_non_empty("username")?;
    validate_password(&req.password)?;

    let salt = generate_salt();
    let hash = hash_password(&req.password, &salt);
    let user = User::new(&req.username, &hash, &salt).with_name(
        req.first_name.as_deref().unwrap_or(""),
        req.last_name.as_deref().unwrap_or(""),
    );

    state.store.user_insert(&user).map_err(|e| match e {
        PanoramaError::Storage(StorageError::UniqueViolation { .. }) => {
            ApiError::username_taken(&req.username)
        }
        other => other.into(),
    })?;

    let token = generate_token(&state.auth, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// POST /login - Log in
///
/// Failure is always the same generic message, regardless of whether the
/// username or the password was wrong.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Pages",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store
        .user_get_by_username(&req.username)?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&user, &req.password) {
        return Err(ApiError::invalid_credentials());
    }

    let token = generate_token(&state.auth, &user)?;
    Ok(Json(TokenResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// POST /logout - Log out
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Pages",
    responses(
        (status = 200, description = "Logged out", body = StatusMessageResponse),
    )
)]
pub async fn logout() -> impl IntoResponse {
    Json(StatusMessageResponse {
        message: "Logged out".to_string(),
    })
}

// ============================================================================
// PROFILE PAGES
// ============================================================================

/// GET /profile/{id} - Profile detail page
#[utoipa::path(
    get,
    path = "/profile/{id}",
    tag = "Pages",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile details", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn profile_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .store
        .profile_get(id)?
        .ok_or_else(|| ApiError::profile_not_found(id))?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// POST /profile/{id}/edit - Edit full name, department, and role
#[utoipa::path(
    post,
    path = "/profile/{id}/edit",
    tag = "Pages",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = EditProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn profile_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.store.profile_update(
        id,
        ProfileUpdate {
            full_name: req.full_name,
            department: req.department,
            role: req.role,
            ..Default::default()
        },
    )?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// POST /profile/edit-avatar - Upload or delete the caller's avatar
///
/// Multipart form: an `avatar` or `resume` file part stores a new asset; a
/// `delete_avatar` part set to `true`/`on` removes the avatar, deleting the
/// underlying file and not just the database reference.
#[utoipa::path(
    post,
    path = "/profile/edit-avatar",
    tag = "Pages",
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid form data", body = ApiError),
        (status = 401, description = "Authentication required", body = ApiError),
        (status = 404, description = "Caller has no profile", body = ApiError),
    )
)]
pub async fn edit_avatar(
    State(state): State<AppState>,
    ctx: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .store
        .profile_get_by_user(ctx.user_id)?
        .ok_or_else(|| ApiError::not_found("Caller has no profile"))?;

    let mut new_avatar: Option<(String, Vec<u8>)> = None;
    let mut new_resume: Option<(String, Vec<u8>)> = None;
    let mut delete_avatar = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::invalid_input(format!("Invalid multipart form: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "avatar" => {
                let name = field.file_name().unwrap_or("avatar.bin").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::invalid_input(format!("Failed to read avatar upload: {}", e))
                })?;
                if bytes.is_empty() {
                    return Err(ApiError::invalid_input("Uploaded avatar file is empty"));
                }
                new_avatar = Some((name, bytes.to_vec()));
            }
            "resume" => {
                let name = field.file_name().unwrap_or("resume.bin").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::invalid_input(format!("Failed to read resume upload: {}", e))
                })?;
                if bytes.is_empty() {
                    return Err(ApiError::invalid_input("Uploaded resume file is empty"));
                }
                new_resume = Some((name, bytes.to_vec()));
            }
            "delete_avatar" => {
                let value = field.text().await.unwrap_or_default();
                delete_avatar = matches!(value.as_str(), "true" | "on" | "1");
            }
            _ => {}
        }
    }

    let mut update = ProfileUpdate::default();

    if delete_avatar {
        if let Some(ref old) = profile.avatar_path {
            state.uploads.remove(old).await?;
        }
        update.avatar_path = Some(None);
    } else if let Some((name, bytes)) = new_avatar {
        let stored = state.uploads.save(UploadKind::Avatar, &name, &bytes).await?;
        if let Some(ref old) = profile.avatar_path {
            state.uploads.remove(old).await?;
        }
        update.avatar_path = Some(Some(stored));
    }

    if let Some((name, bytes)) = new_resume {
        let stored = state.uploads.save(UploadKind::Resume, &name, &bytes).await?;
        if let Some(ref old) = profile.resume_path {
            state.uploads.remove(old).await?;
        }
        update.resume_path = Some(Some(stored));
    }

    let updated = state.store.profile_update(profile.profile_id, update)?;
    Ok(Json(ProfileResponse::from(updated)))
}

/// POST /profile/{id}/delete - Delete a profile
///
/// Removes any stored avatar and resume files along with the record.
#[utoipa::path(
    post,
    path = "/profile/{id}/delete",
    tag = "Pages",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile deleted", body = StatusMessageResponse),
        (status = 404, description = "Profile not found", body = ApiError),
    )
)]
pub async fn profile_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .store
        .profile_get(id)?
        .ok_or_else(|| ApiError::profile_not_found(id))?;

    if let Some(ref avatar) = profile.avatar_path {
        state.uploads.remove(avatar).await?;
    }
    if let Some(ref resume) = profile.resume_path {
        state.uploads.remove(resume).await?;
    }
    state.store.profile_delete(id)?;

    Ok(Json(StatusMessageResponse {
        message: "Profile deleted successfully".to_string(),
    }))
}

// ============================================================================
// LISTING AND DETAIL PAGES
// ============================================================================

/// GET /sessions - All sessions page
pub async fn all_sessions(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let sessions = state.store.session_list()?;
    Ok(Json(
        sessions
            .into_iter()
            .map(SessionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /projects - All projects page
pub async fn all_projects(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.store.project_list()?;
    Ok(Json(
        projects
            .into_iter()
            .map(ProjectResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /competencies - All competencies page
pub async fn all_competencies(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let competencies = state.store.competency_list()?;
    Ok(Json(
        competencies
            .into_iter()
            .map(CompetencyResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /session/{id} - Session detail page
pub async fn session_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .store
        .session_get(id)?
        .ok_or_else(|| ApiError::session_not_found(id))?;
    Ok(Json(SessionResponse::from(session)))
}

/// GET /project/{id} - Project detail page
pub async fn project_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .store
        .project_get(id)?
        .ok_or_else(|| ApiError::project_not_found(id))?;
    Ok(Json(ProjectResponse::from(project)))
}

/// GET /competency/{id} - Competency detail page
pub async fn competency_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let competency = state
        .store
        .competency_get(id)?
        .ok_or_else(|| ApiError::competency_not_found(id))?;
    Ok(Json(CompetencyResponse::from(competency)))
}

/// POST /sessions/delete/{id} - Delete a session (authenticated)
#[utoipa::path(
    post,
    path = "/sessions/delete/{id}",
    tag = "Pages",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session deleted", body = StatusMessageResponse),
        (status = 401, description = "Authentication required", body = ApiError),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn delete_session_page(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.store.session_delete(id)?;
    Ok(Json(StatusMessageResponse {
        message: "Session deleted successfully".to_string(),
    }))
}

/// GET /logs - Visit log page, newest first
#[utoipa::path(
    get,
    path = "/logs",
    tag = "Pages",
    responses(
        (status = 200, description = "Visit log", body = ListVisitLogsResponse),
    )
)]
pub async fn visit_logs(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let visits = state.store.visit_list()?;
    let total = visits.len() as i32;
    Ok(Json(ListVisitLogsResponse {
        logs: visits.into_iter().map(VisitLogResponse::from).collect(),
        total,
    }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the page routes router. State-changing page routes sit behind the
/// auth middleware.
pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile/edit-avatar", post(edit_avatar))
        .route("/sessions/delete/:id", post(delete_session_page))
        .route_layer(from_fn_with_state(state, require_auth));

    Router::new()
        .route("/", get(home))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile/:id", get(profile_detail))
        .route("/profile/:id/edit", post(profile_edit))
        .route("/profile/:id/delete", post(profile_delete))
        .route("/sessions", get(all_sessions))
        .route("/projects", get(all_projects))
        .route("/competencies", get(all_competencies))
        .route("/session/:id", get(session_detail))
        .route("/project/:id", get(project_detail))
        .route("/competency/:id", get(competency_detail))
        .route("/logs", get(visit_logs))
        .merge(protected)
}
