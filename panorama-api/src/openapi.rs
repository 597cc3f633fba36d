//! OpenAPI document for the Panorama API.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::types::{
    AddEvaluatorRequest, AssessmentResponse, AttachCompetencyRequest, CacheDebugResponse,
    CompetencyCountResponse, CompetencyExistsResponse, CompetencyResponse,
    CreateAssessmentRequest, CreateCompetencyRequest, CreateProfileRequest, CreateProjectRequest,
    CreateSessionAssessmentRequest, CreateSessionRequest, EditProfileRequest, EvaluatorResponse,
    HealthResponse, HomeResponse, ListAssessmentsResponse, ListCompetenciesResponse,
    ListProfilesResponse, ListProjectsResponse, ListSessionsResponse, ListVisitLogsResponse,
    LoginRequest, ProfileResponse, ProjectResponse, RegisterRequest, SessionAverageResponse,
    SessionCompetencyResponse, SessionCountResponse, SessionResponse, StatusMessageResponse,
    TokenResponse, UpdateAssessmentRequest, UpdateCompetencyRequest, UpdateProfileRequest,
    UpdateSessionRequest, UserResponse, VisitLogResponse,
};

/// OpenAPI documentation for all REST and page endpoints.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Panorama API",
        description = "360-degree employee assessment service",
        version = "0.1.0",
    ),
    paths(
        // Sessions
        crate::routes::session::create_session,
        crate::routes::session::list_sessions,
        crate::routes::session::average_score,
        crate::routes::session::debug_cache,
        crate::routes::session::clear_cache,
        crate::routes::session::get_session,
        crate::routes::session::update_session,
        crate::routes::session::delete_session,
        crate::routes::session::attach_competency,
        crate::routes::session::add_evaluator,
        crate::routes::session::add_assessment,
        crate::routes::session::get_session_count,
        // Competencies
        crate::routes::competency::create_competency,
        crate::routes::competency::list_competencies,
        crate::routes::competency::filter_by_name,
        crate::routes::competency::filter_contains,
        crate::routes::competency::list_names,
        crate::routes::competency::competency_count,
        crate::routes::competency::competency_exists,
        crate::routes::competency::filter_by_multiple,
        crate::routes::competency::get_competency,
        crate::routes::competency::update_competency,
        crate::routes::competency::delete_competency,
        // Assessments
        crate::routes::assessment::create_assessment,
        crate::routes::assessment::list_assessments,
        crate::routes::assessment::by_user,
        crate::routes::assessment::get_assessment,
        crate::routes::assessment::update_assessment,
        crate::routes::assessment::delete_assessment,
        // Profiles
        crate::routes::user::create_profile,
        crate::routes::user::list_profiles,
        crate::routes::user::get_profile,
        crate::routes::user::update_profile,
        crate::routes::user::delete_profile,
        // Projects
        crate::routes::project::create_project,
        crate::routes::project::list_projects,
        crate::routes::project::get_project,
        crate::routes::project::delete_project,
        // Pages
        crate::routes::pages::home,
        crate::routes::pages::register,
        crate::routes::pages::login,
        crate::routes::pages::logout,
        crate::routes::pages::profile_detail,
        crate::routes::pages::profile_edit,
        crate::routes::pages::profile_delete,
        crate::routes::pages::edit_avatar,
        crate::routes::pages::delete_session_page,
        crate::routes::pages::visit_logs,
        // Health
        crate::routes::health::health,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UserResponse,
        CreateProfileRequest,
        UpdateProfileRequest,
        EditProfileRequest,
        ProfileResponse,
        ListProfilesResponse,
        CreateProjectRequest,
        ProjectResponse,
        ListProjectsResponse,
        CreateCompetencyRequest,
        UpdateCompetencyRequest,
        CompetencyResponse,
        ListCompetenciesResponse,
        CompetencyCountResponse,
        CompetencyExistsResponse,
        CreateSessionRequest,
        UpdateSessionRequest,
        SessionResponse,
        ListSessionsResponse,
        SessionAverageResponse,
        CacheDebugResponse,
        StatusMessageResponse,
        SessionCountResponse,
        AttachCompetencyRequest,
        SessionCompetencyResponse,
        AddEvaluatorRequest,
        EvaluatorResponse,
        CreateAssessmentRequest,
        CreateSessionAssessmentRequest,
        UpdateAssessmentRequest,
        AssessmentResponse,
        ListAssessmentsResponse,
        HomeResponse,
        VisitLogResponse,
        ListVisitLogsResponse,
        HealthResponse,
    )),
    tags(
        (name = "Sessions", description = "Evaluation sessions and the cache-fronted listing"),
        (name = "Competencies", description = "Assessed skills and traits"),
        (name = "Assessments", description = "Scores given by evaluators"),
        (name = "Users", description = "Employee profiles"),
        (name = "Projects", description = "Projects referenced by profiles"),
        (name = "Pages", description = "Dashboard, auth, and listing pages"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
