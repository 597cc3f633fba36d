//! API Request and Response Types
//!
//! This module defines all request and response types for the Panorama API.

use chrono::NaiveDate;
use panorama_core::{
    Assessment, Competency, EntityId, Evaluator, Profile, Project, Session, SessionCompetency,
    StaffRole, Timestamp, User, VisitLog,
};
use panorama_storage::{SessionAverage, SessionSnapshot};
use serde::{Deserialize, Serialize};

// ============================================================================
// AUTH TYPES
// ============================================================================

/// Request to register a new user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request to log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Bearer token plus the account it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub token: String,
    pub user: UserResponse,
}

/// User account details. Credentials never leave the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// PROFILE TYPES
// ============================================================================

/// Request to create a profile for an existing user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateProfileRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<StaffRole>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub hire_date: Option<NaiveDate>,
    pub portfolio: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub project_ids: Option<Vec<EntityId>>,
}

/// Request to update an existing profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<StaffRole>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub hire_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub portfolio: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub project_ids: Option<Vec<EntityId>>,
}

/// Request body for the profile edit page: the three editable fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EditProfileRequest {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<StaffRole>,
}

/// Profile details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub profile_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: StaffRole,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    pub avatar_path: Option<String>,
    pub resume_path: Option<String>,
    pub portfolio: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub project_ids: Vec<EntityId>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            profile_id: profile.profile_id,
            user_id: profile.user_id,
            full_name: profile.full_name,
            department: profile.department,
            role: profile.role,
            hire_date: profile.hire_date,
            is_active: profile.is_active,
            avatar_path: profile.avatar_path,
            resume_path: profile.resume_path,
            portfolio: profile.portfolio,
            project_ids: profile.project_ids,
        }
    }
}

/// Response containing a list of profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListProfilesResponse {
    pub profiles: Vec<ProfileResponse>,
    pub total: i32,
}

// ============================================================================
// PROJECT TYPES
// ============================================================================

/// Request to create a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub end_date: Option<NaiveDate>,
}

/// Project details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub project_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub end_date: Option<NaiveDate>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            project_id: project.project_id,
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
        }
    }
}

/// Response containing a list of projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: i32,
}

// ============================================================================
// COMPETENCY TYPES
// ============================================================================

/// Request to create a competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCompetencyRequest {
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
}

/// Request to update a competency with a partial field set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateCompetencyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
}

impl UpdateCompetencyRequest {
    /// Whether any field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.department.is_none()
    }
}

/// Competency details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompetencyResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
}

impl From<Competency> for CompetencyResponse {
    fn from(competency: Competency) -> Self {
        Self {
            competency_id: competency.competency_id,
            name: competency.name,
            description: competency.description,
            department: competency.department,
        }
    }
}

/// Response containing a list of competencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListCompetenciesResponse {
    pub competencies: Vec<CompetencyResponse>,
    pub total: i32,
}

/// `name` query parameter for competency filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `name` + `department` query parameters for the combined filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameDepartmentQuery {
    pub name: Option<String>,
    pub department: Option<String>,
}

/// Competency count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompetencyCountResponse {
    pub competency_count: i64,
}

/// Competency existence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompetencyExistsResponse {
    pub exists: bool,
}

// ============================================================================
// SESSION TYPES
// ============================================================================

/// Request to create a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateSessionRequest {
    pub title: String,
    /// The user being assessed.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluated: EntityId,
    pub is_active: Option<bool>,
}

/// Request to update a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

/// Session details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluated: EntityId,
    pub is_active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            title: session.title,
            evaluated: session.evaluated,
            is_active: session.is_active,
            created_at: session.created_at,
        }
    }
}

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionsRequest {
    /// `active` or `inactive`; anything else selects all.
    pub status: Option<String>,
}

/// Response containing a list of sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionResponse>,
    pub total: i32,
}

/// Per-session average score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionAverageResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    pub title: String,
    /// `null` when the session has no assessments.
    pub average_score: Option<f64>,
}

impl From<SessionAverage> for SessionAverageResponse {
    fn from(avg: SessionAverage) -> Self {
        Self {
            session_id: avg.session_id,
            title: avg.title,
            average_score: avg.average_score,
        }
    }
}

/// Debug view of the session-list cache. Exactly one of the fields is set:
/// the snapshot when warm, the message when cold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheDebugResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_sessions: Option<Vec<SessionResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CacheDebugResponse {
    /// Build from a peeked snapshot.
    pub fn from_snapshot(snapshot: Option<SessionSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                cached_sessions: Some(
                    snapshot
                        .sessions
                        .into_iter()
                        .map(SessionResponse::from)
                        .collect(),
                ),
                message: None,
            },
            None => Self {
                cached_sessions: None,
                message: Some("Cache is empty".to_string()),
            },
        }
    }
}

/// Plain status message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusMessageResponse {
    pub message: String,
}

/// Total number of sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionCountResponse {
    pub session_count: i64,
}

/// Request to attach a competency to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttachCompetencyRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    pub note: Option<String>,
}

/// Session/competency link details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionCompetencyResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub link_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    pub note: Option<String>,
}

impl From<SessionCompetency> for SessionCompetencyResponse {
    fn from(link: SessionCompetency) -> Self {
        Self {
            link_id: link.link_id,
            session_id: link.session_id,
            competency_id: link.competency_id,
            note: link.note,
        }
    }
}

/// Request to register a user as evaluator on a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddEvaluatorRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
}

/// Evaluator registration details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EvaluatorResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
}

impl From<Evaluator> for EvaluatorResponse {
    fn from(evaluator: Evaluator) -> Self {
        Self {
            evaluator_id: evaluator.evaluator_id,
            session_id: evaluator.session_id,
            user_id: evaluator.user_id,
        }
    }
}

// ============================================================================
// ASSESSMENT TYPES
// ============================================================================

/// Request to create an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAssessmentRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    /// The user giving the score.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator: EntityId,
    pub score: i16,
    pub comment: Option<String>,
}

/// Request to add an assessment to a session addressed by its path id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateSessionAssessmentRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator: EntityId,
    pub score: i16,
    pub comment: Option<String>,
}

/// Request to update an assessment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAssessmentRequest {
    pub score: Option<i16>,
    pub comment: Option<String>,
}

/// Assessment details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssessmentResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub assessment_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator: EntityId,
    pub score: i16,
    pub comment: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<Assessment> for AssessmentResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            assessment_id: assessment.assessment_id,
            session_id: assessment.session_id,
            competency_id: assessment.competency_id,
            evaluator: assessment.evaluator,
            score: assessment.score,
            comment: assessment.comment,
            created_at: assessment.created_at,
        }
    }
}

/// Query parameters for listing assessments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAssessmentsRequest {
    /// Exact score filter.
    pub score: Option<i16>,
    /// Owning session filter.
    pub session: Option<EntityId>,
    /// Maximum number of results (default 10, capped at 100).
    pub limit: Option<i32>,
    /// Offset for pagination.
    pub offset: Option<i32>,
}

/// Response containing a list of assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListAssessmentsResponse {
    pub assessments: Vec<AssessmentResponse>,
    /// Total count before pagination.
    pub total: i32,
}

/// `user_id` query parameter for the by-user filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ByUserQuery {
    pub user_id: Option<EntityId>,
}

// ============================================================================
// PAGE TYPES
// ============================================================================

/// Dashboard payload: search results for `query`, or the default top lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HomeResponse {
    pub query: Option<String>,
    pub active_sessions: Vec<SessionResponse>,
    pub current_projects: Vec<ProjectResponse>,
    pub top_competencies: Vec<CompetencyResponse>,
}

/// Free-text `query` parameter for the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeQuery {
    pub query: Option<String>,
}

/// One visit-log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitLogResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub visit_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub path: String,
    pub method: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
}

impl From<VisitLog> for VisitLogResponse {
    fn from(visit: VisitLog) -> Self {
        Self {
            visit_id: visit.visit_id,
            user_id: visit.user_id,
            path: visit.path,
            method: visit.method,
            timestamp: visit.timestamp,
        }
    }
}

/// Response containing the visit log, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListVisitLogsResponse {
    pub logs: Vec<VisitLogResponse>,
    pub total: i32,
}

/// Health check payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
