//! Error Types for the Panorama API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Internal failure detail is logged, never returned to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use panorama_core::{EntityType, PanoramaError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401, 403)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Request is authenticated but lacks permission for the resource
    Forbidden,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field or query parameter is missing
    MissingField,

    /// Field value is out of valid range
    InvalidRange,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Requested user does not exist
    UserNotFound,

    /// Requested profile does not exist
    ProfileNotFound,

    /// Requested project does not exist
    ProjectNotFound,

    /// Requested competency does not exist
    CompetencyNotFound,

    /// Requested session does not exist
    SessionNotFound,

    /// Requested assessment does not exist
    AssessmentNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same unique key already exists
    EntityAlreadyExists,

    /// Username is already registered
    UsernameTaken,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Authentication errors
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            // Validation errors
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,

            // Not found errors
            ErrorCode::EntityNotFound
            | ErrorCode::UserNotFound
            | ErrorCode::ProfileNotFound
            | ErrorCode::ProjectNotFound
            | ErrorCode::CompetencyNotFound
            | ErrorCode::SessionNotFound
            | ErrorCode::AssessmentNotFound => StatusCode::NOT_FOUND,

            // Conflict errors
            ErrorCode::EntityAlreadyExists | ErrorCode::UsernameTaken => StatusCode::CONFLICT,

            // Server errors
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            // Authentication
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            // Validation
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",

            // Not Found
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::CompetencyNotFound => "Competency not found",
            ErrorCode::SessionNotFound => "Session not found",
            ErrorCode::AssessmentNotFound => "Assessment not found",

            // Conflict
            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::UsernameTaken => "Username already exists",

            // Server
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create the generic login-failure error. Deliberately does not say
    /// whether the username or the password was wrong.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::Unauthorized, "Invalid username or password")
    }

    /// Create a Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create an InvalidToken error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    /// Create a TokenExpired error.
    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create a MissingField error for a query parameter.
    pub fn missing_param(param: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("{} query parameter is required", param),
        )
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("Field '{}' must be between {} and {}", field, min, max),
        )
    }

    /// Create a generic not found error with custom message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    /// Create a UserNotFound error.
    pub fn user_not_found(user_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
    }

    /// Create a ProfileNotFound error.
    pub fn profile_not_found(profile_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProfileNotFound,
            format!("Profile {} not found", profile_id),
        )
    }

    /// Create a ProjectNotFound error.
    pub fn project_not_found(project_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProjectNotFound,
            format!("Project {} not found", project_id),
        )
    }

    /// Create a CompetencyNotFound error.
    pub fn competency_not_found(competency_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CompetencyNotFound,
            format!("Competency {} not found", competency_id),
        )
    }

    /// Create a SessionNotFound error.
    pub fn session_not_found(session_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::SessionNotFound,
            format!("Session {} not found", session_id),
        )
    }

    /// Create an AssessmentNotFound error.
    pub fn assessment_not_found(assessment_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AssessmentNotFound,
            format!("Assessment {} not found", assessment_id),
        )
    }

    /// Create an EntityAlreadyExists error.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityAlreadyExists, message)
    }

    /// Create a UsernameTaken error.
    pub fn username_taken(username: &str) -> Self {
        Self::new(
            ErrorCode::UsernameTaken,
            format!("Username '{}' already exists", username),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in
/// Axum handlers.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

/// Convert storage/validation errors into API errors with the right status.
impl From<PanoramaError> for ApiError {
    fn from(err: PanoramaError) -> Self {
        match err {
            PanoramaError::Storage(StorageError::NotFound { entity_type, id }) => {
                match entity_type {
                    EntityType::User => ApiError::user_not_found(id),
                    EntityType::Profile => ApiError::profile_not_found(id),
                    EntityType::Project => ApiError::project_not_found(id),
                    EntityType::Competency => ApiError::competency_not_found(id),
                    EntityType::Session => ApiError::session_not_found(id),
                    EntityType::Assessment => ApiError::assessment_not_found(id),
                    _ => ApiError::not_found(format!("{:?} {} not found", entity_type, id)),
                }
            }
            PanoramaError::Storage(StorageError::UniqueViolation {
                entity_type,
                constraint,
            }) => ApiError::already_exists(format!(
                "{:?} with the same {} already exists",
                entity_type, constraint
            )),
            PanoramaError::Validation(err) => ApiError::validation_failed(err.to_string()),
            other => {
                tracing::error!(error = %other, "storage operation failed");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
