//! Core entity structures

use crate::{EntityId, StaffRole, Timestamp};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account - external identity with credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub username: String,
    /// Hex-encoded salted digest, never the raw password.
    pub password_hash: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl User {
    /// Create a new user with an already-derived password hash.
    pub fn new(username: &str, password_hash: &str, salt: &str) -> Self {
        Self {
            user_id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Set first and last name.
    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self
    }

    /// Full name as stored on the account, empty when neither part is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Profile - organizational record owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
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
    /// Relative path under the upload root, e.g. `avatars/<uuid>.png`.
    pub avatar_path: Option<String>,
    /// Relative path under the upload root, e.g. `resumes/<uuid>.pdf`.
    pub resume_path: Option<String>,
    pub portfolio: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub project_ids: Vec<EntityId>,
}

impl Profile {
    /// Create a new profile for a user.
    pub fn new(user_id: EntityId, role: StaffRole) -> Self {
        Self {
            profile_id: Uuid::now_v7(),
            user_id,
            full_name: None,
            department: None,
            role,
            hire_date: None,
            is_active: true,
            avatar_path: None,
            resume_path: None,
            portfolio: None,
            project_ids: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_full_name(mut self, full_name: &str) -> Self {
        self.full_name = Some(full_name.to_string());
        self
    }

    /// Set the department.
    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    /// Set the hire date.
    pub fn with_hire_date(mut self, hire_date: NaiveDate) -> Self {
        self.hire_date = Some(hire_date);
        self
    }

    /// Attach projects.
    pub fn with_projects(mut self, project_ids: Vec<EntityId>) -> Self {
        self.project_ids = project_ids;
        self
    }
}

/// Project referenced by profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Project {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub project_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub end_date: Option<NaiveDate>,
}

impl Project {
    /// Create a new project.
    pub fn new(name: &str, start_date: NaiveDate) -> Self {
        Self {
            project_id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            start_date,
            end_date: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the end date.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// Competency - a named skill or trait being assessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Competency {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
}

impl Competency {
    /// Create a new competency.
    pub fn new(name: &str) -> Self {
        Self {
            competency_id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            department: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the owning department.
    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }
}

/// Session - one evaluation round for a single evaluated subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Session {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    pub title: String,
    /// The user being assessed in this session.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluated: EntityId,
    pub is_active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Session {
    /// Create a new active session.
    pub fn new(title: &str, evaluated: EntityId) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            title: title.to_string(),
            evaluated,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Mark the session inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Join row attaching one competency to one session.
/// Invariant: the (session, competency) pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionCompetency {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub link_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    pub note: Option<String>,
}

impl SessionCompetency {
    /// Link a competency to a session.
    pub fn new(session_id: EntityId, competency_id: EntityId) -> Self {
        Self {
            link_id: Uuid::now_v7(),
            session_id,
            competency_id,
            note: None,
        }
    }

    /// Attach a free-text note to the link.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

/// Join row registering one user as evaluator on one session.
/// Invariant: the (session, user) pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Evaluator {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
}

impl Evaluator {
    /// Register a user as evaluator on a session.
    pub fn new(session_id: EntityId, user_id: EntityId) -> Self {
        Self {
            evaluator_id: Uuid::now_v7(),
            session_id,
            user_id,
        }
    }
}

/// Assessment - one evaluator's score for one competency within one session.
/// Invariant: the (session, competency, evaluator) triple is unique, and
/// `created_at` is immutable once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assessment {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub assessment_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub competency_id: EntityId,
    /// The user who gave the score.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub evaluator: EntityId,
    pub score: i16,
    pub comment: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Assessment {
    /// Create a new assessment.
    pub fn new(
        session_id: EntityId,
        competency_id: EntityId,
        evaluator: EntityId,
        score: i16,
    ) -> Self {
        Self {
            assessment_id: Uuid::now_v7(),
            session_id,
            competency_id,
            evaluator,
            score,
            comment: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Append-only record of one authenticated page visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitLog {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub visit_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: EntityId,
    pub path: String,
    pub method: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
}

impl VisitLog {
    /// Record a visit happening now.
    pub fn new(user_id: EntityId, path: &str, method: &str) -> Self {
        Self {
            visit_id: Uuid::now_v7(),
            user_id,
            path: path.to_string(),
            method: method.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaffRole;

    #[test]
    fn test_user_full_name() {
        let user = User::new("alice", "deadbeef", "salt").with_name("Alice", "Smith");
        assert_eq!(user.full_name(), "Alice Smith");

        let anonymous = User::new("bob", "deadbeef", "salt");
        assert_eq!(anonymous.full_name(), "");
    }

    #[test]
    fn test_session_defaults_active() {
        let session = Session::new("Q1 Review", Uuid::now_v7());
        assert!(session.is_active);
        assert!(!session.inactive().is_active);
    }

    #[test]
    fn test_profile_builder() {
        let profile = Profile::new(Uuid::now_v7(), StaffRole::TeamLead)
            .with_full_name("Alice Smith")
            .with_department("Engineering");
        assert_eq!(profile.full_name.as_deref(), Some("Alice Smith"));
        assert_eq!(profile.department.as_deref(), Some("Engineering"));
        assert!(profile.is_active);
        assert!(profile.project_ids.is_empty());
    }

    #[test]
    fn test_assessment_builder() {
        let assessment = Assessment::new(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), 8)
            .with_comment("solid work");
        assert_eq!(assessment.score, 8);
        assert_eq!(assessment.comment.as_deref(), Some("solid work"));
    }
}
