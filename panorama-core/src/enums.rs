//! Discriminator enums shared across the workspace.

use serde::{Deserialize, Serialize};

/// Entity type discriminator for polymorphic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    User,
    Profile,
    Project,
    Competency,
    Session,
    SessionCompetency,
    Evaluator,
    Assessment,
    VisitLog,
}

/// Role a profile holds within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Employee,
    TeamLead,
    HrManager,
}

impl Default for StaffRole {
    fn default() -> Self {
        StaffRole::Employee
    }
}

/// Kind of change captured by a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}
