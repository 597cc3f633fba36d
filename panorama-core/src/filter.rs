//! Filter types shared by the storage and API layers.

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Active/inactive filter applied when listing sessions.
///
/// Mirrors the `status` query parameter: `active` excludes inactive
/// sessions, `inactive` selects only inactive ones, anything else selects
/// all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActiveFilter {
    All,
    Active,
    Inactive,
}

impl ActiveFilter {
    /// Parse the `status` query parameter. Unknown values select all.
    pub fn from_status_param(status: Option<&str>) -> Self {
        match status {
            Some("active") => ActiveFilter::Active,
            Some("inactive") => ActiveFilter::Inactive,
            _ => ActiveFilter::All,
        }
    }

    /// Whether a session with the given active flag passes this filter.
    pub fn matches(&self, is_active: bool) -> bool {
        match self {
            ActiveFilter::All => true,
            ActiveFilter::Active => is_active,
            ActiveFilter::Inactive => !is_active,
        }
    }
}

impl Default for ActiveFilter {
    fn default() -> Self {
        ActiveFilter::All
    }
}

/// AND-composed filters for listing assessments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssessmentFilter {
    /// Exact score to match.
    pub score: Option<i16>,
    /// Owning session.
    pub session_id: Option<EntityId>,
}

impl AssessmentFilter {
    /// Filter by exact score.
    pub fn with_score(mut self, score: i16) -> Self {
        self.score = Some(score);
        self
    }

    /// Filter by owning session.
    pub fn with_session(mut self, session_id: EntityId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}
