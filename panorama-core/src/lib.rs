//! Panorama Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;

pub use entities::{
    Assessment, Competency, Evaluator, Profile, Project, Session, SessionCompetency, User,
    VisitLog,
};
pub use enums::{ChangeKind, EntityType, StaffRole};
pub use error::{ConfigError, PanoramaError, PanoramaResult, StorageError, ValidationError};
pub use filter::{ActiveFilter, AssessmentFilter};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
