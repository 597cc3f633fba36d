//! Append-only change history for tracked entities.
//!
//! Competency, Session, and Assessment writes each append an immutable
//! snapshot here. The store's write path records the change first, then
//! commits the primary write, both under the same guard, so the trail's
//! ordering and atomicity with the write are observable rather than implied.

use panorama_core::{ChangeKind, EntityId, EntityType, Timestamp};
use serde::Serialize;
use uuid::Uuid;

/// One immutable snapshot of a tracked record at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub record_id: EntityId,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub change: ChangeKind,
    pub recorded_at: Timestamp,
    /// Full JSON snapshot of the record's state at this point.
    pub snapshot: serde_json::Value,
}

/// Append-only log of history records. Never mutated or pruned by
/// application logic.
#[derive(Debug, Default)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn append(
        &mut self,
        entity_type: EntityType,
        entity_id: EntityId,
        change: ChangeKind,
        snapshot: serde_json::Value,
    ) {
        self.records.push(HistoryRecord {
            record_id: Uuid::now_v7(),
            entity_type,
            entity_id,
            change,
            recorded_at: chrono::Utc::now(),
            snapshot,
        });
    }

    /// Records for one entity, oldest first.
    pub fn for_entity(&self, entity_type: EntityType, entity_id: EntityId) -> Vec<HistoryRecord> {
        self.records
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = HistoryLog::new();
        let id = Uuid::now_v7();

        log.append(
            EntityType::Competency,
            id,
            ChangeKind::Create,
            serde_json::json!({"name": "Communication"}),
        );
        log.append(
            EntityType::Competency,
            id,
            ChangeKind::Update,
            serde_json::json!({"name": "Clear Communication"}),
        );

        let trail = log.for_entity(EntityType::Competency, id);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].change, ChangeKind::Create);
        assert_eq!(trail[1].change, ChangeKind::Update);
    }

    #[test]
    fn test_for_entity_filters_by_type_and_id() {
        let mut log = HistoryLog::new();
        let id = Uuid::now_v7();

        log.append(
            EntityType::Session,
            id,
            ChangeKind::Create,
            serde_json::Value::Null,
        );
        log.append(
            EntityType::Assessment,
            id,
            ChangeKind::Create,
            serde_json::Value::Null,
        );

        assert_eq!(log.for_entity(EntityType::Session, id).len(), 1);
        assert_eq!(log.for_entity(EntityType::Assessment, id).len(), 1);
        assert_eq!(log.for_entity(EntityType::Competency, id).len(), 0);
        assert_eq!(log.len(), 2);
    }
}
