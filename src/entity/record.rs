use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Auditable, RecordError};
use crate::date;

/// Immutable audit block embedded in resource entities (usually with `#[serde(flatten)]`).
///
/// Creation fields are fixed when the value is built; every later write goes through
/// [`AuditableRecord::touched_by`], which returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditableRecord<I> {
    id: Option<I>,
    created_time: i64,
    updated_time: i64,
    created_by_id: I,
    updated_by_id: I,
}

impl<I: Clone> AuditableRecord<I> {
    /// New unsaved record created now by `created_by`
    pub fn new(created_by: I) -> Self {
        Self::new_at(created_by, date::now_millis())
    }

    pub fn new_at(created_by: I, millis: i64) -> Self {
        Self {
            id: None,
            created_time: millis,
            updated_time: millis,
            updated_by_id: created_by.clone(),
            created_by_id: created_by,
        }
    }

    /// Attach the id generated by the persistence layer. Ids are assigned once.
    pub fn with_id(self, id: I) -> Result<Self, RecordError> {
        if self.id.is_some() {
            return Err(RecordError::IdAlreadyAssigned);
        }
        Ok(Self {
            id: Some(id),
            ..self
        })
    }

    /// Record a write by `updated_by` now
    pub fn touched_by(self, updated_by: I) -> Self {
        self.touched_at(updated_by, date::now_millis())
    }

    pub fn touched_at(self, updated_by: I, millis: i64) -> Self {
        Self {
            updated_time: millis,
            updated_by_id: updated_by,
            ..self
        }
    }
}

impl<I> Auditable<I> for AuditableRecord<I> {
    fn id(&self) -> Option<&I> {
        self.id.as_ref()
    }

    fn created_time(&self) -> i64 {
        self.created_time
    }

    fn updated_time(&self) -> i64 {
        self.updated_time
    }

    fn created_by_id(&self) -> &I {
        &self.created_by_id
    }

    fn updated_by_id(&self) -> &I {
        &self.updated_by_id
    }
}

#[derive(Serialize)]
struct RecordOut<'a, I> {
    id: Option<&'a I>,
    created_time: i64,
    updated_time: i64,
    created_date: Option<String>,
    updated_date: Option<String>,
    created_by_id: &'a I,
    updated_by_id: &'a I,
}

// Date strings on input are ignored and re-derived from the timestamps
#[derive(Deserialize)]
struct RecordIn<I> {
    id: Option<I>,
    created_time: i64,
    updated_time: i64,
    created_by_id: I,
    updated_by_id: I,
}

impl<I: Serialize> Serialize for AuditableRecord<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordOut {
            id: self.id.as_ref(),
            created_time: self.created_time,
            updated_time: self.updated_time,
            created_date: self.created_date(),
            updated_date: self.updated_date(),
            created_by_id: &self.created_by_id,
            updated_by_id: &self.updated_by_id,
        }
        .serialize(serializer)
    }
}

impl<'de, I: Deserialize<'de>> Deserialize<'de> for AuditableRecord<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = RecordIn::<I>::deserialize(deserializer)?;
        Ok(Self {
            id: input.id,
            created_time: input.created_time,
            updated_time: input.updated_time,
            created_by_id: input.created_by_id,
            updated_by_id: input.updated_by_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_sets_both_sides() {
        let record = AuditableRecord::new_at(7u64, 1_000);
        assert_eq!(record.created_time(), 1_000);
        assert_eq!(record.updated_time(), 1_000);
        assert_eq!(*record.created_by_id(), 7);
        assert_eq!(*record.updated_by_id(), 7);
        assert_eq!(record.id(), None);
        assert_eq!(record.created_date().as_deref(), Some("1970-01-01T00:00:01.000Z"));
    }

    #[test]
    fn test_touch_leaves_creation_alone() {
        let record = AuditableRecord::new_at(1u64, 1_000).touched_at(2, 5_000);
        assert_eq!(record.created_time(), 1_000);
        assert_eq!(*record.created_by_id(), 1);
        assert_eq!(record.updated_time(), 5_000);
        assert_eq!(*record.updated_by_id(), 2);
        assert_eq!(record.updated_date().as_deref(), Some("1970-01-01T00:00:05.000Z"));
    }

    #[test]
    fn test_id_assigned_once() {
        let record = AuditableRecord::new_at(1u64, 0).with_id(42).unwrap();
        assert_eq!(record.id(), Some(&42));
        assert!(matches!(record.with_id(43), Err(RecordError::IdAlreadyAssigned)));
    }

    #[test]
    fn test_dates_rederived_on_input() {
        let json = serde_json::json!({
            "id": 3,
            "created_time": 0,
            "updated_time": 2_000,
            "created_date": "2099-01-01T00:00:00.000Z",
            "updated_date": "bogus",
            "created_by_id": 1,
            "updated_by_id": 1
        });
        let record: AuditableRecord<u64> = serde_json::from_value(json).unwrap();
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["created_date"], "1970-01-01T00:00:00.000Z");
        assert_eq!(out["updated_date"], "1970-01-01T00:00:02.000Z");
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Handle(String);

    #[test]
    fn test_missing_id_reads_as_unassigned() {
        let json = serde_json::json!({
            "created_time": 10,
            "updated_time": 20,
            "created_by_id": "alice",
            "updated_by_id": "bob"
        });
        let record: AuditableRecord<Handle> = serde_json::from_value(json).unwrap();
        assert_eq!(record.id(), None);
        assert_eq!(record.created_by_id(), &Handle("alice".to_string()));
        assert_eq!(record.updated_by_id(), &Handle("bob".to_string()));
    }
}
