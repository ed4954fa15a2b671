use serde::{Deserialize, Serialize};

use super::{Auditable, AuditableRecord, RecordError, Secured};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFlags {
    pub deleted: bool,
    pub active: bool,
    pub expired: bool,
    pub locked: bool,
}

impl SecurityFlags {
    pub fn new(deleted: bool, active: bool, expired: bool, locked: bool) -> Self {
        Self {
            deleted,
            active,
            expired,
            locked,
        }
    }

    /// Live, usable account: active and nothing else set
    pub fn active() -> Self {
        Self::new(false, true, false, false)
    }
}

/// Audit block plus [`SecurityFlags`], for resources such as user accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuredRecord<I> {
    #[serde(flatten)]
    record: AuditableRecord<I>,
    #[serde(flatten)]
    flags: SecurityFlags,
}

impl<I: Clone> SecuredRecord<I> {
    pub fn new(created_by: I, flags: SecurityFlags) -> Self {
        Self {
            record: AuditableRecord::new(created_by),
            flags,
        }
    }

    pub fn from_parts(record: AuditableRecord<I>, flags: SecurityFlags) -> Self {
        Self { record, flags }
    }

    pub fn with_id(self, id: I) -> Result<Self, RecordError> {
        Ok(Self {
            record: self.record.with_id(id)?,
            flags: self.flags,
        })
    }

    /// Replace the flags; a flag change is a write, so `updated_by` is stamped too
    pub fn with_flags(self, flags: SecurityFlags, updated_by: I) -> Self {
        Self {
            record: self.record.touched_by(updated_by),
            flags,
        }
    }

    pub fn touched_by(self, updated_by: I) -> Self {
        Self {
            record: self.record.touched_by(updated_by),
            flags: self.flags,
        }
    }

    pub fn record(&self) -> &AuditableRecord<I> {
        &self.record
    }

    pub fn flags(&self) -> SecurityFlags {
        self.flags
    }
}

impl<I> Auditable<I> for SecuredRecord<I> {
    fn id(&self) -> Option<&I> {
        self.record.id()
    }

    fn created_time(&self) -> i64 {
        self.record.created_time()
    }

    fn updated_time(&self) -> i64 {
        self.record.updated_time()
    }

    fn created_by_id(&self) -> &I {
        self.record.created_by_id()
    }

    fn updated_by_id(&self) -> &I {
        self.record.updated_by_id()
    }
}

impl<I> Secured<I> for SecuredRecord<I> {
    fn is_deleted(&self) -> bool {
        self.flags.deleted
    }

    fn is_active(&self) -> bool {
        self.flags.active
    }

    fn is_expired(&self) -> bool {
        self.flags.expired
    }

    fn is_locked(&self) -> bool {
        self.flags.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_independent() {
        let record = SecuredRecord::new(1u64, SecurityFlags::new(true, true, false, true));
        assert!(record.is_deleted());
        assert!(record.is_active());
        assert!(!record.is_expired());
        assert!(record.is_locked());
    }

    #[test]
    fn test_flag_change_stamps_updater() {
        let record = SecuredRecord::from_parts(AuditableRecord::new_at(1u64, 0), SecurityFlags::active());
        let locked = record.with_flags(SecurityFlags::new(false, true, false, true), 9);
        assert!(locked.is_locked());
        assert_eq!(*locked.updated_by_id(), 9);
        assert_eq!(*locked.created_by_id(), 1);
        assert!(locked.updated_time() > 0);
    }

    #[test]
    fn test_flat_wire_shape() {
        let record = SecuredRecord::from_parts(AuditableRecord::new_at(5u64, 0), SecurityFlags::active());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_by_id"], 5);
        assert_eq!(json["created_date"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["active"], true);
        assert_eq!(json["locked"], false);

        let back: SecuredRecord<u64> = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
