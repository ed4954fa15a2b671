// Audit fields shared by every persisted record and its projections
pub mod record;
pub mod secured;

pub use record::AuditableRecord;
pub use secured::{SecuredRecord, SecurityFlags};

use crate::date;

/// Errors raised while building record values
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record already has an id assigned")]
    IdAlreadyAssigned,
}

/// Read view of the audit fields.
///
/// Entities and projections alike implement this. The date strings are provided
/// methods computed from the timestamps, so they cannot drift from them.
pub trait Auditable<I> {
    fn id(&self) -> Option<&I>;
    fn created_time(&self) -> i64;
    fn updated_time(&self) -> i64;
    fn created_by_id(&self) -> &I;
    fn updated_by_id(&self) -> &I;

    fn created_date(&self) -> Option<String> {
        date::instant_from_millis(self.created_time())
    }

    fn updated_date(&self) -> Option<String> {
        date::instant_from_millis(self.updated_time())
    }
}

/// Account-style status flags. They are independent; no combination is rejected here.
pub trait Secured<I>: Auditable<I> {
    fn is_deleted(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_expired(&self) -> bool;
    fn is_locked(&self) -> bool;
}
