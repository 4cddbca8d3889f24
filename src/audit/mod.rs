//! Audit trail for fintrack
//!
//! Every create, update and delete performed through the services is
//! appended to `audit.log` as one JSON object per line, with the entity's
//! state before and after the change.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
