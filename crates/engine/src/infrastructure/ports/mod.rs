//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Record storage (SQLite or in-memory)
//! - Clock (for testing)

mod error;
mod store;
mod testing;

pub use error::RepoError;
pub use store::{
    merge_fields, stored_revision, Collection, RecordFilter, RecordStore, RevisionGuard, WriteBatch,
    WriteOp,
};
pub use testing::ClockPort;

#[cfg(test)]
pub use store::MockRecordStore;
#[cfg(test)]
pub use testing::MockClockPort;
