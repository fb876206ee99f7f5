//! Maat: optimistic-concurrency conflict resolution for versioned record stores.
//!
//! A writer persists its pending records through a storage engine that checks a
//! version token per record. When another writer got there first, the engine
//! reports a conflict set. Maat resolves every conflicting record according to a
//! [`ConflictPolicy`] and retries the write, bounded by a retry budget.

pub mod cancel;
pub mod conflict;
pub mod coordinator;
pub mod data_store;
pub mod entities;
pub mod errors;
pub mod options;

// Re-export key types and functions for easier access
pub use cancel::CancellationToken;
pub use conflict::report::{ConflictSet, ConflictedRecord};
pub use conflict::resolution::{ConflictPolicy, Resolution, resolve, resolve_all};
pub use coordinator::{
    save_with_resolution, save_with_resolution_blocking, save_with_resolution_cancellable,
};
pub use data_store::field_value::{FieldMap, FieldValue, RecordKey};
pub use data_store::pending_record::{PendingRecord, RecordHandle, RecordState};
pub use data_store::versioned_value::{Version, VersionedValue};
pub use entities::SaveableEntities;
pub use errors::{MaatError, Result};
pub use options::{ExhaustionPolicy, ResolveOptions};

/// Maat Prelude
pub mod prelude {
    pub use crate::cancel::*;
    pub use crate::conflict::report::*;
    pub use crate::conflict::resolution::*;
    pub use crate::coordinator::*;
    pub use crate::data_store::field_value::*;
    pub use crate::data_store::pending_record::*;
    pub use crate::data_store::versioned_value::*;
    pub use crate::entities::*;
    pub use crate::errors::*;
    pub use crate::options::*;
}
