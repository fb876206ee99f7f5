use log::trace;
use serde::{Deserialize, Serialize};

use crate::conflict::report::ConflictedRecord;
use crate::data_store::pending_record::RecordState;

/// Defines how concurrency conflicts should be handled when saving changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// No resolution. The first conflict is returned to the caller unchanged.
    #[default]
    Default,
    /// The writer's proposed values overwrite whatever is currently stored.
    /// A record deleted by another writer is recreated.
    ForceOverwrite,
    /// Whatever is currently stored wins and the writer's conflicting change
    /// is dropped. A deletion by another writer is accepted.
    SkipConflicting,
}

impl ConflictPolicy {
    /// Returns the resolution this policy applies, `None` for [`ConflictPolicy::Default`].
    pub fn resolution(self) -> Option<Resolution> {
        match self {
            ConflictPolicy::Default => None,
            ConflictPolicy::ForceOverwrite => Some(Resolution::ForceOverwrite),
            ConflictPolicy::SkipConflicting => Some(Resolution::SkipConflicting),
        }
    }
}

/// The side that wins a two-way merge between proposed and stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the writer's proposed values.
    ForceOverwrite,
    /// Keep the currently stored values.
    SkipConflicting,
}

impl From<Resolution> for ConflictPolicy {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::ForceOverwrite => ConflictPolicy::ForceOverwrite,
            Resolution::SkipConflicting => ConflictPolicy::SkipConflicting,
        }
    }
}

/// Corrects the pending record referenced by `conflict` so it can be resubmitted.
///
/// When the record no longer exists in storage, `ForceOverwrite` turns the
/// pending record into an insert and `SkipConflicting` drops the change. When
/// it still exists, `ForceOverwrite` keeps the proposed values and
/// `SkipConflicting` adopts the stored ones; in both cases the pending version
/// token is replaced by the stored token so the next attempt passes the
/// version check.
///
/// A pending deletion of a record that is already gone resolves to
/// `Unchanged` under either resolution, as does a record with nothing left
/// to write. A pending deletion of a record that was modified elsewhere stays
/// a deletion under `ForceOverwrite` and is abandoned under `SkipConflicting`.
///
/// The function never fails and performs no I/O. Resolving the same conflict
/// twice leaves the record in the same state.
///
/// # Arguments
///
/// * `conflict` - The conflict reported by the storage collaborator.
/// * `resolution` - Which side wins.
///
/// # Examples
///
/// ```no_run
/// use maat::prelude::*;
///
/// let handle = PendingRecord::tracked("k", FieldMap::new(), Version::new(1)).into_handle();
/// handle.lock().set_field("title", "mine");
///
/// let mut stored = FieldMap::new();
/// stored.insert("title".to_string(), FieldValue::from("theirs"));
/// let conflict = ConflictedRecord::modified(handle.clone(), VersionedValue::new(stored, Version::new(2)));
///
/// resolve(&conflict, Resolution::ForceOverwrite);
/// assert_eq!(handle.lock().version(), Some(Version::new(2)));
/// assert_eq!(handle.lock().field("title"), Some(&FieldValue::from("mine")));
/// ```
pub fn resolve(conflict: &ConflictedRecord, resolution: Resolution) {
    let mut record = conflict.record().lock();

    let Some(current) = conflict.current() else {
        // Record in storage was deleted.
        let state = match (record.state(), resolution) {
            // Nothing left to write: a pending delete already happened elsewhere,
            // and an untouched record must not be recreated.
            (RecordState::Deleted | RecordState::Unchanged, _) => RecordState::Unchanged,
            (_, Resolution::ForceOverwrite) => RecordState::Added,
            (_, Resolution::SkipConflicting) => RecordState::Unchanged,
        };
        trace!(
            "Record {} deleted in storage. Resolution: {:?}. State {:?} -> {:?}",
            record.key(),
            resolution,
            record.state(),
            state
        );
        record.set_state(state);
        record.set_version(None);
        return;
    };

    // Record in storage was updated.
    match resolution {
        Resolution::ForceOverwrite => {}
        Resolution::SkipConflicting => {
            record.replace_fields(current.fields().clone());
            // The other writer's update wins over a pending delete too.
            if record.state() == RecordState::Deleted {
                record.set_state(RecordState::Unchanged);
            }
        }
    }
    trace!(
        "Record {} refreshed from {:?} to {}. Resolution: {:?}",
        record.key(),
        record.version(),
        current.version(),
        resolution
    );
    record.set_version(Some(current.version()));
}

/// Resolves every record of a conflict set in report order.
pub fn resolve_all<'a>(conflicts: impl IntoIterator<Item = &'a ConflictedRecord>, resolution: Resolution) {
    for conflict in conflicts {
        resolve(conflict, resolution);
    }
}
