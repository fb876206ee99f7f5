use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data_store::field_value::{FieldMap, FieldValue, RecordKey};
use crate::data_store::versioned_value::Version;

/// Shared handle to a pending record.
///
/// The change-tracking session owns its records through these handles and the
/// storage collaborator hands clones of them back inside a conflict report,
/// so the resolver can correct the exact record that will be resubmitted.
pub type RecordHandle = Arc<Mutex<PendingRecord>>;

/// Lifecycle of a pending record within a change-tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    /// Nothing to write for this record.
    Unchanged,
    /// The record must be inserted.
    Added,
    /// The record must be updated, guarded by its version token.
    Modified,
    /// The record must be deleted, guarded by its version token.
    Deleted,
}

impl RecordState {
    /// Returns `true` if a persist attempt has to write something for this state.
    pub fn is_pending(self) -> bool {
        !matches!(self, RecordState::Unchanged)
    }
}

/// A unit of change queued for persistence.
///
/// Holds the writer's proposed field values together with the version token
/// the writer last read. The token is what the storage engine compares
/// against on update and delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    key: RecordKey,
    fields: FieldMap,
    version: Option<Version>,
    state: RecordState,
}

impl PendingRecord {
    /// Creates a record that was read from storage and has no changes yet.
    ///
    /// # Arguments
    ///
    /// * `key` - The primary key of the record.
    /// * `fields` - The field values as read.
    /// * `version` - The version token read together with the values.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use maat::prelude::*;
    ///
    /// let mut record = PendingRecord::tracked("user-1", FieldMap::new(), Version::new(3));
    /// record.set_field("name", "Ada");
    /// assert_eq!(record.state(), RecordState::Modified);
    /// ```
    pub fn tracked(key: impl Into<RecordKey>, fields: FieldMap, version: Version) -> Self {
        Self {
            key: key.into(),
            fields,
            version: Some(version),
            state: RecordState::Unchanged,
        }
    }

    /// Creates a brand new record that must be inserted.
    pub fn added(key: impl Into<RecordKey>, fields: FieldMap) -> Self {
        Self {
            key: key.into(),
            fields,
            version: None,
            state: RecordState::Added,
        }
    }

    /// Wraps the record into a shareable [`RecordHandle`].
    pub fn into_handle(self) -> RecordHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The version token this writer last read, `None` if never read from storage.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Proposes a new value for a field.
    ///
    /// An `Unchanged` record becomes `Modified`; `Added` stays `Added`.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
        if self.state == RecordState::Unchanged {
            self.state = RecordState::Modified;
        }
    }

    /// Queues the record for deletion.
    pub fn mark_deleted(&mut self) {
        self.state = RecordState::Deleted;
    }

    /// Records the outcome of a successful write of this record.
    ///
    /// Adopts the version token the storage engine assigned and returns the
    /// record to `Unchanged`. A deleted record keeps no token.
    pub fn accept_changes(&mut self, version: Option<Version>) {
        self.version = version;
        self.state = RecordState::Unchanged;
    }

    pub(crate) fn set_state(&mut self, state: RecordState) {
        self.state = state;
    }

    pub(crate) fn replace_fields(&mut self, fields: FieldMap) {
        self.fields = fields;
    }

    pub(crate) fn set_version(&mut self, version: Option<Version>) {
        self.version = version;
    }
}
