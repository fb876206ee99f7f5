use std::fmt;

use crate::data_store::pending_record::RecordHandle;
use crate::data_store::versioned_value::VersionedValue;

/// A record that failed version checking during one persist attempt.
///
/// Produced by the storage collaborator, consumed right away by the resolver.
/// `current` is `None` when the record no longer exists in storage.
#[derive(Clone)]
pub struct ConflictedRecord {
    record: RecordHandle,
    current: Option<VersionedValue>,
}

impl ConflictedRecord {
    /// Reports a conflict on a record that still exists with other values.
    pub fn modified(record: RecordHandle, current: VersionedValue) -> Self {
        Self {
            record,
            current: Some(current),
        }
    }

    /// Reports a conflict on a record that was deleted by another writer.
    pub fn deleted(record: RecordHandle) -> Self {
        Self {
            record,
            current: None,
        }
    }

    /// The pending record the conflict refers to.
    pub fn record(&self) -> &RecordHandle {
        &self.record
    }

    /// The values currently stored, if the record still exists.
    pub fn current(&self) -> Option<&VersionedValue> {
        self.current.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.current.is_none()
    }
}

impl fmt::Debug for ConflictedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid blocking on a record another party holds locked.
        let key = self.record.try_lock().map(|record| record.key().clone());
        f.debug_struct("ConflictedRecord")
            .field("key", &key)
            .field("current", &self.current)
            .finish()
    }
}

/// Every record that failed version checking within one persist attempt.
#[derive(Debug, Clone, Default)]
pub struct ConflictSet {
    records: Vec<ConflictedRecord>,
}

impl ConflictSet {
    pub fn new(records: Vec<ConflictedRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: ConflictedRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConflictedRecord> {
        self.records.iter()
    }
}

impl FromIterator<ConflictedRecord> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = ConflictedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ConflictSet {
    type Item = ConflictedRecord;
    type IntoIter = std::vec::IntoIter<ConflictedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConflictSet {
    type Item = &'a ConflictedRecord;
    type IntoIter = std::slice::Iter<'a, ConflictedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
