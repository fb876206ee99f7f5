//! Common utilities for Maat integration tests.
//!
//! `MemoryStore` plays the storage engine: first-writer-wins optimistic
//! concurrency with one version token per record, reporting every record that
//! failed version checking in a write. `Session` is a minimal change-tracking
//! session on top of it.
#![allow(dead_code)]

use ahash::AHashMap as HashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use maat::prelude::*;

// --- MemoryStore ---

/// In-memory versioned storage engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, VersionedValue>>,
    version_counter: AtomicU64,
    writes: AtomicUsize,
    fail_next_write: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_version(&self) -> Version {
        Version::new(self.version_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Inserts a record directly, bypassing version checks.
    pub fn seed(&self, key: &str, fields: FieldMap) -> Version {
        let version = self.next_version();
        self.data
            .lock()
            .insert(key.to_string(), VersionedValue::new(fields, version));
        version
    }

    pub fn get(&self, key: &str) -> Option<VersionedValue> {
        self.data.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Number of write calls that reached the engine, successful or not.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next write fail with a storage error.
    pub fn fail_next_write(&self, message: &str) {
        *self.fail_next_write.lock() = Some(message.to_string());
    }

    /// Writes every pending record atomically.
    ///
    /// Either all records pass version checking and are applied, or nothing
    /// is applied and every failing record is reported.
    pub fn write(&self, records: &[RecordHandle]) -> Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next_write.lock().take() {
            return Err(MaatError::Storage(message));
        }

        let mut data = self.data.lock();
        let mut conflicts = ConflictSet::default();

        for handle in records {
            let record = handle.lock();
            let stored = data.get(record.key());
            match record.state() {
                RecordState::Unchanged => {}
                RecordState::Added => {
                    if stored.is_some() {
                        return Err(MaatError::Storage(format!("duplicate key {}", record.key())));
                    }
                }
                RecordState::Modified | RecordState::Deleted => match stored {
                    None => conflicts.push(ConflictedRecord::deleted(handle.clone())),
                    Some(current) if Some(current.version()) != record.version() => {
                        conflicts.push(ConflictedRecord::modified(handle.clone(), current.clone()));
                    }
                    Some(_) => {}
                },
            }
        }

        if !conflicts.is_empty() {
            return Err(MaatError::Conflict(conflicts));
        }

        let mut written = 0;
        for handle in records {
            let mut record = handle.lock();
            match record.state() {
                RecordState::Unchanged => continue,
                RecordState::Added | RecordState::Modified => {
                    let version = self.next_version();
                    data.insert(
                        record.key().clone(),
                        VersionedValue::new(record.fields().clone(), version),
                    );
                    record.accept_changes(Some(version));
                }
                RecordState::Deleted => {
                    data.remove(record.key());
                    record.accept_changes(None);
                }
            }
            written += 1;
        }
        Ok(written)
    }
}

// --- Session ---

/// Change-tracking session bound to a `MemoryStore`.
pub struct Session {
    store: Arc<MemoryStore>,
    records: Vec<RecordHandle>,
    attempts: usize,
}

impl Session {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            records: Vec::new(),
            attempts: 0,
        }
    }

    /// Reads a record from the store and starts tracking it.
    pub fn load(&mut self, key: &str) -> Option<RecordHandle> {
        let stored = self.store.get(key)?;
        let handle =
            PendingRecord::tracked(key, stored.fields().clone(), stored.version()).into_handle();
        self.records.push(handle.clone());
        Some(handle)
    }

    /// Starts tracking a new record to be inserted.
    pub fn add(&mut self, key: &str, fields: FieldMap) -> RecordHandle {
        let handle = PendingRecord::added(key, fields).into_handle();
        self.records.push(handle.clone());
        handle
    }

    pub fn tracked(&self) -> usize {
        self.records.len()
    }

    /// Number of persist attempts made through this session.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl SaveableEntities for Session {
    fn save_changes(&mut self, cancel: &CancellationToken) -> impl Future<Output = Result<usize>> {
        let cancelled = cancel.is_cancelled();
        async move {
            if cancelled {
                return Err(MaatError::Cancelled);
            }
            self.attempts += 1;
            let written = self.store.write(&self.records)?;
            // Records without a token no longer exist in storage.
            self.records.retain(|handle| handle.lock().version().is_some());
            Ok(written)
        }
    }
}

// --- Helper Functions ---

/// Builds a field map from name/value pairs.
pub fn fields<const N: usize>(pairs: [(&str, FieldValue); N]) -> FieldMap {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Seeds a single test model and returns a session that loaded it and
/// changed its `value` field to `proposed`, without saving.
pub fn setup_writer(store: &Arc<MemoryStore>, key: &str, proposed: &str) -> (Session, RecordHandle) {
    if store.get(key).is_none() {
        store.seed(key, fields([("value", FieldValue::from("initial"))]));
    }
    let mut session = Session::new(Arc::clone(store));
    let handle = session.load(key).expect("seeded record must exist");
    handle.lock().set_field("value", proposed);
    (session, handle)
}

/// Builds a conflict set of one record modified elsewhere.
pub fn modified_conflict(handle: &RecordHandle, stored_value: &str, version: u64) -> ConflictSet {
    ConflictSet::new(vec![ConflictedRecord::modified(
        handle.clone(),
        VersionedValue::new(fields([("value", FieldValue::from(stored_value))]), Version::new(version)),
    )])
}
