use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data_store::field_value::{FieldMap, FieldValue};

/// An opaque concurrency token stored alongside a record.
///
/// The storage engine changes the token on every successful write. A write is
/// only accepted when the token the writer last read still matches the one
/// currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Wraps a raw token value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The values of a record as currently held by the storage engine.
///
/// A storage collaborator attaches one of these to every record that failed
/// version checking and still exists, so the resolver can decide between the
/// writer's proposal and what is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedValue {
    /// The stored field values.
    fields: FieldMap,
    /// The version token that guards the stored values.
    version: Version,
}

impl VersionedValue {
    /// Creates a new `VersionedValue`.
    ///
    /// # Arguments
    ///
    /// * `fields` - The field values currently stored.
    /// * `version` - The version token currently stored with those values.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use maat::prelude::*;
    ///
    /// let mut fields = FieldMap::new();
    /// fields.insert("title".to_string(), FieldValue::from("stored"));
    ///
    /// let stored = VersionedValue::new(fields, Version::new(7));
    /// assert_eq!(stored.version(), Version::new(7));
    /// ```
    pub fn new(fields: FieldMap, version: Version) -> Self {
        Self { fields, version }
    }

    /// Returns the stored field values.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Returns a single stored field value.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the stored version token.
    pub fn version(&self) -> Version {
        self.version
    }
}
