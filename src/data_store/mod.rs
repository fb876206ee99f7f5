/// Scalar field values, keys and field maps.
pub mod field_value;
/// Records queued for persistence and their lifecycle.
pub mod pending_record;
/// Stored record snapshots guarded by version tokens.
pub mod versioned_value;
