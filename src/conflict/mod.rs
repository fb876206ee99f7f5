/// Conflict reports produced by the storage collaborator.
pub mod report;
/// Policies and the per-record two-way merge.
pub mod resolution;
