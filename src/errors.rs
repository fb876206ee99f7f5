use thiserror::Error;

use crate::conflict::report::ConflictSet;

#[derive(Error, Debug)]
pub enum MaatError {
    #[error("Concurrency conflict detected on {} record(s)", .0.len())]
    Conflict(ConflictSet),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Conflicts still unresolved after {attempts} attempt(s) ({} record(s))", .conflicts.len())]
    RetriesExhausted { attempts: u32, conflicts: ConflictSet },
}

impl MaatError {
    /// Returns `true` for a version-check failure reported by storage.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MaatError::Conflict(_))
    }

    /// The conflicts carried by this error, if any.
    pub fn conflicts(&self) -> Option<&ConflictSet> {
        match self {
            MaatError::Conflict(conflicts) | MaatError::RetriesExhausted { conflicts, .. } => {
                Some(conflicts)
            }
            MaatError::Storage(_) | MaatError::Cancelled => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MaatError>;
