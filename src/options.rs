use serde::{Deserialize, Serialize};

use crate::conflict::resolution::ConflictPolicy;

/// What the coordinator reports once the retry budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Return [`MaatError::RetriesExhausted`](crate::MaatError::RetriesExhausted)
    /// carrying the last unresolved conflict set.
    #[default]
    Surface,
    /// Return `Ok(0)`: nothing was committed and the resolved records are left
    /// for the caller to inspect or resubmit.
    Swallow,
}

/// Configuration of a save with conflict resolution.
///
/// Converts from a bare [`ConflictPolicy`] (`max_retries` of 0) and from a
/// `(ConflictPolicy, u32)` pair, so callers can pass whichever is shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// The approach taken when a conflict is reported.
    pub policy: ConflictPolicy,
    /// Extra resolve-and-resubmit rounds after the first resubmission.
    ///
    /// A resolved conflict set is always resubmitted once, so `0` allows one
    /// resolution followed by one more attempt.
    pub max_retries: u32,
    /// Outcome once every attempt ended in a conflict.
    pub on_exhausted: ExhaustionPolicy,
}

impl ResolveOptions {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_exhaustion(mut self, on_exhausted: ExhaustionPolicy) -> Self {
        self.on_exhausted = on_exhausted;
        self
    }

    /// Total number of persist attempts this configuration allows: the
    /// first attempt, the resubmission of its resolved records and
    /// `max_retries` further resubmissions.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(2)
    }
}

impl From<ConflictPolicy> for ResolveOptions {
    fn from(policy: ConflictPolicy) -> Self {
        Self::new(policy)
    }
}

impl From<(ConflictPolicy, u32)> for ResolveOptions {
    fn from((policy, max_retries): (ConflictPolicy, u32)) -> Self {
        Self::new(policy).with_max_retries(max_retries)
    }
}
