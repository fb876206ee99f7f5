use std::future::Future;

use crate::cancel::CancellationToken;
use crate::coordinator;
use crate::errors::Result;
use crate::options::ResolveOptions;

/// Capability of a change-tracking session that can persist its pending records.
///
/// Implementations hand every pending record to the storage engine in one
/// write and report the outcome:
///
/// - `Ok(n)` with the number of records actually written,
/// - `Err(MaatError::Conflict(set))` listing *every* record that failed
///   version checking in that write, each with its current stored values or a
///   deletion marker,
/// - any other `MaatError` for failures that must not be retried.
///
/// Sessions are not meant to be shared across threads while a save is
/// running; the coordinator mutates the pending records between attempts.
///
/// # Examples
///
/// A session that always succeeds:
///
/// ```no_run
/// use maat::prelude::*;
/// use std::future::Future;
///
/// struct Noop;
///
/// impl SaveableEntities for Noop {
///     fn save_changes(&mut self, _cancel: &CancellationToken) -> impl Future<Output = Result<usize>> {
///         async { Ok(0) }
///     }
/// }
///
/// let mut session = Noop;
/// let written = futures::executor::block_on(
///     session.save_changes_resolving((ConflictPolicy::ForceOverwrite, 3)),
/// );
/// assert_eq!(written.unwrap(), 0);
/// ```
pub trait SaveableEntities {
    /// Performs one persist attempt of all pending records.
    ///
    /// # Errors
    ///
    /// Returns `MaatError::Conflict` on version mismatches,
    /// `MaatError::Cancelled` if `cancel` fired during the attempt and
    /// `MaatError::Storage` for anything else.
    fn save_changes(&mut self, cancel: &CancellationToken) -> impl Future<Output = Result<usize>>;

    /// Saves pending changes and resolves any concurrency conflicts encountered.
    ///
    /// `options` accepts [`ResolveOptions::default()`], a bare
    /// [`ConflictPolicy`](crate::ConflictPolicy), or a `(ConflictPolicy, u32)`
    /// pair of policy and retry count.
    fn save_changes_resolving(
        &mut self,
        options: impl Into<ResolveOptions>,
    ) -> impl Future<Output = Result<usize>> {
        let options = options.into();
        async move {
            let cancel = CancellationToken::new();
            coordinator::run(self, &options, &cancel).await
        }
    }

    /// Like [`SaveableEntities::save_changes_resolving`], observing `cancel`
    /// before every attempt.
    fn save_changes_resolving_cancellable(
        &mut self,
        options: impl Into<ResolveOptions>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<usize>> {
        let options = options.into();
        async move { coordinator::run(self, &options, cancel).await }
    }
}
