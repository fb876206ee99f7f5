use futures::executor::block_on;
use log::{debug, warn};
use std::future::Future;

use crate::cancel::CancellationToken;
use crate::conflict::resolution::resolve_all;
use crate::entities::SaveableEntities;
use crate::errors::{MaatError, Result};
use crate::options::{ExhaustionPolicy, ResolveOptions};

/// Attempts a persist operation and resolves any concurrency conflicts it reports.
///
/// `attempt` is invoked at most `max_retries + 2` times: the first attempt,
/// one resubmission of the resolved records and `max_retries` further
/// resubmissions. After every conflict the reported records are corrected in
/// place according to the policy and the operation is retried.
///
/// # Arguments
///
/// * `attempt` - Performs one write and reports conflicts as `MaatError::Conflict`.
/// * `options` - Policy, retry count and exhaustion behaviour.
///
/// # Returns
///
/// The number of records written by the successful attempt, or `Ok(0)` when
/// the budget ran out under [`ExhaustionPolicy::Swallow`].
///
/// # Errors
///
/// - `MaatError::Conflict` on the first conflict under `ConflictPolicy::Default`.
/// - `MaatError::RetriesExhausted` when every attempt conflicted under
///   [`ExhaustionPolicy::Surface`].
/// - Any other error from `attempt`, unchanged and without retrying.
///
/// # Examples
///
/// ```no_run
/// use maat::prelude::*;
///
/// let written = futures::executor::block_on(save_with_resolution(
///     || async { Ok(1) },
///     ConflictPolicy::SkipConflicting,
/// ));
/// assert_eq!(written.unwrap(), 1);
/// ```
pub async fn save_with_resolution<F, Fut>(attempt: F, options: impl Into<ResolveOptions>) -> Result<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<usize>>,
{
    let cancel = CancellationToken::new();
    save_with_resolution_cancellable(attempt, options, &cancel).await
}

/// Like [`save_with_resolution`], returning `MaatError::Cancelled` as soon as
/// `cancel` is observed before an attempt.
pub async fn save_with_resolution_cancellable<F, Fut>(
    attempt: F,
    options: impl Into<ResolveOptions>,
    cancel: &CancellationToken,
) -> Result<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<usize>>,
{
    let options = options.into();
    let mut entities = FnEntities { attempt };
    run(&mut entities, &options, cancel).await
}

/// Blocking variant of [`save_with_resolution`] for callers outside an async runtime.
///
/// Drives the retry loop on the current thread. Must not be called from
/// within another executor.
pub fn save_with_resolution_blocking<F, Fut>(attempt: F, options: impl Into<ResolveOptions>) -> Result<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<usize>>,
{
    block_on(save_with_resolution(attempt, options))
}

/// Adapts a zero-argument persist callback to [`SaveableEntities`].
struct FnEntities<F> {
    attempt: F,
}

impl<F, Fut> SaveableEntities for FnEntities<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<usize>>,
{
    fn save_changes(&mut self, _cancel: &CancellationToken) -> impl Future<Output = Result<usize>> {
        (self.attempt)()
    }
}

pub(crate) async fn run<E>(
    entities: &mut E,
    options: &ResolveOptions,
    cancel: &CancellationToken,
) -> Result<usize>
where
    E: SaveableEntities + ?Sized,
{
    let max_attempts = options.max_attempts();
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            debug!("Save cancelled before attempt {}.", attempt + 1);
            return Err(MaatError::Cancelled);
        }
        attempt += 1;

        let conflicts = match entities.save_changes(cancel).await {
            Ok(affected) => {
                debug!("Save succeeded on attempt {}/{}. {} record(s) written.", attempt, max_attempts, affected);
                return Ok(affected);
            }
            Err(MaatError::Conflict(conflicts)) => conflicts,
            Err(e) => return Err(e),
        };

        let Some(resolution) = options.policy.resolution() else {
            debug!("Conflict detected on {} record(s). Policy: Default. Conflict is fatal.", conflicts.len());
            return Err(MaatError::Conflict(conflicts));
        };

        debug!(
            "Conflict detected on {} record(s) in attempt {}/{}. Resolution: {:?}.",
            conflicts.len(),
            attempt,
            max_attempts,
            resolution
        );
        resolve_all(&conflicts, resolution);

        if attempt >= max_attempts {
            warn!(
                "Giving up after {} attempt(s) with {} record(s) still conflicting.",
                attempt,
                conflicts.len()
            );
            return match options.on_exhausted {
                ExhaustionPolicy::Surface => Err(MaatError::RetriesExhausted { attempts: attempt, conflicts }),
                ExhaustionPolicy::Swallow => Ok(0),
            };
        }
    }
}
