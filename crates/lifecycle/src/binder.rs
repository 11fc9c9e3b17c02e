//! Entity lifecycle binding
//!
//! `bind_lifecycle` ties an entity's existence to the lifetime of a
//! task: when the task finishes (normal return, error, or cancellation)
//! the entity is deleted, exactly once, through the commit pipeline.
//!
//! The teardown transaction runs with the match context stripped to
//! empty. A bound entity is commonly created under an outer reactive
//! match; when that match is invalidated, the bound task is cancelled,
//! and checking the cleanup transaction against the now-dead match
//! would make cleanup impossible. Stripping the context for the
//! cleanup only breaks that cycle.
//!
//! Teardown is shielded: it never awaits, so a cancellation request
//! cannot interrupt it, but the awaiting party still observes task
//! completion only after the deletion transaction has finished.

use crate::cancel::CancelToken;
use crate::context::{checked_change, MatchRegistry, TaskContext};
use loam_core::{Eid, LoamError, Result};
use loam_pipeline::Chain;
use loam_store::Db;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a bound entity
///
/// `Active → TearingDown → Deleted`, no transitions back. At most one
/// teardown transaction is issued per binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BindState {
    /// Block running
    Active = 0,
    /// Exit trigger fired; deletion transaction in flight
    TearingDown = 1,
    /// Terminal
    Deleted = 2,
}

struct TeardownState {
    db: Db,
    chain: Chain,
    registry: MatchRegistry,
    /// Already stripped to the empty match set
    ctx: TaskContext,
    eid: Eid,
    state: AtomicU8,
}

impl TeardownState {
    /// Issue the deletion transaction if nobody has yet
    ///
    /// Returns None when another exit path already tore down.
    fn run(&self) -> Option<Result<()>> {
        if self
            .state
            .compare_exchange(
                BindState::Active as u8,
                BindState::TearingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return None;
        }
        let eid = self.eid;
        let result = checked_change(&self.db, &self.chain, &self.registry, &self.ctx, |scope| {
            // Already-deleted is success: an external deletion racing
            // with teardown must not turn cleanup into an error.
            scope.delete(eid);
            Ok(())
        });
        self.state.store(BindState::Deleted as u8, Ordering::Release);
        Some(result)
    }
}

/// Backstop for hard-dropped futures
///
/// The cooperative path runs teardown explicitly; this guard only
/// fires when the binding future is dropped without completing (e.g.
/// its task was aborted), and then runs the same exactly-once path.
struct TeardownGuard {
    state: Arc<TeardownState>,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        if let Some(Err(e)) = self.state.run() {
            // No caller left to propagate to on this path.
            tracing::error!(
                eid = %self.state.eid,
                error = %e,
                "lifecycle teardown failed while dropping bound task"
            );
        }
    }
}

/// Bind an entity's existence to a block of work
///
/// Runs `block(eid)` until it completes or `token` is cancelled, then
/// deletes `eid` through `chain`, exactly once, with the match context
/// stripped. Errors from the block propagate after teardown has run;
/// teardown's own failure is surfaced as `LoamError::Teardown`,
/// carrying the primary error when there was one, because a silently
/// dropped cleanup would leak the entity.
///
/// Cancellation surfaces as `Err(LoamError::Cancelled)`, again only
/// after the deletion transaction has finished.
///
/// # Errors
///
/// The block's error, `Cancelled`, or `Teardown`.
pub async fn bind_lifecycle<R, F, Fut>(
    db: &Db,
    chain: &Chain,
    registry: &MatchRegistry,
    ctx: &TaskContext,
    token: &CancelToken,
    eid: Eid,
    block: F,
) -> Result<R>
where
    F: FnOnce(Eid) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let state = Arc::new(TeardownState {
        db: db.clone(),
        chain: chain.clone(),
        registry: registry.clone(),
        ctx: ctx.with_empty_matches(),
        eid,
        state: AtomicU8::new(BindState::Active as u8),
    });
    let guard = TeardownGuard {
        state: Arc::clone(&state),
    };

    let primary = tokio::select! {
        result = block(eid) => Some(result),
        () = token.cancelled() => None,
    };

    // Shielded region: synchronous, no await between here and the
    // store lock, so the deletion cannot be cancelled.
    let teardown_err = match state.run() {
        Some(Err(e)) => Some(e),
        _ => None,
    };
    drop(guard);

    match (primary, teardown_err) {
        (Some(Ok(value)), None) => Ok(value),
        (Some(Err(e)), None) => Err(e),
        (None, None) => Err(LoamError::Cancelled),
        (Some(Ok(_)), Some(t)) => Err(LoamError::Teardown {
            cause: Box::new(t),
            primary: None,
        }),
        (Some(Err(e)), Some(t)) => Err(LoamError::Teardown {
            cause: Box::new(t),
            primary: Some(Box::new(e)),
        }),
        (None, Some(t)) => Err(LoamError::Teardown {
            cause: Box::new(t),
            primary: Some(Box::new(LoamError::Cancelled)),
        }),
    }
}
