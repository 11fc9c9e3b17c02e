//! Ambient task context
//!
//! This module defines:
//! - MatchId / MatchRegistry: the reactive-match boundary consumed by
//!   context-checked transactions
//! - TaskContext: the immutable, inheritable context value threaded
//!   explicitly through task-spawning calls
//!
//! The context is a value, not thread-local state: stripping it for
//! one sub-call is a pure, local, race-free operation, which is what
//! lifecycle teardown relies on.

use dashmap::DashMap;
use loam_core::{LoamError, Result};
use loam_pipeline::Chain;
use loam_store::{ChangeScope, Db};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier of a live reactive match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchId(u64);

impl MatchId {
    /// Raw id value (diagnostics and errors)
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match/{}", self.0)
    }
}

/// Registry of reactive matches and their validity
///
/// Stands in for the external query engine at this core's boundary:
/// matches are created when a reactive query produces a result and
/// invalidated when that result stops holding. Cheap to clone; all
/// clones share state.
#[derive(Clone, Default)]
pub struct MatchRegistry {
    valid: Arc<DashMap<u64, ()>>,
    next: Arc<AtomicU64>,
}

impl MatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new live match
    pub fn create(&self) -> MatchId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.valid.insert(id, ());
        MatchId(id)
    }

    /// Invalidate a match; idempotent
    pub fn invalidate(&self, id: MatchId) {
        self.valid.remove(&id.0);
    }

    /// Whether a match is still valid
    pub fn is_valid(&self, id: MatchId) -> bool {
        self.valid.contains_key(&id.0)
    }
}

impl fmt::Debug for MatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchRegistry")
            .field("live", &self.valid.len())
            .finish()
    }
}

/// Immutable, inheritable per-task context
///
/// Carries the set of reactive matches this task's execution depends
/// on and the strict-failure flag. Child tasks inherit by cloning;
/// every transformer returns a new value and leaves the original
/// untouched.
///
/// Strict-failure mode is never set implicitly by production code;
/// only whoever constructs the top-level context (typically a test
/// harness) calls [`TaskContext::with_strict_failures`].
#[derive(Clone, Default)]
pub struct TaskContext {
    matches: Arc<[MatchId]>,
    strict_failures: bool,
}

impl TaskContext {
    /// The root context: no matches, lenient failure mode
    pub fn root() -> Self {
        Self::default()
    }

    /// Context extended with one more live match dependency
    pub fn with_match(&self, id: MatchId) -> Self {
        let mut matches: Vec<MatchId> = self.matches.to_vec();
        matches.push(id);
        Self {
            matches: matches.into(),
            strict_failures: self.strict_failures,
        }
    }

    /// Context with the match set stripped to empty
    ///
    /// Used by lifecycle teardown so that a cleanup transaction is
    /// never checked against an already-invalidated ambient match.
    pub fn with_empty_matches(&self) -> Self {
        Self {
            matches: Arc::from([]),
            strict_failures: self.strict_failures,
        }
    }

    /// Context with strict-failure mode enabled
    pub fn with_strict_failures(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            strict_failures: true,
        }
    }

    /// Matches this task's execution depends on
    pub fn matches(&self) -> &[MatchId] {
        &self.matches
    }

    /// Whether secondary failures abort the owning scope
    pub fn strict_failures(&self) -> bool {
        self.strict_failures
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("matches", &self.matches.len())
            .field("strict_failures", &self.strict_failures)
            .finish()
    }
}

/// Run a transaction after checking the context's match dependencies
///
/// Fails with `MatchInvalidated` (before any mutation is staged) if
/// any match the context depends on is no longer valid. A context with
/// an empty match set passes vacuously; that is exactly what teardown
/// exploits.
///
/// # Errors
///
/// `MatchInvalidated`, or whatever the chain/body surface.
pub fn checked_change<F>(
    db: &Db,
    chain: &Chain,
    registry: &MatchRegistry,
    ctx: &TaskContext,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut ChangeScope<'_>) -> Result<()> + Send,
{
    for id in ctx.matches() {
        if !registry.is_valid(*id) {
            return Err(LoamError::MatchInvalidated { match_id: id.raw() });
        }
    }
    chain.change(db, body)
}
