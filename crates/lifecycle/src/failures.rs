//! Secondary-failure policy
//!
//! Components that run many independent units of work (reactive
//! subscribers, pool workers) normally isolate a failing unit: log and
//! keep going. Under strict-failure mode the same failure aborts the
//! owning task instead. The mode is pure policy, carried by the
//! ambient [`TaskContext`](crate::TaskContext) and inherited by child
//! tasks.

use crate::context::TaskContext;
use loam_core::Result;

/// Run a unit of work under the context's secondary-failure policy
///
/// Lenient mode (the default): a failure is logged and isolated; the
/// caller continues. Strict mode: the failure propagates to terminate
/// the owning task/scope.
///
/// # Errors
///
/// Only in strict mode, and only the unit's own error.
pub fn guard_secondary<F>(ctx: &TaskContext, label: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match f() {
        Ok(()) => Ok(()),
        Err(e) if ctx.strict_failures() => Err(e),
        Err(e) => {
            tracing::warn!(unit = label, error = %e, "secondary failure isolated");
            Ok(())
        }
    }
}
