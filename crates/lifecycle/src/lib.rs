//! Entity lifecycle binding and ambient task context
//!
//! This crate ties derived entities to the lifetime of concurrent
//! tasks:
//! - TaskContext: immutable, inheritable per-task context (reactive
//!   match dependencies + strict-failure flag)
//! - MatchRegistry: the reactive-match boundary
//! - CancelToken: cooperative cancellation
//! - bind_lifecycle: exactly-once, non-cancellable entity teardown on
//!   every exit path
//! - guard_secondary: lenient vs strict secondary-failure policy

#![warn(missing_docs)]
#![warn(clippy::all)]

mod binder;
mod cancel;
mod context;
mod failures;

pub use binder::{bind_lifecycle, BindState};
pub use cancel::CancelToken;
pub use context::{checked_change, MatchId, MatchRegistry, TaskContext};
pub use failures::guard_secondary;
