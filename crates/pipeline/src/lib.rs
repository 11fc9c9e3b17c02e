//! Commit middleware pipeline
//!
//! Every transaction in the system is executed through a composed
//! middleware [`Chain`], never by calling `Db::run_transaction`
//! directly from application code. This keeps cross-cutting behaviors
//! (validation, auditing, replication hooks) unbypassable.
//!
//! A middleware wraps the rest of the chain as a continuation: it must
//! invoke `next` exactly once to let the transaction proceed. The
//! continuation is an `FnOnce`, so invoking it twice is a compile
//! error. A middleware that wants to stop the transaction returns
//! `Err(LoamError::Vetoed { .. })` instead of calling `next`; a veto
//! is always explicit and carries an explanation.
//!
//! Composition is associative but not commutative: in `f + g`, `f`
//! observes the transaction first on the way in and last on the way
//! out. [`Identity`] is the neutral element.

#![warn(missing_docs)]
#![warn(clippy::all)]

use loam_core::{LoamError, Result};
use loam_store::{ChangeScope, Db};
use std::ops::Add;
use std::sync::Arc;

/// Continuation representing the rest of a transaction
///
/// Boxed `FnOnce` over the active change scope; the innermost
/// continuation is the application's change body.
pub type ChangeBody<'a> = Box<dyn FnOnce(&mut ChangeScope<'_>) -> Result<()> + Send + 'a>;

/// An ordered interceptor around the commit pipeline
pub trait Middleware: Send + Sync {
    /// Intercept a transaction
    ///
    /// Must call `next` exactly once to let the transaction proceed.
    /// Returning `Err(LoamError::Vetoed { .. })` without calling `next`
    /// stops the transaction; any mutations staged so far are
    /// discarded by the surrounding scope.
    ///
    /// # Errors
    ///
    /// Propagates errors from `next` and surfaces vetoes.
    fn perform_change<'a>(
        &self,
        scope: &mut ChangeScope<'_>,
        next: ChangeBody<'a>,
    ) -> Result<()>;

    /// Seed entities this middleware depends on
    ///
    /// Invoked once, before any transaction runs, inside its own
    /// change scope. Default is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding fails; the store is then unusable
    /// for this chain.
    fn init_db(&self, scope: &mut ChangeScope<'_>) -> Result<()> {
        let _ = scope;
        Ok(())
    }
}

/// The neutral element of composition
///
/// `Identity + m` and `m + Identity` behave observably like `m` alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Middleware for Identity {
    fn perform_change<'a>(
        &self,
        scope: &mut ChangeScope<'_>,
        next: ChangeBody<'a>,
    ) -> Result<()> {
        next(scope)
    }
}

/// Left-to-right composition of two middlewares
struct Composed {
    outer: Arc<dyn Middleware>,
    inner: Arc<dyn Middleware>,
}

impl Middleware for Composed {
    fn perform_change<'a>(
        &self,
        scope: &mut ChangeScope<'_>,
        next: ChangeBody<'a>,
    ) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.outer
            .perform_change(scope, Box::new(move |s| inner.perform_change(s, next)))
    }

    fn init_db(&self, scope: &mut ChangeScope<'_>) -> Result<()> {
        self.outer.init_db(scope)?;
        self.inner.init_db(scope)
    }
}

/// A composed middleware chain
///
/// Cheap to clone. Build with [`Chain::new`] and compose with `+`:
///
/// ```ignore
/// let chain = Chain::new(audit) + Chain::new(validate);
/// chain.init_db(&db)?;
/// chain.change(&db, |scope| { ... })?;
/// ```
#[derive(Clone)]
pub struct Chain(Arc<dyn Middleware>);

impl Chain {
    /// Wrap a single middleware into a chain
    pub fn new(middleware: impl Middleware + 'static) -> Self {
        Self(Arc::new(middleware))
    }

    /// The identity chain
    pub fn identity() -> Self {
        Self::new(Identity)
    }

    /// Run one transaction through the whole chain
    ///
    /// This is the only sanctioned write path: the chain wraps the
    /// store's `run_transaction` primitive, it never replaces it.
    ///
    /// # Errors
    ///
    /// Surfaces vetoes and body errors; either aborts the transaction.
    pub fn change<F>(&self, db: &Db, body: F) -> Result<()>
    where
        F: FnOnce(&mut ChangeScope<'_>) -> Result<()> + Send,
    {
        db.run_transaction(|scope| self.0.perform_change(scope, Box::new(body)))
    }

    /// Run every middleware's `init_db`, left to right, in one scope
    ///
    /// Call once per store, before the first [`Chain::change`].
    ///
    /// # Errors
    ///
    /// Returns the first seeding failure; nothing is applied then.
    pub fn init_db(&self, db: &Db) -> Result<()> {
        db.run_transaction(|scope| self.0.init_db(scope))
    }

    /// Construct a veto error with an explanation
    pub fn veto(reason: impl Into<String>) -> LoamError {
        LoamError::Vetoed {
            reason: reason.into(),
        }
    }
}

impl Add for Chain {
    type Output = Chain;

    fn add(self, rhs: Chain) -> Chain {
        Chain(Arc::new(Composed {
            outer: self.0,
            inner: rhs.0,
        }))
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Chain(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_core::{Schema, Value};
    use parking_lot::Mutex;

    /// Records enter/exit events around the wrapped continuation
    struct Recorder {
        name: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn perform_change<'a>(
            &self,
            scope: &mut ChangeScope<'_>,
            next: ChangeBody<'a>,
        ) -> Result<()> {
            self.trace.lock().push(format!("enter({})", self.name));
            let result = next(scope);
            self.trace.lock().push(format!("exit({})", self.name));
            result
        }
    }

    fn recorder(name: &'static str, trace: &Arc<Mutex<Vec<String>>>) -> Chain {
        Chain::new(Recorder {
            name,
            trace: Arc::clone(trace),
        })
    }

    fn test_db() -> Db {
        let mut b = Schema::builder();
        b.scalar("title");
        Db::new(b.build())
    }

    #[test]
    fn test_trace_order() {
        let db = test_db();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain = recorder("A", &trace) + recorder("B", &trace);

        chain
            .change(&db, |scope| {
                scope.new_local_entity();
                trace.lock().push("mutation".to_string());
                Ok(())
            })
            .unwrap();

        assert_eq!(
            *trace.lock(),
            vec!["enter(A)", "enter(B)", "mutation", "exit(B)", "exit(A)"]
        );
    }

    #[test]
    fn test_composition_is_associative() {
        let db = test_db();
        let left = Arc::new(Mutex::new(Vec::new()));
        let right = Arc::new(Mutex::new(Vec::new()));

        let lhs = (recorder("A", &left) + recorder("B", &left)) + recorder("C", &left);
        let rhs = recorder("A", &right) + (recorder("B", &right) + recorder("C", &right));

        lhs.change(&db, |_| Ok(())).unwrap();
        rhs.change(&db, |_| Ok(())).unwrap();

        assert_eq!(*left.lock(), *right.lock());
    }

    #[test]
    fn test_identity_is_neutral() {
        let db = test_db();
        let a = Arc::new(Mutex::new(Vec::new()));
        let b = Arc::new(Mutex::new(Vec::new()));
        let c = Arc::new(Mutex::new(Vec::new()));

        recorder("M", &a).change(&db, |_| Ok(())).unwrap();
        (Chain::identity() + recorder("M", &b))
            .change(&db, |_| Ok(()))
            .unwrap();
        (recorder("M", &c) + Chain::identity())
            .change(&db, |_| Ok(()))
            .unwrap();

        assert_eq!(*a.lock(), *b.lock());
        assert_eq!(*a.lock(), *c.lock());
    }

    #[test]
    fn test_veto_aborts_and_explains() {
        struct Veto;
        impl Middleware for Veto {
            fn perform_change<'a>(
                &self,
                _scope: &mut ChangeScope<'_>,
                _next: ChangeBody<'a>,
            ) -> Result<()> {
                Err(Chain::veto("writes are frozen"))
            }
        }

        let db = test_db();
        let chain = Chain::new(Veto) + Chain::identity();
        let err = chain
            .change(&db, |scope| {
                scope.new_local_entity();
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, LoamError::Vetoed { reason } if reason == "writes are frozen"));
        assert_eq!(db.entity_count(), 0);
    }

    #[test]
    fn test_init_db_runs_left_to_right() {
        struct Seeder {
            ident: &'static str,
            order: Arc<Mutex<Vec<&'static str>>>,
        }
        impl Middleware for Seeder {
            fn perform_change<'a>(
                &self,
                scope: &mut ChangeScope<'_>,
                next: ChangeBody<'a>,
            ) -> Result<()> {
                next(scope)
            }
            fn init_db(&self, scope: &mut ChangeScope<'_>) -> Result<()> {
                let (e, _) = scope.new_shared_entity();
                scope.set_ident(e, self.ident)?;
                self.order.lock().push(self.ident);
                Ok(())
            }
        }

        let db = test_db();
        let order = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(Seeder {
            ident: "First",
            order: Arc::clone(&order),
        }) + Chain::new(Seeder {
            ident: "Second",
            order: Arc::clone(&order),
        });

        chain.init_db(&db).unwrap();

        assert_eq!(*order.lock(), vec!["First", "Second"]);
        assert!(db.lookup_ident("First").is_some());
        assert!(db.lookup_ident("Second").is_some());
    }

    #[test]
    fn test_body_error_propagates_through_chain() {
        let db = test_db();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain = recorder("A", &trace);

        let err = chain
            .change(&db, |_| {
                Err(LoamError::Serialization("boom".to_string()))
            })
            .unwrap_err();

        assert!(matches!(err, LoamError::Serialization(_)));
        // Middleware still observed the exit
        assert_eq!(*trace.lock(), vec!["enter(A)", "exit(A)"]);
    }

    #[test]
    fn test_mutations_inside_chain_commit() {
        let db = test_db();
        let chain = Chain::identity() + Chain::identity();
        chain
            .change(&db, |scope| {
                let e = scope.new_local_entity();
                scope.set(e, loam_core::Attr::from_raw(0), Value::Int(7))
            })
            .unwrap();
        assert_eq!(db.entity_count(), 1);
    }
}
