//! The Db handle
//!
//! This module implements the store entry point:
//! - `parking_lot::RwLock` over the side tables for thread-safe access
//! - `run_transaction`: the change-scope primitive every mutation path
//!   bottoms out in
//! - snapshot-consistent read API
//!
//! # Design Notes
//!
//! - **One write lock per transaction**: visible effects of
//!   transactions are serialized; readers never observe a partially
//!   applied scope.
//! - **Eager id minting**: aborted transactions may burn ids; ids are
//!   never reused within a store instance.

use crate::scope::ChangeScope;
use crate::tables::Tables;
use loam_core::{Attr, Eid, Ident, Resolver, Result, Schema, Uid, Value};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to an in-process EAV store
///
/// Cheap to clone; all clones see the same store. All mutation access
/// goes through [`Db::run_transaction`]; there is no other write path.
#[derive(Clone)]
pub struct Db {
    inner: Arc<DbInner>,
}

struct DbInner {
    schema: Schema,
    tables: RwLock<Tables>,
}

impl Db {
    /// Create an empty store over a frozen schema
    pub fn new(schema: Schema) -> Self {
        Self {
            inner: Arc::new(DbInner {
                schema,
                tables: RwLock::new(Tables::default()),
            }),
        }
    }

    /// The store's attribute schema
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Run a transaction
    ///
    /// Exactly one [`ChangeScope`] is active for the duration of the
    /// body. All staged mutations apply atomically when the body
    /// returns `Ok`; an `Err` discards every staged operation (minted
    /// ids stay burned).
    ///
    /// This is the change-scope primitive. Application code should go
    /// through the commit pipeline's `Chain::change` instead, so that
    /// middleware is never bypassed.
    ///
    /// # Errors
    ///
    /// Propagates whatever the body returns.
    pub fn run_transaction<R>(
        &self,
        body: impl FnOnce(&mut ChangeScope<'_>) -> Result<R>,
    ) -> Result<R> {
        let mut tables = self.inner.tables.write();
        let mut scope = ChangeScope::new(&self.inner.schema, &mut tables);
        match body(&mut scope) {
            Ok(result) => {
                scope.apply();
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether an entity currently exists
    pub fn exists(&self, eid: Eid) -> bool {
        self.inner.tables.read().is_live(eid)
    }

    /// Committed value of an attribute
    pub fn value(&self, eid: Eid, attr: Attr) -> Option<Value> {
        self.inner.tables.read().value(eid, attr)
    }

    /// Find the entity carrying a Uid
    pub fn lookup_uid(&self, uid: &Uid) -> Option<Eid> {
        self.inner.tables.read().eid_by_uid(uid)
    }

    /// Find the type-marker entity carrying an Ident
    pub fn lookup_ident(&self, ident: &str) -> Option<Eid> {
        self.inner.tables.read().eid_by_ident(ident)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.inner.tables.read().live_count()
    }
}

impl Resolver for Db {
    fn resolve_uid(&self, eid: Eid) -> Option<Uid> {
        self.inner.tables.read().uid_of(eid)
    }

    fn resolve_ident(&self, eid: Eid) -> Option<Ident> {
        self.inner.tables.read().ident_of(eid)
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("entities", &self.entity_count())
            .field("attributes", &self.inner.schema.len())
            .finish()
    }
}
