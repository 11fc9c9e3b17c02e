//! Change scopes
//!
//! A ChangeScope is the transactional context in which mutations are
//! legal. All mutations are staged in an operation buffer and applied
//! to the side tables only when the transaction body returns `Ok`;
//! concurrent readers never observe partial application.
//!
//! Eids (and Uids for shared entities) are minted eagerly so that ids
//! are never reused, even when the transaction aborts.

use crate::tables::Tables;
use loam_core::{Attr, AttrKind, Eid, Ident, LoamError, Partition, Result, Schema, Uid, Value};

/// A single staged mutation
#[derive(Debug, Clone)]
pub(crate) enum Op {
    /// Bring a freshly minted entity to life
    Create { eid: Eid, uid: Option<Uid> },
    /// Mark an entity as a type marker
    SetIdent { eid: Eid, ident: Ident },
    /// Write an attribute value
    Set { eid: Eid, attr: Attr, value: Value },
    /// Remove an attribute value
    Retract { eid: Eid, attr: Attr },
    /// Destroy an entity and all its side-table rows
    Delete { eid: Eid },
}

/// Transactional mutation context
///
/// Obtained only through `Db::run_transaction`; exactly one scope is
/// active per transaction. Mutations are schema-checked at staging
/// time and buffered until commit.
pub struct ChangeScope<'a> {
    schema: &'a Schema,
    tables: &'a mut Tables,
    ops: Vec<Op>,
}

impl<'a> ChangeScope<'a> {
    pub(crate) fn new(schema: &'a Schema, tables: &'a mut Tables) -> Self {
        Self {
            schema,
            tables,
            ops: Vec::new(),
        }
    }

    /// Mint a new entity in the local partition
    ///
    /// Local entities have no stable identity and cannot be referenced
    /// from serialized data.
    pub fn new_local_entity(&mut self) -> Eid {
        let eid = self.tables.mint(Partition::Local);
        self.ops.push(Op::Create { eid, uid: None });
        eid
    }

    /// Mint a new entity in the shared partition
    ///
    /// Shared entities always receive their Uid at creation; this makes
    /// the "shared implies Uid" invariant structural.
    pub fn new_shared_entity(&mut self) -> (Eid, Uid) {
        let eid = self.tables.mint(Partition::Shared);
        let uid = Uid::new();
        self.ops.push(Op::Create {
            eid,
            uid: Some(uid),
        });
        (eid, uid)
    }

    /// Mark an entity as a type marker with a stable textual identity
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity does not exist in this
    /// scope's view.
    pub fn set_ident(&mut self, eid: Eid, ident: impl Into<Ident>) -> Result<()> {
        if !self.exists(eid) {
            return Err(LoamError::EntityNotFound { eid });
        }
        self.ops.push(Op::SetIdent {
            eid,
            ident: ident.into(),
        });
        Ok(())
    }

    /// Write an attribute value
    ///
    /// The value shape is checked against the attribute's declared
    /// kind: `Value::Ref` only on reference attributes, scalar values
    /// only on scalar attributes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute`, `NotReference`/`NotScalar` on schema
    /// mismatch, or `EntityNotFound` if the entity does not exist.
    pub fn set(&mut self, eid: Eid, attr: Attr, value: Value) -> Result<()> {
        if !self.exists(eid) {
            return Err(LoamError::EntityNotFound { eid });
        }
        let kind = self
            .schema
            .kind_of(attr)
            .ok_or(LoamError::UnknownAttribute { attr })?;
        match (kind, value.is_ref()) {
            (AttrKind::Ref, false) => return Err(LoamError::NotScalar { attr }),
            (AttrKind::Scalar, true) => return Err(LoamError::NotReference { attr }),
            _ => {}
        }
        self.ops.push(Op::Set { eid, attr, value });
        Ok(())
    }

    /// Remove an attribute value, if present
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity does not exist.
    pub fn retract(&mut self, eid: Eid, attr: Attr) -> Result<()> {
        if !self.exists(eid) {
            return Err(LoamError::EntityNotFound { eid });
        }
        self.ops.push(Op::Retract { eid, attr });
        Ok(())
    }

    /// Destroy an entity
    ///
    /// Deleting an entity that is already gone is success, not an
    /// error: returns `false` and stages nothing. This keeps teardown
    /// races (external deletion vs lifecycle cleanup) idempotent.
    pub fn delete(&mut self, eid: Eid) -> bool {
        if !self.exists(eid) {
            return false;
        }
        self.ops.push(Op::Delete { eid });
        true
    }

    /// Whether an entity exists in this scope's view
    ///
    /// Sees both committed state and this scope's staged creations and
    /// deletions (read-your-writes).
    pub fn exists(&self, eid: Eid) -> bool {
        let mut alive = self.tables.is_live(eid);
        for op in &self.ops {
            match op {
                Op::Create { eid: e, .. } if *e == eid => alive = true,
                Op::Delete { eid: e } if *e == eid => alive = false,
                _ => {}
            }
        }
        alive
    }

    /// Current value of an attribute in this scope's view
    pub fn value(&self, eid: Eid, attr: Attr) -> Option<Value> {
        if !self.exists(eid) {
            return None;
        }
        let mut current = self.tables.value(eid, attr);
        for op in &self.ops {
            match op {
                Op::Set {
                    eid: e,
                    attr: a,
                    value,
                } if *e == eid && *a == attr => current = Some(value.clone()),
                Op::Retract { eid: e, attr: a } if *e == eid && *a == attr => current = None,
                Op::Delete { eid: e } if *e == eid => current = None,
                _ => {}
            }
        }
        current
    }

    /// Number of staged operations (diagnostics)
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Apply all staged operations to the tables
    pub(crate) fn apply(self) {
        for op in self.ops {
            match op {
                Op::Create { eid, uid } => self.tables.create(eid, uid),
                Op::SetIdent { eid, ident } => self.tables.set_ident(eid, ident),
                Op::Set { eid, attr, value } => self.tables.set(eid, attr, value),
                Op::Retract { eid, attr } => self.tables.retract(eid, attr),
                Op::Delete { eid } => self.tables.delete(eid),
            }
        }
    }
}
