//! Side tables
//!
//! Arena + index layout: entities are opaque handles into separate
//! indexed tables (attribute rows, Uid and Ident lookups in both
//! directions). Nothing links entities to each other directly, which
//! keeps the graph free of cyclic ownership.

use loam_core::{Attr, Eid, Ident, Partition, Uid, Value};
use rustc_hash::{FxHashMap, FxHashSet};

/// All committed store state
///
/// Lives behind the `Db` lock; mutated only by applied change scopes,
/// except for id minting, which advances counters eagerly so that ids
/// are never reused even across aborted transactions.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// Live entities
    live: FxHashSet<Eid>,
    /// The EAV table: entity -> attribute -> value
    attrs: FxHashMap<Eid, FxHashMap<Attr, Value>>,
    /// Stable identity side tables
    uids: FxHashMap<Eid, Uid>,
    uids_rev: FxHashMap<Uid, Eid>,
    /// Type-marker side tables
    idents: FxHashMap<Eid, Ident>,
    idents_rev: FxHashMap<String, Eid>,
    /// Per-partition sequence counters
    next_local: u64,
    next_shared: u64,
}

impl Tables {
    /// Mint a fresh Eid in the given partition
    pub(crate) fn mint(&mut self, partition: Partition) -> Eid {
        match partition {
            Partition::Local => {
                let seq = self.next_local;
                self.next_local += 1;
                Eid::local(seq)
            }
            Partition::Shared => {
                let seq = self.next_shared;
                self.next_shared += 1;
                Eid::shared(seq)
            }
        }
    }

    pub(crate) fn create(&mut self, eid: Eid, uid: Option<Uid>) {
        debug_assert!(
            uid.is_some() || !eid.is_shared(),
            "shared entities must be created with a uid"
        );
        self.live.insert(eid);
        if let Some(uid) = uid {
            self.uids.insert(eid, uid);
            self.uids_rev.insert(uid, eid);
        }
    }

    pub(crate) fn set_ident(&mut self, eid: Eid, ident: Ident) {
        self.idents_rev.insert(ident.as_str().to_string(), eid);
        self.idents.insert(eid, ident);
    }

    pub(crate) fn set(&mut self, eid: Eid, attr: Attr, value: Value) {
        self.attrs.entry(eid).or_default().insert(attr, value);
    }

    pub(crate) fn retract(&mut self, eid: Eid, attr: Attr) {
        if let Some(row) = self.attrs.get_mut(&eid) {
            row.remove(&attr);
        }
    }

    pub(crate) fn delete(&mut self, eid: Eid) {
        self.live.remove(&eid);
        self.attrs.remove(&eid);
        if let Some(uid) = self.uids.remove(&eid) {
            self.uids_rev.remove(&uid);
        }
        if let Some(ident) = self.idents.remove(&eid) {
            self.idents_rev.remove(ident.as_str());
        }
    }

    pub(crate) fn is_live(&self, eid: Eid) -> bool {
        self.live.contains(&eid)
    }

    pub(crate) fn value(&self, eid: Eid, attr: Attr) -> Option<Value> {
        self.attrs.get(&eid).and_then(|row| row.get(&attr)).cloned()
    }

    pub(crate) fn uid_of(&self, eid: Eid) -> Option<Uid> {
        self.uids.get(&eid).copied()
    }

    pub(crate) fn ident_of(&self, eid: Eid) -> Option<Ident> {
        self.idents.get(&eid).cloned()
    }

    pub(crate) fn eid_by_uid(&self, uid: &Uid) -> Option<Eid> {
        self.uids_rev.get(uid).copied()
    }

    pub(crate) fn eid_by_ident(&self, ident: &str) -> Option<Eid> {
        self.idents_rev.get(ident).copied()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }
}
