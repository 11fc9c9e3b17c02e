//! Stable-identity resolution seam
//!
//! The durable codec never touches store internals; it resolves Eids to
//! stable identities through this trait. The store implements it, and
//! tests substitute table-backed fakes.

use crate::ids::{Eid, Ident, Uid};

/// Resolves process-local Eids to their stable identities
pub trait Resolver {
    /// Stable Uid of an entity, if it has one
    fn resolve_uid(&self, eid: Eid) -> Option<Uid>;

    /// Ident of a type-marker entity, if it is one
    fn resolve_ident(&self, eid: Eid) -> Option<Ident>;
}

/// Resolver over explicit lookup tables (test support)
#[derive(Debug, Default, Clone)]
pub struct TableResolver {
    uids: Vec<(Eid, Uid)>,
    idents: Vec<(Eid, Ident)>,
}

impl TableResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a Uid with an entity
    pub fn with_uid(mut self, eid: Eid, uid: Uid) -> Self {
        self.uids.push((eid, uid));
        self
    }

    /// Associate an Ident with an entity
    pub fn with_ident(mut self, eid: Eid, ident: Ident) -> Self {
        self.idents.push((eid, ident));
        self
    }
}

impl Resolver for TableResolver {
    fn resolve_uid(&self, eid: Eid) -> Option<Uid> {
        self.uids.iter().find(|(e, _)| *e == eid).map(|(_, u)| *u)
    }

    fn resolve_ident(&self, eid: Eid) -> Option<Ident> {
        self.idents
            .iter()
            .find(|(e, _)| *e == eid)
            .map(|(_, i)| i.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_resolver_lookups() {
        let e = Eid::shared(1);
        let uid = Uid::new();
        let r = TableResolver::new()
            .with_uid(e, uid)
            .with_ident(Eid::shared(2), Ident::new("Marker"));

        assert_eq!(r.resolve_uid(e), Some(uid));
        assert_eq!(r.resolve_uid(Eid::local(1)), None);
        assert_eq!(
            r.resolve_ident(Eid::shared(2)),
            Some(Ident::new("Marker"))
        );
        assert_eq!(r.resolve_ident(e), None);
    }
}
