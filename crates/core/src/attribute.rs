//! Attribute schema
//!
//! This module defines:
//! - Attr: attribute identifier
//! - AttrKind: reference vs scalar discrimination
//! - AttrSchema: per-attribute declaration
//! - Schema: immutable attribute registry, built once via SchemaBuilder
//!
//! Every attribute declares up front whether its value is a reference
//! (another entity, by Eid) or a scalar (an opaque value with a
//! registered serializer). The schema is frozen before the store runs
//! any transaction; there is no dynamic attribute registration.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute identifier
///
/// A small integer handle into the schema. Attr values are assigned by
/// the schema builder in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attr(u32);

impl Attr {
    /// Create an Attr from a raw id
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Raw id value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attr/{}", self.0)
    }
}

/// Whether an attribute holds references or scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrKind {
    /// Value is another entity, identified by Eid
    Ref,
    /// Value is an opaque scalar with an attribute-specific serializer
    Scalar,
}

/// Declaration of a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrSchema {
    /// Human-readable attribute name (diagnostics and errors)
    pub name: String,
    /// Reference or scalar
    pub kind: AttrKind,
    /// Marks the identity schema: entities carrying this attribute are
    /// type markers and serialize by Ident, never by Uid
    pub ident_schema: bool,
}

/// Immutable attribute registry
///
/// Built once through [`SchemaBuilder`]; lookups never mutate.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attrs: FxHashMap<Attr, AttrSchema>,
}

impl Schema {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Look up the declaration for an attribute
    pub fn lookup(&self, attr: Attr) -> Option<&AttrSchema> {
        self.attrs.get(&attr)
    }

    /// Kind of an attribute, if declared
    pub fn kind_of(&self, attr: Attr) -> Option<AttrKind> {
        self.attrs.get(&attr).map(|s| s.kind)
    }

    /// Name of an attribute, or a placeholder for undeclared ids
    pub fn name_of(&self, attr: Attr) -> &str {
        self.attrs
            .get(&attr)
            .map(|s| s.name.as_str())
            .unwrap_or("<undeclared>")
    }

    /// Number of declared attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// True if no attributes are declared
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Builder assigning Attr ids in registration order
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    attrs: FxHashMap<Attr, AttrSchema>,
    next_id: u32,
}

impl SchemaBuilder {
    fn push(&mut self, schema: AttrSchema) -> Attr {
        let attr = Attr(self.next_id);
        self.next_id += 1;
        self.attrs.insert(attr, schema);
        attr
    }

    /// Declare a reference attribute
    pub fn reference(&mut self, name: impl Into<String>) -> Attr {
        self.push(AttrSchema {
            name: name.into(),
            kind: AttrKind::Ref,
            ident_schema: false,
        })
    }

    /// Declare a scalar attribute
    pub fn scalar(&mut self, name: impl Into<String>) -> Attr {
        self.push(AttrSchema {
            name: name.into(),
            kind: AttrKind::Scalar,
            ident_schema: false,
        })
    }

    /// Declare the identity-schema reference attribute
    ///
    /// Entities reachable through this attribute are type markers.
    pub fn identity(&mut self, name: impl Into<String>) -> Attr {
        self.push(AttrSchema {
            name: name.into(),
            kind: AttrKind::Ref,
            ident_schema: true,
        })
    }

    /// Freeze the schema
    pub fn build(self) -> Schema {
        Schema { attrs: self.attrs }
    }
}
