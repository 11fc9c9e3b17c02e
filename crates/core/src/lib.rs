//! Core types for the Loam store
//!
//! This crate defines the foundational types used throughout the system:
//! - Eid / Uid / Ident: the three identity spaces of the data model
//! - Partition: local vs shared id-space split
//! - Value: unified live attribute value enum
//! - Attr / Schema: attribute declarations (reference vs scalar)
//! - ScalarSerializer / SerializerRegistry: per-attribute codecs
//! - LoamError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod error;
pub mod ids;
pub mod resolve;
pub mod serializer;
pub mod value;

// Re-export commonly used types at the crate root
pub use attribute::{Attr, AttrKind, AttrSchema, Schema, SchemaBuilder};
pub use error::{LoamError, Result};
pub use ids::{Eid, Ident, Partition, Uid};
pub use resolve::{Resolver, TableResolver};
pub use serializer::{JsonSerializer, ScalarSerializer, SerializerRegistry};
pub use value::Value;
