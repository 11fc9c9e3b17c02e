//! Durable value codec
//!
//! Converts live attribute values to and from the wire/disk-safe
//! representation:
//! - DurableValue: closed three-variant sum type (Scalar / EntityRef /
//!   EntityTypeRef) with a stable JSON wire shape
//! - LazyJson: scalar JSON computed at most once, on first read
//! - Codec: encode (total), encode_or_unresolved (partial), decode
//!
//! References serialize to stable identities only: type markers by
//! Ident, everything else by Uid. Eids never leave the process.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod codec;
mod lazy;
mod value;

pub use codec::Codec;
pub use lazy::LazyJson;
pub use value::DurableValue;
