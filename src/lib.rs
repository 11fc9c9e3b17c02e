//! Loam - in-process transactional entity-attribute-value store
//!
//! Loam stores entities as opaque handles with typed attribute slots,
//! and builds three things on top of that:
//! - a commit pipeline every mutation passes through, interceptable by
//!   ordered middleware
//! - a durable value codec converting live attribute values to and
//!   from the wire/disk-safe representation
//! - a lifecycle binder tying a derived entity's existence to the
//!   lifetime of a concurrent task, with exactly-once teardown
//!
//! # Quick Start
//!
//! ```ignore
//! use loamdb::{Chain, Db, Schema, Value};
//!
//! let mut b = Schema::builder();
//! let title = b.scalar("title");
//! let db = Db::new(b.build());
//!
//! let chain = Chain::identity();
//! chain.change(&db, |scope| {
//!     let e = scope.new_local_entity();
//!     scope.set(e, title, Value::from("hello"))
//! })?;
//! ```
//!
//! # Architecture
//!
//! All mutation access goes through a [`Chain`] wrapping the store's
//! `run_transaction` primitive; there is no alternate write path.
//! Serialization crosses the process boundary only as [`DurableValue`].

// Re-export the public API from the member crates
pub use loam_core::{
    Attr, AttrKind, AttrSchema, Eid, Ident, JsonSerializer, LoamError, Partition, Resolver,
    Result, ScalarSerializer, Schema, SchemaBuilder, SerializerRegistry, TableResolver, Uid,
    Value,
};
pub use loam_durable::{Codec, DurableValue, LazyJson};
pub use loam_lifecycle::{
    bind_lifecycle, checked_change, guard_secondary, BindState, CancelToken, MatchId,
    MatchRegistry, TaskContext,
};
pub use loam_pipeline::{Chain, ChangeBody, Identity, Middleware};
pub use loam_store::{ChangeScope, Db};
