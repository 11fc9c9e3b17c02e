//! In-process transactional EAV store
//!
//! This crate implements the store core:
//! - Db: shared store handle with the `run_transaction` primitive
//! - ChangeScope: the transactional mutation context
//! - Side tables: arena + index layout for identity lookups
//!
//! All mutation access is mediated through change scopes; readers are
//! snapshot-consistent with committed transactions.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod scope;
mod store;
mod tables;

pub use scope::ChangeScope;
pub use store::Db;
