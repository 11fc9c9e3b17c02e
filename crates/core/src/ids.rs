//! Entity identifiers
//!
//! This module defines the three identity types of the data model:
//! - Eid: process-local opaque entity handle, partitioned by id space
//! - Uid: process-independent, globally stable identifier (shared entities)
//! - Ident: stable textual identity of a type-marker entity

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bit tagging an Eid as belonging to the shared partition.
const SHARED_BIT: u64 = 1 << 63;

/// Identity partition an entity belongs to
///
/// Every entity lives in exactly one partition, derivable from its Eid
/// alone. Local entities never leave the process; shared entities carry
/// a [`Uid`] and may be referenced from serialized data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// Process-local entities with no stable identity
    Local,
    /// Entities with a process-independent Uid
    Shared,
}

/// Process-local opaque entity handle
///
/// An Eid is a 64-bit handle minted by the store at entity creation and
/// never reused within the same store instance. It is meaningless
/// outside the process that minted it; only [`Uid`]s and [`Ident`]s
/// cross process boundaries.
///
/// The high bit encodes the partition (`1` = shared); the remaining 63
/// bits are a per-partition sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Eid(u64);

impl Eid {
    /// Create an Eid in the local partition from a sequence number
    pub fn local(seq: u64) -> Self {
        debug_assert!(seq & SHARED_BIT == 0, "sequence overflows partition space");
        Self(seq)
    }

    /// Create an Eid in the shared partition from a sequence number
    pub fn shared(seq: u64) -> Self {
        debug_assert!(seq & SHARED_BIT == 0, "sequence overflows partition space");
        Self(seq | SHARED_BIT)
    }

    /// Partition this Eid belongs to
    pub fn partition(&self) -> Partition {
        if self.0 & SHARED_BIT != 0 {
            Partition::Shared
        } else {
            Partition::Local
        }
    }

    /// True if this Eid belongs to the shared partition
    pub fn is_shared(&self) -> bool {
        self.partition() == Partition::Shared
    }

    /// Raw handle value (diagnostics only)
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.partition() {
            Partition::Local => write!(f, "eid:local/{}", self.0),
            Partition::Shared => write!(f, "eid:shared/{}", self.0 & !SHARED_BIT),
        }
    }
}

/// Process-independent, globally stable entity identifier
///
/// A Uid is a wrapper around a UUID v4, assigned exactly once at
/// creation time to entities in the shared partition. Shared entities
/// MUST have a Uid; this is checked at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid(Uuid);

impl Uid {
    /// Create a new random Uid using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a Uid from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a Uid from its string representation
    ///
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable textual identity of a type-marker entity
///
/// Type markers ("this is an instance of type T") serialize by Ident,
/// never by Uid, even when they also carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    /// Create an Ident from any string-like value
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Self(s)
    }
}
