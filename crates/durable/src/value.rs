//! Durable values and their wire shape
//!
//! A DurableValue is the only representation of an attribute value that
//! may cross a process boundary. The wire shape is a single-key JSON
//! object and is stable for persistence and transmission:
//!
//! ```text
//! {"scalar": <json>}   scalar value
//! {"ref": "<uid>"}     reference, resolved to a stable Uid
//! {"type": "<ident>"}  reference to a type marker, by Ident
//! ```

use crate::lazy::LazyJson;
use loam_core::{Ident, LoamError, Result, Uid};

/// Serialized form of an attribute value
///
/// Exactly three variants exist; every consumer must handle all of
/// them, and forgetting one is a compile error.
#[derive(Debug, PartialEq)]
pub enum DurableValue {
    /// Lazily computed JSON representation of a scalar value
    Scalar(LazyJson),
    /// Reference to another entity, by its stable Uid
    EntityRef(Uid),
    /// Reference to a type-marker entity, by its Ident (never by Uid)
    EntityTypeRef(Ident),
}

impl DurableValue {
    /// Render to the wire shape
    ///
    /// Forces the scalar JSON, if any.
    ///
    /// # Errors
    ///
    /// Surfaces a deferred serializer failure.
    pub fn to_wire(&self) -> Result<serde_json::Value> {
        Ok(match self {
            DurableValue::Scalar(lazy) => serde_json::json!({ "scalar": lazy.get()? }),
            DurableValue::EntityRef(uid) => serde_json::json!({ "ref": uid.to_string() }),
            DurableValue::EntityTypeRef(ident) => {
                serde_json::json!({ "type": ident.as_str() })
            }
        })
    }

    /// Parse from the wire shape
    ///
    /// # Errors
    ///
    /// Returns a serialization error for anything that is not a
    /// well-formed single-key wire object.
    pub fn from_wire(json: serde_json::Value) -> Result<Self> {
        let obj = match json {
            serde_json::Value::Object(obj) if obj.len() == 1 => obj,
            other => {
                return Err(LoamError::Serialization(format!(
                    "expected single-key wire object, got {}",
                    other
                )))
            }
        };
        let (key, value) = obj.into_iter().next().expect("len checked above");
        match key.as_str() {
            "scalar" => Ok(DurableValue::Scalar(LazyJson::eager(value))),
            "ref" => {
                let s = value.as_str().ok_or_else(|| {
                    LoamError::Serialization("\"ref\" payload must be a string".to_string())
                })?;
                let uid = Uid::from_string(s).ok_or_else(|| {
                    LoamError::Serialization(format!("\"ref\" payload {:?} is not a uid", s))
                })?;
                Ok(DurableValue::EntityRef(uid))
            }
            "type" => {
                let s = value.as_str().ok_or_else(|| {
                    LoamError::Serialization("\"type\" payload must be a string".to_string())
                })?;
                Ok(DurableValue::EntityTypeRef(Ident::new(s)))
            }
            other => Err(LoamError::Serialization(format!(
                "unknown wire key {:?}",
                other
            ))),
        }
    }

    /// The scalar JSON, if this is a scalar (forces it)
    ///
    /// # Errors
    ///
    /// Surfaces a deferred serializer failure.
    pub fn scalar_json(&self) -> Result<Option<&serde_json::Value>> {
        match self {
            DurableValue::Scalar(lazy) => lazy.get().map(Some),
            _ => Ok(None),
        }
    }
}
