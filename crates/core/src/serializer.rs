//! Scalar serializer registry
//!
//! Every scalar attribute that wants a non-opaque durable form
//! registers a [`ScalarSerializer`]. Encoding a scalar with no
//! registered serializer is a fatal configuration error; decoding with
//! no registered serializer returns the raw JSON unchanged, so
//! undeclared attributes round-trip opaquely.

use crate::attribute::Attr;
use crate::error::{LoamError, Result};
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Converts a live scalar value to and from its JSON representation
pub trait ScalarSerializer: Send + Sync {
    /// Encode a live value into its durable JSON form
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not of the type this serializer
    /// handles.
    fn encode(&self, value: &Value) -> Result<serde_json::Value>;

    /// Decode a durable JSON form back into a live value
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a well-formed encoding.
    fn decode(&self, json: serde_json::Value) -> Result<Value>;
}

/// Lookup-by-attribute registry of scalar serializers
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    serializers: FxHashMap<Attr, Arc<dyn ScalarSerializer>>,
}

impl SerializerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serializer for an attribute, replacing any previous one
    pub fn register(&mut self, attr: Attr, serializer: Arc<dyn ScalarSerializer>) {
        self.serializers.insert(attr, serializer);
    }

    /// Look up the serializer registered for an attribute
    pub fn lookup(&self, attr: Attr) -> Option<Arc<dyn ScalarSerializer>> {
        self.serializers.get(&attr).cloned()
    }
}

impl std::fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("len", &self.serializers.len())
            .finish()
    }
}

/// Serializer passing primitive values through their natural JSON form
///
/// Handles `Null`, `Bool`, `Int`, `Float`, `String`, and `Json`
/// values. Decoding maps JSON primitives back to the matching variant
/// and leaves arrays/objects as `Value::Json`.
#[derive(Debug, Default)]
pub struct JsonSerializer;

impl ScalarSerializer for JsonSerializer {
    fn encode(&self, value: &Value) -> Result<serde_json::Value> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::Value::Number((*i).into())),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    LoamError::Serialization(format!("non-finite float {} has no JSON form", f))
                }),
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Json(j) => Ok(j.clone()),
            Value::Ref(e) => Err(LoamError::Serialization(format!(
                "reference value {} is not a scalar",
                e
            ))),
        }
    }

    fn decode(&self, json: serde_json::Value) -> Result<Value> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(attr: Attr) -> SerializerRegistry {
        let mut reg = SerializerRegistry::new();
        reg.register(attr, Arc::new(JsonSerializer));
        reg
    }

    #[test]
    fn test_lookup_registered() {
        let attr = Attr::from_raw(0);
        let reg = registry_with(attr);
        assert!(reg.lookup(attr).is_some());
    }

    #[test]
    fn test_lookup_missing() {
        let reg = SerializerRegistry::new();
        assert!(reg.lookup(Attr::from_raw(0)).is_none());
    }

    #[test]
    fn test_json_serializer_roundtrip_primitives() {
        let s = JsonSerializer;
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(2.5),
            Value::String("x".into()),
        ] {
            let json = s.encode(&v).unwrap();
            assert_eq!(s.decode(json).unwrap(), v);
        }
    }

    #[test]
    fn test_json_serializer_opaque_json() {
        let s = JsonSerializer;
        let v = Value::Json(serde_json::json!({"k": [1, 2]}));
        let json = s.encode(&v).unwrap();
        assert_eq!(s.decode(json).unwrap(), v);
    }

    #[test]
    fn test_json_serializer_rejects_ref() {
        let s = JsonSerializer;
        let err = s.encode(&Value::Ref(crate::ids::Eid::local(1))).unwrap_err();
        assert!(matches!(err, LoamError::Serialization(_)));
    }

    #[test]
    fn test_json_serializer_rejects_nan() {
        let s = JsonSerializer;
        assert!(s.encode(&Value::Float(f64::NAN)).is_err());
    }
}
