//! Attribute value types
//!
//! This module defines:
//! - Value: the unified enum for live attribute values
//!
//! ## Value Model
//!
//! The Value enum has exactly 7 variants:
//! - Null, Bool, Int, Float, String, Json, Ref
//!
//! `Ref` is the only variant legal on reference attributes; every other
//! variant is a scalar. `Json` holds a value that is already in its
//! serialized representation, used for attributes with no registered
//! serializer (opaque round-trip) and for pre-serialized writes.
//!
//! ### Type Rules
//!
//! - No implicit type coercions
//! - `Int(1) != Float(1.0)` - different types are NEVER equal
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use crate::ids::Eid;
use serde::{Deserialize, Serialize};

/// Live attribute value
///
/// Different types are NEVER equal, even when they contain the same
/// "value": `Int(1) != Float(1.0)`. Float equality follows IEEE-754
/// semantics: `NaN != NaN`, `-0.0 == 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Already-serialized JSON value (opaque scalar)
    Json(serde_json::Value),
    /// Reference to another entity
    Ref(Eid),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            // Different types are NEVER equal
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Json(_) => "Json",
            Value::Ref(_) => "Ref",
        }
    }

    /// True if this value is a reference to another entity
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    /// True if this value is a scalar (anything but a reference)
    pub fn is_scalar(&self) -> bool {
        !self.is_ref()
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &serde_json::Value if this is a Json value
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    /// Get the referenced Eid if this is a Ref value
    pub fn as_ref_eid(&self) -> Option<Eid> {
        match self {
            Value::Ref(e) => Some(*e),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Eid> for Value {
    fn from(e: Eid) -> Self {
        Value::Ref(e)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_variants_and_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::String("hi".into()).as_str(), Some("hi"));
        assert_eq!(
            Value::Ref(Eid::local(1)).as_ref_eid(),
            Some(Eid::local(1))
        );
        let j = serde_json::json!({"a": 1});
        assert_eq!(Value::Json(j.clone()).as_json(), Some(&j));
    }

    #[test]
    fn test_ref_vs_scalar() {
        assert!(Value::Ref(Eid::local(1)).is_ref());
        assert!(!Value::Ref(Eid::local(1)).is_scalar());
        assert!(Value::Int(1).is_scalar());
        assert!(Value::Null.is_scalar());
    }

    // Different types are NEVER equal
    #[test]
    fn test_int_not_equal_float() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_null_not_equal_to_other_types() {
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::Null, Value::Int(0));
        assert_ne!(Value::Null, Value::String(String::new()));
    }

    // IEEE-754 float equality
    #[test]
    fn test_nan_not_equal_nan() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn test_ref_equality_is_by_eid() {
        assert_eq!(Value::Ref(Eid::shared(9)), Value::Ref(Eid::shared(9)));
        assert_ne!(Value::Ref(Eid::shared(9)), Value::Ref(Eid::local(9)));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Bool(true).type_name(), "Bool");
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::Float(1.0).type_name(), "Float");
        assert_eq!(Value::String(String::new()).type_name(), "String");
        assert_eq!(Value::Json(serde_json::Value::Null).type_name(), "Json");
        assert_eq!(Value::Ref(Eid::local(0)).type_name(), "Ref");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(()), Value::Null);
        assert_eq!(Value::from(Eid::local(5)), Value::Ref(Eid::local(5)));
    }

    #[test]
    fn test_value_serde_roundtrip() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-7),
            Value::String("test".into()),
            Value::Json(serde_json::json!([1, 2, 3])),
            Value::Ref(Eid::shared(12)),
        ];
        for v in values {
            let s = serde_json::to_string(&v).unwrap();
            let back: Value = serde_json::from_str(&s).unwrap();
            assert_eq!(v, back);
        }
    }
}
