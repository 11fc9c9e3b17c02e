//! Encoding and decoding of attribute values
//!
//! Encoding resolves references to stable identities and defers scalar
//! serialization until the JSON is actually read. Two encode policies
//! exist:
//! - `encode`: total form, for subgraphs known to be serializable;
//!   an unresolvable reference is a contract violation.
//! - `encode_or_unresolved`: partial form, for best-effort
//!   serialization; an unresolvable reference (typically a
//!   local-partition entity) yields `Ok(None)` for the caller to
//!   handle.
//!
//! Configuration errors (missing serializer, value/attribute kind
//! mismatch) are fatal in both forms.

use crate::lazy::LazyJson;
use crate::value::DurableValue;
use loam_core::{
    Attr, AttrKind, LoamError, Resolver, Result, Schema, SerializerRegistry, Value,
};

/// Durable value codec over a schema and serializer registry
///
/// Borrowing and stateless; construct one wherever values cross the
/// process boundary.
#[derive(Clone, Copy)]
pub struct Codec<'a> {
    schema: &'a Schema,
    serializers: &'a SerializerRegistry,
}

impl<'a> Codec<'a> {
    /// Create a codec
    pub fn new(schema: &'a Schema, serializers: &'a SerializerRegistry) -> Self {
        Self {
            schema,
            serializers,
        }
    }

    /// Encode an attribute value, total form
    ///
    /// # Errors
    ///
    /// - `MissingUid` if a referenced entity has neither Ident nor Uid
    /// - `MissingSerializer` for a scalar attribute with no registered
    ///   serializer
    /// - `UnknownAttribute` / kind-mismatch errors on schema misuse
    pub fn encode(
        &self,
        resolver: &dyn Resolver,
        attr: Attr,
        value: &Value,
    ) -> Result<DurableValue> {
        match self.encode_or_unresolved(resolver, attr, value)? {
            Some(durable) => Ok(durable),
            None => {
                // Partial form said "presently unserializable"; the
                // total form treats that as a broken contract.
                let eid = value.as_ref_eid().expect("only references are unresolved");
                Err(LoamError::MissingUid { eid })
            }
        }
    }

    /// Encode an attribute value, partial form
    ///
    /// Returns `Ok(None)` when the referenced entity has no stable
    /// identity (a normal condition for local-partition entities), and
    /// `Err` only for configuration mistakes.
    ///
    /// # Errors
    ///
    /// Same as [`Codec::encode`], minus `MissingUid`.
    pub fn encode_or_unresolved(
        &self,
        resolver: &dyn Resolver,
        attr: Attr,
        value: &Value,
    ) -> Result<Option<DurableValue>> {
        let decl = self
            .schema
            .lookup(attr)
            .ok_or(LoamError::UnknownAttribute { attr })?;

        match decl.kind {
            AttrKind::Ref => {
                let eid = value
                    .as_ref_eid()
                    .ok_or(LoamError::NotScalar { attr })?;
                // Type markers always serialize by identity, never by
                // Uid, even when they happen to carry one.
                if let Some(ident) = resolver.resolve_ident(eid) {
                    return Ok(Some(DurableValue::EntityTypeRef(ident)));
                }
                Ok(resolver.resolve_uid(eid).map(DurableValue::EntityRef))
            }
            AttrKind::Scalar => {
                if value.is_ref() {
                    return Err(LoamError::NotReference { attr });
                }
                // Already in the target representation: wrap directly.
                if let Value::Json(json) = value {
                    return Ok(Some(DurableValue::Scalar(LazyJson::eager(json.clone()))));
                }
                let serializer =
                    self.serializers
                        .lookup(attr)
                        .ok_or_else(|| LoamError::MissingSerializer {
                            attr,
                            name: decl.name.clone(),
                        })?;
                let value = value.clone();
                Ok(Some(DurableValue::Scalar(LazyJson::deferred(move || {
                    serializer.encode(&value)
                }))))
            }
        }
    }

    /// Decode a scalar attribute's durable JSON back into a live value
    ///
    /// With no registered serializer the raw JSON is returned unchanged
    /// as `Value::Json`, so undeclared scalar types round-trip
    /// opaquely.
    ///
    /// # Errors
    ///
    /// Surfaces serializer decode failures.
    pub fn decode(&self, attr: Attr, json: serde_json::Value) -> Result<Value> {
        match self.serializers.lookup(attr) {
            Some(serializer) => serializer.decode(json),
            None => Ok(Value::Json(json)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_core::{Eid, Ident, JsonSerializer, TableResolver, Uid};
    use std::sync::Arc;

    struct Fixture {
        schema: Schema,
        serializers: SerializerRegistry,
        title: Attr,
        payload: Attr,
        owner: Attr,
    }

    fn fixture() -> Fixture {
        let mut b = Schema::builder();
        let title = b.scalar("title");
        let payload = b.scalar("payload");
        let owner = b.reference("owner");
        let schema = b.build();

        let mut serializers = SerializerRegistry::new();
        serializers.register(title, Arc::new(JsonSerializer));
        // payload deliberately has no serializer

        Fixture {
            schema,
            serializers,
            title,
            payload,
            owner,
        }
    }

    #[test]
    fn test_scalar_encode_decode_roundtrip() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();

        let value = Value::from("hello");
        let durable = codec.encode(&resolver, f.title, &value).unwrap();
        let json = durable.scalar_json().unwrap().unwrap().clone();
        assert_eq!(codec.decode(f.title, json).unwrap(), value);
    }

    #[test]
    fn test_scalar_encoding_is_lazy() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();

        let durable = codec
            .encode(&resolver, f.title, &Value::Int(7))
            .unwrap();
        match &durable {
            DurableValue::Scalar(lazy) => {
                assert!(!lazy.is_computed(), "encode must not force the JSON");
                assert_eq!(lazy.get().unwrap(), &serde_json::json!(7));
            }
            other => panic!("expected scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_serializer_is_fatal() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();

        let err = codec
            .encode(&resolver, f.payload, &Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, LoamError::MissingSerializer { .. }));

        // The partial form is just as strict about configuration
        let err = codec
            .encode_or_unresolved(&resolver, f.payload, &Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, LoamError::MissingSerializer { .. }));
    }

    #[test]
    fn test_pre_serialized_json_needs_no_serializer() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();

        let raw = serde_json::json!({"opaque": true});
        let durable = codec
            .encode(&resolver, f.payload, &Value::Json(raw.clone()))
            .unwrap();
        assert_eq!(durable.scalar_json().unwrap(), Some(&raw));
    }

    #[test]
    fn test_opaque_decode_without_serializer() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let raw = serde_json::json!([1, 2, 3]);
        assert_eq!(
            codec.decode(f.payload, raw.clone()).unwrap(),
            Value::Json(raw)
        );
    }

    #[test]
    fn test_reference_resolves_to_uid() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let e = Eid::shared(1);
        let uid = Uid::new();
        let resolver = TableResolver::new().with_uid(e, uid);

        let durable = codec
            .encode_or_unresolved(&resolver, f.owner, &Value::Ref(e))
            .unwrap();
        assert_eq!(durable, Some(DurableValue::EntityRef(uid)));
    }

    #[test]
    fn test_ident_wins_over_uid() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let e = Eid::shared(1);
        let resolver = TableResolver::new()
            .with_uid(e, Uid::new())
            .with_ident(e, Ident::new("Widget"));

        let durable = codec.encode(&resolver, f.owner, &Value::Ref(e)).unwrap();
        assert_eq!(durable, DurableValue::EntityTypeRef(Ident::new("Widget")));
    }

    #[test]
    fn test_unresolvable_reference_partial_vs_total() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let local = Eid::local(3);
        let resolver = TableResolver::new();

        // Partial form: a normal None
        let partial = codec
            .encode_or_unresolved(&resolver, f.owner, &Value::Ref(local))
            .unwrap();
        assert_eq!(partial, None);

        // Total form: contract violation
        let err = codec.encode(&resolver, f.owner, &Value::Ref(local)).unwrap_err();
        assert!(matches!(err, LoamError::MissingUid { eid } if eid == local));
    }

    #[test]
    fn test_kind_mismatches_are_fatal() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();

        let err = codec
            .encode(&resolver, f.owner, &Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, LoamError::NotScalar { .. }));

        let err = codec
            .encode(&resolver, f.title, &Value::Ref(Eid::local(0)))
            .unwrap_err();
        assert!(matches!(err, LoamError::NotReference { .. }));
    }

    #[test]
    fn test_unknown_attribute_is_fatal() {
        let f = fixture();
        let codec = Codec::new(&f.schema, &f.serializers);
        let resolver = TableResolver::new();
        let err = codec
            .encode(&resolver, Attr::from_raw(99), &Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, LoamError::UnknownAttribute { .. }));
    }
}
