//! Error types for the Loam store
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! The taxonomy distinguishes fatal configuration errors (missing
//! scalar serializer, shared entity without a Uid at total-encode)
//! from recoverable conditions. Unresolvable references in the partial
//! encode path are not errors at all; they surface as `Ok(None)`.

use crate::attribute::Attr;
use crate::ids::Eid;
use thiserror::Error;

/// Result type alias for Loam operations
pub type Result<T> = std::result::Result<T, LoamError>;

/// Error types for the Loam store
#[derive(Debug, Error)]
pub enum LoamError {
    /// Scalar attribute has no registered serializer (configuration error)
    #[error("no serializer registered for scalar attribute {name} ({attr})")]
    MissingSerializer {
        /// Offending attribute
        attr: Attr,
        /// Declared attribute name
        name: String,
    },

    /// Shared entity has no Uid at total-encode time (contract violation)
    #[error("entity {eid} has no stable uid; total encode requires one")]
    MissingUid {
        /// Offending entity
        eid: Eid,
    },

    /// Reference value written to a scalar attribute, or vice versa
    #[error("attribute {attr} is not a reference attribute")]
    NotReference {
        /// Offending attribute
        attr: Attr,
    },

    /// Scalar value written to a reference attribute
    #[error("attribute {attr} is not a scalar attribute")]
    NotScalar {
        /// Offending attribute
        attr: Attr,
    },

    /// Attribute is not declared in the schema
    #[error("attribute {attr} is not declared in the schema")]
    UnknownAttribute {
        /// Offending attribute
        attr: Attr,
    },

    /// Entity does not exist (or was deleted)
    #[error("entity {eid} not found")]
    EntityNotFound {
        /// Missing entity
        eid: Eid,
    },

    /// A middleware vetoed the transaction
    #[error("transaction vetoed: {reason}")]
    Vetoed {
        /// Middleware-supplied explanation
        reason: String,
    },

    /// A reactive match this task depends on is no longer valid
    #[error("reactive match {match_id} is no longer valid")]
    MatchInvalidated {
        /// Raw id of the invalidated match
        match_id: u64,
    },

    /// The task owning a bound entity was cancelled
    #[error("task cancelled")]
    Cancelled,

    /// Lifecycle teardown failed (secondary failure)
    ///
    /// Carries the optional primary error it accompanies; a failed
    /// cleanup is never silently dropped because that would leak the
    /// bound entity.
    #[error("lifecycle teardown failed: {cause}")]
    Teardown {
        /// Why the deletion transaction failed
        cause: Box<LoamError>,
        /// Primary error from the bound block, when there was one
        primary: Option<Box<LoamError>>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LoamError {
    /// True for errors indicating a programming/schema mistake rather
    /// than a transient condition
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LoamError::MissingSerializer { .. }
                | LoamError::MissingUid { .. }
                | LoamError::UnknownAttribute { .. }
                | LoamError::NotReference { .. }
                | LoamError::NotScalar { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_missing_serializer() {
        let err = LoamError::MissingSerializer {
            attr: Attr::from_raw(4),
            name: "payload".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no serializer"));
        assert!(msg.contains("payload"));
    }

    #[test]
    fn test_display_missing_uid() {
        let err = LoamError::MissingUid {
            eid: Eid::shared(1),
        };
        assert!(err.to_string().contains("no stable uid"));
    }

    #[test]
    fn test_display_vetoed() {
        let err = LoamError::Vetoed {
            reason: "audit rejected".to_string(),
        };
        assert!(err.to_string().contains("audit rejected"));
    }

    #[test]
    fn test_teardown_carries_primary() {
        let err = LoamError::Teardown {
            cause: Box::new(LoamError::EntityNotFound {
                eid: Eid::local(2),
            }),
            primary: Some(Box::new(LoamError::Cancelled)),
        };
        match err {
            LoamError::Teardown { primary, .. } => {
                assert!(matches!(primary.as_deref(), Some(LoamError::Cancelled)));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(LoamError::MissingUid {
            eid: Eid::shared(0)
        }
        .is_configuration_error());
        assert!(LoamError::MissingSerializer {
            attr: Attr::from_raw(0),
            name: "a".into()
        }
        .is_configuration_error());
        assert!(!LoamError::Cancelled.is_configuration_error());
        assert!(!LoamError::Vetoed {
            reason: "x".into()
        }
        .is_configuration_error());
    }

    #[test]
    fn test_result_type_alias() {
        fn ok() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok().unwrap(), 42);
    }
}
