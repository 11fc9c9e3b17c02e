//! Lazily computed scalar JSON
//!
//! Many attributes are serialized speculatively and never actually
//! read; the JSON for a scalar durable value is therefore computed at
//! most once, on first access. Computation failures are cached too, so
//! a failing serializer fails the same way on every access.

use loam_core::{LoamError, Result};
use once_cell::sync::Lazy;

type Compute = Box<dyn FnOnce() -> std::result::Result<serde_json::Value, String> + Send>;

/// JSON representation of a scalar value, computed at most once
pub struct LazyJson {
    inner: Lazy<std::result::Result<serde_json::Value, String>, Compute>,
}

impl LazyJson {
    /// Wrap a value that is already in its serialized representation
    pub fn eager(json: serde_json::Value) -> Self {
        Self {
            inner: Lazy::new(Box::new(move || Ok(json))),
        }
    }

    /// Defer computation until first access
    pub fn deferred(f: impl FnOnce() -> Result<serde_json::Value> + Send + 'static) -> Self {
        Self {
            inner: Lazy::new(Box::new(move || f().map_err(|e| e.to_string()))),
        }
    }

    /// Force the computation (at most once) and borrow the JSON
    ///
    /// # Errors
    ///
    /// Surfaces the cached serializer failure, if the computation
    /// failed.
    pub fn get(&self) -> Result<&serde_json::Value> {
        self.inner
            .as_ref()
            .map_err(|msg| LoamError::Serialization(msg.clone()))
    }

    /// Whether the computation has run yet (does not force)
    pub fn is_computed(&self) -> bool {
        Lazy::get(&self.inner).is_some()
    }
}

impl std::fmt::Debug for LazyJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match Lazy::get(&self.inner) {
            Some(Ok(json)) => write!(f, "LazyJson({})", json),
            Some(Err(e)) => write!(f, "LazyJson(<failed: {}>)", e),
            None => f.write_str("LazyJson(<deferred>)"),
        }
    }
}

// Equality forces both sides; failed computations equal nothing.
impl PartialEq for LazyJson {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
