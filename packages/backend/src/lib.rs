//! Backend adapter layer for typed settings.
//!
//! This is the narrow waist of the settings stack. A backend is a flat
//! string-keyed store that can hold a handful of native scalars and strings.
//! It knows nothing about decimals, date-times, optional wrappers or
//! serialized objects - the orchestrator in `typed-settings` maps every
//! other type onto these primitives.
//!
//! Use this layer to:
//! - Wrap a platform preference store (booleans, integers, floats, strings)
//! - Wrap a file-per-key or single-document store (strings only)
//! - Build test doubles that count commits or inject failures
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};
//!
//! struct StringOnly {
//!     data: HashMap<String, String>,
//! }
//!
//! impl Backend for StringOnly {
//!     fn native_kinds(&self) -> &[NativeKind] {
//!         &[NativeKind::String]
//!     }
//!
//!     fn get_native(&mut self, key: &str, _kind: NativeKind) -> Result<Option<NativeValue>, BackendError> {
//!         Ok(self.data.get(key).cloned().map(NativeValue::String))
//!     }
//!
//!     fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
//!         Ok(self.data.get(key).cloned())
//!     }
//!
//!     fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
//!         self.data.insert(key.to_string(), value.to_canonical_string());
//!         Ok(())
//!     }
//!
//!     fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
//!         self.data.insert(key.to_string(), value.to_string());
//!         Ok(())
//!     }
//!
//!     fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
//!         Ok(self.data.contains_key(key))
//!     }
//!
//!     fn commit(&mut self) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//! }
//! ```

mod error;
mod traits;
mod value;

pub use error::BackendError;
pub use traits::Backend;
pub use value::{NativeKind, NativeValue};
