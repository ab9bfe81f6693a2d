//! Typed Settings
//!
//! Store and load typed values in flat key/value backends. This layer adds:
//! - `SettingsService`: typed `get_or_default`/`add_or_update` over any `Backend`
//! - `SettingsProperty`: a key and default bound to a service
//! - `ConverterRegistry`: culture-invariant string conversions
//! - `Classifier`: picks native, string or JSON storage per type
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use typed_settings::{Setting, Settings, SettingsService};
//! use typed_settings_stores::MemoryBackend;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! struct Window {
//!     width: u32,
//!     height: u32,
//! }
//!
//! impl Setting for Window {}
//!
//! let settings = SettingsService::new(MemoryBackend::new());
//! settings.add_or_update("ratio", 1.5f32).unwrap();
//! settings.add_or_update("window", Window { width: 800, height: 600 }).unwrap();
//!
//! assert_eq!(settings.get_or_default("ratio", 0f32).unwrap(), 1.5);
//! let default = Window { width: 0, height: 0 };
//! assert_eq!(settings.get_or_default("window", default).unwrap().width, 800);
//! ```
//!
//! # Failure model
//!
//! Reads never fail because of what is (or is not) stored: a missing key or
//! an undecodable value yields the default. Reads and writes do fail for an
//! invalid key or a failing backend, and writes fail when the value cannot
//! be encoded.

mod classify;
mod codec;
mod convert;
mod datetime;
mod error;
mod key;
mod property;
mod service;
mod setting;

pub use classify::{Classifier, Strategy};
pub use codec::ComplexCodec;
pub use convert::{register_defaults, ConverterRegistry};
pub use datetime::{DateTimeKind, TaggedDateTime};
pub use error::{ConversionError, SettingsError};
pub use key::{Key, KeyError, MAX_KEY_LENGTH};
pub use property::{SettingsProperty, SettingsPropertyBuilder, UntypedProperty};
pub use service::{Settings, SettingsService, SettingsServiceBuilder};
pub use setting::{Setting, TypeDescriptor};

// Re-export backend types for convenience
pub use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};
