//! Error types for the settings layer.

use std::any::type_name;

use typed_settings_backend::BackendError;

use crate::key::KeyError;

/// Errors surfaced by the settings service and properties.
///
/// Read operations only fail for programmer errors (bad key) or an
/// unavailable backend; undecodable stored data degrades to the caller's
/// default. Write operations additionally fail when the value cannot be
/// encoded.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Empty key, or a key over the length limit.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// A missing service, an absent value passed to a write, or a value of
    /// the wrong type passed through an untyped property.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A string-convertible value could not be converted on the write path.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A complex value could not be serialized for storage.
    #[error("cannot serialize {type_name}: {message}")]
    Serialization {
        type_name: &'static str,
        message: String,
    },

    /// The backend could not be read, written or committed.
    #[error("backend error: {0}")]
    BackendUnavailable(#[from] BackendError),

    /// A previous holder of the service lock panicked.
    #[error("settings lock poisoned: {message}")]
    LockPoisoned { message: String },
}

impl SettingsError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        SettingsError::InvalidArgument {
            message: message.into(),
        }
    }
}

/// A converter could not produce the target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Nothing is registered for the (source, target) pair.
    #[error("no converter registered from {source_type} to {target_type}")]
    NoConverter {
        source_type: &'static str,
        target_type: &'static str,
    },

    /// The converter ran and rejected its input.
    #[error("cannot convert {source_type} to {target_type}: {message}")]
    Failed {
        source_type: &'static str,
        target_type: &'static str,
        message: String,
    },
}

impl ConversionError {
    /// A failed conversion from `S` to `T`.
    pub fn failed<S: ?Sized, T: ?Sized>(message: impl Into<String>) -> Self {
        ConversionError::Failed {
            source_type: type_name::<S>(),
            target_type: type_name::<T>(),
            message: message.into(),
        }
    }
}
