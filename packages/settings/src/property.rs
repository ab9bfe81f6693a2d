//! Key-bound accessors.

use std::any::{type_name, Any};
use std::fmt;

use uuid::Uuid;

use crate::error::SettingsError;
use crate::key::Key;
use crate::service::Settings;
use crate::setting::{Setting, TypeDescriptor};

/// One key and one default, bound to a settings service.
///
/// Nothing is cached: every `value()` reads through the service and every
/// `set_value()` writes and commits.
///
/// ```rust
/// use std::sync::Arc;
/// use typed_settings::{SettingsProperty, SettingsService};
/// use typed_settings_stores::MemoryBackend;
///
/// let service = Arc::new(SettingsService::new(MemoryBackend::new()));
/// let width = SettingsProperty::new(Arc::clone(&service), "window.width", 800u32).unwrap();
///
/// assert_eq!(width.value().unwrap(), 800);
/// width.set_value(1024).unwrap();
/// assert_eq!(width.value().unwrap(), 1024);
/// ```
pub struct SettingsProperty<T, S> {
    service: S,
    key: Key,
    default: T,
    descriptor: TypeDescriptor,
}

impl<T: Setting + Clone, S: Settings> SettingsProperty<T, S> {
    /// Bind `key` with `default`. Fails if the key is empty or too long.
    pub fn new(service: S, key: impl Into<String>, default: T) -> Result<Self, SettingsError> {
        let key = Key::new(key)?;
        Ok(Self::with_key(service, key, default))
    }

    /// Bind a freshly generated unique key.
    pub fn with_generated_key(service: S, default: T) -> Self {
        Self::with_key(service, generated_key(), default)
    }

    pub fn with_key(service: S, key: Key, default: T) -> Self {
        SettingsProperty {
            service,
            key,
            default,
            descriptor: T::descriptor(),
        }
    }

    pub fn builder() -> SettingsPropertyBuilder<T, S> {
        SettingsPropertyBuilder::default()
    }

    /// The stored value, or the default.
    pub fn value(&self) -> Result<T, SettingsError> {
        self.service
            .read(&self.descriptor, self.key.as_str(), self.default.clone())
    }

    pub fn set_value(&self, value: T) -> Result<(), SettingsError> {
        self.service.write(&self.descriptor, self.key.as_str(), &value)
    }

    /// Delete the stored value; `value()` then returns the default.
    pub fn remove(&self) -> Result<bool, SettingsError> {
        self.service.remove(self.key.as_str())
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<T: fmt::Debug, S> fmt::Debug for SettingsProperty<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsProperty")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("type", &self.descriptor.type_name())
            .finish()
    }
}

fn generated_key() -> Key {
    // a hyphenated v4 UUID is 36 characters, always a valid key
    Key::from_generated(Uuid::new_v4().hyphenated().to_string())
}

/// Builder for [`SettingsProperty`].
///
/// Service and default are required. Without a key a unique one is
/// generated.
pub struct SettingsPropertyBuilder<T, S> {
    service: Option<S>,
    key: Option<String>,
    default: Option<T>,
}

impl<T, S> Default for SettingsPropertyBuilder<T, S> {
    fn default() -> Self {
        SettingsPropertyBuilder {
            service: None,
            key: None,
            default: None,
        }
    }
}

impl<T: Setting + Clone, S: Settings> SettingsPropertyBuilder<T, S> {
    pub fn service(mut self, service: S) -> Self {
        self.service = Some(service);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn default_value(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    pub fn build(self) -> Result<SettingsProperty<T, S>, SettingsError> {
        let service = self
            .service
            .ok_or_else(|| SettingsError::invalid_argument("settings service is required"))?;
        let key = match self.key {
            Some(key) => Key::new(key)?,
            None => generated_key(),
        };
        let default = self.default.ok_or_else(|| {
            SettingsError::invalid_argument(format!(
                "default value for '{}' is required",
                key
            ))
        })?;
        Ok(SettingsProperty::with_key(service, key, default))
    }
}

/// A property viewed without its value type.
///
/// Lets heterogeneous properties live in one list, e.g. to check that
/// every property survives a round trip.
pub trait UntypedProperty {
    fn key(&self) -> &str;

    /// Name of the property's value type.
    fn type_name(&self) -> &'static str;

    /// The current value, boxed as the property's value type.
    fn get_untyped(&self) -> Result<Box<dyn Any + Send>, SettingsError>;

    /// Store a boxed value. It must hold the property's value type (or,
    /// for an optional property, the underlying type).
    fn set_untyped(&self, value: Box<dyn Any + Send>) -> Result<(), SettingsError>;
}

impl<T: Setting + Clone, S: Settings> UntypedProperty for SettingsProperty<T, S> {
    fn key(&self) -> &str {
        self.key.as_str()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn get_untyped(&self) -> Result<Box<dyn Any + Send>, SettingsError> {
        Ok(Box::new(self.value()?))
    }

    fn set_untyped(&self, value: Box<dyn Any + Send>) -> Result<(), SettingsError> {
        let value = match value.downcast::<T>() {
            Ok(value) => *value,
            Err(other) => T::from_inner(other).ok_or_else(|| {
                SettingsError::invalid_argument(format!(
                    "property '{}' holds {}",
                    self.key,
                    type_name::<T>()
                ))
            })?,
        };
        self.set_value(value)
    }
}
