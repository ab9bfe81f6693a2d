//! The persistence orchestrator.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex, MutexGuard};

use typed_settings_backend::{Backend, NativeKind, NativeValue};

use crate::classify::{Classifier, Strategy};
use crate::codec::ComplexCodec;
use crate::convert::ConverterRegistry;
use crate::error::{ConversionError, SettingsError};
use crate::key::Key;
use crate::setting::{Setting, TypeDescriptor};

/// The typed settings contract.
///
/// `read` and `write` take the descriptor explicitly so callers that bind a
/// key to a type (see [`SettingsProperty`](crate::SettingsProperty)) can
/// resolve it once and reuse it.
pub trait Settings {
    /// Read `key` as `T`, returning `default` if the key is absent or the
    /// stored value cannot be decoded as `T`.
    fn read<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError>;

    /// Store `value` at `key` and commit.
    fn write<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        value: &T,
    ) -> Result<(), SettingsError>;

    /// Delete `key`. Returns whether a value existed.
    fn remove(&self, key: &str) -> Result<bool, SettingsError>;

    fn get_or_default<T: Setting>(&self, key: &str, default: T) -> Result<T, SettingsError> {
        self.read(&T::descriptor(), key, default)
    }

    fn add_or_update<T: Setting>(&self, key: &str, value: T) -> Result<(), SettingsError> {
        self.write(&T::descriptor(), key, &value)
    }
}

impl<S: Settings + ?Sized> Settings for &S {
    fn read<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError> {
        (**self).read(descriptor, key, default)
    }

    fn write<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        value: &T,
    ) -> Result<(), SettingsError> {
        (**self).write(descriptor, key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, SettingsError> {
        (**self).remove(key)
    }
}

impl<S: Settings + ?Sized> Settings for Arc<S> {
    fn read<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError> {
        self.as_ref().read(descriptor, key, default)
    }

    fn write<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        value: &T,
    ) -> Result<(), SettingsError> {
        self.as_ref().write(descriptor, key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, SettingsError> {
        self.as_ref().remove(key)
    }
}

/// Typed get/set over a [`Backend`].
///
/// Every operation holds one instance lock for its full duration, backend
/// round-trip and commit included, so calls against one service are
/// serialized. Share a service between threads with `Arc`.
///
/// ```rust
/// use typed_settings::{Settings, SettingsService};
/// use typed_settings_stores::MemoryBackend;
///
/// let settings = SettingsService::new(MemoryBackend::new());
///
/// settings.add_or_update("age", 42).unwrap();
/// assert_eq!(settings.get_or_default("age", 0).unwrap(), 42);
/// assert_eq!(
///     settings.get_or_default("missing", "fallback".to_string()).unwrap(),
///     "fallback"
/// );
/// ```
pub struct SettingsService<B> {
    backend: Mutex<B>,
    registry: Arc<ConverterRegistry>,
    classifier: Classifier,
    codec: ComplexCodec,
}

impl<B: Backend> SettingsService<B> {
    /// A service with the default converters.
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    pub fn builder(backend: B) -> SettingsServiceBuilder<B> {
        SettingsServiceBuilder::new(backend)
    }

    /// The converter registry, for ad-hoc conversions or late registration.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The storage strategy this service uses for `T`.
    pub fn classify<T: Setting>(&self) -> Strategy {
        self.classifier.classify_type::<T>()
    }

    /// Whether `key` holds a value.
    pub fn contains_key(&self, key: &str) -> Result<bool, SettingsError> {
        Key::validate(key)?;
        let mut backend = self.lock()?;
        Ok(backend.contains_key(key)?)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let mut backend = self.lock()?;
        let mut keys = backend.keys()?;
        keys.sort();
        Ok(keys)
    }

    /// Run `f` with exclusive access to the backend.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> Result<R, SettingsError> {
        let mut backend = self.lock()?;
        Ok(f(&mut backend))
    }

    /// Consume the service and hand back the backend.
    pub fn into_inner(self) -> Result<B, SettingsError> {
        self.backend
            .into_inner()
            .map_err(|e| SettingsError::LockPoisoned {
                message: e.to_string(),
            })
    }

    fn lock(&self) -> Result<MutexGuard<'_, B>, SettingsError> {
        self.backend.lock().map_err(|e| SettingsError::LockPoisoned {
            message: e.to_string(),
        })
    }

    fn decode_native<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        kind: NativeKind,
        stored: NativeValue,
    ) -> Result<T, ConversionError> {
        if stored.kind() == kind {
            return T::from_inner(stored.into_any()).ok_or_else(|| {
                ConversionError::failed::<NativeValue, T>("native value has the wrong type")
            });
        }

        // written under another type; go through the canonical string
        tracing::debug!(
            stored = %stored.kind(),
            requested = %kind,
            "reconciling native kinds"
        );
        self.decode_string(descriptor, stored.to_canonical_string())
    }

    fn decode_string<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        stored: String,
    ) -> Result<T, ConversionError> {
        let inner: Box<dyn Any + Send> = if descriptor.is::<String>() {
            Box::new(stored)
        } else {
            self.registry.convert_any(&stored, descriptor.type_id())?
        };
        T::from_inner(inner)
            .ok_or_else(|| ConversionError::failed::<String, T>("converter produced another type"))
    }

    fn encode_string(&self, value: &dyn Any) -> Result<String, ConversionError> {
        self.registry
            .convert_any(value, TypeId::of::<String>())?
            .downcast::<String>()
            .map(|text| *text)
            .map_err(|_| ConversionError::failed::<dyn Any, String>("converter produced another type"))
    }
}

impl<B: Backend> Settings for SettingsService<B> {
    fn read<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError> {
        Key::validate(key)?;
        let mut backend = self.lock()?;
        let strategy = self.classifier.classify(descriptor);
        tracing::debug!(key, type_name = descriptor.type_name(), %strategy, "get");

        let decoded = match strategy {
            Strategy::Native(NativeKind::String) | Strategy::StringConvertible => {
                match backend.get_string(key)? {
                    Some(stored) => self.decode_string(descriptor, stored),
                    None => return Ok(default),
                }
            }
            Strategy::Native(kind) => match backend.get_native(key, kind)? {
                Some(stored) => self.decode_native(descriptor, kind, stored),
                None => return Ok(default),
            },
            Strategy::Complex => match backend.get_string(key)? {
                Some(stored) => self.codec.decode::<T>(&stored).map_err(|e| {
                    ConversionError::failed::<String, T>(e.to_string())
                }),
                None => return Ok(default),
            },
        };

        match decoded {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is unreadable, using default");
                Ok(default)
            }
        }
    }

    fn write<T: Setting>(
        &self,
        descriptor: &TypeDescriptor,
        key: &str,
        value: &T,
    ) -> Result<(), SettingsError> {
        Key::validate(key)?;
        let inner = value.inner().ok_or_else(|| {
            SettingsError::invalid_argument(format!(
                "cannot store an absent {} at '{}'; use remove to delete",
                descriptor.type_name(),
                key
            ))
        })?;

        let mut backend = self.lock()?;
        let strategy = self.classifier.classify(descriptor);
        tracing::debug!(key, type_name = descriptor.type_name(), %strategy, "add or update");

        match strategy {
            Strategy::Native(NativeKind::String) => {
                let text = inner.downcast_ref::<String>().ok_or_else(|| {
                    SettingsError::invalid_argument("string setting holds another type")
                })?;
                backend.put_string(key, text)?;
            }
            Strategy::Native(kind) => {
                let native = NativeValue::from_any(inner, kind).ok_or_else(|| {
                    SettingsError::invalid_argument(format!(
                        "{} is not a native {}",
                        descriptor.type_name(),
                        kind
                    ))
                })?;
                backend.put_native(key, native)?;
            }
            Strategy::StringConvertible => {
                let text = self.encode_string(inner)?;
                backend.put_string(key, &text)?;
            }
            Strategy::Complex => {
                let text = self.codec.encode(descriptor, value)?;
                backend.put_string(key, &text)?;
            }
        }

        backend.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, SettingsError> {
        Key::validate(key)?;
        let mut backend = self.lock()?;
        tracing::debug!(key, "remove");
        let existed = backend.remove(key)?;
        backend.commit()?;
        Ok(existed)
    }
}

impl<B> std::fmt::Debug for SettingsService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("registry", &self.registry)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SettingsService`].
pub struct SettingsServiceBuilder<B> {
    backend: B,
    registry: Option<Arc<ConverterRegistry>>,
    extra: Vec<Box<dyn FnOnce(&ConverterRegistry)>>,
    string_types: Vec<Box<dyn FnOnce(&mut Classifier)>>,
}

impl<B: Backend> SettingsServiceBuilder<B> {
    pub fn new(backend: B) -> Self {
        SettingsServiceBuilder {
            backend,
            registry: None,
            extra: Vec::new(),
            string_types: Vec::new(),
        }
    }

    /// Use an existing registry instead of a fresh default one.
    pub fn registry(mut self, registry: Arc<ConverterRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register an extra converter, overriding any default for the pair.
    pub fn converter<S, T, F>(mut self, convert: F) -> Self
    where
        S: 'static,
        T: Send + 'static,
        F: Fn(&S) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        self.extra
            .push(Box::new(move |registry: &ConverterRegistry| {
                registry.register::<S, T, F>(convert)
            }));
        self
    }

    /// Store `T` as a string using the given converter pair.
    pub fn string_type<T, To, From>(mut self, to_string: To, from_string: From) -> Self
    where
        T: Setting,
        To: Fn(&T) -> Result<String, ConversionError> + Send + Sync + 'static,
        From: Fn(&String) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        self = self
            .converter::<T, String, To>(to_string)
            .converter::<String, T, From>(from_string);
        self.string_types
            .push(Box::new(|classifier: &mut Classifier| {
                classifier.add_string_convertible::<T>()
            }));
        self
    }

    pub fn build(self) -> SettingsService<B> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ConverterRegistry::with_defaults()));
        for register in self.extra {
            register(&registry);
        }

        let mut classifier = Classifier::new(self.backend.native_kinds());
        for add in self.string_types {
            add(&mut classifier);
        }

        tracing::debug!(
            native_kinds = ?self.backend.native_kinds(),
            "settings service ready"
        );

        SettingsService {
            backend: Mutex::new(self.backend),
            registry,
            classifier,
            codec: ComplexCodec::new(),
        }
    }
}
