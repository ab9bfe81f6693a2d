//! The backend adapter trait.

use crate::{BackendError, NativeKind, NativeValue};

/// A flat key/value store the settings orchestrator persists into.
///
/// Keys are opaque non-empty strings. Values are either one of the backend's
/// native scalars or a string. Writes may be staged; `commit` makes them
/// durable and is called by the orchestrator after every write.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Backend>`.
pub trait Backend: Send {
    /// The kinds this backend stores without converting to a string.
    ///
    /// `NativeKind::String` is implied even when not listed.
    fn native_kinds(&self) -> &[NativeKind];

    /// Read the value at `key` as a native scalar.
    ///
    /// `kind` is the kind the caller expects. A backend may return a value
    /// of a different kind (whatever was stored); the caller reconciles it.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key does not exist (not an error condition).
    /// * `Ok(Some(value))` - The stored value.
    /// * `Err(BackendError)` - The store could not be read.
    fn get_native(&mut self, key: &str, kind: NativeKind)
        -> Result<Option<NativeValue>, BackendError>;

    /// Read the stored string form of `key`.
    ///
    /// If the stored value is a non-string native, its canonical string form
    /// is returned.
    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError>;

    /// Write a native scalar.
    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError>;

    /// Write a string.
    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Check whether `key` holds a value.
    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError>;

    /// Delete the value at `key`.
    ///
    /// Returns `true` if a value existed. Backends without deletion keep the
    /// default, which reports `NotSupported`.
    fn remove(&mut self, _key: &str) -> Result<bool, BackendError> {
        Err(BackendError::not_supported("remove"))
    }

    /// List all keys, in no particular order.
    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        Err(BackendError::not_supported("keys"))
    }

    /// Flush pending writes durably.
    fn commit(&mut self) -> Result<(), BackendError>;

    /// Whether `kind` is native for this backend.
    fn is_native(&self, kind: NativeKind) -> bool {
        kind == NativeKind::String || self.native_kinds().contains(&kind)
    }
}

// Blanket implementations for references and boxes

impl<T: Backend + ?Sized> Backend for &mut T {
    fn native_kinds(&self) -> &[NativeKind] {
        (**self).native_kinds()
    }

    fn get_native(
        &mut self,
        key: &str,
        kind: NativeKind,
    ) -> Result<Option<NativeValue>, BackendError> {
        (**self).get_native(key, kind)
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get_string(key)
    }

    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
        (**self).put_native(key, value)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).put_string(key, value)
    }

    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
        (**self).contains_key(key)
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        (**self).remove(key)
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        (**self).keys()
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        (**self).commit()
    }

    fn is_native(&self, kind: NativeKind) -> bool {
        (**self).is_native(kind)
    }
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn native_kinds(&self) -> &[NativeKind] {
        self.as_ref().native_kinds()
    }

    fn get_native(
        &mut self,
        key: &str,
        kind: NativeKind,
    ) -> Result<Option<NativeValue>, BackendError> {
        self.as_mut().get_native(key, kind)
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        self.as_mut().get_string(key)
    }

    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
        self.as_mut().put_native(key, value)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.as_mut().put_string(key, value)
    }

    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
        self.as_mut().contains_key(key)
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        self.as_mut().remove(key)
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        self.as_mut().keys()
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.as_mut().commit()
    }

    fn is_native(&self, kind: NativeKind) -> bool {
        self.as_ref().is_native(kind)
    }
}
