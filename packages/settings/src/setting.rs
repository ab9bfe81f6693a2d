//! The `Setting` trait and type descriptors.
//!
//! A `Setting` is any type the service can persist. The trait carries a
//! compile-time `TypeDescriptor` (so no runtime reflection is needed to find
//! out what a type is) and the two hooks that let `Option<T>` present itself
//! as its underlying `T`.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// Identifies the underlying type of a setting.
///
/// For `Option<T>` the descriptor names `T` and is marked optional;
/// [`TypeDescriptor::unwrapped`] drops the wrapper flag. Classification only
/// ever looks at the underlying type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    optional: bool,
}

impl TypeDescriptor {
    /// Descriptor of a plain (non-optional) type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeDescriptor {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            optional: false,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether this descriptor came through an optional wrapper.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The same type behind an optional wrapper.
    #[must_use]
    pub fn wrapped(self) -> Self {
        TypeDescriptor {
            optional: true,
            ..self
        }
    }

    /// The underlying type with any optional wrapper removed.
    #[must_use]
    pub fn unwrapped(self) -> Self {
        TypeDescriptor {
            optional: false,
            ..self
        }
    }

    /// Whether this describes `T` (ignoring optional wrappers).
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// A type that can be stored by the settings service.
///
/// Scalars, strings, decimals, GUIDs, URIs, date-times, collections and
/// `Option<T>` are covered out of the box. Your own serde types opt in with
/// an empty impl and are stored as type-tagged JSON:
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use typed_settings::Setting;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Setting for Person {}
/// ```
pub trait Setting: Serialize + DeserializeOwned + Send + 'static {
    /// Descriptor of the underlying (unwrapped) type.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    /// Borrow the underlying value, or `None` for an absent optional.
    fn inner(&self) -> Option<&(dyn Any + Send)> {
        Some(self)
    }

    /// Rebuild a value from its underlying type.
    ///
    /// Returns `None` if `inner` holds some other type.
    fn from_inner(inner: Box<dyn Any + Send>) -> Option<Self> {
        inner.downcast::<Self>().ok().map(|boxed| *boxed)
    }
}

impl<T: Setting> Setting for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor().wrapped()
    }

    fn inner(&self) -> Option<&(dyn Any + Send)> {
        self.as_ref().and_then(|value| value.inner())
    }

    fn from_inner(inner: Box<dyn Any + Send>) -> Option<Self> {
        T::from_inner(inner).map(Some)
    }
}

macro_rules! impl_setting {
    ($($ty:ty),* $(,)?) => {
        $(impl Setting for $ty {})*
    };
}

impl_setting!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    Decimal,
    Uuid,
    Url,
    DateTime<Utc>,
    DateTime<Local>,
    DateTime<FixedOffset>,
    NaiveDateTime,
    serde_json::Value,
);

impl<T> Setting for Vec<T> where T: Serialize + DeserializeOwned + Send + 'static {}

impl<V> Setting for HashMap<String, V> where V: Serialize + DeserializeOwned + Send + 'static {}

impl<V> Setting for BTreeMap<String, V> where V: Serialize + DeserializeOwned + Send + 'static {}
