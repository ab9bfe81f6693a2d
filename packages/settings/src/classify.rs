//! Storage strategy table.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use typed_settings_backend::NativeKind;
use url::Url;
use uuid::Uuid;

use crate::setting::{Setting, TypeDescriptor};

/// How a setting type is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Stored directly as one of the backend's native kinds.
    Native(NativeKind),
    /// Stored as its canonical string, converted through the registry.
    StringConvertible,
    /// Stored as type-tagged JSON.
    Complex,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Native(kind) => write!(f, "native {}", kind),
            Strategy::StringConvertible => f.write_str("string-convertible"),
            Strategy::Complex => f.write_str("complex"),
        }
    }
}

/// Maps types to storage strategies.
///
/// The table is filled once, when the service is built:
///
/// 1. Decimal, GUID, URI and the date-time types are always
///    string-convertible, whatever the backend declares.
/// 2. The Rust type behind each backend-declared native kind is native.
///    `String` is native on every backend.
/// 3. The remaining scalars (every integer width, both float widths,
///    `bool`, `char`) are string-convertible.
///
/// Types not in the table are complex.
#[derive(Clone, Debug)]
pub struct Classifier {
    table: HashMap<TypeId, Strategy>,
}

impl Classifier {
    /// Build the table for a backend declaring `native_kinds`.
    pub fn new(native_kinds: &[NativeKind]) -> Self {
        let mut classifier = Classifier {
            table: HashMap::new(),
        };

        classifier.insert_special::<Decimal>();
        classifier.insert_special::<Uuid>();
        classifier.insert_special::<Url>();
        classifier.insert_special::<DateTime<Utc>>();
        classifier.insert_special::<DateTime<Local>>();
        classifier.insert_special::<DateTime<FixedOffset>>();
        classifier.insert_special::<NaiveDateTime>();

        classifier
            .table
            .insert(TypeId::of::<String>(), Strategy::Native(NativeKind::String));
        for kind in native_kinds {
            if let Some(type_id) = backing_type(*kind) {
                classifier.table.insert(type_id, Strategy::Native(*kind));
            }
        }

        classifier.add_string_convertible::<bool>();
        classifier.add_string_convertible::<char>();
        classifier.add_string_convertible::<i8>();
        classifier.add_string_convertible::<i16>();
        classifier.add_string_convertible::<i32>();
        classifier.add_string_convertible::<i64>();
        classifier.add_string_convertible::<u8>();
        classifier.add_string_convertible::<u16>();
        classifier.add_string_convertible::<u32>();
        classifier.add_string_convertible::<u64>();
        classifier.add_string_convertible::<f32>();
        classifier.add_string_convertible::<f64>();

        classifier
    }

    fn insert_special<T: 'static>(&mut self) {
        self.table
            .insert(TypeId::of::<T>(), Strategy::StringConvertible);
    }

    /// Mark `T` as string-convertible unless it is already classified.
    ///
    /// A converter pair between `T` and `String` must be registered for
    /// the type to actually persist.
    pub fn add_string_convertible<T: 'static>(&mut self) {
        self.table
            .entry(TypeId::of::<T>())
            .or_insert(Strategy::StringConvertible);
    }

    /// The strategy for `descriptor`'s underlying type.
    pub fn classify(&self, descriptor: &TypeDescriptor) -> Strategy {
        let strategy = self
            .table
            .get(&descriptor.unwrapped().type_id())
            .copied()
            .unwrap_or(Strategy::Complex);
        tracing::trace!(type_name = descriptor.type_name(), %strategy, "classified");
        strategy
    }

    /// The strategy for `T`.
    pub fn classify_type<T: Setting>(&self) -> Strategy {
        self.classify(&T::descriptor())
    }

    pub fn is_native(&self, descriptor: &TypeDescriptor) -> bool {
        matches!(self.classify(descriptor), Strategy::Native(_))
    }

    pub fn is_string_convertible(&self, descriptor: &TypeDescriptor) -> bool {
        self.classify(descriptor) == Strategy::StringConvertible
    }
}

impl Default for Classifier {
    /// A classifier for a backend that only stores strings.
    fn default() -> Self {
        Classifier::new(&[NativeKind::String])
    }
}

fn backing_type(kind: NativeKind) -> Option<TypeId> {
    match kind {
        NativeKind::Bool => Some(TypeId::of::<bool>()),
        NativeKind::Int => Some(TypeId::of::<i32>()),
        NativeKind::Long => Some(TypeId::of::<i64>()),
        NativeKind::Float => Some(TypeId::of::<f32>()),
        NativeKind::Double => Some(TypeId::of::<f64>()),
        NativeKind::String => None,
    }
}
