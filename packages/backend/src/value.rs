//! Native scalar values a backend can hold without string conversion.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of scalar a backend may declare as native.
///
/// Every backend stores `String` natively; the numeric and boolean kinds are
/// opt-in (a platform preference store typically offers all of them, a
/// file-per-key store none).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeKind {
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    String,
}

impl NativeKind {
    /// All native kinds, in declaration order.
    pub const ALL: [NativeKind; 6] = [
        NativeKind::Bool,
        NativeKind::Int,
        NativeKind::Long,
        NativeKind::Float,
        NativeKind::Double,
        NativeKind::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NativeKind::Bool => "bool",
            NativeKind::Int => "int",
            NativeKind::Long => "long",
            NativeKind::Float => "float",
            NativeKind::Double => "double",
            NativeKind::String => "string",
        }
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value in one of the backend's native representations.
///
/// Serialized with an explicit kind tag so stores that persist to a
/// self-describing format (JSON) keep `Int(1)` and `Double(1.0)` apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum NativeValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl NativeValue {
    /// The kind of this value.
    pub fn kind(&self) -> NativeKind {
        match self {
            NativeValue::Bool(_) => NativeKind::Bool,
            NativeValue::Int(_) => NativeKind::Int,
            NativeValue::Long(_) => NativeKind::Long,
            NativeValue::Float(_) => NativeKind::Float,
            NativeValue::Double(_) => NativeKind::Double,
            NativeValue::String(_) => NativeKind::String,
        }
    }

    /// Culture-invariant string form of the value.
    ///
    /// Numbers use Rust's shortest round-trip `Display` form, so parsing the
    /// result back yields the same bits.
    pub fn to_canonical_string(&self) -> String {
        match self {
            NativeValue::Bool(b) => b.to_string(),
            NativeValue::Int(i) => i.to_string(),
            NativeValue::Long(l) => l.to_string(),
            NativeValue::Float(f) => f.to_string(),
            NativeValue::Double(d) => d.to_string(),
            NativeValue::String(s) => s.clone(),
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Move the payload into a type-erased box holding the plain Rust value
    /// (`bool`, `i32`, `i64`, `f32`, `f64` or `String`).
    pub fn into_any(self) -> Box<dyn Any + Send> {
        match self {
            NativeValue::Bool(b) => Box::new(b),
            NativeValue::Int(i) => Box::new(i),
            NativeValue::Long(l) => Box::new(l),
            NativeValue::Float(f) => Box::new(f),
            NativeValue::Double(d) => Box::new(d),
            NativeValue::String(s) => Box::new(s),
        }
    }

    /// Build a native value of `kind` from a type-erased plain Rust value.
    ///
    /// Returns `None` when the erased value is not the Rust type backing
    /// `kind`.
    pub fn from_any(value: &dyn Any, kind: NativeKind) -> Option<Self> {
        match kind {
            NativeKind::Bool => value.downcast_ref::<bool>().map(|v| NativeValue::Bool(*v)),
            NativeKind::Int => value.downcast_ref::<i32>().map(|v| NativeValue::Int(*v)),
            NativeKind::Long => value.downcast_ref::<i64>().map(|v| NativeValue::Long(*v)),
            NativeKind::Float => value.downcast_ref::<f32>().map(|v| NativeValue::Float(*v)),
            NativeKind::Double => value.downcast_ref::<f64>().map(|v| NativeValue::Double(*v)),
            NativeKind::String => value
                .downcast_ref::<String>()
                .map(|v| NativeValue::String(v.clone())),
        }
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        NativeValue::Bool(v)
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        NativeValue::Int(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        NativeValue::Long(v)
    }
}

impl From<f32> for NativeValue {
    fn from(v: f32) -> Self {
        NativeValue::Float(v)
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        NativeValue::Double(v)
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        NativeValue::String(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        NativeValue::String(v.to_string())
    }
}
