//! Type-tagged JSON for complex settings.
//!
//! A complex value is written as an envelope naming the Rust type it was
//! written as:
//!
//! ```json
//! {"$type": "app::Person", "value": {"name": "Ada", "age": 36}}
//! ```
//!
//! On read the `value` member is deserialized into whatever type the caller
//! asks for, so a value written as one type can be read back as another
//! type with a compatible shape. A bare JSON document without an envelope
//! is accepted too.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SettingsError;
use crate::setting::TypeDescriptor;

const TYPE_FIELD: &str = "$type";
const VALUE_FIELD: &str = "value";

#[derive(Serialize)]
struct EnvelopeRef<'a, T: ?Sized> {
    #[serde(rename = "$type")]
    type_name: &'a str,
    value: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "$type")]
    type_name: String,
    value: Value,
}

/// Encoder/decoder for complex settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComplexCodec;

impl ComplexCodec {
    pub fn new() -> Self {
        ComplexCodec
    }

    /// Serialize `value` inside an envelope naming `descriptor`'s type.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        value: &T,
    ) -> Result<String, SettingsError> {
        let envelope = EnvelopeRef {
            type_name: descriptor.type_name(),
            value,
        };
        serde_json::to_string(&envelope).map_err(|e| SettingsError::Serialization {
            type_name: descriptor.type_name(),
            message: e.to_string(),
        })
    }

    /// Deserialize a stored document into `T`.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, serde_json::Error> {
        let document: Value = serde_json::from_str(text)?;
        if is_envelope(&document) {
            let envelope: Envelope = serde_json::from_value(document)?;
            tracing::trace!(stored_type = %envelope.type_name, "decoding enveloped value");
            serde_json::from_value(envelope.value)
        } else {
            serde_json::from_value(document)
        }
    }

    /// The type name recorded in a stored document, if it has an envelope.
    pub fn stored_type_name(&self, text: &str) -> Option<String> {
        let document: Value = serde_json::from_str(text).ok()?;
        if !is_envelope(&document) {
            return None;
        }
        document
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

fn is_envelope(document: &Value) -> bool {
    match document.as_object() {
        Some(object) => {
            object.len() == 2
                && object.get(TYPE_FIELD).is_some_and(Value::is_string)
                && object.contains_key(VALUE_FIELD)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Setting;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }

    impl Setting for Person {}

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Contact {
        name: String,
    }

    fn ada() -> Person {
        Person {
            name: "Ada".to_string(),
            age: 36,
        }
    }

    #[test]
    fn encode_writes_envelope() {
        let codec = ComplexCodec::new();
        let text = codec.encode(&Person::descriptor(), &ada()).unwrap();

        let document: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["value"]["name"], "Ada");
        assert_eq!(
            codec.stored_type_name(&text).unwrap(),
            std::any::type_name::<Person>()
        );
    }

    #[test]
    fn decode_roundtrip() {
        let codec = ComplexCodec::new();
        let text = codec.encode(&Person::descriptor(), &ada()).unwrap();
        let person: Person = codec.decode(&text).unwrap();
        assert_eq!(person, ada());
    }

    #[test]
    fn decode_into_compatible_type() {
        let codec = ComplexCodec::new();
        let text = codec.encode(&Person::descriptor(), &ada()).unwrap();
        let contact: Contact = codec.decode(&text).unwrap();
        assert_eq!(contact.name, "Ada");
    }

    #[test]
    fn decode_accepts_bare_document() {
        let codec = ComplexCodec::new();
        let person: Person = codec.decode(r#"{"name":"Ada","age":36}"#).unwrap();
        assert_eq!(person, ada());
        assert_eq!(codec.stored_type_name(r#"{"name":"Ada","age":36}"#), None);
    }

    #[test]
    fn decode_rejects_incompatible_shape() {
        let codec = ComplexCodec::new();
        let text = codec.encode(&Person::descriptor(), &ada()).unwrap();
        assert!(codec.decode::<Vec<u8>>(&text).is_err());
        assert!(codec.decode::<Person>("not json").is_err());
    }

    #[test]
    fn envelope_inside_value_is_kept() {
        let codec = ComplexCodec::new();
        let inner = serde_json::json!({"$type": "x", "value": 1});
        let text = codec.encode(&Value::descriptor(), &inner).unwrap();
        let back: Value = codec.decode(&text).unwrap();
        assert_eq!(back, inner);
    }

    #[test]
    fn encode_failure_is_serialization_error() {
        // JSON object keys must be strings
        let mut map: HashMap<(i32, i32), i32> = HashMap::new();
        map.insert((1, 2), 3);

        let codec = ComplexCodec::new();
        let err = codec
            .encode(&TypeDescriptor::of::<HashMap<(i32, i32), i32>>(), &map)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Serialization { .. }));
    }
}
