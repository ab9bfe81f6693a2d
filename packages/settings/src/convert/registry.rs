//! Type-erased converter catalog.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ConversionError;

type ErasedConvert =
    dyn Fn(&dyn Any) -> Result<Box<dyn Any + Send>, ConversionError> + Send + Sync;

struct Entry {
    convert: Arc<ErasedConvert>,
}

/// A catalog of converters keyed by (source type, target type).
///
/// Registration takes `&self`; lookups share a read lock, so one registry
/// can serve many threads. Registering a pair twice replaces the earlier
/// converter.
///
/// ```rust
/// use typed_settings::{ConversionError, ConverterRegistry};
///
/// let registry = ConverterRegistry::new();
/// registry.register(|s: &String| {
///     s.parse::<u16>()
///         .map_err(|e| ConversionError::failed::<String, u16>(e.to_string()))
/// });
///
/// let port: u16 = registry.convert(&"8080".to_string()).unwrap();
/// assert_eq!(port, 8080);
/// assert_eq!(registry.try_convert(&"eighty".to_string(), 80u16), 80);
/// ```
pub struct ConverterRegistry {
    converters: RwLock<HashMap<(TypeId, TypeId), Entry>>,
    names: RwLock<HashMap<TypeId, &'static str>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            converters: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
        }
    }

    /// Register a converter from `S` to `T`, replacing any earlier one.
    pub fn register<S, T, F>(&self, convert: F)
    where
        S: 'static,
        T: Send + 'static,
        F: Fn(&S) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        let erased = move |source: &dyn Any| -> Result<Box<dyn Any + Send>, ConversionError> {
            let source = source.downcast_ref::<S>().ok_or(ConversionError::NoConverter {
                source_type: type_name::<S>(),
                target_type: type_name::<T>(),
            })?;
            convert(source).map(|target| Box::new(target) as Box<dyn Any + Send>)
        };

        let pair = (TypeId::of::<S>(), TypeId::of::<T>());
        let entry = Entry {
            convert: Arc::new(erased),
        };

        if let Ok(mut names) = self.names.write() {
            names.insert(pair.0, type_name::<S>());
            names.insert(pair.1, type_name::<T>());
        }

        match self.converters.write() {
            Ok(mut converters) => {
                if converters.insert(pair, entry).is_some() {
                    tracing::debug!(
                        source = type_name::<S>(),
                        target = type_name::<T>(),
                        "replaced converter"
                    );
                }
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(pair, entry);
            }
        }
    }

    /// Whether a converter from `S` to `T` is registered.
    pub fn contains<S: 'static, T: 'static>(&self) -> bool {
        self.contains_pair(TypeId::of::<S>(), TypeId::of::<T>())
    }

    pub(crate) fn contains_pair(&self, source: TypeId, target: TypeId) -> bool {
        self.lookup(source, target).is_some()
    }

    /// Convert `source` to `T`, failing if no converter applies or the
    /// converter rejects the input.
    pub fn convert<S: 'static, T: 'static>(&self, source: &S) -> Result<T, ConversionError> {
        let converted = self.convert_any(source, TypeId::of::<T>())?;
        converted
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ConversionError::failed::<S, T>("converter produced another type"))
    }

    /// Convert `source` to `T`, returning `default` on any failure.
    pub fn try_convert<S: 'static, T: 'static>(&self, source: &S, default: T) -> T {
        match self.convert(source) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "conversion failed, using default");
                default
            }
        }
    }

    /// Convert a type-erased value to the type identified by `target`.
    ///
    /// The returned box holds a value of the target type.
    pub fn convert_any(
        &self,
        source: &dyn Any,
        target: TypeId,
    ) -> Result<Box<dyn Any + Send>, ConversionError> {
        let source_id = (*source).type_id();
        let convert = self
            .lookup(source_id, target)
            .ok_or_else(|| ConversionError::NoConverter {
                source_type: self.name_of(source_id),
                target_type: self.name_of(target),
            })?;
        convert(source)
    }

    fn lookup(&self, source: TypeId, target: TypeId) -> Option<Arc<ErasedConvert>> {
        let converters = match self.converters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        converters
            .get(&(source, target))
            .map(|entry| Arc::clone(&entry.convert))
    }

    fn name_of(&self, id: TypeId) -> &'static str {
        self.names
            .read()
            .ok()
            .and_then(|names| names.get(&id).copied())
            .unwrap_or("<unregistered type>")
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.converters.read().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("ConverterRegistry")
            .field("converters", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_i32(s: &String) -> Result<i32, ConversionError> {
        s.parse()
            .map_err(|e: std::num::ParseIntError| ConversionError::failed::<String, i32>(e.to_string()))
    }

    #[test]
    fn strict_convert_uses_registered_converter() {
        let registry = ConverterRegistry::new();
        registry.register(parse_i32);

        let value: i32 = registry.convert(&"42".to_string()).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn strict_convert_reports_missing_converter() {
        let registry = ConverterRegistry::new();
        let result: Result<i32, _> = registry.convert(&"42".to_string());
        assert!(matches!(result, Err(ConversionError::NoConverter { .. })));
    }

    #[test]
    fn strict_convert_reports_converter_failure() {
        let registry = ConverterRegistry::new();
        registry.register(parse_i32);

        let result: Result<i32, _> = registry.convert(&"4x2".to_string());
        assert!(matches!(result, Err(ConversionError::Failed { .. })));
    }

    #[test]
    fn try_convert_falls_back_to_default() {
        let registry = ConverterRegistry::new();
        registry.register(parse_i32);

        assert_eq!(registry.try_convert(&"7".to_string(), -1), 7);
        assert_eq!(registry.try_convert(&"seven".to_string(), -1), -1);
        // no converter at all
        assert_eq!(registry.try_convert(&1.5f64, -1i32), -1);
    }

    #[test]
    fn last_registration_wins() {
        let registry = ConverterRegistry::new();
        registry.register(|_: &String| Ok(1i32));
        registry.register(|_: &String| Ok(2i32));

        let value: i32 = registry.convert(&String::new()).unwrap();
        assert_eq!(value, 2);
    }

    #[test]
    fn convert_any_dispatches_on_dynamic_type() {
        let registry = ConverterRegistry::new();
        registry.register(|v: &i32| Ok(v.to_string()));

        let source: &dyn Any = &5i32;
        let converted = registry
            .convert_any(source, TypeId::of::<String>())
            .unwrap();
        assert_eq!(converted.downcast_ref::<String>().map(String::as_str), Some("5"));
    }

    #[test]
    fn missing_converter_names_known_types() {
        let registry = ConverterRegistry::new();
        registry.register(|v: &i32| Ok(v.to_string()));

        let err = registry
            .convert_any(&"x".to_string(), TypeId::of::<i32>())
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::NoConverter {
                source_type: "alloc::string::String",
                target_type: "i32",
            }
        );
    }

    #[test]
    fn contains_reports_registered_pairs() {
        let registry = ConverterRegistry::new();
        assert!(!registry.contains::<String, i32>());
        registry.register(parse_i32);
        assert!(registry.contains::<String, i32>());
        assert!(!registry.contains::<i32, String>());
    }

    #[test]
    fn concurrent_lookups() {
        let registry = Arc::new(ConverterRegistry::new());
        registry.register(parse_i32);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.convert::<String, i32>(&i.to_string()).unwrap())
            })
            .collect();

        let mut results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }
}
