//! Converter registry and the default converter set.

mod defaults;
mod registry;

pub use defaults::register_defaults;
pub use registry::ConverterRegistry;

impl ConverterRegistry {
    /// A registry pre-loaded with the default converters.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        register_defaults(&registry);
        registry
    }
}
