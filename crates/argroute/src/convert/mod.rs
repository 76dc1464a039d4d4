//! Type-constraint converters
//!
//! A converter turns raw argument text into a [`Value`]. Type constraints in
//! patterns (`{id:int}`) are resolved against a [`ConverterRegistry`] when
//! the pattern is compiled, so compiled routes carry the converter itself and
//! never look names up again while matching.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::Value;

pub mod builtin;

pub use builtin::BUILTIN_TYPE_NAMES;

/// Conversion function signature: raw text → value, or a human-readable reason
pub type ConvertFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// A named, shareable conversion function
#[derive(Clone)]
pub struct Converter {
    name: Arc<str>,
    func: Arc<ConvertFn>,
}

impl Converter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    /// Type name this converter was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn convert(&self, raw: &str) -> Result<Value, String> {
        (self.func)(raw)
    }

    /// Same conversion function exposed under another type name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            func: Arc::clone(&self.func),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converter").field(&self.name).finish()
    }
}

/// Name → converter table consulted at compile time
///
/// # Examples
///
/// ```
/// use argroute::{ConverterRegistry, Value};
///
/// let mut registry = ConverterRegistry::new();
/// registry.register("color", |raw| match raw {
///     "red" | "green" | "blue" => Ok(Value::String(raw.to_string())),
///     other => Err(format!("'{}' is not a color", other)),
/// });
///
/// assert!(registry.contains("color"));
/// assert!(registry.contains("int"));
/// ```
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl ConverterRegistry {
    /// Registry pre-populated with every built-in type
    pub fn new() -> Self {
        Self {
            converters: builtin::BUILTINS.clone(),
        }
    }

    /// Registry without any converters, for hosts that want full control
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registers (or replaces) the converter for `name`
    ///
    /// Must be called before compiling any pattern that references `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.converters.contains_key(&name) {
            tracing::debug!(type_name = %name, "replacing registered converter");
        }
        self.converters
            .insert(name.clone(), Converter::new(name, func));
        self
    }

    /// Registers `name` as another spelling of an existing converter
    ///
    /// Returns `false` when `existing` is unknown.
    pub fn register_alias(&mut self, name: impl Into<String>, existing: &str) -> bool {
        match self.converters.get(existing) {
            Some(converter) => {
                let name = name.into();
                let alias = converter.renamed(name.clone());
                self.converters.insert(name, alias);
                true
            }
            None => false,
        }
    }

    /// Functional builder variant of [`register`](Self::register)
    pub fn with_converter<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(name, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Converter> {
        self.converters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_all_builtins() {
        let registry = ConverterRegistry::new();
        for name in BUILTIN_TYPE_NAMES {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
        assert_eq!(registry.names().len(), BUILTIN_TYPE_NAMES.len());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ConverterRegistry::empty();
        assert!(!registry.contains("int"));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_register_custom_converter() {
        let registry = ConverterRegistry::new().with_converter("even", |raw| {
            let n: i64 = raw.parse().map_err(|_| "not a number".to_string())?;
            if n % 2 == 0 {
                Ok(Value::Long(n))
            } else {
                Err(format!("{} is odd", n))
            }
        });

        let even = registry.get("even").unwrap();
        assert_eq!(even.name(), "even");
        assert_eq!(even.convert("4"), Ok(Value::Long(4)));
        assert_eq!(even.convert("3"), Err("3 is odd".to_string()));
    }

    #[test]
    fn test_register_alias() {
        let mut registry = ConverterRegistry::new();
        assert!(registry.register_alias("port", "ushort"));
        assert!(!registry.register_alias("nope", "missing"));

        let port = registry.get("port").unwrap();
        assert_eq!(port.name(), "port");
        assert_eq!(port.convert("8080"), Ok(Value::UShort(8080)));
        assert!(port.convert("70000").is_err());
    }
}
