//! System options.
//!
//! Options are the configuration a [`PluginSystem`](crate::PluginSystem) is
//! created with. They are a JSON object so that any serializable value can be
//! supplied, and plugins read them back with typed accessors.

use crate::error::PluginError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// String-keyed configuration values shared through the [`Context`](crate::Context).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    values: Map<String, Value>,
}

impl Options {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, PluginError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(PluginError::InvalidOptions(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Set an option, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an option, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Get the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Deserialize the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PluginError> {
        self.values
            .get(key)
            .map(|value| T::deserialize(value).map_err(PluginError::from))
            .transpose()
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over the option keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Get the number of options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no options.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for Options {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
