use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix of the key holding the element count of a list attribute
pub const COUNT_SUFFIX: &str = ".#";

/// Flat, string-valued attribute set of one state entry
///
/// Terraform's legacy state stores every attribute as a string, including
/// booleans and numbers; list attributes are represented by a `<name>.#`
/// count key. Keys are kept sorted so output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, String>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain string attribute
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set an optional string attribute, writing `""` when absent
    pub fn set_optional(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        self.set(key, value.unwrap_or_default())
    }

    /// Set a boolean as `"true"` / `"false"`, or `""` when absent
    pub fn set_optional_bool(&mut self, key: &str, value: Option<bool>) -> &mut Self {
        self.set(key, value.map(|v| v.to_string()).unwrap_or_default())
    }

    /// Set the `<name>.#` count key of a list attribute
    pub fn set_count(&mut self, name: &str, count: usize) -> &mut Self {
        self.0.insert(count_key(name), count.to_string());
        self
    }
}

#[cfg(test)]
impl AttributeMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Count stored for a list attribute, if present and numeric
    pub fn count(&self, name: &str) -> Option<usize> {
        self.0.get(&count_key(name)).and_then(|v| v.parse().ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `name` -> `name.#`
pub fn count_key(name: &str) -> String {
    format!("{}{}", name, COUNT_SUFFIX)
}
