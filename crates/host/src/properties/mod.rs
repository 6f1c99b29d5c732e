//! Thread-safe property store.
//!
//! [`PropertySet`] holds the server object's configuration properties and
//! serves them to the interceptor through [`ConfigurationSource`]. Values can
//! be changed while requests are running; the interceptor reads
//! `ExtensionName` on every resolution, so a change takes effect on the next
//! request.

use std::collections::BTreeMap;

use interceptor::{ConfigurationError, ConfigurationSource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::HostAdapterError;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A string value. The only kind read as an extension name.
    String(String),
    /// A whole number.
    Integer(i64),
    /// A flag.
    Boolean(bool),
}

impl PropertyValue {
    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Named configuration properties of a server object.
///
/// # Example
///
/// ```
/// use host::{PropertySet, PropertyValue};
/// use interceptor::ConfigurationSource;
///
/// let properties = PropertySet::new();
/// properties.set("ExtensionName", "Audit");
/// properties.set("MaxRecordCount", 1000_i64);
///
/// assert_eq!(properties.get("ExtensionName"), Ok(Some("Audit".to_owned())));
/// assert!(properties.get("MaxRecordCount").is_err());
/// assert_eq!(properties.value("MaxRecordCount"), Some(PropertyValue::Integer(1000)));
/// ```
#[derive(Debug, Default)]
pub struct PropertySet {
    values: RwLock<BTreeMap<String, PropertyValue>>,
}

impl PropertySet {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a property set from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`HostAdapterError::InvalidProperties`] if `json` is not an
    /// object of string, integer or boolean values.
    pub fn from_json(json: &str) -> Result<Self, HostAdapterError> {
        let values: BTreeMap<String, PropertyValue> = serde_json::from_str(json)
            .map_err(|source| HostAdapterError::InvalidProperties { source })?;
        Ok(Self {
            values: RwLock::new(values),
        })
    }

    /// Sets `key`, returning the previous value.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let key = key.into();
        let value = value.into();
        debug!(key = %key, ?value, "property set");
        self.values.write().insert(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<PropertyValue> {
        let previous = self.values.write().remove(key);
        if previous.is_some() {
            debug!(key, "property removed");
        }
        previous
    }

    /// The value of `key`, whatever its type.
    pub fn value(&self, key: &str) -> Option<PropertyValue> {
        self.values.read().get(key).cloned()
    }

    /// Number of properties set.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// A copy of every property, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, PropertyValue> {
        self.values.read().clone()
    }
}

impl ConfigurationSource for PropertySet {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        match self.values.read().get(key) {
            None => Ok(None),
            Some(PropertyValue::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(ConfigurationError::NotAString {
                key: key.to_owned(),
            }),
        }
    }
}
