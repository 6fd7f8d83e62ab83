//! Concrete entity metadata backed by a property map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{EntityMetadata, PropertyResolution};
use super::value::ValueType;
use crate::error::{StoreError, StoreResult};

/// Property names and types of one entity type.
///
/// The primary key is itself a property and must appear in `properties`.
///
/// # Example
///
/// ```
/// use lazygrid_store::{EntityMetadata, Schema, ValueType};
///
/// let schema = Schema::new("id", ValueType::Int)
///     .with_property("name", ValueType::Text)
///     .with_property("address.city", ValueType::Text);
///
/// assert_eq!(schema.primary_key_property(), "id");
/// assert!(schema.resolve_property("address.city").exists);
/// assert!(!schema.resolve_property("address").exists);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Path of the primary key property.
    pub primary_key: String,

    /// Declared properties by path.
    #[serde(default)]
    pub properties: BTreeMap<String, ValueType>,
}

impl Schema {
    /// Creates a schema containing only the primary key.
    pub fn new(primary_key: impl Into<String>, key_type: ValueType) -> Self {
        let primary_key = primary_key.into();
        let mut properties = BTreeMap::new();
        properties.insert(primary_key.clone(), key_type);
        Self {
            primary_key,
            properties,
        }
    }

    /// Adds a property, returning the extended schema.
    pub fn with_property(mut self, path: impl Into<String>, value_type: ValueType) -> Self {
        self.properties.insert(path.into(), value_type);
        self
    }

    /// Returns the declared type of a property.
    pub fn property_type(&self, path: &str) -> Option<ValueType> {
        self.properties.get(path).copied()
    }

    /// Checks that the primary key is a declared property.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the key is not declared.
    pub fn validate(&self) -> StoreResult<()> {
        if self.properties.contains_key(&self.primary_key) {
            Ok(())
        } else {
            Err(StoreError::invalid_record(format!(
                "primary key '{}' is not a declared property",
                self.primary_key
            )))
        }
    }
}

impl EntityMetadata for Schema {
    fn resolve_property(&self, path: &str) -> PropertyResolution {
        match self.property_type(path) {
            Some(value_type) => PropertyResolution::found(value_type),
            None => PropertyResolution::missing(),
        }
    }

    fn primary_key_property(&self) -> &str {
        &self.primary_key
    }

    fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }
}
