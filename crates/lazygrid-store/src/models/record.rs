//! Generic property-bag entity used by the in-memory store.

use std::collections::BTreeMap;

use serde::Serialize;

use super::entity::Entity;
use super::schema::Schema;
use super::value::Value;
use crate::error::{StoreError, StoreResult};

/// A flat map of property paths to values.
///
/// Nested JSON objects are flattened into dot-qualified paths when a record
/// is loaded, so `{"address": {"city": "Oslo"}}` is stored under
/// `address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    key_property: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a record holding only its primary key.
    pub fn new(key_property: impl Into<String>, key: impl Into<Value>) -> Self {
        let key_property = key_property.into();
        let mut fields = BTreeMap::new();
        fields.insert(key_property.clone(), key.into());
        Self {
            key_property,
            fields,
        }
    }

    /// Sets a property, returning the updated record.
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Sets a property in place.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(path.into(), value.into());
    }

    /// Returns the value stored at `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    /// Returns the primary key value.
    pub fn key(&self) -> &Value {
        self.fields.get(&self.key_property).unwrap_or(&Value::Null)
    }

    /// Returns all fields by path.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Builds a record from a JSON object, typing values by `schema`.
    ///
    /// Properties the schema does not declare are kept with an inferred
    /// type.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the primary key is missing or
    /// null, if a value does not match its declared type, or if the object
    /// contains an array.
    pub fn from_json(
        object: &serde_json::Map<String, serde_json::Value>,
        schema: &Schema,
    ) -> StoreResult<Self> {
        let mut fields = BTreeMap::new();
        flatten_into(None, object, schema, &mut fields)?;

        match fields.get(&schema.primary_key) {
            Some(key) if !key.is_null() => {}
            _ => {
                return Err(StoreError::invalid_record(format!(
                    "record has no value for primary key '{}'",
                    schema.primary_key
                )))
            }
        }

        Ok(Self {
            key_property: schema.primary_key.clone(),
            fields,
        })
    }

    /// Converts the record into a flat JSON object for output.
    pub fn to_json(&self) -> serde_json::Value {
        let object: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(path, value)| (path.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(object)
    }
}

fn flatten_into(
    prefix: Option<&str>,
    object: &serde_json::Map<String, serde_json::Value>,
    schema: &Schema,
    out: &mut BTreeMap<String, Value>,
) -> StoreResult<()> {
    for (name, json) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };

        if let serde_json::Value::Object(nested) = json {
            flatten_into(Some(&path), nested, schema, out)?;
            continue;
        }

        let value = match schema.property_type(&path) {
            Some(value_type) => Value::from_json(json, value_type).map_err(|e| {
                StoreError::invalid_record(format!("property '{path}': {e}"))
            })?,
            None => Value::infer_from_json(json).ok_or_else(|| {
                StoreError::invalid_record(format!("property '{path}': arrays are not supported"))
            })?,
        };
        out.insert(path, value);
    }
    Ok(())
}

impl Entity for Record {
    type Key = Value;

    fn primary_key(&self) -> Value {
        self.key().clone()
    }

    fn property(&self, path: &str) -> Option<Value> {
        self.fields.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueType;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int)
            .with_property("name", ValueType::Text)
            .with_property("address.city", ValueType::Text)
            .with_property("born", ValueType::Date)
    }

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_builder_sets_key_and_fields() {
        let record = Record::new("id", 7).with("name", "Joe");
        assert_eq!(record.primary_key(), Value::Int(7));
        assert_eq!(record.property("name"), Some(Value::text("Joe")));
        assert_eq!(record.property("missing"), None);
    }

    #[test]
    fn test_from_json_flattens_nested_objects() {
        let record = Record::from_json(
            &object(json!({
                "id": 1,
                "name": "Ann",
                "address": { "city": "Oslo", "zip": "0150" }
            })),
            &schema(),
        )
        .unwrap();

        assert_eq!(record.get("address.city"), Some(&Value::text("Oslo")));
        assert_eq!(record.get("address.zip"), Some(&Value::text("0150")));
        assert_eq!(record.get("address"), None);
    }

    #[test]
    fn test_from_json_types_declared_properties() {
        let record = Record::from_json(
            &object(json!({ "id": 1, "born": "1990-04-01" })),
            &schema(),
        )
        .unwrap();
        assert_eq!(
            record.get("born").and_then(Value::value_type),
            Some(ValueType::Date)
        );
    }

    #[test]
    fn test_from_json_requires_key() {
        let err = Record::from_json(&object(json!({ "name": "Ann" })), &schema()).unwrap_err();
        assert!(err.to_string().contains("primary key 'id'"));

        let err = Record::from_json(&object(json!({ "id": null })), &schema()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { .. }));
    }

    #[test]
    fn test_from_json_rejects_type_mismatch() {
        let err = Record::from_json(&object(json!({ "id": "one" })), &schema()).unwrap_err();
        assert!(err.to_string().contains("property 'id'"));
    }

    #[test]
    fn test_from_json_rejects_arrays() {
        let err =
            Record::from_json(&object(json!({ "id": 1, "tags": ["a"] })), &schema()).unwrap_err();
        assert!(err.to_string().contains("arrays are not supported"));
    }

    #[test]
    fn test_to_json_is_flat() {
        let record = Record::new("id", 3).with("address.city", "Rome");
        assert_eq!(record.to_json(), json!({ "id": 3, "address.city": "Rome" }));
    }
}
