//! Sort specifications and their native translation.

use std::fmt;

use lazygrid_store::{EntityMetadata, NativeSort, OrderClause};
use serde::{Deserialize, Serialize};

use crate::filter::{resolve_property, FilterError, FilterResult};

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// One `(property, direction)` sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    /// Property path.
    pub property: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

/// An ordered list of sort keys; earlier keys take priority.
///
/// A spec is a plain value: builder methods return new specs. The
/// primary-key tie-break is added by the data providers, never here.
///
/// # Example
///
/// ```
/// use lazygrid_core::sort::{SortDirection, SortSpec};
///
/// let spec = SortSpec::new().ascending("name").descending("age");
/// assert_eq!(spec, SortSpec::parse("name,-age").unwrap());
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    orders: Vec<SortOrder>,
}

impl SortSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a spec with a single key.
    pub fn by(property: impl Into<String>, direction: SortDirection) -> Self {
        Self::new().then_by(property, direction)
    }

    /// Appends a key.
    pub fn then_by(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        self.orders.push(SortOrder {
            property: property.into(),
            direction,
        });
        self
    }

    /// Appends an ascending key.
    pub fn ascending(self, property: impl Into<String>) -> Self {
        self.then_by(property, SortDirection::Ascending)
    }

    /// Appends a descending key.
    pub fn descending(self, property: impl Into<String>) -> Self {
        self.then_by(property, SortDirection::Descending)
    }

    /// Parses a comma-separated key list such as `name,-age`.
    ///
    /// A leading `-` sorts descending and an optional leading `+` sorts
    /// ascending. Blank input yields an empty spec.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidLiteral` for an empty key.
    pub fn parse(input: &str) -> FilterResult<Self> {
        let mut spec = Self::new();
        if input.trim().is_empty() {
            return Ok(spec);
        }

        for raw in input.split(',') {
            let key = raw.trim();
            let (property, direction) = if let Some(rest) = key.strip_prefix('-') {
                (rest.trim(), SortDirection::Descending)
            } else if let Some(rest) = key.strip_prefix('+') {
                (rest.trim(), SortDirection::Ascending)
            } else {
                (key, SortDirection::Ascending)
            };

            if property.is_empty() {
                return Err(FilterError::invalid_literal(format!("sort key '{key}'")));
            }
            spec = spec.then_by(property, direction);
        }
        Ok(spec)
    }

    /// Returns true if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Iterates keys in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, SortOrder> {
        self.orders.iter()
    }

    /// Returns the keys in priority order.
    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }
}

impl<'a> IntoIterator for &'a SortSpec {
    type Item = &'a SortOrder;
    type IntoIter = std::slice::Iter<'a, SortOrder>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .orders
            .iter()
            .map(|o| match o.direction {
                SortDirection::Ascending => o.property.clone(),
                SortDirection::Descending => format!("-{}", o.property),
            })
            .collect();
        f.write_str(&keys.join(","))
    }
}

/// Translates a [`SortSpec`] into a [`NativeSort`], preserving key order.
#[derive(Debug)]
pub struct SortConverter<'a, M: ?Sized> {
    metadata: &'a M,
}

impl<'a, M> SortConverter<'a, M>
where
    M: EntityMetadata + ?Sized,
{
    /// Creates a converter resolving paths through `metadata`.
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Converts a spec into native ordering clauses.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::PropertyResolution` for unknown paths.
    pub fn convert(&self, spec: &SortSpec) -> FilterResult<NativeSort> {
        spec.iter()
            .map(|order| {
                resolve_property(self.metadata, &order.property)?;
                Ok(match order.direction {
                    SortDirection::Ascending => OrderClause::asc(&order.property),
                    SortDirection::Descending => OrderClause::desc(&order.property),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazygrid_store::{Schema, ValueType};

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int)
            .with_property("name", ValueType::Text)
            .with_property("age", ValueType::Int)
    }

    #[test]
    fn test_builder_preserves_order() {
        let spec = SortSpec::by("name", SortDirection::Ascending).then_by("age", SortDirection::Descending);
        let properties: Vec<&str> = spec.iter().map(|o| o.property.as_str()).collect();
        assert_eq!(properties, vec!["name", "age"]);
        assert_eq!(spec.orders()[1].direction, SortDirection::Descending);
    }

    #[test]
    fn test_parse() {
        let spec = SortSpec::parse(" name , -age,+id ").unwrap();
        assert_eq!(
            spec,
            SortSpec::new().ascending("name").descending("age").ascending("id")
        );
        assert_eq!(spec.to_string(), "name,-age,id");
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert!(SortSpec::parse("").unwrap().is_empty());
        assert!(SortSpec::parse("  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert!(matches!(
            SortSpec::parse("name,,age").unwrap_err(),
            FilterError::InvalidLiteral { .. }
        ));
        assert!(SortSpec::parse("-").is_err());
    }

    #[test]
    fn test_convert() {
        let schema = schema();
        let native = SortConverter::new(&schema)
            .convert(&SortSpec::new().descending("age").ascending("name"))
            .unwrap();
        assert_eq!(
            native.clauses(),
            &[OrderClause::desc("age"), OrderClause::asc("name")]
        );
    }

    #[test]
    fn test_convert_unknown_property() {
        let schema = schema();
        let err = SortConverter::new(&schema)
            .convert(&SortSpec::new().ascending("nam"))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::property_resolution("nam", Some("name".to_string()))
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let spec = SortSpec::parse("name,-age").unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"[{"property":"name","direction":"ascending"},{"property":"age","direction":"descending"}]"#
        );
        assert_eq!(serde_json::from_str::<SortSpec>(&json).unwrap(), spec);
    }
}
