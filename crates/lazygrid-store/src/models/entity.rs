//! Entity and metadata traits.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use super::value::{Value, ValueType};

/// A domain object identified by a primary key.
///
/// Implementations expose their attributes through property paths only.
/// Nested attributes use dot-qualified paths (`address.city`).
pub trait Entity {
    /// Primary key type.
    type Key: Clone + Eq + Hash + Ord + fmt::Debug + Serialize;

    /// Returns the primary key of this entity.
    fn primary_key(&self) -> Self::Key;

    /// Returns the value at `path`, or `None` when the entity has no value
    /// there.
    ///
    /// Whether `path` names a real property is decided by
    /// [`EntityMetadata`], not by the entity.
    fn property(&self, path: &str) -> Option<Value>;
}

/// Result of resolving a property path against entity metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyResolution {
    /// Whether the path names a property.
    pub exists: bool,
    /// Declared type of the property, when it exists.
    pub value_type: Option<ValueType>,
}

impl PropertyResolution {
    /// Resolution of a property with the given type.
    pub fn found(value_type: ValueType) -> Self {
        Self {
            exists: true,
            value_type: Some(value_type),
        }
    }

    /// Resolution of an unknown path.
    pub fn missing() -> Self {
        Self {
            exists: false,
            value_type: None,
        }
    }
}

/// Description of an entity type's properties and primary key.
pub trait EntityMetadata {
    /// Resolves a property path.
    fn resolve_property(&self, path: &str) -> PropertyResolution;

    /// Returns the path of the primary key property.
    fn primary_key_property(&self) -> &str;

    /// Returns every known property path, used for "did you mean" hints.
    fn property_names(&self) -> Vec<&str>;
}

impl<M: EntityMetadata + ?Sized> EntityMetadata for &M {
    fn resolve_property(&self, path: &str) -> PropertyResolution {
        (**self).resolve_property(path)
    }

    fn primary_key_property(&self) -> &str {
        (**self).primary_key_property()
    }

    fn property_names(&self) -> Vec<&str> {
        (**self).property_names()
    }
}

impl<M: EntityMetadata + ?Sized> EntityMetadata for std::sync::Arc<M> {
    fn resolve_property(&self, path: &str) -> PropertyResolution {
        (**self).resolve_property(path)
    }

    fn primary_key_property(&self) -> &str {
        (**self).primary_key_property()
    }

    fn property_names(&self) -> Vec<&str> {
        (**self).property_names()
    }
}
