//! Data model shared by stores and data providers.
//!
//! Providers never look inside an entity except through named property
//! paths, so the model is split into the traits providers depend on
//! ([`Entity`], [`EntityMetadata`]) and the concrete types the in-memory
//! store uses ([`Record`], [`Schema`]).

mod entity;
mod record;
mod schema;
mod value;

pub use entity::{Entity, EntityMetadata, PropertyResolution};
pub use record::Record;
pub use schema::Schema;
pub use value::{Value, ValueType};
