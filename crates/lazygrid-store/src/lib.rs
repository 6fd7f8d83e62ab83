//! Backing-store side of lazygrid.
//!
//! This crate defines everything a data provider needs to talk to a store
//! without knowing how the store works internally:
//!
//! - [`models`] - scalar [`Value`]s, the [`Entity`] and [`EntityMetadata`]
//!   traits, and the concrete [`Schema`] and [`Record`] types
//! - [`native`] - the store's own predicate and ordering representation
//! - [`store`] - the [`BackingStore`] trait and fetch-join hints
//! - [`memory`] - an in-memory reference store and JSON dataset loading
//! - [`retry`] - a retrying wrapper around any store
//!
//! # Quick Start
//!
//! ```
//! use lazygrid_store::prelude::*;
//!
//! let schema = Schema::new("id", ValueType::Int).with_property("name", ValueType::Text);
//! let store = MemoryStore::new(schema);
//! assert_eq!(store.native_count(&Criterion::All).unwrap(), 0);
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod native;
pub mod prelude;
pub mod retry;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{Dataset, MemoryStore};
pub use models::{Entity, EntityMetadata, PropertyResolution, Record, Schema, Value, ValueType};
pub use native::{Criterion, LikePattern, NativeSort, OrderClause};
pub use retry::{RetryConfig, RetryingStore};
pub use store::{BackingStore, FetchJoin, KeyOf};
