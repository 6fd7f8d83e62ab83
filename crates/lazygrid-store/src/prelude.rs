//! Prelude module for convenient imports.
//!
//! Re-exports the types a store implementer or data-provider user needs
//! most often.
//!
//! # Example
//!
//! ```
//! use lazygrid_store::prelude::*;
//!
//! // Now you have access to:
//! // - BackingStore, FetchJoin, KeyOf (store contract)
//! // - Criterion, NativeSort, OrderClause (native query model)
//! // - Entity, EntityMetadata, Schema, Record, Value, ValueType (models)
//! // - MemoryStore, Dataset, RetryingStore (implementations)
//! // - StoreError, StoreResult (error handling)
//! ```

// Store contract
pub use crate::store::{BackingStore, FetchJoin, KeyOf};

// Native query model
pub use crate::native::{Criterion, LikePattern, NativeSort, OrderClause};

// Models
pub use crate::models::{
    Entity, EntityMetadata, PropertyResolution, Record, Schema, Value, ValueType,
};

// Implementations
pub use crate::memory::{Dataset, MemoryStore};
pub use crate::retry::{RetryConfig, RetryingStore};

// Error types
pub use crate::error::{StoreError, StoreResult};
