//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```
//! use lazygrid_core::prelude::*;
//!
//! // Now you have access to:
//! // - Predicate, FilterParser, FilterConverter, FilterEvaluator (filtering)
//! // - SortSpec, SortDirection (sorting)
//! // - DataProvider, ProviderBuilder, PagingStrategy (paging)
//! ```

// Filtering
pub use crate::filter::{FilterConverter, FilterError, FilterEvaluator, FilterParser, FilterResult, Predicate};

// Sorting
pub use crate::sort::{SortConverter, SortDirection, SortSpec};

// Paging
pub use crate::provider::{
    BoxedProvider, DataProvider, IdListDataProvider, OffsetDataProvider, PagingStrategy,
    ProviderBuilder, ProviderError, ProviderResult, ProviderState,
};
