//! Predicate algebra, filter conversion and lazy paginated data providers.
//!
//! - [`filter`] - the [`Predicate`](filter::Predicate) tree, in-memory
//!   evaluation, conversion to native store criteria and a textual filter
//!   syntax
//! - [`sort`] - multi-key sort specifications and their native translation
//! - [`provider`] - the [`DataProvider`](provider::DataProvider) trait with
//!   offset-based and id-list-based strategies
//!
//! Stores and entity metadata come from [`lazygrid_store`]; this crate only
//! talks to them through the [`BackingStore`](lazygrid_store::BackingStore)
//! and [`EntityMetadata`](lazygrid_store::EntityMetadata) traits.

pub mod filter;
pub mod prelude;
pub mod provider;
pub mod sort;

pub use filter::{FilterError, FilterResult, Predicate};
pub use provider::{
    DataProvider, PagingStrategy, ProviderBuilder, ProviderError, ProviderResult, ProviderState,
};
pub use sort::{SortDirection, SortSpec};
