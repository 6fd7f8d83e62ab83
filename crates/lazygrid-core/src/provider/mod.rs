//! Lazy, paginated data providers.
//!
//! A [`DataProvider`] turns a [`Predicate`] and a [`SortSpec`] into native
//! store queries and serves pages, counts and cursor navigation over the
//! result. Two strategies implement the trait:
//!
//! - [`OffsetDataProvider`] asks the store for each page with an offset and
//!   limit. Pages reflect the store as it is when they are fetched.
//! - [`IdListDataProvider`] loads the ordered primary keys once and
//!   materializes pages from that snapshot, so pages and cursor positions
//!   stay put while the underlying data changes.
//!
//! Both are built through [`ProviderBuilder`].
//!
//! # Example
//!
//! ```
//! use lazygrid_core::filter::Predicate;
//! use lazygrid_core::provider::{PagingStrategy, ProviderBuilder};
//! use lazygrid_core::sort::SortSpec;
//! use lazygrid_store::{MemoryStore, Record, Schema, Value, ValueType};
//!
//! let schema = Schema::new("id", ValueType::Int).with_property("age", ValueType::Int);
//! let store = MemoryStore::with_records(
//!     schema.clone(),
//!     (1..=10).map(|i| Record::new("id", i).with("age", 20 + i)),
//! )
//! .unwrap();
//!
//! let mut provider = ProviderBuilder::new(store, schema)
//!     .strategy(PagingStrategy::IdList)
//!     .filter(Predicate::between("age", 22, 26))
//!     .sort(SortSpec::new().ascending("age"))
//!     .build();
//!
//! assert_eq!(provider.count().unwrap(), 5);
//! let page = provider.fetch_page(0, 2).unwrap();
//! assert_eq!(page[0].key(), &Value::Int(2));
//!
//! provider.set_currently_selected_id(Some(Value::Int(2)));
//! assert_eq!(provider.next_item_id().unwrap(), Some(Value::Int(3)));
//! ```

mod builder;
mod cursor;
mod error;
mod id_list;
mod offset;
mod state;

use std::fmt;
use std::str::FromStr;

use lazygrid_store::FetchJoin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::Predicate;
use crate::sort::SortSpec;

pub use builder::{BoxedProvider, ProviderBuilder, DEFAULT_BATCH_SIZE};
pub use cursor::CursorState;
pub use error::{ProviderError, ProviderResult};
pub use id_list::IdListDataProvider;
pub use offset::OffsetDataProvider;
pub use state::QueryState;

// ==================== Provider State ====================

/// Lifecycle state of a provider.
///
/// Any change to the filter, sort, cap or fetch joins returns a provider to
/// `Uninitialized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    /// Nothing is loaded.
    #[default]
    Uninitialized,
    /// The ordered id sequence is loaded but not yet used.
    IdSequenceLoaded,
    /// The last operation served a page or a count.
    Paging,
    /// The last operation moved or queried the cursor.
    Navigating,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderState::Uninitialized => "uninitialized",
            ProviderState::IdSequenceLoaded => "id_sequence_loaded",
            ProviderState::Paging => "paging",
            ProviderState::Navigating => "navigating",
        };
        f.write_str(name)
    }
}

// ==================== Paging Strategy ====================

/// Which provider implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PagingStrategy {
    /// Offset and limit queries per page.
    #[default]
    Offset,
    /// Snapshot of ordered ids, materialized per page.
    IdList,
}

impl PagingStrategy {
    /// Returns the configuration name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            PagingStrategy::Offset => "offset",
            PagingStrategy::IdList => "id-list",
        }
    }
}

impl fmt::Display for PagingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a paging strategy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown paging strategy '{0}' (expected 'offset' or 'id-list')")]
pub struct ParseStrategyError(String);

impl FromStr for PagingStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "offset" => Ok(PagingStrategy::Offset),
            "id-list" | "id_list" | "idlist" => Ok(PagingStrategy::IdList),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

// ==================== Data Provider ====================

/// A lazily evaluated, paginated view over a backing store.
///
/// Setters invalidate the loaded id sequence and the memoized count right
/// away, even when the new value equals the old one. The selected id
/// survives invalidation.
///
/// Navigation works on the full filtered, sorted and capped id sequence.
/// Reaching either end is not an error: `next_item_id` and
/// `previous_item_id` return `None` and leave the selection alone. With no
/// selection, or a selection outside the sequence, every navigation
/// operation reports absence.
pub trait DataProvider {
    /// Entity type served.
    type Entity;
    /// Primary key type of `Entity`.
    type Key;

    /// Returns the strategy this provider implements.
    fn strategy(&self) -> PagingStrategy;

    /// Returns the lifecycle state.
    fn state(&self) -> ProviderState;

    /// Replaces the filter; `None` matches everything. Drops the id
    /// sequence and the memoized count but keeps the selection.
    fn set_filter(&mut self, filter: Option<Predicate>);
    /// Returns the current filter.
    fn filter(&self) -> Option<&Predicate>;

    /// Replaces the sort; an empty spec means primary key descending.
    /// Drops the id sequence and the memoized count but keeps the selection.
    fn set_sort(&mut self, sort: SortSpec);
    /// Returns the explicit sort, without the primary key tie-break.
    fn sort(&self) -> &SortSpec;

    /// Caps the number of matching entities; `None` removes the cap.
    /// Drops the id sequence and the memoized count but keeps the selection.
    fn set_max_results(&mut self, max_results: Option<usize>);
    /// Returns the cap, if any.
    fn max_results(&self) -> Option<usize>;

    /// Replaces the associations loaded with each page. Drops the id
    /// sequence and the memoized count but keeps the selection.
    fn set_fetch_joins(&mut self, joins: Vec<FetchJoin>);
    /// Returns the associations loaded with each page.
    fn fetch_joins(&self) -> &[FetchJoin];

    /// Number of matching entities, capped by `max_results`.
    fn count(&mut self) -> ProviderResult<usize>;

    /// Returns up to `limit` entities starting at `offset`, in effective
    /// sort order.
    ///
    /// The effective order is the explicit sort followed by primary key
    /// descending. Pages never reach past `max_results`.
    fn fetch_page(&mut self, offset: usize, limit: usize) -> ProviderResult<Vec<Self::Entity>>;

    /// Moves the selection forward and returns the new id.
    fn next_item_id(&mut self) -> ProviderResult<Option<Self::Key>>;

    /// Moves the selection back and returns the new id.
    fn previous_item_id(&mut self) -> ProviderResult<Option<Self::Key>>;

    /// Whether a selection exists and an id follows it. Does not move.
    fn has_next_item_id(&mut self) -> ProviderResult<bool>;
    /// Whether a selection exists and an id precedes it. Does not move.
    fn has_previous_item_id(&mut self) -> ProviderResult<bool>;

    /// Selects `id` without checking that it is in the sequence.
    fn set_currently_selected_id(&mut self, id: Option<Self::Key>);
    /// Returns the selected id.
    fn currently_selected_id(&self) -> Option<&Self::Key>;
}
