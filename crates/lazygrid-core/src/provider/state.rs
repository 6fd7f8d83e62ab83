//! Query state shared by the paging strategies.

use lazygrid_store::{BackingStore, Criterion, EntityMetadata, FetchJoin, KeyOf, NativeSort, OrderClause};
use tracing::debug;

use super::cursor::CursorState;
use super::error::ProviderResult;
use super::ProviderState;
use crate::filter::{FilterConverter, FilterResult, Predicate};
use crate::sort::{SortConverter, SortSpec};

/// Filter, sort, cap and cursor state of one provider.
///
/// Both strategies hold one of these and delegate their setters and
/// navigation to it. Every setter drops the id sequence and the memoized
/// count, whether or not the new value differs from the old one.
pub struct QueryState<S: BackingStore, M> {
    store: S,
    metadata: M,
    filter: Option<Predicate>,
    sort: SortSpec,
    max_results: Option<usize>,
    joins: Vec<FetchJoin>,
    state: ProviderState,
    cursor: CursorState<KeyOf<S>>,
    count: Option<usize>,
}

impl<S, M> QueryState<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    /// Creates an uninitialized state with no filter, sort or cap.
    pub fn new(store: S, metadata: M) -> Self {
        Self {
            store,
            metadata,
            filter: None,
            sort: SortSpec::new(),
            max_results: None,
            joins: Vec::new(),
            state: ProviderState::Uninitialized,
            cursor: CursorState::new(),
            count: None,
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the entity metadata.
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Returns the filter.
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Returns the explicit sort.
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Returns the cap.
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Returns the fetch joins.
    pub fn joins(&self) -> &[FetchJoin] {
        &self.joins
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> ProviderState {
        self.state
    }

    pub(crate) fn mark(&mut self, state: ProviderState) {
        self.state = state;
    }

    /// Replaces the filter, then drops the id sequence and the count.
    pub fn set_filter(&mut self, filter: Option<Predicate>) {
        self.filter = filter;
        self.invalidate("filter changed");
    }

    /// Replaces the sort, then drops the id sequence and the count.
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.invalidate("sort changed");
    }

    /// Replaces the cap, then drops the id sequence and the count.
    pub fn set_max_results(&mut self, max_results: Option<usize>) {
        self.max_results = max_results;
        self.invalidate("max results changed");
    }

    /// Replaces the fetch joins, then drops the id sequence and the count.
    pub fn set_fetch_joins(&mut self, joins: Vec<FetchJoin>) {
        self.joins = joins;
        self.invalidate("fetch joins changed");
    }

    /// Back to `Uninitialized` with no id sequence or count; the selection stays.
    fn invalidate(&mut self, reason: &'static str) {
        self.cursor.clear();
        self.count = None;
        self.state = ProviderState::Uninitialized;
        debug!(reason, "provider state invalidated");
    }

    /// Converts the current filter; no filter matches everything.
    pub fn criterion(&self) -> FilterResult<Criterion> {
        FilterConverter::new(&self.metadata).convert_optional(self.filter.as_ref())
    }

    /// Converts the current sort and appends the primary-key tie-break.
    ///
    /// The tie-break is descending and is skipped when the sort already
    /// orders by the primary key. With no sort at all the order is primary
    /// key descending.
    pub fn native_sort(&self) -> FilterResult<NativeSort> {
        let mut native = SortConverter::new(&self.metadata).convert(&self.sort)?;
        let primary_key = self.metadata.primary_key_property();
        if !native.orders_by(primary_key) {
            native.push(OrderClause::desc(primary_key));
        }
        Ok(native)
    }

    /// Applies the cap to a result size.
    pub fn cap(&self, total: usize) -> usize {
        match self.max_results {
            Some(max) => total.min(max),
            None => total,
        }
    }

    /// Clips a page window to the cap, returning the usable limit.
    pub fn clip_limit(&self, offset: usize, limit: usize) -> usize {
        match self.max_results {
            Some(max) => limit.min(max.saturating_sub(offset)),
            None => limit,
        }
    }

    pub fn cached_count(&self) -> Option<usize> {
        self.count
    }

    pub fn remember_count(&mut self, count: usize) {
        self.count = Some(count);
    }

    /// Loads the ordered id sequence unless it is already loaded.
    pub fn ensure_ids(&mut self, strategy: &'static str) -> ProviderResult<&[KeyOf<S>]> {
        if !self.cursor.is_loaded() {
            let criterion = self.criterion()?;
            let sort = self.native_sort()?;
            let mut ids = self.store.native_fetch_ids(&criterion, &sort)?;
            if let Some(max) = self.max_results {
                ids.truncate(max);
            }
            debug!(strategy, count = ids.len(), "loaded id sequence");
            self.cursor.load(ids);
            self.state = ProviderState::IdSequenceLoaded;
        }
        Ok(self.cursor.ids().unwrap_or_default())
    }

    pub fn current(&self) -> Option<&KeyOf<S>> {
        self.cursor.current()
    }

    pub fn select(&mut self, id: Option<KeyOf<S>>) {
        self.cursor.select(id);
    }

    /// Advances the cursor, loading the sequence first if needed.
    pub fn next_id(&mut self, strategy: &'static str) -> ProviderResult<Option<KeyOf<S>>> {
        self.begin_navigation(strategy)?;
        Ok(self.cursor.advance())
    }

    /// Moves the cursor back, loading the sequence first if needed.
    pub fn previous_id(&mut self, strategy: &'static str) -> ProviderResult<Option<KeyOf<S>>> {
        self.begin_navigation(strategy)?;
        Ok(self.cursor.retreat())
    }

    pub fn has_next_id(&mut self, strategy: &'static str) -> ProviderResult<bool> {
        self.begin_navigation(strategy)?;
        Ok(self.cursor.peek_next().is_some())
    }

    pub fn has_previous_id(&mut self, strategy: &'static str) -> ProviderResult<bool> {
        self.begin_navigation(strategy)?;
        Ok(self.cursor.peek_previous().is_some())
    }

    fn begin_navigation(&mut self, strategy: &'static str) -> ProviderResult<()> {
        self.ensure_ids(strategy)?;
        self.state = ProviderState::Navigating;
        Ok(())
    }
}
