//! Offset-based paging.

use lazygrid_store::{BackingStore, EntityMetadata, FetchJoin, KeyOf};
use tracing::debug;

use super::error::ProviderResult;
use super::state::QueryState;
use super::{DataProvider, PagingStrategy, ProviderState};
use crate::filter::Predicate;
use crate::sort::SortSpec;

const STRATEGY: &str = "offset";

/// Provider that queries the store with an offset and limit per page.
///
/// Counts are memoized until the query changes. The id sequence used for
/// navigation is loaded on first use only, so paging alone never pulls
/// the full key list.
pub struct OffsetDataProvider<S: BackingStore, M> {
    query: QueryState<S, M>,
}

impl<S, M> OffsetDataProvider<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    pub fn new(store: S, metadata: M) -> Self {
        Self {
            query: QueryState::new(store, metadata),
        }
    }

    /// Returns the shared query state.
    pub fn query(&self) -> &QueryState<S, M> {
        &self.query
    }
}

impl<S, M> DataProvider for OffsetDataProvider<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    type Entity = S::Entity;
    type Key = KeyOf<S>;

    fn strategy(&self) -> PagingStrategy {
        PagingStrategy::Offset
    }

    fn state(&self) -> ProviderState {
        self.query.state()
    }

    fn set_filter(&mut self, filter: Option<Predicate>) {
        self.query.set_filter(filter);
    }

    fn filter(&self) -> Option<&Predicate> {
        self.query.filter()
    }

    fn set_sort(&mut self, sort: SortSpec) {
        self.query.set_sort(sort);
    }

    fn sort(&self) -> &SortSpec {
        self.query.sort()
    }

    fn set_max_results(&mut self, max_results: Option<usize>) {
        self.query.set_max_results(max_results);
    }

    fn max_results(&self) -> Option<usize> {
        self.query.max_results()
    }

    fn set_fetch_joins(&mut self, joins: Vec<FetchJoin>) {
        self.query.set_fetch_joins(joins);
    }

    fn fetch_joins(&self) -> &[FetchJoin] {
        self.query.joins()
    }

    fn count(&mut self) -> ProviderResult<usize> {
        // Unknown sort paths fail here too, as they do for the id-list strategy
        self.query.native_sort()?;
        let count = match self.query.cached_count() {
            Some(count) => count,
            None => {
                let criterion = self.query.criterion()?;
                let count = self.query.cap(self.query.store().native_count(&criterion)?);
                self.query.remember_count(count);
                count
            }
        };
        self.query.mark(ProviderState::Paging);
        Ok(count)
    }

    fn fetch_page(&mut self, offset: usize, limit: usize) -> ProviderResult<Vec<Self::Entity>> {
        let limit = self.query.clip_limit(offset, limit);
        self.query.mark(ProviderState::Paging);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let criterion = self.query.criterion()?;
        let sort = self.query.native_sort()?;
        let page = self
            .query
            .store()
            .native_fetch(&criterion, &sort, offset, limit, self.query.joins())?;
        debug!(
            strategy = STRATEGY,
            offset,
            limit,
            returned = page.len(),
            "fetched page"
        );
        Ok(page)
    }

    fn next_item_id(&mut self) -> ProviderResult<Option<Self::Key>> {
        self.query.next_id(STRATEGY)
    }

    fn previous_item_id(&mut self) -> ProviderResult<Option<Self::Key>> {
        self.query.previous_id(STRATEGY)
    }

    fn has_next_item_id(&mut self) -> ProviderResult<bool> {
        self.query.has_next_id(STRATEGY)
    }

    fn has_previous_item_id(&mut self) -> ProviderResult<bool> {
        self.query.has_previous_id(STRATEGY)
    }

    fn set_currently_selected_id(&mut self, id: Option<Self::Key>) {
        self.query.select(id);
    }

    fn currently_selected_id(&self) -> Option<&Self::Key> {
        self.query.current()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use lazygrid_store::{
        Criterion, MemoryStore, NativeSort, Record, Schema, StoreError, StoreResult, Value, ValueType,
    };

    use super::*;
    use crate::provider::ProviderError;

    /// Counts native calls made against an inner store.
    struct CountingStore {
        inner: MemoryStore,
        counts: Cell<usize>,
        fetches: Cell<usize>,
        id_loads: Cell<usize>,
        last_limit: Cell<Option<usize>>,
    }

    impl CountingStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                counts: Cell::new(0),
                fetches: Cell::new(0),
                id_loads: Cell::new(0),
                last_limit: Cell::new(None),
            }
        }
    }

    impl BackingStore for CountingStore {
        type Entity = Record;

        fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
            self.counts.set(self.counts.get() + 1);
            self.inner.native_count(criterion)
        }

        fn native_fetch(
            &self,
            criterion: &Criterion,
            sort: &NativeSort,
            offset: usize,
            limit: usize,
            joins: &[FetchJoin],
        ) -> StoreResult<Vec<Record>> {
            self.fetches.set(self.fetches.get() + 1);
            self.last_limit.set(Some(limit));
            self.inner.native_fetch(criterion, sort, offset, limit, joins)
        }

        fn native_fetch_ids(&self, criterion: &Criterion, sort: &NativeSort) -> StoreResult<Vec<Value>> {
            self.id_loads.set(self.id_loads.get() + 1);
            self.inner.native_fetch_ids(criterion, sort)
        }

        fn native_fetch_by_ids(&self, ids: &[Value], joins: &[FetchJoin]) -> StoreResult<Vec<Record>> {
            self.inner.native_fetch_by_ids(ids, joins)
        }
    }

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int)
            .with_property("name", ValueType::Text)
            .with_property("age", ValueType::Int)
    }

    fn provider(n: i64) -> OffsetDataProvider<CountingStore, Schema> {
        let store = MemoryStore::with_records(
            schema(),
            (1..=n).map(|i| Record::new("id", i).with("name", format!("user{i}")).with("age", i % 4)),
        )
        .unwrap();
        OffsetDataProvider::new(CountingStore::new(store), schema())
    }

    fn keys(page: &[Record]) -> Vec<i64> {
        page.iter()
            .map(|r| match r.key() {
                Value::Int(i) => *i,
                other => panic!("unexpected key {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_default_order_is_primary_key_descending() {
        let mut p = provider(5);
        assert_eq!(keys(&p.fetch_page(0, 3).unwrap()), vec![5, 4, 3]);
        assert_eq!(keys(&p.fetch_page(3, 3).unwrap()), vec![2, 1]);
        assert_eq!(p.state(), ProviderState::Paging);
    }

    #[test]
    fn test_sort_ties_broken_by_primary_key_descending() {
        let mut p = provider(8);
        p.set_sort(SortSpec::new().ascending("age"));
        // ages: 1..=8 % 4 -> 1,2,3,0,1,2,3,0
        assert_eq!(keys(&p.fetch_page(0, 8).unwrap()), vec![8, 4, 5, 1, 6, 2, 7, 3]);
    }

    #[test]
    fn test_count_rejects_unknown_sort_property() {
        let mut p = provider(3);
        p.set_sort(SortSpec::new().descending("aeg"));
        let err = p.count().unwrap_err();
        assert_eq!(err.to_string(), "unknown property 'aeg'. Did you mean 'age'?");
        assert_eq!(p.query().store().counts.get(), 0);
    }

    #[test]
    fn test_count_is_memoized_until_invalidated() {
        let mut p = provider(6);
        assert_eq!(p.count().unwrap(), 6);
        assert_eq!(p.count().unwrap(), 6);
        assert_eq!(p.query().store().counts.get(), 1);

        p.set_filter(Some(Predicate::equals("age", 2)));
        assert_eq!(p.count().unwrap(), 2);
        assert_eq!(p.query().store().counts.get(), 2);
    }

    #[test]
    fn test_cap_clips_count_and_pages() {
        let mut p = provider(10);
        p.set_max_results(Some(3));
        assert_eq!(p.count().unwrap(), 3);
        assert_eq!(keys(&p.fetch_page(0, 10).unwrap()), vec![10, 9, 8]);
        assert_eq!(p.query().store().last_limit.get(), Some(3));
        assert_eq!(keys(&p.fetch_page(2, 10).unwrap()), vec![8]);
    }

    #[test]
    fn test_window_past_cap_skips_store() {
        let mut p = provider(10);
        p.set_max_results(Some(3));
        assert!(p.fetch_page(3, 10).unwrap().is_empty());
        assert!(p.fetch_page(0, 0).unwrap().is_empty());
        assert_eq!(p.query().store().fetches.get(), 0);
    }

    #[test]
    fn test_paging_does_not_load_ids() {
        let mut p = provider(4);
        p.fetch_page(0, 2).unwrap();
        p.count().unwrap();
        assert_eq!(p.query().store().id_loads.get(), 0);
    }

    #[test]
    fn test_navigation_loads_ids_once() {
        let mut p = provider(4);
        p.set_currently_selected_id(Some(Value::Int(4)));
        assert_eq!(p.next_item_id().unwrap(), Some(Value::Int(3)));
        assert!(p.has_next_item_id().unwrap());
        assert!(p.has_previous_item_id().unwrap());
        assert_eq!(p.previous_item_id().unwrap(), Some(Value::Int(4)));
        assert_eq!(p.query().store().id_loads.get(), 1);
        assert_eq!(p.state(), ProviderState::Navigating);
    }

    #[test]
    fn test_navigation_without_selection() {
        let mut p = provider(4);
        assert_eq!(p.next_item_id().unwrap(), None);
        assert!(!p.has_previous_item_id().unwrap());
        assert_eq!(p.currently_selected_id(), None);
    }

    #[test]
    fn test_unknown_filter_property_is_filter_error() {
        let mut p = provider(3);
        p.set_filter(Some(Predicate::equals("nmae", "x")));
        let err = p.fetch_page(0, 10).unwrap_err();
        assert!(matches!(err, ProviderError::Filter(_)));
        assert!(err.to_string().contains("Did you mean 'name'?"));
    }

    #[test]
    fn test_store_error_is_propagated() {
        struct DownStore;

        impl BackingStore for DownStore {
            type Entity = Record;

            fn native_count(&self, _: &Criterion) -> StoreResult<usize> {
                Err(StoreError::unavailable("down"))
            }

            fn native_fetch(
                &self,
                _: &Criterion,
                _: &NativeSort,
                _: usize,
                _: usize,
                _: &[FetchJoin],
            ) -> StoreResult<Vec<Record>> {
                Err(StoreError::unavailable("down"))
            }

            fn native_fetch_ids(&self, _: &Criterion, _: &NativeSort) -> StoreResult<Vec<Value>> {
                Err(StoreError::unavailable("down"))
            }

            fn native_fetch_by_ids(&self, _: &[Value], _: &[FetchJoin]) -> StoreResult<Vec<Record>> {
                Err(StoreError::unavailable("down"))
            }
        }

        let mut p = OffsetDataProvider::new(DownStore, schema());
        let err = p.count().unwrap_err();
        assert!(err.is_store_error());
        assert!(p.fetch_page(0, 1).unwrap_err().is_store_error());
    }
}
