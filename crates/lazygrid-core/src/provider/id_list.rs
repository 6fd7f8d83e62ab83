//! ID-list paging over a snapshot of ordered primary keys.

use std::collections::HashMap;

use lazygrid_store::{BackingStore, Entity, EntityMetadata, FetchJoin, KeyOf};
use tracing::debug;

use super::builder::DEFAULT_BATCH_SIZE;
use super::error::ProviderResult;
use super::state::QueryState;
use super::{DataProvider, PagingStrategy, ProviderState};
use crate::filter::Predicate;
use crate::sort::SortSpec;

const STRATEGY: &str = "id-list";

/// Provider that pages over a snapshot of the ordered id sequence.
///
/// The first count, page or navigation call loads every matching primary
/// key (truncated to the cap). Pages are sliced from that snapshot and
/// materialized with `native_fetch_by_ids` in batches, so rows inserted
/// later never appear and rows deleted later are skipped. The snapshot is
/// dropped when the filter, sort, cap or joins change.
pub struct IdListDataProvider<S: BackingStore, M> {
    query: QueryState<S, M>,
    batch_size: usize,
}

impl<S, M> IdListDataProvider<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    pub fn new(store: S, metadata: M) -> Self {
        Self {
            query: QueryState::new(store, metadata),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets how many ids go into one `native_fetch_by_ids` call.
    ///
    /// Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the shared query state.
    pub fn query(&self) -> &QueryState<S, M> {
        &self.query
    }

    fn materialize(&self, ids: &[KeyOf<S>]) -> ProviderResult<Vec<S::Entity>> {
        let mut by_id = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(self.batch_size) {
            let entities = self
                .query
                .store()
                .native_fetch_by_ids(batch, self.query.joins())?;
            by_id.extend(entities.into_iter().map(|e| (e.primary_key(), e)));
        }

        // snapshot order, missing ids skipped
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

impl<S, M> DataProvider for IdListDataProvider<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    type Entity = S::Entity;
    type Key = KeyOf<S>;

    fn strategy(&self) -> PagingStrategy {
        PagingStrategy::IdList
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
        let count = self.query.ensure_ids(STRATEGY)?.len();
        self.query.mark(ProviderState::Paging);
        Ok(count)
    }

    fn fetch_page(&mut self, offset: usize, limit: usize) -> ProviderResult<Vec<Self::Entity>> {
        let window: Vec<KeyOf<S>> = self
            .query
            .ensure_ids(STRATEGY)?
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        self.query.mark(ProviderState::Paging);
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let page = self.materialize(&window)?;
        debug!(
            strategy = STRATEGY,
            offset,
            requested = window.len(),
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
    use std::cell::RefCell;
    use std::sync::Arc;

    use lazygrid_store::{Criterion, MemoryStore, NativeSort, Record, Schema, StoreResult, Value, ValueType};

    use super::*;

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int).with_property("age", ValueType::Int)
    }

    fn store(n: i64) -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::with_records(schema(), (1..=n).map(|i| Record::new("id", i).with("age", i)))
                .unwrap(),
        )
    }

    fn keys(page: &[Record]) -> Vec<Value> {
        page.iter().map(|r| r.key().clone()).collect()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&i| Value::Int(i)).collect()
    }

    /// Records every batch passed to `native_fetch_by_ids`.
    struct BatchLog {
        inner: MemoryStore,
        batches: RefCell<Vec<usize>>,
    }

    impl BackingStore for BatchLog {
        type Entity = Record;

        fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
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
            self.inner.native_fetch(criterion, sort, offset, limit, joins)
        }

        fn native_fetch_ids(&self, criterion: &Criterion, sort: &NativeSort) -> StoreResult<Vec<Value>> {
            self.inner.native_fetch_ids(criterion, sort)
        }

        fn native_fetch_by_ids(&self, ids: &[Value], joins: &[FetchJoin]) -> StoreResult<Vec<Record>> {
            self.batches.borrow_mut().push(ids.len());
            // reversed to prove the provider restores snapshot order
            let mut found = self.inner.native_fetch_by_ids(ids, joins)?;
            found.reverse();
            Ok(found)
        }
    }

    #[test]
    fn test_count_is_sequence_length() {
        let mut p = IdListDataProvider::new(store(7), schema());
        p.set_filter(Some(Predicate::between("age", 2, 5)));
        assert_eq!(p.count().unwrap(), 4);
        assert_eq!(p.state(), ProviderState::Paging);
    }

    #[test]
    fn test_pages_follow_snapshot_order() {
        let mut p = IdListDataProvider::new(store(5), schema());
        p.set_sort(SortSpec::new().ascending("age"));
        assert_eq!(keys(&p.fetch_page(0, 2).unwrap()), ints(&[1, 2]));
        assert_eq!(keys(&p.fetch_page(2, 10).unwrap()), ints(&[3, 4, 5]));
        assert!(p.fetch_page(5, 10).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_in_batches() {
        let inner = MemoryStore::with_records(schema(), (1..=5).map(|i| Record::new("id", i).with("age", i)))
            .unwrap();
        let log = BatchLog {
            inner,
            batches: RefCell::new(Vec::new()),
        };
        let mut p = IdListDataProvider::new(&log, schema()).with_batch_size(2);

        let page = p.fetch_page(0, 5).unwrap();
        assert_eq!(keys(&page), ints(&[5, 4, 3, 2, 1]));
        assert_eq!(*log.batches.borrow(), vec![2, 2, 1]);
    }

    #[test]
    fn test_zero_batch_size_is_one() {
        let p = IdListDataProvider::new(store(1), schema()).with_batch_size(0);
        assert_eq!(p.batch_size(), 1);
    }

    #[test]
    fn test_snapshot_survives_store_changes() {
        let store = store(5);
        let mut p = IdListDataProvider::new(Arc::clone(&store), schema());
        let before = keys(&p.fetch_page(0, 3).unwrap());
        assert_eq!(before, ints(&[5, 4, 3]));

        store.insert(Record::new("id", 9).with("age", 9)).unwrap();
        assert_eq!(keys(&p.fetch_page(0, 3).unwrap()), before);
        assert_eq!(p.count().unwrap(), 5);

        store.remove(&Value::Int(4)).unwrap();
        assert_eq!(keys(&p.fetch_page(0, 3).unwrap()), ints(&[5, 3]));

        p.set_filter(None);
        assert_eq!(keys(&p.fetch_page(0, 3).unwrap()), ints(&[9, 5, 3]));
    }

    #[test]
    fn test_cursor_positions_are_stable() {
        let store = store(4);
        let mut p = IdListDataProvider::new(Arc::clone(&store), schema());
        p.set_currently_selected_id(Some(Value::Int(3)));
        assert!(p.has_next_item_id().unwrap());

        store.insert(Record::new("id", 0).with("age", 0)).unwrap();
        assert_eq!(p.next_item_id().unwrap(), Some(Value::Int(2)));
        assert_eq!(p.next_item_id().unwrap(), Some(Value::Int(1)));
        assert_eq!(p.next_item_id().unwrap(), None);
        assert_eq!(p.currently_selected_id(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_cap_truncates_snapshot() {
        let mut p = IdListDataProvider::new(store(10), schema());
        p.set_max_results(Some(3));
        assert_eq!(p.count().unwrap(), 3);
        assert_eq!(keys(&p.fetch_page(0, 10).unwrap()), ints(&[10, 9, 8]));

        p.set_currently_selected_id(Some(Value::Int(8)));
        assert!(!p.has_next_item_id().unwrap());
    }
}
