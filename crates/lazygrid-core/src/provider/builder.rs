//! Builder for data providers.

use lazygrid_store::{BackingStore, EntityMetadata, FetchJoin, KeyOf};

use super::id_list::IdListDataProvider;
use super::offset::OffsetDataProvider;
use super::{DataProvider, PagingStrategy};
use crate::filter::Predicate;
use crate::sort::SortSpec;

/// Default number of ids per `native_fetch_by_ids` call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// A boxed provider over store `S`, whatever its strategy.
pub type BoxedProvider<'a, S> =
    Box<dyn DataProvider<Entity = <S as BackingStore>::Entity, Key = KeyOf<S>> + 'a>;

/// Configures and builds a [`DataProvider`].
///
/// # Example
///
/// ```
/// use lazygrid_core::provider::{PagingStrategy, ProviderBuilder};
/// use lazygrid_store::{MemoryStore, Schema, ValueType};
///
/// let schema = Schema::new("id", ValueType::Int);
/// let provider = ProviderBuilder::new(MemoryStore::new(schema.clone()), schema)
///     .strategy(PagingStrategy::Offset)
///     .max_results(Some(50))
///     .build();
/// assert_eq!(provider.max_results(), Some(50));
/// ```
#[derive(Debug)]
pub struct ProviderBuilder<S, M> {
    store: S,
    metadata: M,
    strategy: PagingStrategy,
    filter: Option<Predicate>,
    sort: SortSpec,
    max_results: Option<usize>,
    joins: Vec<FetchJoin>,
    batch_size: usize,
}

impl<S, M> ProviderBuilder<S, M>
where
    S: BackingStore,
    M: EntityMetadata,
{
    /// Creates a builder for the offset strategy with no filter or sort.
    pub fn new(store: S, metadata: M) -> Self {
        Self {
            store,
            metadata,
            strategy: PagingStrategy::default(),
            filter: None,
            sort: SortSpec::new(),
            max_results: None,
            joins: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn strategy(mut self, strategy: PagingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn filter(mut self, filter: impl Into<Option<Predicate>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn fetch_joins(mut self, joins: impl IntoIterator<Item = FetchJoin>) -> Self {
        self.joins = joins.into_iter().collect();
        self
    }

    /// Batch size for the id-list strategy; ignored by the offset strategy.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builds the configured strategy behind a trait object.
    pub fn build<'a>(self) -> BoxedProvider<'a, S>
    where
        S: 'a,
        M: 'a,
    {
        match self.strategy {
            PagingStrategy::Offset => Box::new(self.build_offset()),
            PagingStrategy::IdList => Box::new(self.build_id_list()),
        }
    }

    /// Builds an offset provider, ignoring the configured strategy.
    pub fn build_offset(self) -> OffsetDataProvider<S, M> {
        let mut provider = OffsetDataProvider::new(self.store, self.metadata);
        configure(&mut provider, self.filter, self.sort, self.max_results, self.joins);
        provider
    }

    /// Builds an id-list provider, ignoring the configured strategy.
    pub fn build_id_list(self) -> IdListDataProvider<S, M> {
        let mut provider =
            IdListDataProvider::new(self.store, self.metadata).with_batch_size(self.batch_size);
        configure(&mut provider, self.filter, self.sort, self.max_results, self.joins);
        provider
    }
}

fn configure<P: DataProvider>(
    provider: &mut P,
    filter: Option<Predicate>,
    sort: SortSpec,
    max_results: Option<usize>,
    joins: Vec<FetchJoin>,
) {
    provider.set_filter(filter);
    provider.set_sort(sort);
    provider.set_max_results(max_results);
    provider.set_fetch_joins(joins);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderState;
    use lazygrid_store::{MemoryStore, Schema, ValueType};

    fn builder() -> ProviderBuilder<MemoryStore, Schema> {
        let schema = Schema::new("id", ValueType::Int).with_property("age", ValueType::Int);
        ProviderBuilder::new(MemoryStore::new(schema.clone()), schema)
    }

    #[test]
    fn test_build_selects_strategy() {
        assert_eq!(builder().build().strategy(), PagingStrategy::Offset);
        assert_eq!(
            builder().strategy(PagingStrategy::IdList).build().strategy(),
            PagingStrategy::IdList
        );
    }

    #[test]
    fn test_build_applies_settings() {
        let provider = builder()
            .filter(Predicate::equals("age", 3))
            .sort(SortSpec::new().descending("age"))
            .max_results(Some(7))
            .fetch_joins([FetchJoin::new("owner")])
            .build();

        assert_eq!(provider.filter(), Some(&Predicate::equals("age", 3)));
        assert_eq!(provider.sort(), &SortSpec::new().descending("age"));
        assert_eq!(provider.max_results(), Some(7));
        assert_eq!(provider.fetch_joins(), &[FetchJoin::new("owner")]);
        assert_eq!(provider.state(), ProviderState::Uninitialized);
    }

    #[test]
    fn test_batch_size() {
        assert_eq!(builder().build_id_list().batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(builder().batch_size(5).build_id_list().batch_size(), 5);
    }
}
