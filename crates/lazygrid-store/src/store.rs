//! The backing-store contract.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::Entity;
use crate::native::{Criterion, NativeSort};

/// Primary key type of a store's entities.
pub type KeyOf<S> = <<S as BackingStore>::Entity as Entity>::Key;

/// Hint asking the store to eagerly materialize a named relation.
///
/// Data providers never interpret joins; they pass them to the store
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchJoin(String);

impl FetchJoin {
    /// Creates a join hint for `relation`.
    pub fn new(relation: impl Into<String>) -> Self {
        Self(relation.into())
    }

    /// Returns the relation name.
    pub fn relation(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store that answers native count and fetch queries.
///
/// Every call is synchronous. Implementations own their own timeout and
/// retry policy; callers propagate errors unchanged.
pub trait BackingStore {
    /// Entity type stored.
    type Entity: Entity;

    /// Counts entities matching `criterion` without materializing them.
    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize>;

    /// Fetches a window of matching entities in `sort` order.
    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>>;

    /// Fetches the primary keys of all matching entities in `sort` order.
    fn native_fetch_ids(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<KeyOf<Self>>>;

    /// Fetches the entities with the given keys.
    ///
    /// Keys with no entity are skipped. The result order is unspecified.
    fn native_fetch_by_ids(
        &self,
        ids: &[KeyOf<Self>],
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>>;
}

impl<S: BackingStore + ?Sized> BackingStore for &S {
    type Entity = S::Entity;

    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
        (**self).native_count(criterion)
    }

    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch(criterion, sort, offset, limit, joins)
    }

    fn native_fetch_ids(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<KeyOf<Self>>> {
        (**self).native_fetch_ids(criterion, sort)
    }

    fn native_fetch_by_ids(
        &self,
        ids: &[KeyOf<Self>],
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch_by_ids(ids, joins)
    }
}

impl<S: BackingStore + ?Sized> BackingStore for Arc<S> {
    type Entity = S::Entity;

    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
        (**self).native_count(criterion)
    }

    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch(criterion, sort, offset, limit, joins)
    }

    fn native_fetch_ids(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<KeyOf<Self>>> {
        (**self).native_fetch_ids(criterion, sort)
    }

    fn native_fetch_by_ids(
        &self,
        ids: &[KeyOf<Self>],
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch_by_ids(ids, joins)
    }
}

impl<S: BackingStore + ?Sized> BackingStore for Box<S> {
    type Entity = S::Entity;

    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
        (**self).native_count(criterion)
    }

    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch(criterion, sort, offset, limit, joins)
    }

    fn native_fetch_ids(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<KeyOf<Self>>> {
        (**self).native_fetch_ids(criterion, sort)
    }

    fn native_fetch_by_ids(
        &self,
        ids: &[KeyOf<Self>],
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        (**self).native_fetch_by_ids(ids, joins)
    }
}
