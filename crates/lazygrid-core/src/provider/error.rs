//! Error types for data providers.

use lazygrid_store::StoreError;
use thiserror::Error;

use crate::filter::FilterError;

/// A specialized Result type for data provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors reported by a data provider.
///
/// Store failures are passed through unchanged and never retried here;
/// wrap the store in a [`RetryingStore`](lazygrid_store::RetryingStore) for
/// that.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The filter or sort could not be resolved or converted.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The backing store failed.
    #[error(transparent)]
    BackingStore(#[from] StoreError),
}

impl ProviderError {
    /// Returns true if the error came from the backing store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, ProviderError::BackingStore(_))
    }
}
