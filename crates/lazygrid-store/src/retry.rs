//! Retrying store wrapper with exponential backoff.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::StoreResult;
use crate::native::{Criterion, NativeSort};
use crate::store::{BackingStore, FetchJoin, KeyOf};

/// Default initial backoff duration for retries (100 milliseconds).
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;

/// Default maximum backoff duration for retries (2 seconds).
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 2_000;

/// Default maximum number of retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Initial backoff duration for retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration for retries.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculates the backoff duration for a retry attempt.
    ///
    /// Exponential backoff: initial * 2^attempt, capped at max_backoff.
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or
    /// the retries are used up.
    pub fn execute<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut attempt = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "retrying store call"
                    );
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A [`BackingStore`] that retries transient failures of an inner store.
///
/// Only errors for which [`StoreError::is_retryable`] holds are retried;
/// query and record errors pass through on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryingStore<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: BackingStore> RetryingStore<S> {
    /// Wraps `inner` with the default retry config.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, RetryConfig::default())
    }

    /// Wraps `inner` with a custom retry config.
    pub fn with_config(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the retry config.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl<S: BackingStore> BackingStore for RetryingStore<S> {
    type Entity = S::Entity;

    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
        self.config
            .execute("count", || self.inner.native_count(criterion))
    }

    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        self.config.execute("fetch", || {
            self.inner
                .native_fetch(criterion, sort, offset, limit, joins)
        })
    }

    fn native_fetch_ids(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<KeyOf<Self>>> {
        self.config
            .execute("fetch_ids", || self.inner.native_fetch_ids(criterion, sort))
    }

    fn native_fetch_by_ids(
        &self,
        ids: &[KeyOf<Self>],
        joins: &[FetchJoin],
    ) -> StoreResult<Vec<Self::Entity>> {
        self.config
            .execute("fetch_by_ids", || self.inner.native_fetch_by_ids(ids, joins))
    }
}
