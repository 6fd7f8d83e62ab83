//! Command implementations for the lg CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod count;
pub mod list;
pub mod nav;

use std::path::Path;

use lazygrid_core::filter::{FilterError, FilterParser, Predicate};
use lazygrid_core::provider::{BoxedProvider, ProviderBuilder};
use lazygrid_core::sort::SortSpec;
use lazygrid_core::{PagingStrategy, ProviderError};
use lazygrid_store::{Dataset, MemoryStore, RetryingStore, Schema, StoreError};
use tracing::debug;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter or sort expression error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Dataset or store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid command argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProviderError> for CommandError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Filter(e) => CommandError::Filter(e),
            ProviderError::BackingStore(e) => CommandError::Store(e),
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color,
            quiet: cli.quiet,
        }
    }

    /// Applies output settings from the config file. Flags still win.
    pub fn with_config(mut self, config: &Config) -> Self {
        if config.output.color == Some(false) {
            self.use_colors = false;
        }
        self
    }
}

/// The store every data command reads from.
pub type DataStore = RetryingStore<MemoryStore>;

/// A loaded dataset ready to be queried.
pub struct DataSource {
    /// Schema of the dataset's records.
    pub schema: Schema,
    /// Store holding the records.
    pub store: DataStore,
}

impl DataSource {
    /// Loads a dataset file into an in-memory store.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Dataset::load(path)?.into_store()?;
        let records = store.len()?;
        debug!(path = %path.display(), records, "loaded dataset");
        Ok(Self::from_store(store))
    }

    /// Wraps an already populated store.
    pub fn from_store(store: MemoryStore) -> Self {
        Self {
            schema: store.schema().clone(),
            store: RetryingStore::new(store),
        }
    }

    /// Builds a provider over this dataset.
    pub fn provider(
        &self,
        query: &Query,
        strategy: PagingStrategy,
        batch_size: Option<usize>,
    ) -> BoxedProvider<'_, &DataStore> {
        let mut builder = ProviderBuilder::new(&self.store, &self.schema)
            .strategy(strategy)
            .filter(query.filter.clone())
            .sort(query.sort.clone())
            .max_results(query.max_results);
        if let Some(batch_size) = batch_size {
            builder = builder.batch_size(batch_size);
        }
        builder.build()
    }
}

/// Parsed filter, sort and cap shared by the data commands.
#[derive(Debug, Default)]
pub struct Query {
    pub filter: Option<Predicate>,
    pub sort: SortSpec,
    pub max_results: Option<usize>,
}

impl Query {
    /// Parses the textual filter and sort arguments.
    pub fn parse(
        filter: Option<&str>,
        sort: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Self> {
        let filter = filter.map(FilterParser::parse).transpose()?;
        let sort = sort.map(SortSpec::parse).transpose()?.unwrap_or_default();
        Ok(Self {
            filter,
            sort,
            max_results,
        })
    }
}
