//! List command implementation.
//!
//! Prints one page of records from a dataset, optionally filtered and sorted.

use lazygrid_core::PagingStrategy;
use lazygrid_store::{FetchJoin, Record};
use tracing::debug;

use super::{CommandContext, CommandError, DataSource, Query, Result};
use crate::output::{format_records_json, format_records_table, PageInfo};

/// Options for the list command.
#[derive(Debug)]
pub struct ListOptions {
    /// Filter expression.
    pub filter: Option<String>,
    /// Sort keys.
    pub sort: Option<String>,
    /// Page number, starting at 1.
    pub page: u64,
    /// Records per page.
    pub page_size: usize,
    /// Cap on matching records.
    pub max_results: Option<usize>,
    /// Paging strategy.
    pub strategy: PagingStrategy,
    /// Ids per store call for the id-list strategy.
    pub batch_size: Option<usize>,
    /// Relations to fetch eagerly.
    pub joins: Vec<String>,
}

impl ListOptions {
    /// Offset of the first record on the requested page.
    fn offset(&self) -> Result<usize> {
        let index = usize::try_from(self.page.saturating_sub(1))
            .map_err(|_| CommandError::InvalidArgument(format!("page {} is too large", self.page)))?;
        index.checked_mul(self.page_size).ok_or_else(|| {
            CommandError::InvalidArgument(format!("page {} is too large", self.page))
        })
    }
}

/// Page of records plus what the footer needs.
pub struct ListResult {
    pub records: Vec<Record>,
    pub info: PageInfo,
}

/// Fetches the requested page.
///
/// # Errors
///
/// Returns an error if the filter or sort expression is invalid, or if the
/// store rejects the query.
pub fn fetch(source: &DataSource, opts: &ListOptions) -> Result<ListResult> {
    if opts.page_size == 0 {
        return Err(CommandError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }
    let offset = opts.offset()?;

    let query = Query::parse(opts.filter.as_deref(), opts.sort.as_deref(), opts.max_results)?;
    let mut provider = source.provider(&query, opts.strategy, opts.batch_size);
    if !opts.joins.is_empty() {
        provider.set_fetch_joins(opts.joins.iter().map(FetchJoin::new).collect());
    }

    let total = provider.count()?;
    let records = provider.fetch_page(offset, opts.page_size)?;
    debug!(
        strategy = %opts.strategy,
        offset,
        shown = records.len(),
        total,
        "fetched page"
    );

    Ok(ListResult {
        records,
        info: PageInfo {
            page: opts.page,
            page_size: opts.page_size,
            total,
        },
    })
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched or written.
pub fn execute(ctx: &CommandContext, source: &DataSource, opts: &ListOptions) -> Result<()> {
    let result = fetch(source, opts)?;

    if ctx.json_output {
        println!("{}", format_records_json(&result.records, result.info)?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_records_table(&result.records, &source.schema, result.info, ctx.use_colors)
        );
    }

    Ok(())
}
