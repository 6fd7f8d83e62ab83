//! Count command implementation.

use lazygrid_core::PagingStrategy;

use super::{CommandContext, DataSource, Query, Result};
use crate::output::format_count_json;

/// Options for the count command.
#[derive(Debug)]
pub struct CountOptions {
    /// Filter expression.
    pub filter: Option<String>,
    /// Stop counting at this many records.
    pub max_results: Option<usize>,
}

/// Counts matching records.
///
/// # Errors
///
/// Returns an error if the filter is invalid or the store rejects the query.
pub fn count(source: &DataSource, opts: &CountOptions) -> Result<usize> {
    let query = Query::parse(opts.filter.as_deref(), None, opts.max_results)?;
    // Offset paging counts with a single store query.
    let mut provider = source.provider(&query, PagingStrategy::Offset, None);
    Ok(provider.count()?)
}

/// Executes the count command.
pub fn execute(ctx: &CommandContext, source: &DataSource, opts: &CountOptions) -> Result<()> {
    let count = count(source, opts)?;

    if ctx.json_output {
        println!(
            "{}",
            format_count_json(count, opts.filter.as_deref(), opts.max_results)?
        );
    } else if ctx.quiet {
        println!("{count}");
    } else {
        let noun = if count == 1 { "record" } else { "records" };
        println!("{count} {noun}");
    }

    Ok(())
}
