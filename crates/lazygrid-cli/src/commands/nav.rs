//! Nav command implementation.
//!
//! Shows which records come before and after a given record under the
//! current filter and sort.

use lazygrid_core::PagingStrategy;
use lazygrid_store::{Schema, Value, ValueType};
use tracing::debug;

use super::{CommandContext, CommandError, DataSource, Query, Result};
use crate::output::{format_nav_json, format_nav_table};

/// Options for the nav command.
#[derive(Debug)]
pub struct NavOptions {
    /// Primary key as typed on the command line.
    pub id: String,
    /// Filter expression.
    pub filter: Option<String>,
    /// Sort keys.
    pub sort: Option<String>,
    /// Cap on matching records.
    pub max_results: Option<usize>,
    /// Paging strategy.
    pub strategy: PagingStrategy,
    /// Ids per store call for the id-list strategy.
    pub batch_size: Option<usize>,
}

/// Neighbours of one record.
#[derive(Debug, PartialEq)]
pub struct NavResult {
    pub id: Value,
    pub previous: Option<Value>,
    pub next: Option<Value>,
}

/// Parses a command-line id into a value of the schema's key type.
pub fn parse_key(schema: &Schema, raw: &str) -> Result<Value> {
    let key_type = schema
        .property_type(&schema.primary_key)
        .unwrap_or(ValueType::Text);
    let invalid = || {
        CommandError::InvalidArgument(format!("'{raw}' is not a valid {key_type} id"))
    };

    match key_type {
        ValueType::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        ValueType::Float => raw.trim().parse::<f64>().map(Value::Float).map_err(|_| invalid()),
        ValueType::Bool => raw.trim().parse::<bool>().map(Value::Bool).map_err(|_| invalid()),
        _ => Value::from_json(&serde_json::Value::String(raw.to_string()), key_type)
            .map_err(|_| invalid()),
    }
}

/// Finds the neighbours of `opts.id`.
///
/// Both lookups start from the given id; an id outside the filtered sequence
/// has no neighbours.
///
/// # Errors
///
/// Returns an error if the id does not fit the key type, the expressions are
/// invalid, or the store rejects the query.
pub fn navigate(source: &DataSource, opts: &NavOptions) -> Result<NavResult> {
    let id = parse_key(&source.schema, &opts.id)?;
    let query = Query::parse(opts.filter.as_deref(), opts.sort.as_deref(), opts.max_results)?;
    let mut provider = source.provider(&query, opts.strategy, opts.batch_size);

    provider.set_currently_selected_id(Some(id.clone()));
    let previous = provider.previous_item_id()?;

    provider.set_currently_selected_id(Some(id.clone()));
    let next = provider.next_item_id()?;

    debug!(%id, strategy = %opts.strategy, ?previous, ?next, "navigated");
    Ok(NavResult { id, previous, next })
}

/// Executes the nav command.
pub fn execute(ctx: &CommandContext, source: &DataSource, opts: &NavOptions) -> Result<()> {
    let result = navigate(source, opts)?;

    if ctx.json_output {
        println!(
            "{}",
            format_nav_json(&result.id, result.previous.as_ref(), result.next.as_ref())?
        );
    } else if !ctx.quiet {
        print!(
            "{}",
            format_nav_table(
                &result.id,
                result.previous.as_ref(),
                result.next.as_ref(),
                ctx.use_colors
            )
        );
    }

    Ok(())
}
