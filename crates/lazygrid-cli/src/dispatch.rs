//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands split into those that run without a dataset (config,
//! completions, help) and those that load one first.

use std::path::Path;

use lazygrid_core::PagingStrategy;

use crate::cli::{Cli, Commands, ConfigCommands, Shell, StrategyArg};
use crate::commands::config::Config;
use crate::commands::count::CountOptions;
use crate::commands::list::ListOptions;
use crate::commands::nav::NavOptions;
use crate::commands::{self, CommandContext, CommandError, DataSource, Result};

/// Trait for commands that can be executed without a dataset.
pub trait NoDataCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that read a dataset.
pub trait DataCommand {
    /// Execute the command against a loaded dataset.
    fn execute(&self, ctx: &CommandContext, source: &DataSource) -> Result<()>;
}

/// Commands that don't need a dataset.
pub enum NoDataDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> NoDataDispatch<'a> {
    /// Try to create a no-data dispatch from the CLI command.
    /// Returns None if the command reads a dataset.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl NoDataCommand for NoDataDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("lg - browse JSON datasets");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that read a dataset, with flags already merged over the config.
#[derive(Debug)]
pub enum DataDispatch {
    List(ListOptions),
    Count(CountOptions),
    Nav(NavOptions),
}

/// Picks the flag, then the config value, then the default.
fn resolve_strategy(flag: Option<StrategyArg>, config: &Config) -> PagingStrategy {
    flag.map(PagingStrategy::from)
        .unwrap_or_else(|| config.strategy())
}

impl DataDispatch {
    /// Create a data dispatch from the CLI command.
    /// Returns None for commands handled by [`NoDataDispatch`].
    pub fn from_cli(cli: &Cli, config: &Config) -> Option<Self> {
        let paging = &config.paging;
        match &cli.command {
            Some(Commands::List {
                filter,
                sort,
                page,
                page_size,
                max,
                strategy,
                join,
            }) => Some(Self::List(ListOptions {
                filter: filter.clone(),
                sort: sort.clone(),
                page: *page,
                page_size: page_size.unwrap_or_else(|| config.page_size()),
                max_results: max.or(paging.max_results),
                strategy: resolve_strategy(*strategy, config),
                batch_size: paging.batch_size,
                joins: join.clone(),
            })),
            Some(Commands::Count { filter, max }) => Some(Self::Count(CountOptions {
                filter: filter.clone(),
                max_results: max.or(paging.max_results),
            })),
            Some(Commands::Nav {
                id,
                filter,
                sort,
                max,
                strategy,
            }) => Some(Self::Nav(NavOptions {
                id: id.clone(),
                filter: filter.clone(),
                sort: sort.clone(),
                max_results: max.or(paging.max_results),
                strategy: resolve_strategy(*strategy, config),
                batch_size: paging.batch_size,
            })),
            _ => None,
        }
    }
}

impl DataCommand for DataDispatch {
    fn execute(&self, ctx: &CommandContext, source: &DataSource) -> Result<()> {
        match self {
            Self::List(opts) => commands::list::execute(ctx, source, opts),
            Self::Count(opts) => commands::count::execute(ctx, source, opts),
            Self::Nav(opts) => commands::nav::execute(ctx, source, opts),
        }
    }
}

/// Returns the dataset path or explains how to provide one.
pub fn require_data(data: Option<&Path>) -> Result<&Path> {
    data.ok_or_else(|| {
        CommandError::Config(
            "no dataset given. Pass --data <FILE> or set LAZYGRID_DATA".to_string(),
        )
    })
}
