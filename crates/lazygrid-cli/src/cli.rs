//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the lg CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lazygrid_core::PagingStrategy;

/// lg - Browse JSON datasets with filters, sorting and lazy paging
#[derive(Parser, Debug)]
#[command(name = "lg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Dataset file to read
    #[arg(short, long, global = true, env = "LAZYGRID_DATA")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page of records
    #[command(alias = "ls")]
    List {
        /// Filter expression (e.g., "name ilike 'jo%' & age between 20 and 30")
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort keys, comma separated; prefix with '-' for descending
        #[arg(short, long, allow_hyphen_values = true)]
        sort: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,

        /// Records per page (default: from config, else 25)
        #[arg(long)]
        page_size: Option<usize>,

        /// Stop after this many matching records
        #[arg(long)]
        max: Option<usize>,

        /// Paging strategy (default: from config, else offset)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Relation to fetch eagerly (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        join: Vec<String>,
    },

    /// Count matching records
    #[command(alias = "c")]
    Count {
        /// Filter expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Stop counting at this many records
        #[arg(long)]
        max: Option<usize>,
    },

    /// Show the records before and after a given id
    Nav {
        /// Primary key of the record
        id: String,

        /// Filter expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort keys, comma separated; prefix with '-' for descending
        #[arg(short, long, allow_hyphen_values = true)]
        sort: Option<String>,

        /// Only navigate within the first N matching records
        #[arg(long)]
        max: Option<usize>,

        /// Paging strategy (default: from config, else offset)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Paging strategies selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// One store query per page
    Offset,
    /// Snapshot of ordered ids, stable while browsing
    IdList,
}

impl From<StrategyArg> for PagingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Offset => PagingStrategy::Offset,
            StrategyArg::IdList => PagingStrategy::IdList,
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., paging.page_size)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults() {
        let cli = Cli::parse_from(["lg", "list"]);
        if let Some(Commands::List {
            filter,
            sort,
            page,
            page_size,
            max,
            strategy,
            join,
        }) = cli.command
        {
            assert!(filter.is_none());
            assert!(sort.is_none());
            assert_eq!(page, 1);
            assert!(page_size.is_none());
            assert!(max.is_none());
            assert!(strategy.is_none());
            assert!(join.is_empty());
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_list_with_options() {
        let cli = Cli::parse_from([
            "lg",
            "list",
            "-f",
            "age = 3",
            "-s",
            "-age,name",
            "--page",
            "2",
            "--page-size",
            "10",
            "--strategy",
            "id-list",
            "--join",
            "owner",
            "--join",
            "team",
        ]);
        if let Some(Commands::List {
            filter,
            sort,
            page,
            page_size,
            strategy,
            join,
            ..
        }) = cli.command
        {
            assert_eq!(filter.as_deref(), Some("age = 3"));
            assert_eq!(sort.as_deref(), Some("-age,name"));
            assert_eq!(page, 2);
            assert_eq!(page_size, Some(10));
            assert_eq!(strategy, Some(StrategyArg::IdList));
            assert_eq!(join, vec!["owner", "team"]);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(Cli::try_parse_from(["lg", "list", "--page", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["lg", "count", "--json", "--data", "people.json"]);
        assert!(cli.json);
        assert_eq!(cli.data, Some(PathBuf::from("people.json")));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["lg", "-q", "-v", "count"]).is_err());
    }

    #[test]
    fn test_nav() {
        let cli = Cli::parse_from(["lg", "nav", "42", "--max", "10"]);
        if let Some(Commands::Nav { id, max, .. }) = cli.command {
            assert_eq!(id, "42");
            assert_eq!(max, Some(10));
        } else {
            panic!("Expected Nav command");
        }
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from(["lg", "config", "set", "paging.strategy", "id-list"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "paging.strategy");
            assert_eq!(value, "id-list");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["lg", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_strategy_arg_into_paging_strategy() {
        assert_eq!(PagingStrategy::from(StrategyArg::IdList), PagingStrategy::IdList);
        assert_eq!(PagingStrategy::from(StrategyArg::Offset), PagingStrategy::Offset);
    }
}
