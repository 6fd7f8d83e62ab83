use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError, DataSource};
use dispatch::{require_data, DataCommand, DataDispatch, NoDataCommand, NoDataDispatch};
use lazygrid_store::StoreError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Sends diagnostics to stderr. `LAZYGRID_LOG` takes an `EnvFilter`
/// directive and overrides `--verbose`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env("LAZYGRID_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .try_init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    // Config and completions must work even with a broken config file
    if let Some(dispatch) = NoDataDispatch::try_from_cli(cli) {
        let ctx = CommandContext::from_cli(cli);
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli).with_config(&config);

    let Some(dispatch) = DataDispatch::from_cli(cli, &config) else {
        return Ok(());
    };
    let path = require_data(cli.data.as_deref())?;
    let source = DataSource::open(path)?;
    dispatch.execute(&ctx, &source)
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::InvalidArgument(_) => "INVALID_ARGUMENT",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Config(_) => 5,
        CommandError::Filter(_) => 1,
        CommandError::InvalidArgument(_) => 1,
        CommandError::Store(StoreError::Io { .. }) => 3,
        CommandError::Store(_) => 2,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazygrid_core::filter::FilterError;
    use serial_test::serial;
    use std::path::PathBuf;

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&FilterError::EmptyExpression.into()), "FILTER_ERROR");
        assert_eq!(error_code(&StoreError::query("x").into()), "STORE_ERROR");
        assert_eq!(
            error_code(&CommandError::InvalidArgument("x".into())),
            "INVALID_ARGUMENT"
        );
        assert_eq!(error_code(&CommandError::Config("x".into())), "CONFIG_ERROR");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_status(&CommandError::Config("x".into())), 5);
        assert_eq!(exit_status(&StoreError::unavailable("x").into()), 2);

        let missing = StoreError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(exit_status(&missing.into()), 3);
    }

    #[test]
    #[serial]
    fn test_missing_dataset_is_config_error() {
        let cli = Cli {
            verbose: false,
            quiet: true,
            json: false,
            no_color: true,
            data: None,
            command: Some(cli::Commands::Count {
                filter: None,
                max: None,
            }),
        };
        assert!(matches!(run(&cli), Err(CommandError::Config(_))));
    }
}
