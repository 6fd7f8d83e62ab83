//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/lazygrid/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use lazygrid_core::PagingStrategy;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 2;

/// Page size used when neither the flag nor the config sets one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Keys accepted by `lg config set`.
const VALID_KEYS: &str =
    "paging.strategy, paging.page_size, paging.max_results, paging.batch_size, output.color";

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Files without a version are treated as version 1.
    #[serde(default = "legacy_version")]
    pub version: u32,

    /// Paging defaults for the data commands.
    #[serde(default)]
    pub paging: PagingConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Version 1 kept the page size at the top level.
    #[serde(default, skip_serializing)]
    page_size: Option<usize>,
}

/// Returns the version assumed for files written before versioning.
fn legacy_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            paging: PagingConfig::default(),
            output: OutputConfig::default(),
            page_size: None,
        }
    }
}

impl Config {
    /// Page size to use, falling back to [`DEFAULT_PAGE_SIZE`].
    pub fn page_size(&self) -> usize {
        self.paging.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Paging strategy to use, falling back to offset paging.
    pub fn strategy(&self) -> PagingStrategy {
        self.paging.strategy.unwrap_or_default()
    }
}

/// Paging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Default paging strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PagingStrategy>,

    /// Default records per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// Default cap on matching records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,

    /// Ids per store call for the id-list strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/lazygrid/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("lazygrid"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("lazygrid"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("LAZYGRID_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than this lg supports ({})",
            config.version, CONFIG_VERSION
        )));
    }

    if config.version < 2 {
        // v1 -> v2: page_size moved under [paging]
        if let Some(page_size) = config.page_size.take() {
            config.paging.page_size.get_or_insert(page_size);
        }
        config.version = 2;
    }

    Ok(config)
}

/// Saves the configuration to disk.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("[paging]");
        println!("  strategy: {}", config.strategy());
        println!("  page_size: {}", config.page_size());
        if let Some(max) = config.paging.max_results {
            println!("  max_results: {}", max);
        }
        if let Some(batch) = config.paging.batch_size {
            println!("  batch_size: {}", batch);
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Sets one dotted key on a config.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key.split_once('.') {
        Some(("paging", "strategy")) => {
            let strategy = value
                .parse::<PagingStrategy>()
                .map_err(|e| CommandError::Config(e.to_string()))?;
            config.paging.strategy = Some(strategy);
        }
        Some(("paging", "page_size")) => {
            config.paging.page_size = Some(parse_positive(key, value)?);
        }
        Some(("paging", "max_results")) => {
            config.paging.max_results = Some(parse_positive(key, value)?);
        }
        Some(("paging", "batch_size")) => {
            config.paging.batch_size = Some(parse_positive(key, value)?);
        }
        Some(("output", "color")) => {
            config.output.color = Some(parse_bool(value)?);
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key, VALID_KEYS
            )));
        }
    }
    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a count greater than zero.
fn parse_positive(key: &str, s: &str) -> Result<usize> {
    match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::Config(format!(
            "Invalid {} value '{}'. Expected a positive integer",
            key, s
        ))),
    }
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}
