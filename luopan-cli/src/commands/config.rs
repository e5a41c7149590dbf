//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` for
//! viewing and modifying `config.ini` from the command line.

use std::path::Path;

use clap::Subcommand;
use luopan::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., search.providers)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., search.providers)
        key: String,

        /// Value to set (an empty string clears optional keys)
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the default config file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            println!("{}", display_value(&get_value(&path, &key)?));
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let config_key = set_value(&path, &key, &value)?;
            println!("Set {} = {}", config_key.name(), value);
            Ok(())
        }
        ConfigCommands::List => {
            print!("{}", render_list(&load_or_default(&path)));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'luopan config list' to see available keys.",
            key
        ))
    })
}

fn load_or_default(path: &Path) -> ConfigFile {
    ConfigFile::load_from(path).unwrap_or_default()
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Read one value from the config at `path`.
fn get_value(path: &Path, key: &str) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    Ok(config_key.get(&load_or_default(path)))
}

/// Validate and store one value, rewriting the config at `path`.
fn set_value(path: &Path, key: &str, value: &str) -> Result<ConfigKey, CliError> {
    let config_key = parse_key(key)?;

    // Starting from defaults here would overwrite every other setting
    let mut config = ConfigFile::load_from(path).map_err(|e| {
        CliError::Config(format!(
            "{}. Fix or remove {} before setting values.",
            e,
            path.display()
        ))
    })?;
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save_to(path)?;

    Ok(config_key)
}

/// Render every key grouped by section.
fn render_list(config: &ConfigFile) -> String {
    let mut out = String::new();
    out.push_str("Configuration Settings\n");
    out.push_str("======================\n\n");

    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        let value = key.get(config);
        out.push_str(&format!("  {} = {}\n", key.key_name(), display_value(&value)));
    }

    out
}
