//! CLI error type.

use std::fmt;

use luopan::config::ConfigError;
use luopan::life_circle::ActivationError;
use luopan::logging::LoggingError;
use luopan::search::SearchError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem described in user terms.
    Config(String),
    /// Loading or saving the configuration file failed.
    ConfigFile(ConfigError),
    Logging(LoggingError),
    Search(SearchError),
    /// The user interrupted a running search.
    Cancelled,
    LifeCircle(ActivationError),
    /// A command-line argument was well-formed but unusable.
    InvalidArgument(String),
    /// Serializing `--json` output failed.
    Output(serde_json::Error),
    /// Starting the async runtime failed.
    Runtime(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Search(e) => write!(f, "Search failed: {}", e),
            CliError::Cancelled => write!(f, "Search cancelled"),
            CliError::LifeCircle(e) => write!(f, "Cannot activate life circle: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Search(e) => Some(e),
            CliError::LifeCircle(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Config(_) | CliError::InvalidArgument(_) | CliError::Cancelled => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        match e {
            // Only Ctrl+C cancels a CLI search; nothing else supersedes it
            SearchError::Superseded => CliError::Cancelled,
            other => CliError::Search(other),
        }
    }
}

impl From<ActivationError> for CliError {
    fn from(e: ActivationError) -> Self {
        CliError::LifeCircle(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
