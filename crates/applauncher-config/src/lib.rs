//! Runtime configuration and application documents for the launcher.
//!
//! Two kinds of configuration live here. [`Config`] holds the runtime
//! settings of the `applauncher` binary: where application documents are
//! stored, how logs are written, and the connection details exported to
//! launched applications. Every setting is a command-line flag that also
//! reads an `APPLAUNCHER_*` environment variable.
//!
//! [`ApplicationDocument`] is the JSON schema describing one launchable
//! application family: its search paths per platform, templates for labels
//! and identifiers, and the integration groups it requires. The [`loader`]
//! reads documents from the configured directories and groups them by
//! identifier.

mod defaults;
pub mod document;
mod error;
pub mod loader;
mod logging;

use std::path::PathBuf;

use clap::Args;
use url::Url;

pub use self::defaults::{
    APPLICATIONS_SUBDIRECTORY, DEFAULT_LOG_FILTER, PATH_LIST_DELIMITER, default_config_paths,
    default_log_filter, default_log_format,
};
pub use self::document::{ApplicationDocument, PlatformSearchPath};
pub use self::error::ConfigError;
pub use self::loader::{DocumentGroup, group_documents, load_documents};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Runtime settings shared by every `applauncher` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Directories containing JSON application documents.
    #[arg(
        long = "config-path",
        env = "APPLAUNCHER_CONFIG_PATHS",
        value_delimiter = PATH_LIST_DELIMITER,
        global = true
    )]
    pub config_paths: Vec<PathBuf>,

    /// Tracing filter directive.
    #[arg(
        long,
        env = "APPLAUNCHER_LOG_FILTER",
        default_value = DEFAULT_LOG_FILTER,
        global = true
    )]
    pub log_filter: String,

    /// Log output format.
    #[arg(
        long,
        env = "APPLAUNCHER_LOG_FORMAT",
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,

    /// Server URL used for icons and exported as the event endpoint.
    #[arg(long, env = "APPLAUNCHER_SERVER_URL", global = true)]
    pub server_url: Option<Url>,

    /// Credential exported to launched applications.
    #[arg(long, env = "APPLAUNCHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Directory prepended to the launched application's library search path.
    #[arg(long, env = "APPLAUNCHER_DEPENDENCY_PATH", global = true)]
    pub dependency_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_paths: Vec::new(),
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            server_url: None,
            api_key: None,
            dependency_path: None,
        }
    }
}

impl Config {
    /// Returns the document directories, falling back to the defaults.
    #[must_use]
    pub fn document_paths(&self) -> Vec<PathBuf> {
        if self.config_paths.is_empty() {
            default_config_paths()
        } else {
            self.config_paths.clone()
        }
    }

    /// Returns the server URL without a trailing slash.
    #[must_use]
    pub fn server_url_text(&self) -> Option<String> {
        self.server_url
            .as_ref()
            .map(|url| url.as_str().trim_end_matches('/').to_owned())
    }
}

#[cfg(test)]
mod tests;
