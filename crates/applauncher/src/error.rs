//! Error types raised by the launcher runtime.

use std::io;

use applauncher_discovery::{Platform, TemplateError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Errors raised while starting an application process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The command line had no executable.
    #[error("launch command is empty")]
    EmptyCommand,
    /// The operating system refused to start the process.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Executable that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised by launch action configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The action lists no entity types it can be offered for.
    #[error("action '{identifier}' declares no selection context")]
    EmptyContext {
        /// Action identifier.
        identifier: String,
    },
    /// A launch request did not name an application.
    #[error("launch request for action '{identifier}' names no application")]
    MissingApplication {
        /// Action identifier.
        identifier: String,
    },
}

/// Errors raised while turning an application document into a search.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The platform entry lists no path segments.
    #[error("document '{identifier}' declares an empty search path for {platform}")]
    EmptySearchPath {
        /// Action identifier of the document.
        identifier: String,
        /// Platform whose entry is empty.
        platform: Platform,
    },
    /// A name template could not be parsed.
    #[error("invalid {field} template in document '{identifier}': {source}")]
    Template {
        /// Action identifier of the document.
        identifier: String,
        /// Document field holding the template.
        field: &'static str,
        /// Underlying template error.
        #[source]
        source: TemplateError,
    },
}

/// Errors raised while delivering usage events.
#[derive(Debug, Error)]
pub enum UsageError {
    /// The event could not be encoded.
    #[error("failed to encode usage event '{name}': {source}")]
    Encode {
        /// Usage event name.
        name: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The transport rejected the event.
    #[error("failed to deliver usage event '{name}': {message}")]
    Delivery {
        /// Usage event name.
        name: String,
        /// Transport supplied description.
        message: String,
    },
}

/// Errors surfaced by the command-line interface.
#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments could not be parsed.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The `--context` argument was not valid JSON.
    #[error("invalid launch context: {0}")]
    Context(#[source] serde_json::Error),
    /// No configured action offers the requested application.
    #[error("no launch action offers application '{identifier}'")]
    UnknownApplication {
        /// Requested application identifier.
        identifier: String,
    },
    /// The requested action is not configured.
    #[error("launch action '{identifier}' is not configured")]
    UnknownAction {
        /// Requested action identifier.
        identifier: String,
    },
    /// The action rejected the launch request.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// The action refused the supplied selection.
    #[error("launch action '{identifier}' is not available for this selection")]
    InvalidSelection {
        /// Action identifier.
        identifier: String,
    },
    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}
