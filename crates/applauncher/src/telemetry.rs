//! Structured logging for the launcher.

use std::io::{self, IsTerminal};

use applauncher_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned once logging is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Returns the format requested by the configuration that produced
    /// this handle.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// Later calls return a new [`TelemetryHandle`] without reconfiguring
/// anything, so the first configuration wins for the life of the process.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a different
/// subscriber was installed elsewhere.
///
/// # Examples
///
/// ```rust
/// use applauncher::telemetry;
/// use applauncher_config::Config;
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let config = Config::default();
/// let handle = telemetry::initialise(&config)?;
/// assert_eq!(handle.format(), config.log_format);
/// telemetry::initialise(&config)?;
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|()| TelemetryHandle {
            format: config.log_format,
        })
}

/// Parses the configured filter directive.
fn log_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_filter).map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = log_filter(config)?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            // stdout carries command output; logs stay on stderr.
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> =
        if config.log_format.emits_json(io::stderr().is_terminal()) {
            Box::new(builder(filter).json().flatten_event(true).finish())
        } else {
            Box::new(builder(filter).compact().finish())
        };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("info")]
    #[case("applauncher=debug,applauncher_discovery=trace")]
    fn accepts_target_directives(#[case] directive: &str) {
        let config = Config {
            log_filter: directive.to_owned(),
            ..Config::default()
        };
        assert!(log_filter(&config).is_ok());
    }

    #[test]
    fn rejects_malformed_filter() {
        let config = Config {
            log_filter: String::from("applauncher=[unterminated"),
            ..Config::default()
        };
        let err = log_filter(&config).expect_err("invalid directive");
        assert!(matches!(err, TelemetryError::Filter(_)));
    }
}
