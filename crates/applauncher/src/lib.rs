//! Application launcher runtime.
//!
//! The crate ties application discovery and integration negotiation
//! together into launch actions. [`bootstrap`] turns application documents
//! into [`action::LaunchAction`] values, each backed by a catalog of
//! installed applications. An action answers two questions for the client:
//! which applications can be launched for the current selection, and how to
//! start one of them. Launching composes the child environment from the
//! host environment, connection settings, and the environment patches of
//! every satisfied integration, then starts a detached process.
//!
//! [`run`] drives the same flow from the command line.

pub mod action;
pub mod bootstrap;
mod cli;
pub mod command;
pub mod environment;
pub mod error;
pub mod launcher;
pub mod process;
pub mod telemetry;
pub mod usage;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use applauncher_config::{group_documents, load_documents};
use applauncher_discovery::Platform;
use applauncher_integrations::InProcessBus;
use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

pub use self::action::{ActionConfig, ActionEvent, ActionItem, LaunchAction, SelectionEntity};
pub use self::bootstrap::Bootstrap;
pub use self::environment::{ConnectionSettings, EnvAction, EnvPatch, Environment};
pub use self::error::{ActionError, BootstrapError, CliError, LaunchError, UsageError};
pub use self::launcher::{LaunchRequest, LaunchResult, LaunchStage, Launcher};
pub use self::process::{DetachedSpawner, ProcessRequest, ProcessSpawner};
pub use self::usage::{LogReporter, PendingReports, UsageEvent, UsageReporter};

use self::cli::{Cli, CliCommand, LaunchArgs};
use self::launcher::LAUNCH_ARGUMENTS_KEY;

const CLI_TARGET: &str = "applauncher::cli";

/// Upper bound on waiting for usage reports before the process exits.
const USAGE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

type CliAction = LaunchAction<Arc<InProcessBus>, DetachedSpawner>;

/// Runs the launcher using the provided arguments and IO handles.
///
/// Help and version requests are written to `stdout` and succeed. Every
/// other error is written to `stderr` and yields a failing exit code, as
/// does a launch that could not start its application.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    match execute(args, stdout) {
        Ok(exit_code) => exit_code,
        Err(CliError::Usage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<I, W>(args: I, stdout: &mut W) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    let cli = Cli::try_parse_from(args)?;
    telemetry::initialise(&cli.config)?;

    let platform = Platform::current();
    let groups = group_documents(load_documents(&cli.config.document_paths()));
    let engine = bootstrap::discovery_engine(&cli.config, platform);
    let actions = Bootstrap::new(
        &engine,
        Arc::new(InProcessBus::new()),
        DetachedSpawner,
        bootstrap::connection_settings(&cli.config),
    )
    .discover_actions(&groups);
    info!(
        target: CLI_TARGET,
        actions = actions.len(),
        %platform,
        "launch actions ready"
    );

    match cli.command {
        CliCommand::List => {
            let summaries: Vec<ActionSummary> = actions.iter().map(ActionSummary::from).collect();
            write_json(stdout, &summaries)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Discover { context } => {
            let event = ActionEvent::new(Value::Object(parse_context(context.as_deref())?));
            let items: Vec<ActionItem> = actions
                .iter()
                .filter_map(|action| action.discover(&event))
                .flatten()
                .collect();
            write_json(stdout, &items)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Launch(arguments) => {
            let outcome = launch(&actions, arguments);
            for action in &actions {
                action.wait_for_reports(USAGE_FLUSH_TIMEOUT);
            }
            let result = outcome?;
            write_json(stdout, &result)?;
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn launch(actions: &[CliAction], arguments: LaunchArgs) -> Result<LaunchResult, CliError> {
    let action = select_action(actions, &arguments)?;
    let Some(context) = arguments.context.as_deref() else {
        let request = LaunchRequest::new(arguments.application, Value::Object(Map::new()))
            .with_arguments(arguments.arguments);
        return Ok(action.launch_request(&request));
    };

    let mut data = parse_context(Some(context))?;
    data.insert(
        String::from("applicationIdentifier"),
        Value::String(arguments.application),
    );
    if !arguments.arguments.is_empty() {
        let mut launch_arguments = data
            .remove(LAUNCH_ARGUMENTS_KEY)
            .and_then(|value| match value {
                Value::Array(entries) => Some(entries),
                _ => None,
            })
            .unwrap_or_default();
        launch_arguments.extend(arguments.arguments.into_iter().map(Value::String));
        data.insert(
            String::from(LAUNCH_ARGUMENTS_KEY),
            Value::Array(launch_arguments),
        );
    }

    action
        .launch(&ActionEvent::new(Value::Object(data)))?
        .ok_or_else(|| CliError::InvalidSelection {
            identifier: action.config().identifier.clone(),
        })
}

fn select_action<'a>(
    actions: &'a [CliAction],
    arguments: &LaunchArgs,
) -> Result<&'a CliAction, CliError> {
    if let Some(identifier) = arguments.action.as_deref() {
        return actions
            .iter()
            .find(|action| action.config().identifier == identifier)
            .ok_or_else(|| CliError::UnknownAction {
                identifier: identifier.to_owned(),
            });
    }
    actions
        .iter()
        .find(|action| action.catalog().lookup(&arguments.application).is_some())
        .ok_or_else(|| CliError::UnknownApplication {
            identifier: arguments.application.clone(),
        })
}

fn parse_context(context: Option<&str>) -> Result<Map<String, Value>, CliError> {
    context.map_or_else(
        || Ok(Map::new()),
        |text| serde_json::from_str(text).map_err(CliError::Context),
    )
}

fn write_json<W: Write, T: Serialize + ?Sized>(stdout: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *stdout, value).map_err(CliError::Encode)?;
    writeln!(stdout).map_err(CliError::Write)
}

/// One row of `applauncher list`.
#[derive(Debug, Serialize)]
struct ActionSummary {
    action: String,
    label: String,
    priority: i64,
    applications: Vec<ApplicationSummary>,
}

#[derive(Debug, Serialize)]
struct ApplicationSummary {
    identifier: String,
    label: String,
    variant: String,
    version: String,
    path: String,
}

impl<B, S> From<&LaunchAction<B, S>> for ActionSummary {
    fn from(action: &LaunchAction<B, S>) -> Self {
        let config = action.config();
        Self {
            action: config.identifier.clone(),
            label: config.label.clone(),
            priority: config.priority,
            applications: action
                .catalog()
                .iter()
                .map(|application| ApplicationSummary {
                    identifier: application.identifier().to_owned(),
                    label: application.label().to_owned(),
                    variant: application.variant().to_owned(),
                    version: application.version().as_str().to_owned(),
                    path: application.path().display().to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests;
