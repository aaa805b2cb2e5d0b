//! Launch orchestration.
//!
//! A launch moves through a fixed sequence of [`LaunchStage`]s:
//!
//! ```text
//! ResolvingApplication -> BuildingCommand -> NegotiatingIntegrations
//!     -> ComposingEnvironment -> Starting -> Succeeded | Failed
//! ```
//!
//! Only an unknown application or a process that fails to start ends in
//! [`LaunchStage::Failed`]. Integration shortfalls, bus errors and usage
//! reporting problems are logged and the launch carries on.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use applauncher_discovery::{Application, CatalogHandle, Platform};
use applauncher_integrations::negotiator::enabled_integrations;
use applauncher_integrations::{
    Event, EventBus, IntegrationDescriptor, LaunchOptions, LaunchPayload, Negotiation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::command::{build_command, working_directory};
use crate::environment::{ConnectionSettings, Environment, compose};
use crate::process::{ProcessRequest, ProcessSpawner};
use crate::usage::{
    LogReporter, PendingReports, UsageEvent, UsageReporter, report_in_background,
};

const LAUNCHER_TARGET: &str = "applauncher::launcher";

/// Context key holding caller-supplied launch arguments.
pub const LAUNCH_ARGUMENTS_KEY: &str = "launchArguments";

/// Steps of a launch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchStage {
    /// Looking the application up in the catalog.
    ResolvingApplication,
    /// Building the platform command line.
    BuildingCommand,
    /// Publishing the launch event and collecting integrations.
    NegotiatingIntegrations,
    /// Applying integration patches to the environment.
    ComposingEnvironment,
    /// Starting the detached process.
    Starting,
    /// The process started.
    Succeeded,
    /// The launch was abandoned.
    Failed,
}

impl LaunchStage {
    /// Returns whether the stage ends a launch.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingApplication => "resolving-application",
            Self::BuildingCommand => "building-command",
            Self::NegotiatingIntegrations => "negotiating-integrations",
            Self::ComposingEnvironment => "composing-environment",
            Self::Starting => "starting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome reported to whoever requested a launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchResult {
    /// Whether the process started.
    pub success: bool,
    /// User-facing description of the outcome.
    pub message: String,
}

impl LaunchResult {
    /// Result for a started application.
    #[must_use]
    pub fn started(application: &Application) -> Self {
        let message = if application.variant().is_empty() {
            format!("{} application started.", application.label())
        } else {
            format!(
                "{} {} application started.",
                application.label(),
                application.variant()
            )
        };
        Self {
            success: true,
            message,
        }
    }

    /// Result for an application whose process could not start.
    #[must_use]
    pub fn not_started(application: &Application) -> Self {
        Self {
            success: false,
            message: format!("{} application could not be started.", application.label()),
        }
    }

    /// Result for an identifier missing from the catalog.
    #[must_use]
    pub fn not_found(identifier: &str) -> Self {
        Self {
            success: false,
            message: format!("{identifier} application not found."),
        }
    }
}

/// What to launch and with which context.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    /// Identifier, or wildcard prefix, of the application.
    pub application_identifier: String,
    /// Context forwarded to integrations and exported to the child.
    pub context: Value,
    /// Arguments appended after the application's own.
    pub arguments: Vec<String>,
}

impl LaunchRequest {
    /// Creates a request.
    ///
    /// String entries under [`LAUNCH_ARGUMENTS_KEY`] in `context` become the
    /// initial caller arguments.
    #[must_use]
    pub fn new(application_identifier: impl Into<String>, context: Value) -> Self {
        let arguments = context
            .get(LAUNCH_ARGUMENTS_KEY)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            application_identifier: application_identifier.into(),
            context,
            arguments,
        }
    }

    /// Appends further caller arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = String>) -> Self {
        self.arguments.extend(arguments);
        self
    }
}

/// Resolves, negotiates, composes and starts applications.
pub struct Launcher<B, S> {
    catalog: CatalogHandle,
    bus: B,
    spawner: S,
    platform: Platform,
    connection: ConnectionSettings,
    base_environment: Option<Environment>,
    reporter: Arc<dyn UsageReporter>,
    pending_reports: PendingReports,
}

impl<B, S> fmt::Debug for Launcher<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("platform", &self.platform)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

impl<B, S> Launcher<B, S> {
    /// Creates a launcher over `catalog`.
    ///
    /// Usage events go to a [`LogReporter`] and the base environment is read
    /// from the host at each launch until overridden.
    #[must_use]
    pub fn new(catalog: CatalogHandle, bus: B, spawner: S, platform: Platform) -> Self {
        Self {
            catalog,
            bus,
            spawner,
            platform,
            connection: ConnectionSettings::default(),
            base_environment: None,
            reporter: Arc::new(LogReporter),
            pending_reports: PendingReports::default(),
        }
    }

    /// Sets the connection variables exported to every child.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Uses `environment` instead of the host environment as the base.
    #[must_use]
    pub fn with_base_environment(mut self, environment: Environment) -> Self {
        self.base_environment = Some(environment);
        self
    }

    /// Sends usage events through `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn UsageReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Returns the catalog handle.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Returns the event bus launch events are published on.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the platform launches are built for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Waits up to `timeout` for usage deliveries still in flight.
    ///
    /// Returns how many deliveries were abandoned at the deadline.
    pub fn wait_for_reports(&self, timeout: Duration) -> usize {
        self.pending_reports.wait(timeout)
    }

    fn base_environment(&self) -> Environment {
        self.base_environment
            .clone()
            .unwrap_or_else(|| Environment::from_host(self.platform))
    }
}

impl<B: EventBus, S: ProcessSpawner> Launcher<B, S> {
    /// Launches the application named by `request`.
    ///
    /// Never fails: every outcome is described by the returned
    /// [`LaunchResult`], with details of failures written to the log.
    #[must_use]
    pub fn launch(&self, request: &LaunchRequest) -> LaunchResult {
        let mut attempt = Attempt::new(&request.application_identifier);

        let snapshot = self.catalog.snapshot();
        let Some(application) = snapshot.lookup(&request.application_identifier) else {
            attempt.advance(LaunchStage::Failed);
            return LaunchResult::not_found(&request.application_identifier);
        };

        attempt.advance(LaunchStage::BuildingCommand);
        let command = build_command(self.platform, application, &request.arguments);
        let mut environment = self.base_environment();
        environment.inject_connection(&self.connection, &request.context);
        let payload = LaunchPayload::new(
            command,
            LaunchOptions {
                env: environment.clone().into_variables(),
                cwd: working_directory(application),
            },
            application.clone(),
            request.context.clone(),
            self.platform,
        );

        attempt.advance(LaunchStage::NegotiatingIntegrations);
        let (payload, enabled) = self.publish_launch(payload);
        let negotiation = Negotiation::evaluate(application.integrations(), enabled);

        attempt.advance(LaunchStage::ComposingEnvironment);
        let composed = compose_integrations(environment, application, &negotiation);

        attempt.advance(LaunchStage::Starting);
        let process = ProcessRequest {
            command: payload.command,
            env: composed.into_variables(),
            cwd: payload.options.cwd,
        };
        debug!(
            target: LAUNCHER_TARGET,
            application = application.identifier(),
            command = ?process.command,
            cwd = ?process.cwd,
            "starting application"
        );
        match self.spawner.spawn(&process) {
            Ok(pid) => {
                attempt.advance(LaunchStage::Succeeded);
                info!(
                    target: LAUNCHER_TARGET,
                    application = application.identifier(),
                    pid,
                    "application started"
                );
                self.report_usage(application, negotiation.discovered());
                LaunchResult::started(application)
            }
            Err(error) => {
                attempt.advance(LaunchStage::Failed);
                error!(
                    target: LAUNCHER_TARGET,
                    application = application.identifier(),
                    command = ?process.command,
                    %error,
                    "application could not be started"
                );
                LaunchResult::not_started(application)
            }
        }
    }

    /// Publishes the launch event, returning the possibly rewritten payload
    /// and the enabled integrations the subscribers described.
    ///
    /// Launch arguments of enabled integrations are appended to the command
    /// in response order.
    fn publish_launch(&self, payload: LaunchPayload) -> (LaunchPayload, Vec<IntegrationDescriptor>) {
        let published = Event::launch(&payload).and_then(|mut event| {
            self.bus
                .publish(&mut event)
                .map(|responses| (event, responses))
        });
        let (event, responses) = match published {
            Ok(published) => published,
            Err(error) => {
                warn!(target: LAUNCHER_TARGET, %error, "launch event failed; continuing without integrations");
                return (payload, Vec::new());
            }
        };

        let mut rewritten = event.to_launch_payload().unwrap_or_else(|error| {
            warn!(target: LAUNCHER_TARGET, %error, "ignoring malformed launch event rewrite");
            payload
        });
        let descriptors = enabled_integrations(responses);
        for descriptor in &descriptors {
            rewritten
                .command
                .extend(descriptor.launch_arguments().iter().cloned());
        }
        (rewritten, descriptors)
    }

    fn report_usage(&self, application: &Application, used: &[IntegrationDescriptor]) {
        if used.is_empty() {
            debug!(
                target: LAUNCHER_TARGET,
                application = application.identifier(),
                "no integrations to report"
            );
            return;
        }
        let event = UsageEvent::integrations_used(application, used);
        if let Some(handle) = report_in_background(Arc::clone(&self.reporter), event) {
            self.pending_reports.track(handle);
        }
    }
}

/// Applies the environment patches of every satisfied integration group.
fn compose_integrations(
    base: Environment,
    application: &Application,
    negotiation: &Negotiation,
) -> Environment {
    let unsatisfied: HashSet<&str> = negotiation.unsatisfied().iter().map(String::as_str).collect();
    let mut environment = base;
    for (group, providers) in application.integrations() {
        if unsatisfied.contains(group.as_str()) {
            warn!(
                target: LAUNCHER_TARGET,
                application = application.identifier(),
                group = %group,
                "ignoring integration group with undiscovered providers"
            );
            continue;
        }
        for provider in providers {
            let Some(descriptor) = negotiation
                .discovered()
                .iter()
                .find(|descriptor| descriptor.name() == provider.as_str())
            else {
                continue;
            };
            if descriptor.env().is_empty() {
                warn!(target: LAUNCHER_TARGET, integration = %provider, "integration exported no environment");
                continue;
            }
            debug!(
                target: LAUNCHER_TARGET,
                integration = %provider,
                group = %group,
                "merging integration environment"
            );
            environment = compose(
                environment,
                descriptor
                    .env()
                    .iter()
                    .map(|(key, value)| (key.as_str(), value)),
            );
        }
    }
    environment
}

/// Tracks and logs stage transitions of one launch.
struct Attempt<'a> {
    identifier: &'a str,
    stage: LaunchStage,
}

impl<'a> Attempt<'a> {
    const fn new(identifier: &'a str) -> Self {
        Self {
            identifier,
            stage: LaunchStage::ResolvingApplication,
        }
    }

    fn advance(&mut self, next: LaunchStage) {
        debug!(
            target: LAUNCHER_TARGET,
            application = self.identifier,
            from = %self.stage,
            to = %next,
            "launch stage"
        );
        self.stage = next;
    }
}
