//! Launch actions offered to the task-management client.
//!
//! Each configured application family becomes one [`LaunchAction`]. The
//! client asks an action to *discover* what it can launch for the current
//! selection, then asks it to *launch* one of the returned items. Both
//! requests arrive as an [`ActionEvent`] whose data carries the selection.

use std::fmt;
use std::time::Duration;
use std::sync::Arc;

use applauncher_discovery::{
    Application, ApplicationCatalog, ApplicationSearch, DiscoveryEngine, IntegrationGroups,
};
use applauncher_integrations::{EventBus, IntegrationDescriptor, IntegrationNegotiator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ActionError;
use crate::launcher::{LaunchRequest, LaunchResult, Launcher};
use crate::process::ProcessSpawner;

const ACTION_TARGET: &str = "applauncher::action";

/// Icon reported for applications without one.
pub const DEFAULT_ICON: &str = "default";

/// Host name reported when the real one cannot be read.
const UNKNOWN_HOST: &str = "localhost";

/// Static settings of one launch action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    /// Action identifier.
    pub identifier: String,
    /// Display label.
    pub label: String,
    /// Optional variant shown next to the label.
    pub variant: Option<String>,
    /// Entity types the action is offered for; `None` allows an empty
    /// selection.
    pub context: Vec<Option<String>>,
    /// Ordering among actions; lower values come first.
    pub priority: i64,
}

/// One selected entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntity {
    /// Entity identifier.
    pub entity_id: String,
    /// Entity type, for example `task`.
    pub entity_type: String,
}

/// A discover or launch request addressed to an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionEvent {
    /// Event data; carries `selection` and, for launches,
    /// `applicationIdentifier`.
    pub data: Value,
    /// Description of the client that sent the event.
    pub source: Value,
}

impl ActionEvent {
    /// Creates an event with no source.
    #[must_use]
    pub const fn new(data: Value) -> Self {
        Self {
            data,
            source: Value::Null,
        }
    }

    /// Sets the event source.
    #[must_use]
    pub fn with_source(mut self, source: Value) -> Self {
        self.source = source;
        self
    }

    /// Returns the selected entities, skipping malformed entries.
    #[must_use]
    pub fn selection(&self) -> Vec<SelectionEntity> {
        self.data
            .get("selection")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| SelectionEntity::deserialize(entry).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the application the client asked to launch.
    #[must_use]
    pub fn application_identifier(&self) -> Option<&str> {
        self.data
            .get("applicationIdentifier")
            .and_then(Value::as_str)
    }

    /// Returns the launch context: the event data plus its source.
    #[must_use]
    pub fn context(&self) -> Value {
        let mut context = self.data.clone();
        if let Value::Object(map) = &mut context {
            map.insert(String::from("source"), self.source.clone());
        }
        context
    }
}

/// One launchable entry returned by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// Identifier of the action offering the item.
    pub action_identifier: String,
    /// Application label.
    pub label: String,
    /// Icon name or URL.
    pub icon: String,
    /// Variant, when the application has one.
    pub variant: Option<String>,
    /// Identifier to pass back when launching.
    pub application_identifier: String,
    /// Integration groups the application requires.
    pub integrations: IntegrationGroups,
    /// Host the application would run on.
    pub host: String,
}

/// A configured launch action bound to a launcher.
pub struct LaunchAction<B, S> {
    config: ActionConfig,
    launcher: Launcher<B, S>,
    negotiator: IntegrationNegotiator<B>,
    host: String,
}

impl<B, S> fmt::Debug for LaunchAction<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchAction")
            .field("config", &self.config)
            .field("launcher", &self.launcher)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl<B: Clone, S> LaunchAction<B, S> {
    /// Binds `config` to `launcher`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::EmptyContext`] when `config` lists no context
    /// types.
    pub fn new(config: ActionConfig, launcher: Launcher<B, S>) -> Result<Self, ActionError> {
        if config.context.is_empty() {
            return Err(ActionError::EmptyContext {
                identifier: config.identifier,
            });
        }
        let negotiator = IntegrationNegotiator::new(launcher.bus().clone(), launcher.platform());
        Ok(Self {
            config,
            launcher,
            negotiator,
            host: host_name(),
        })
    }
}

impl<B, S> LaunchAction<B, S> {
    /// Overrides the host name reported in discovered items.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Returns the action settings.
    #[must_use]
    pub const fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Returns the current catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> Arc<ApplicationCatalog> {
        self.launcher.catalog().snapshot()
    }

    /// Waits up to `timeout` for usage reports from earlier launches.
    pub fn wait_for_reports(&self, timeout: Duration) -> usize {
        self.launcher.wait_for_reports(timeout)
    }

    /// Re-runs `searches` and swaps the result in as the action's catalog.
    ///
    /// Lookups that already hold a snapshot keep seeing the previous catalog;
    /// later lookups see the new one. Returns the number of applications now
    /// in the catalog.
    pub fn refresh<'a>(
        &self,
        engine: &DiscoveryEngine,
        searches: impl IntoIterator<Item = &'a ApplicationSearch>,
    ) -> usize {
        let catalog = engine.discover_all(searches);
        let count = catalog.len();
        let previous = self.launcher.catalog().replace(catalog);
        debug!(
            target: ACTION_TARGET,
            action = %self.config.identifier,
            previous = previous.len(),
            current = count,
            "catalog refreshed"
        );
        count
    }

    /// Returns whether the action is offered for `selection`.
    ///
    /// An empty selection is valid only when the context allows it. Otherwise
    /// the first entity's type must match a context type, ignoring ASCII case.
    #[must_use]
    pub fn validate_selection(&self, selection: &[SelectionEntity]) -> bool {
        let Some(first) = selection.first() else {
            return self.config.context.contains(&None);
        };
        self.config
            .context
            .iter()
            .flatten()
            .any(|entity_type| entity_type.eq_ignore_ascii_case(&first.entity_type))
    }
}

impl<B: EventBus, S: ProcessSpawner> LaunchAction<B, S> {
    /// Lists the applications this action can launch for `event`.
    ///
    /// Returns `None` when the selection is not valid for this action.
    /// Applications with an unsatisfied integration group are left out.
    #[must_use]
    pub fn discover(&self, event: &ActionEvent) -> Option<Vec<ActionItem>> {
        if !self.validate_selection(&event.selection()) {
            return None;
        }
        let context = event.context();
        let catalog = self.catalog();
        let mut applications: Vec<&Application> = catalog.iter().collect();
        applications.sort_by(|left, right| left.label().cmp(right.label()));

        let items = applications
            .into_iter()
            .filter(|application| self.integrations_available(application, &context))
            .map(|application| self.item_for(application))
            .collect();
        Some(items)
    }

    /// Launches the application named in `event`.
    ///
    /// Returns `Ok(None)` when the selection is not valid for this action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MissingApplication`] when the event does not
    /// name an application.
    pub fn launch(&self, event: &ActionEvent) -> Result<Option<LaunchResult>, ActionError> {
        if !self.validate_selection(&event.selection()) {
            return Ok(None);
        }
        let identifier = event
            .application_identifier()
            .ok_or_else(|| ActionError::MissingApplication {
                identifier: self.config.identifier.clone(),
            })?;
        let request = LaunchRequest::new(identifier, event.context());
        Ok(Some(self.launcher.launch(&request)))
    }

    /// Launches `request` directly, bypassing selection checks.
    #[must_use]
    pub fn launch_request(&self, request: &LaunchRequest) -> LaunchResult {
        self.launcher.launch(request)
    }

    /// Returns every integration discovered for any catalog application,
    /// without duplicates.
    #[must_use]
    pub fn version_information(&self) -> Vec<IntegrationDescriptor> {
        let mut found: Vec<IntegrationDescriptor> = Vec::new();
        for application in self.catalog().iter() {
            for descriptor in self
                .negotiator
                .negotiate(application, &Value::Null)
                .into_discovered()
            {
                if !found.contains(&descriptor) {
                    found.push(descriptor);
                }
            }
        }
        found
    }

    fn integrations_available(&self, application: &Application, context: &Value) -> bool {
        if !application.requires_integrations() {
            return true;
        }
        let negotiation = self.negotiator.negotiate(application, context);
        for group in negotiation.unsatisfied() {
            debug!(
                target: ACTION_TARGET,
                application = application.identifier(),
                group = %group,
                providers = ?application.integrations().get(group),
                "integration group could not be loaded"
            );
        }
        negotiation.is_satisfied()
    }

    fn item_for(&self, application: &Application) -> ActionItem {
        ActionItem {
            action_identifier: self.config.identifier.clone(),
            label: application.label().to_owned(),
            icon: application.icon().unwrap_or(DEFAULT_ICON).to_owned(),
            variant: Some(application.variant())
                .filter(|variant| !variant.is_empty())
                .map(str::to_owned),
            application_identifier: application.identifier().to_owned(),
            integrations: application.integrations().clone(),
            host: self.host.clone(),
        }
    }
}

fn host_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(error) => {
            warn!(target: ACTION_TARGET, %error, "host name unavailable");
            String::from(UNKNOWN_HOST)
        }
    }
}

#[cfg(test)]
mod tests;
