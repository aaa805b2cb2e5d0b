//! Event envelope and payload types shared with integration providers.
//!
//! Providers subscribe to two topics. [`DISCOVER_TOPIC`] is published while
//! negotiating which integrations are available for an application; its data
//! carries the application record, the selection context, and the platform
//! name. [`LAUNCH_TOPIC`] is published just before a process starts; its data
//! additionally carries the command line and process options so subscribers
//! may rewrite them in place.
//!
//! Each subscriber answers with an [`EventResponse`] whose optional
//! `integration` object describes what it contributes. The topic strings and
//! field names are part of the wire contract with existing providers.

use std::path::PathBuf;

use applauncher_discovery::{Application, Platform};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntegrationError;

/// Topic published while negotiating integrations for an application.
pub const DISCOVER_TOPIC: &str = "ftrack.connect.application.discover";

/// Topic published immediately before an application is started.
pub const LAUNCH_TOPIC: &str = "ftrack.connect.application.launch";

/// Version label used when a provider does not report one.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// A published event: a topic plus free-form JSON data.
///
/// Subscribers receive the event mutably, so any change they make to
/// [`Event::data_mut`] is visible to the publisher once `publish` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    topic: String,
    data: Value,
}

impl Event {
    /// Creates an event on `topic`.
    #[must_use]
    pub fn new(topic: impl Into<String>, data: Value) -> Self {
        Self {
            topic: topic.into(),
            data,
        }
    }

    /// Builds a [`DISCOVER_TOPIC`] event.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Serialize`] when the payload cannot be
    /// represented as JSON.
    pub fn discover(payload: &DiscoverPayload<'_>) -> Result<Self, IntegrationError> {
        to_event(DISCOVER_TOPIC, payload)
    }

    /// Builds a [`LAUNCH_TOPIC`] event.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Serialize`] when the payload cannot be
    /// represented as JSON.
    pub fn launch(payload: &LaunchPayload) -> Result<Self, IntegrationError> {
        to_event(LAUNCH_TOPIC, payload)
    }

    /// Returns the topic.
    #[must_use]
    pub const fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// Returns the event data.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the event data for in-place modification.
    #[must_use]
    pub const fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Returns the identifier of the application the event concerns.
    #[must_use]
    pub fn application_identifier(&self) -> Option<&str> {
        self.data
            .get("application")
            .and_then(|application| application.get("identifier"))
            .and_then(Value::as_str)
    }

    /// Returns the version of the application the event concerns.
    #[must_use]
    pub fn application_version(&self) -> Option<&str> {
        self.data
            .get("application")
            .and_then(|application| application.get("version"))
            .and_then(Value::as_str)
    }

    /// Reads the data back as a launch payload.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::MalformedEvent`] when a subscriber left the
    /// data in a shape that no longer matches [`LaunchPayload`].
    pub fn to_launch_payload(&self) -> Result<LaunchPayload, IntegrationError> {
        LaunchPayload::deserialize(&self.data).map_err(|source| IntegrationError::MalformedEvent {
            topic: self.topic.clone(),
            source,
        })
    }
}

fn to_event(topic: &str, payload: &impl Serialize) -> Result<Event, IntegrationError> {
    serde_json::to_value(payload)
        .map(|data| Event::new(topic, data))
        .map_err(|source| IntegrationError::Serialize {
            topic: topic.to_owned(),
            source,
        })
}

/// What one provider contributes to a launch.
///
/// # Example
///
/// ```
/// use applauncher_integrations::IntegrationDescriptor;
///
/// let descriptor: IntegrationDescriptor = serde_json::from_str(
///     r#"{"name": "ftrack-connect-maya", "version": "1.4.0", "env": {"MAYA_SCRIPT_PATH.prepend": "/opt/ftrack/maya"}}"#,
/// )
/// .expect("valid descriptor");
/// assert_eq!(descriptor.name(), "ftrack-connect-maya");
/// assert_eq!(descriptor.version_label(), "1.4.0");
/// assert!(!descriptor.is_disabled());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationDescriptor {
    name: String,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    disable: bool,
    #[serde(default)]
    env: IndexMap<String, Value>,
    #[serde(default)]
    launch_arguments: Vec<String>,
}

impl IntegrationDescriptor {
    /// Creates a descriptor contributing nothing.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            disable: false,
            env: IndexMap::new(),
            launch_arguments: Vec::new(),
        }
    }

    /// Sets the reported version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(Value::String(version.into()));
        self
    }

    /// Adds an environment patch entry keyed by `variable[.action]`.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the arguments appended to the command line.
    #[must_use]
    pub fn with_launch_arguments(mut self, arguments: Vec<String>) -> Self {
        self.launch_arguments = arguments;
        self
    }

    /// Marks the provider as disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disable = true;
        self
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the reported version, if any.
    #[must_use]
    pub const fn version(&self) -> Option<&Value> {
        self.version.as_ref()
    }

    /// Returns the version as text, or [`UNKNOWN_VERSION`].
    #[must_use]
    pub fn version_label(&self) -> String {
        match &self.version {
            None | Some(Value::Null) => String::from(UNKNOWN_VERSION),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Returns `true` when the provider opted out.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disable
    }

    /// Returns the environment patch entries in declaration order.
    #[must_use]
    pub const fn env(&self) -> &IndexMap<String, Value> {
        &self.env
    }

    /// Returns the arguments appended to the command line.
    #[must_use]
    pub fn launch_arguments(&self) -> &[String] {
        &self.launch_arguments
    }
}

/// A subscriber's answer to a published event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(default)]
    integration: Option<IntegrationDescriptor>,
}

impl EventResponse {
    /// Creates a response carrying `integration`.
    #[must_use]
    pub const fn integration(integration: IntegrationDescriptor) -> Self {
        Self {
            integration: Some(integration),
        }
    }

    /// Creates a response without an integration.
    #[must_use]
    pub const fn empty() -> Self {
        Self { integration: None }
    }

    /// Returns the carried integration, if any.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&IntegrationDescriptor> {
        self.integration.as_ref()
    }

    /// Consumes the response, returning the carried integration.
    #[must_use]
    pub fn into_descriptor(self) -> Option<IntegrationDescriptor> {
        self.integration
    }
}

/// Data published on [`DISCOVER_TOPIC`].
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverPayload<'a> {
    /// Application being negotiated.
    pub application: &'a Application,
    /// Selection context supplied by the caller.
    pub context: &'a Value,
    /// Host platform name.
    pub platform: Platform,
}

/// Process options carried by a launch event.
///
/// `env` shows subscribers the base environment; the launcher replaces it
/// with the fully composed environment after publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Base environment of the child process.
    #[serde(default)]
    pub env: IndexMap<String, String>,
    /// Working directory for the child process.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// Data published on [`LAUNCH_TOPIC`].
///
/// Subscribers may rewrite `command` and `options` in place; the launcher
/// reads both back once publishing completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPayload {
    /// Command line, executable first.
    pub command: Vec<String>,
    /// Process options.
    #[serde(default)]
    pub options: LaunchOptions,
    /// Application being launched.
    pub application: Application,
    /// Launch context supplied by the caller.
    #[serde(default)]
    pub context: Value,
    /// Placeholder subscribers may fill in.
    #[serde(default = "integration_placeholder")]
    pub integration: Value,
    /// Host platform name.
    pub platform: Platform,
}

impl LaunchPayload {
    /// Creates a payload with an empty integration placeholder.
    #[must_use]
    pub fn new(
        command: Vec<String>,
        options: LaunchOptions,
        application: Application,
        context: Value,
        platform: Platform,
    ) -> Self {
        Self {
            command,
            options,
            application,
            context,
            integration: integration_placeholder(),
            platform,
        }
    }
}

/// Returns the placeholder integration object carried by launch events.
#[must_use]
pub fn integration_placeholder() -> Value {
    serde_json::json!({
        "name": null,
        "version": null,
        "env": {},
        "launch_arguments": [],
    })
}

#[cfg(test)]
mod tests;
