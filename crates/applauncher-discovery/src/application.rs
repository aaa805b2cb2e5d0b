//! Immutable records describing discovered applications.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::version::LooseVersion;

/// Integration groups required by an application, in declaration order.
///
/// Each group name maps to the provider names that must all be discovered for
/// the group to be usable.
pub type IntegrationGroups = IndexMap<String, Vec<String>>;

/// A launchable application found on the local filesystem.
///
/// Records are produced by the [`DiscoveryEngine`](crate::DiscoveryEngine)
/// and never change afterwards; a refresh replaces the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    identifier: String,
    label: String,
    variant: String,
    path: PathBuf,
    version: LooseVersion,
    icon: Option<String>,
    launch_arguments: Option<Vec<String>>,
    description: Option<String>,
    #[serde(default)]
    integrations: IntegrationGroups,
}

impl Application {
    /// Creates a record for the executable at `path`.
    #[must_use]
    pub fn new(identifier: impl Into<String>, path: impl Into<PathBuf>, version: LooseVersion) -> Self {
        Self {
            identifier: identifier.into(),
            label: String::new(),
            variant: String::new(),
            path: path.into(),
            version,
            icon: None,
            launch_arguments: None,
            description: None,
            integrations: IntegrationGroups::new(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the variant differentiator.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Sets the icon reference.
    #[must_use]
    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    /// Sets the arguments always passed to the executable.
    #[must_use]
    pub fn with_launch_arguments(mut self, arguments: Option<Vec<String>>) -> Self {
        self.launch_arguments = arguments;
        self
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Declares the integration groups required at launch.
    #[must_use]
    pub fn with_integrations(mut self, integrations: IntegrationGroups) -> Self {
        self.integrations = integrations;
        self
    }

    /// Returns the catalog identifier.
    #[must_use]
    pub const fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the variant differentiator.
    #[must_use]
    pub const fn variant(&self) -> &str {
        self.variant.as_str()
    }

    /// Returns the absolute path to the executable or bundle.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the resolved version.
    #[must_use]
    pub const fn version(&self) -> &LooseVersion {
        &self.version
    }

    /// Returns the icon reference, if any.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the arguments always passed to the executable.
    #[must_use]
    pub fn launch_arguments(&self) -> Option<&[String]> {
        self.launch_arguments.as_deref()
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the required integration groups.
    #[must_use]
    pub const fn integrations(&self) -> &IntegrationGroups {
        &self.integrations
    }

    /// Returns `true` when at least one integration group is declared.
    #[must_use]
    pub fn requires_integrations(&self) -> bool {
        !self.integrations.is_empty()
    }
}
