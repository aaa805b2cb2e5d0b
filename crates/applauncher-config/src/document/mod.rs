//! JSON schema for application documents.
//!
//! A document describes one application family. Several documents may share
//! an `identifier`; they are then presented as one launch action whose
//! catalog spans all of them.
//!
//! ```json
//! {
//!     "identifier": "ftrack-connect-launch-maya",
//!     "applicationIdentifier": "maya_{variant}",
//!     "label": "Maya",
//!     "variant": "{version}",
//!     "icon": "maya",
//!     "context": ["Task"],
//!     "integrations": {"legacy": ["ftrack-connect-maya"]},
//!     "search_path": {
//!         "linux": {
//!             "prefix": ["/", "usr", "autodesk", "maya.+"],
//!             "expression": ["bin", "maya$"],
//!             "version_expression": "maya(?P<version>\\d{4})"
//!         }
//!     }
//! }
//! ```

use applauncher_discovery::{IntegrationGroups, Platform};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Priority of actions whose documents do not set one.
pub const DEFAULT_PRIORITY: i64 = i64::MAX;

/// One application document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    /// Launch action identifier shared by grouped documents.
    pub identifier: String,
    /// Template for discovered application identifiers.
    #[serde(rename = "applicationIdentifier")]
    pub application_identifier: String,
    /// Template for the display label.
    pub label: String,
    /// Template for the variant differentiator.
    #[serde(default)]
    pub variant: String,
    /// Entity types the action is offered for; `null` allows empty selections.
    pub context: Vec<Option<String>>,
    /// Icon name or URL.
    #[serde(default)]
    pub icon: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Integration groups required at launch.
    #[serde(default)]
    pub integrations: Option<IntegrationGroups>,
    /// Action ordering; lower values are presented first.
    #[serde(default)]
    pub priority: Option<i64>,
    /// Search paths keyed by platform name.
    pub search_path: IndexMap<String, PlatformSearchPath>,
}

impl ApplicationDocument {
    /// Returns the search path declared for `platform`, if any.
    #[must_use]
    pub fn search_path_for(&self, platform: Platform) -> Option<&PlatformSearchPath> {
        self.search_path.get(platform.as_str())
    }

    /// Returns the declared integration groups, or an empty mapping.
    #[must_use]
    pub fn integration_groups(&self) -> IntegrationGroups {
        self.integrations.clone().unwrap_or_default()
    }

    /// Returns the priority, defaulting to [`DEFAULT_PRIORITY`].
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}

/// Where to look for an application on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSearchPath {
    /// Leading segments; the first one is the literal search root.
    pub prefix: Vec<String>,
    /// Remaining per-depth expressions.
    pub expression: Vec<String>,
    /// Arguments always passed to discovered executables.
    #[serde(default)]
    pub launch_arguments: Option<Vec<String>>,
    /// Custom version expression with a named `version` group.
    #[serde(default)]
    pub version_expression: Option<String>,
}

impl PlatformSearchPath {
    /// Returns the full segment list: prefix followed by expression.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        self.prefix
            .iter()
            .chain(&self.expression)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests;
