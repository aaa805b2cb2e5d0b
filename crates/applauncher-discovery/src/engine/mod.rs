//! Turns filesystem hits into versioned application records.
//!
//! An [`ApplicationSearch`] bundles a [`SearchSpec`] with the templates and
//! metadata every hit inherits. [`DiscoveryEngine::discover`] runs one search
//! and returns its applications newest first; [`DiscoveryEngine::discover_all`]
//! runs many, logging and skipping the searches that are misconfigured so a
//! single bad entry never empties the catalog.

use tracing::{debug, warn};

use crate::application::{Application, IntegrationGroups};
use crate::catalog::ApplicationCatalog;
use crate::error::DiscoveryError;
use crate::icon::IconResolver;
use crate::matcher::{PathMatcher, SearchSpec};
use crate::platform::Platform;
use crate::template::{Template, TemplateValues};
use crate::version::{LooseVersion, VersionParser};

/// Tracing target for discovery runs.
const ENGINE_TARGET: &str = "applauncher_discovery::engine";

/// Everything needed to discover one family of applications.
#[derive(Debug, Clone)]
pub struct ApplicationSearch {
    spec: SearchSpec,
    label: Template,
    identifier: Template,
    variant: Template,
    version_expression: Option<String>,
    icon: Option<String>,
    launch_arguments: Option<Vec<String>>,
    description: Option<String>,
    integrations: IntegrationGroups,
}

impl ApplicationSearch {
    /// Creates a search with an empty variant and the default version
    /// expression.
    #[must_use]
    pub fn new(spec: SearchSpec, label: Template, identifier: Template) -> Self {
        Self {
            spec,
            label,
            identifier,
            variant: Template::default(),
            version_expression: None,
            icon: None,
            launch_arguments: None,
            description: None,
            integrations: IntegrationGroups::new(),
        }
    }

    /// Sets the variant template; it may reference `{version}`.
    #[must_use]
    pub fn with_variant(mut self, variant: Template) -> Self {
        self.variant = variant;
        self
    }

    /// Overrides the version expression applied to each hit's full path.
    #[must_use]
    pub fn with_version_expression(mut self, expression: impl Into<String>) -> Self {
        self.version_expression = Some(expression.into());
        self
    }

    /// Sets the icon name or URL.
    #[must_use]
    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    /// Sets arguments always passed to discovered executables.
    #[must_use]
    pub fn with_launch_arguments(mut self, arguments: Option<Vec<String>>) -> Self {
        self.launch_arguments = arguments;
        self
    }

    /// Sets the description copied onto every record.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Declares integration groups required by discovered applications.
    #[must_use]
    pub fn with_integrations(mut self, integrations: IntegrationGroups) -> Self {
        self.integrations = integrations;
        self
    }

    /// Returns the filesystem search.
    #[must_use]
    pub const fn spec(&self) -> &SearchSpec {
        &self.spec
    }
}

/// Runs application searches on behalf of one platform.
#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    platform: Platform,
    icons: IconResolver,
}

impl DiscoveryEngine {
    /// Creates an engine that leaves icon names unresolved.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            icons: IconResolver::default(),
        }
    }

    /// Uses `icons` to turn well-known icon names into URLs.
    #[must_use]
    pub fn with_icon_resolver(mut self, icons: IconResolver) -> Self {
        self.icons = icons;
        self
    }

    /// Returns the platform searches are normalised for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Runs `search` and returns its applications, newest version first.
    ///
    /// Hits with equal versions keep traversal order.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] when the search specification, the version
    /// expression, or a template is invalid.
    pub fn discover(&self, search: &ApplicationSearch) -> Result<Vec<Application>, DiscoveryError> {
        let matcher = PathMatcher::new(&search.spec, self.platform)?;
        let parser = VersionParser::new(search.version_expression.as_deref())?;
        let icon = search.icon.as_deref().map(|name| self.icons.resolve(name));

        let mut applications = matcher
            .find()
            .into_iter()
            .map(|path| {
                let version = parser.parse(&path).into_version();
                let names = render_names(search, &version)?;
                Ok(Application::new(names.identifier, path, version)
                    .with_label(names.label)
                    .with_variant(names.variant)
                    .with_icon(icon.clone())
                    .with_launch_arguments(search.launch_arguments.clone())
                    .with_description(search.description.clone())
                    .with_integrations(search.integrations.clone()))
            })
            .collect::<Result<Vec<_>, DiscoveryError>>()?;

        applications.sort_by(|left, right| right.version().cmp(left.version()));
        debug!(
            target: ENGINE_TARGET,
            search = %search.spec,
            discovered = applications.len(),
            "search complete"
        );
        Ok(applications)
    }

    /// Runs every search and merges the results into one catalog.
    ///
    /// Failing searches are logged and contribute nothing. The merged catalog
    /// is ordered newest version first; ties keep search order.
    pub fn discover_all<'a>(
        &self,
        searches: impl IntoIterator<Item = &'a ApplicationSearch>,
    ) -> ApplicationCatalog {
        let mut applications = Vec::new();
        for search in searches {
            match self.discover(search) {
                Ok(found) => applications.extend(found),
                Err(error) => warn!(
                    target: ENGINE_TARGET,
                    search = %search.spec,
                    %error,
                    "skipping application search"
                ),
            }
        }
        applications.sort_by(|left, right| right.version().cmp(left.version()));
        ApplicationCatalog::new(applications)
    }
}

struct RenderedNames {
    label: String,
    variant: String,
    identifier: String,
}

fn render_names(
    search: &ApplicationSearch,
    version: &LooseVersion,
) -> Result<RenderedNames, DiscoveryError> {
    let version_text = version.to_string();
    let values = TemplateValues::version(&version_text);

    let label = render(&search.label, values, "label")?;
    let mut variant = render(&search.variant, values, "variant")?;
    if !search.integrations.is_empty() {
        let groups: Vec<&str> = search.integrations.keys().map(String::as_str).collect();
        variant = format!("{variant} [{}]", groups.join(":"));
    }
    let identifier = render(&search.identifier, values.with_variant(&variant), "identifier")?;

    Ok(RenderedNames {
        label,
        variant,
        identifier,
    })
}

fn render(
    template: &Template,
    values: TemplateValues<'_>,
    field: &'static str,
) -> Result<String, DiscoveryError> {
    template
        .render(values)
        .map_err(|source| DiscoveryError::Template { field, source })
}

#[cfg(test)]
mod tests;
