//! Builds launch actions from application documents.
//!
//! Documents are grouped by identifier. Every document in a group
//! contributes one search for the current platform, and the group's merged
//! catalog backs a single [`LaunchAction`]. A document without an entry for
//! the current platform, or with an invalid entry, is logged and skipped
//! while the rest of its group is still discovered.

use applauncher_config::{ApplicationDocument, Config, DocumentGroup};
use applauncher_discovery::{
    ApplicationSearch, CatalogHandle, DiscoveryEngine, IconResolver, Platform, SearchSpec,
    Template,
};
use tracing::{debug, error, info, warn};

use crate::action::{ActionConfig, LaunchAction};
use crate::environment::ConnectionSettings;
use crate::error::BootstrapError;
use crate::launcher::Launcher;

const BOOTSTRAP_TARGET: &str = "applauncher::bootstrap";

/// Returns the connection variables `config` exports to launched
/// applications.
#[must_use]
pub fn connection_settings(config: &Config) -> ConnectionSettings {
    ConnectionSettings {
        event_server: config.server_url_text(),
        api_key: config.api_key.clone(),
        dependency_path: config.dependency_path.clone(),
    }
}

/// Returns a discovery engine for `platform` resolving icons against the
/// configured server.
#[must_use]
pub fn discovery_engine(config: &Config, platform: Platform) -> DiscoveryEngine {
    DiscoveryEngine::new(platform).with_icon_resolver(IconResolver::new(config.server_url_text()))
}

/// Converts `document` into a search for `platform`.
///
/// Returns `Ok(None)` when the document has no entry for `platform`.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the entry has no segments or a name
/// template is malformed.
pub fn search_for(
    document: &ApplicationDocument,
    platform: Platform,
) -> Result<Option<ApplicationSearch>, BootstrapError> {
    let Some(entry) = document.search_path_for(platform) else {
        return Ok(None);
    };
    let spec = SearchSpec::from_segments(&entry.segments()).ok_or_else(|| {
        BootstrapError::EmptySearchPath {
            identifier: document.identifier.clone(),
            platform,
        }
    })?;

    let template = |field: &'static str, source: &str| {
        Template::parse(source).map_err(|error| BootstrapError::Template {
            identifier: document.identifier.clone(),
            field,
            source: error,
        })
    };
    let label = template("label", &document.label)?;
    let identifier = template("applicationIdentifier", &document.application_identifier)?;
    let variant = template("variant", &document.variant)?;

    let mut search = ApplicationSearch::new(spec, label, identifier)
        .with_variant(variant)
        .with_icon(document.icon.clone())
        .with_launch_arguments(entry.launch_arguments.clone())
        .with_description(document.description.clone())
        .with_integrations(document.integration_groups());
    if let Some(expression) = entry.version_expression.as_deref() {
        search = search.with_version_expression(expression);
    }
    Ok(Some(search))
}

/// Returns the searches of every usable document in `group`.
#[must_use]
pub fn searches_for(group: &DocumentGroup, platform: Platform) -> Vec<ApplicationSearch> {
    group
        .documents
        .iter()
        .filter_map(|document| match search_for(document, platform) {
            Ok(Some(search)) => Some(search),
            Ok(None) => {
                info!(
                    target: BOOTSTRAP_TARGET,
                    identifier = %document.identifier,
                    label = %document.label,
                    %platform,
                    "document has no search path for this platform"
                );
                None
            }
            Err(error) => {
                warn!(target: BOOTSTRAP_TARGET, %error, "skipping application document");
                None
            }
        })
        .collect()
}

/// Returns the action settings of `group`, taken from its primary document.
#[must_use]
pub fn action_config(group: &DocumentGroup) -> Option<ActionConfig> {
    let primary = group.primary()?;
    Some(ActionConfig {
        identifier: group.identifier.clone(),
        label: primary.label.clone(),
        variant: Some(primary.variant.clone()).filter(|variant| !variant.is_empty()),
        context: primary.context.clone(),
        priority: primary.priority(),
    })
}

/// Everything shared by the actions built from one configuration load.
#[derive(Debug, Clone)]
pub struct Bootstrap<'a, B, S> {
    engine: &'a DiscoveryEngine,
    bus: B,
    spawner: S,
    connection: ConnectionSettings,
}

impl<'a, B: Clone, S: Clone> Bootstrap<'a, B, S> {
    /// Creates a bootstrap publishing on `bus` and starting processes through
    /// `spawner`.
    #[must_use]
    pub const fn new(
        engine: &'a DiscoveryEngine,
        bus: B,
        spawner: S,
        connection: ConnectionSettings,
    ) -> Self {
        Self {
            engine,
            bus,
            spawner,
            connection,
        }
    }

    /// Discovers the catalog of every group and wraps each in an action.
    ///
    /// Actions are ordered by priority, lowest first; equal priorities keep
    /// group order. Groups whose primary document declares no selection
    /// context are logged and skipped.
    #[must_use]
    pub fn discover_actions(&self, groups: &[DocumentGroup]) -> Vec<LaunchAction<B, S>> {
        let mut actions: Vec<LaunchAction<B, S>> = groups
            .iter()
            .filter_map(|group| self.action_for(group))
            .collect();
        actions.sort_by_key(|action| action.config().priority);
        actions
    }

    /// Rediscovers the catalog of every action from `groups`.
    ///
    /// Actions are matched to groups by identifier; an action whose group is
    /// gone keeps its current catalog. Returns the number of actions
    /// refreshed.
    pub fn refresh_actions(
        &self,
        actions: &[LaunchAction<B, S>],
        groups: &[DocumentGroup],
    ) -> usize {
        let mut refreshed = 0;
        for action in actions {
            let Some(group) = groups
                .iter()
                .find(|group| group.identifier == action.config().identifier)
            else {
                warn!(
                    target: BOOTSTRAP_TARGET,
                    action = %action.config().identifier,
                    "no configuration left for action; keeping its catalog"
                );
                continue;
            };
            action.refresh(self.engine, &searches_for(group, self.engine.platform()));
            refreshed += 1;
        }
        refreshed
    }

    fn action_for(&self, group: &DocumentGroup) -> Option<LaunchAction<B, S>> {
        let config = action_config(group)?;
        let searches = searches_for(group, self.engine.platform());
        let catalog = self.engine.discover_all(&searches);
        debug!(
            target: BOOTSTRAP_TARGET,
            action = %group.identifier,
            applications = catalog.len(),
            "catalog discovered"
        );

        let launcher = Launcher::new(
            CatalogHandle::new(catalog),
            self.bus.clone(),
            self.spawner.clone(),
            self.engine.platform(),
        )
        .with_connection(self.connection.clone());
        match LaunchAction::new(config, launcher) {
            Ok(action) => Some(action),
            Err(error) => {
                error!(target: BOOTSTRAP_TARGET, %error, "skipping launch action");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
