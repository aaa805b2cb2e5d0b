//! Decides which integration groups an application can satisfy.
//!
//! The [`IntegrationNegotiator`] publishes a discover event for one
//! application and collects the providers that answer. A required group is
//! satisfied only when every provider it names answered without opting out.
//! Negotiation never fails: a transport error is logged and treated as if no
//! provider had answered, which leaves every non-empty group unsatisfied.

use std::collections::HashSet;

use applauncher_discovery::application::IntegrationGroups;
use applauncher_discovery::{Application, Platform};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bus::EventBus;
use crate::protocol::{DiscoverPayload, Event, EventResponse, IntegrationDescriptor};

/// Tracing target for negotiation.
const NEGOTIATOR_TARGET: &str = "applauncher_integrations::negotiator";

/// Outcome of negotiating one application's integrations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Negotiation {
    discovered: Vec<IntegrationDescriptor>,
    unsatisfied: Vec<String>,
}

impl Negotiation {
    /// Evaluates `required` against the providers in `discovered`.
    #[must_use]
    pub fn evaluate(required: &IntegrationGroups, discovered: Vec<IntegrationDescriptor>) -> Self {
        let names: HashSet<&str> = discovered.iter().map(IntegrationDescriptor::name).collect();
        let unsatisfied = unsatisfied_groups(required, &names);
        Self {
            discovered,
            unsatisfied,
        }
    }

    /// Returns the enabled providers that answered, in response order.
    #[must_use]
    pub fn discovered(&self) -> &[IntegrationDescriptor] {
        &self.discovered
    }

    /// Returns the names of groups missing at least one provider.
    #[must_use]
    pub fn unsatisfied(&self) -> &[String] {
        &self.unsatisfied
    }

    /// Returns `true` when every required group is satisfied.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    /// Consumes the outcome, returning the discovered providers.
    #[must_use]
    pub fn into_discovered(self) -> Vec<IntegrationDescriptor> {
        self.discovered
    }
}

/// Returns the groups in `required` naming a provider absent from
/// `discovered`, in declaration order.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
///
/// use applauncher_discovery::IntegrationGroups;
/// use applauncher_integrations::negotiator::unsatisfied_groups;
///
/// let mut required = IntegrationGroups::new();
/// required.insert("a".into(), vec!["p1".into(), "p2".into()]);
///
/// assert_eq!(unsatisfied_groups(&required, &HashSet::from(["p1"])), ["a"]);
/// assert!(unsatisfied_groups(&required, &HashSet::from(["p1", "p2"])).is_empty());
/// ```
#[must_use]
pub fn unsatisfied_groups(required: &IntegrationGroups, discovered: &HashSet<&str>) -> Vec<String> {
    required
        .iter()
        .filter(|(_, providers)| {
            providers
                .iter()
                .any(|provider| !discovered.contains(provider.as_str()))
        })
        .map(|(group, _)| group.clone())
        .collect()
}

/// Keeps the enabled integrations carried by `responses`.
#[must_use]
pub fn enabled_integrations(responses: Vec<EventResponse>) -> Vec<IntegrationDescriptor> {
    responses
        .into_iter()
        .filter_map(EventResponse::into_descriptor)
        .filter(|descriptor| !descriptor.is_disabled())
        .collect()
}

/// Negotiates integrations over an [`EventBus`].
#[derive(Debug, Clone)]
pub struct IntegrationNegotiator<B> {
    bus: B,
    platform: Platform,
}

impl<B> IntegrationNegotiator<B> {
    /// Creates a negotiator publishing on `bus` for `platform`.
    #[must_use]
    pub const fn new(bus: B, platform: Platform) -> Self {
        Self { bus, platform }
    }

    /// Returns the underlying bus.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }
}

impl<B: EventBus> IntegrationNegotiator<B> {
    /// Negotiates the integrations required by `application`.
    ///
    /// `context` is forwarded to providers unchanged.
    #[must_use]
    pub fn negotiate(&self, application: &Application, context: &Value) -> Negotiation {
        let responses = self.collect(application, context);
        let negotiation =
            Negotiation::evaluate(application.integrations(), enabled_integrations(responses));
        if !negotiation.is_satisfied() {
            debug!(
                target: NEGOTIATOR_TARGET,
                application = application.identifier(),
                unsatisfied = ?negotiation.unsatisfied(),
                "integration groups unsatisfied"
            );
        }
        negotiation
    }

    fn collect(&self, application: &Application, context: &Value) -> Vec<EventResponse> {
        let payload = DiscoverPayload {
            application,
            context,
            platform: self.platform,
        };
        let published =
            Event::discover(&payload).and_then(|mut event| self.bus.publish(&mut event));
        match published {
            Ok(responses) => responses,
            Err(error) => {
                warn!(
                    target: NEGOTIATOR_TARGET,
                    application = application.identifier(),
                    %error,
                    "integration discovery failed; assuming no providers"
                );
                Vec::new()
            }
        }
    }
}
