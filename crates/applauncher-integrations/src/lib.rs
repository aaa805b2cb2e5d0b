//! Integration negotiation for launched applications.
//!
//! Integration providers are external plugins that contribute environment
//! variables and command-line arguments to an application launch. They live
//! behind an [`EventBus`]: the launcher publishes an [`Event`] describing the
//! application, and every interested provider answers with an
//! [`EventResponse`] carrying an [`IntegrationDescriptor`].
//!
//! Applications declare the providers they need as named groups. The
//! [`IntegrationNegotiator`] publishes a discover event, keeps the enabled
//! descriptors, and reports which groups lack at least one provider so callers
//! can hide or degrade the affected launch options.
//!
//! # Example
//!
//! ```
//! use applauncher_discovery::{Application, IntegrationGroups, LooseVersion, Platform};
//! use applauncher_integrations::{
//!     EventResponse, InProcessBus, IntegrationDescriptor, IntegrationNegotiator, Subscription,
//!     DISCOVER_TOPIC,
//! };
//!
//! let mut bus = InProcessBus::new();
//! bus.subscribe(Subscription::new(DISCOVER_TOPIC, |_event| {
//!     Some(EventResponse::integration(IntegrationDescriptor::new("ftrack-connect-maya")))
//! }));
//!
//! let mut groups = IntegrationGroups::new();
//! groups.insert("ftrack".into(), vec!["ftrack-connect-maya".into()]);
//! let maya = Application::new("maya_2023", "/usr/autodesk/maya2023/bin/maya", LooseVersion::default())
//!     .with_integrations(groups);
//!
//! let negotiator = IntegrationNegotiator::new(bus, Platform::Linux);
//! let negotiation = negotiator.negotiate(&maya, &serde_json::Value::Null);
//! assert!(negotiation.is_satisfied());
//! ```

pub mod bus;
pub mod error;
pub mod negotiator;
pub mod protocol;

#[cfg(test)]
mod tests;

pub use self::bus::{EventBus, Handler, InProcessBus, Subscription};
pub use self::error::IntegrationError;
pub use self::negotiator::{IntegrationNegotiator, Negotiation};
pub use self::protocol::{
    DISCOVER_TOPIC, DiscoverPayload, Event, EventResponse, IntegrationDescriptor, LAUNCH_TOPIC,
    LaunchOptions, LaunchPayload,
};
