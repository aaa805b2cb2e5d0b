//! Synchronous publish-and-collect transport for integration events.
//!
//! The [`EventBus`] trait is the seam between the launcher and whatever hub
//! integration providers live on. Publishing blocks until every subscriber has
//! answered (or the transport's own timeout elapses) and returns the collected
//! responses in delivery order.
//!
//! [`InProcessBus`] is the built-in implementation: subscribers are closures
//! registered with a topic and optional application filters, run in priority
//! order on the publishing thread.

use std::fmt;
use std::sync::Arc;

use applauncher_discovery::LooseVersion;
use tracing::debug;

use crate::error::IntegrationError;
use crate::protocol::{Event, EventResponse};

/// Tracing target for event delivery.
const BUS_TARGET: &str = "applauncher_integrations::bus";

/// Blocking request/response transport for integration events.
///
/// Implementations deliver `event` to every interested subscriber. Subscribers
/// may modify the event data, and those modifications must be visible in
/// `event` when `publish` returns.
pub trait EventBus {
    /// Publishes `event` and collects the subscribers' responses.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationError`] when the transport fails.
    fn publish(&self, event: &mut Event) -> Result<Vec<EventResponse>, IntegrationError>;
}

impl<B: EventBus + ?Sized> EventBus for Arc<B> {
    fn publish(&self, event: &mut Event) -> Result<Vec<EventResponse>, IntegrationError> {
        (**self).publish(event)
    }
}

impl<B: EventBus + ?Sized> EventBus for &B {
    fn publish(&self, event: &mut Event) -> Result<Vec<EventResponse>, IntegrationError> {
        (**self).publish(event)
    }
}

/// Callback invoked for each matching event.
pub type Handler = Box<dyn Fn(&mut Event) -> Option<EventResponse> + Send + Sync>;

/// Priority given to subscriptions that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A subscriber registration on an [`InProcessBus`].
///
/// # Example
///
/// ```
/// use applauncher_integrations::{
///     EventResponse, IntegrationDescriptor, Subscription, DISCOVER_TOPIC,
/// };
///
/// let subscription = Subscription::new(DISCOVER_TOPIC, |_event| {
///     Some(EventResponse::integration(IntegrationDescriptor::new("ftrack-connect-nuke")))
/// })
/// .for_identifier("nuke_*")
/// .with_minimum_version("12.0");
/// assert_eq!(subscription.topic(), DISCOVER_TOPIC);
/// ```
pub struct Subscription {
    topic: String,
    identifier: Option<String>,
    minimum_version: Option<LooseVersion>,
    priority: i32,
    handler: Handler,
}

impl Subscription {
    /// Creates a subscription to every event on `topic`.
    #[must_use]
    pub fn new<F>(topic: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Event) -> Option<EventResponse> + Send + Sync + 'static,
    {
        Self {
            topic: topic.into(),
            identifier: None,
            minimum_version: None,
            priority: DEFAULT_PRIORITY,
            handler: Box::new(handler),
        }
    }

    /// Restricts delivery to one application identifier.
    ///
    /// A trailing `*` turns the identifier into a prefix.
    #[must_use]
    pub fn for_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Restricts delivery to applications at or above `version`.
    ///
    /// Unparsable versions leave the subscription unrestricted.
    #[must_use]
    pub fn with_minimum_version(mut self, version: &str) -> Self {
        self.minimum_version = LooseVersion::parse(version);
        self
    }

    /// Sets the delivery priority; lower values run first.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the subscribed topic.
    #[must_use]
    pub const fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// Returns the delivery priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    fn accepts(&self, event: &Event) -> bool {
        if self.topic != event.topic() {
            return false;
        }
        if let Some(filter) = &self.identifier {
            let Some(identifier) = event.application_identifier() else {
                return false;
            };
            let matched = match filter.strip_suffix('*') {
                Some(prefix) => identifier.starts_with(prefix),
                None => identifier == filter,
            };
            if !matched {
                return false;
            }
        }
        if let Some(minimum) = &self.minimum_version {
            let version = event
                .application_version()
                .and_then(LooseVersion::parse)
                .unwrap_or_else(LooseVersion::lowest);
            if version < *minimum {
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("identifier", &self.identifier)
            .field("minimum_version", &self.minimum_version)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Event bus delivering events to closures on the publishing thread.
#[derive(Debug, Default)]
pub struct InProcessBus {
    subscriptions: Vec<Subscription>,
}

impl InProcessBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Registers `subscription`.
    ///
    /// Subscriptions are kept in priority order; equal priorities keep
    /// registration order.
    pub fn subscribe(&mut self, subscription: Subscription) {
        let position = self
            .subscriptions
            .partition_point(|existing| existing.priority <= subscription.priority);
        self.subscriptions.insert(position, subscription);
    }

    /// Returns the number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` when nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl EventBus for InProcessBus {
    fn publish(&self, event: &mut Event) -> Result<Vec<EventResponse>, IntegrationError> {
        let mut responses = Vec::new();
        for subscription in &self.subscriptions {
            if !subscription.accepts(event) {
                continue;
            }
            if let Some(response) = (subscription.handler)(event) {
                responses.push(response);
            }
        }
        debug!(
            target: BUS_TARGET,
            topic = event.topic(),
            responses = responses.len(),
            "event published"
        );
        Ok(responses)
    }
}
