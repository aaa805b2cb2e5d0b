//! Domain errors raised while exchanging integration events.
//!
//! Callers of the negotiator never see these errors: a failed round trip is
//! treated as "no providers responded". They surface only to code that talks
//! to an [`EventBus`](crate::EventBus) directly.

use thiserror::Error;

/// Errors arising from event construction or delivery.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Event data could not be serialised to JSON.
    #[error("failed to serialise '{topic}' event data: {source}")]
    Serialize {
        /// Topic of the event being built.
        topic: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Event data did not have the expected shape after publishing.
    #[error("'{topic}' event data is malformed: {source}")]
    MalformedEvent {
        /// Topic of the event being read.
        topic: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The transport carrying the event failed.
    #[error("event transport failed for '{topic}': {message}")]
    Transport {
        /// Topic of the event being published.
        topic: String,
        /// Human-readable failure description.
        message: String,
    },
}
