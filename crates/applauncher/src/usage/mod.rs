//! Fire-and-forget reporting of integration usage.
//!
//! After an application starts, the launcher records which integrations
//! contributed to it. Delivery happens on a dedicated thread and every
//! failure is logged and dropped; a usage report never changes the outcome
//! of a launch. A short-lived process can still wait a bounded time for
//! deliveries in flight through [`PendingReports::wait`] before it exits.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use applauncher_discovery::Application;
use applauncher_integrations::IntegrationDescriptor;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::UsageError;

const USAGE_TARGET: &str = "applauncher::usage";

/// Name of the event recording integrations used by a launch.
pub const INTEGRATION_USAGE_EVENT: &str = "USED-CONNECT-INTEGRATION";

/// Server action that receives usage events.
pub const TRACK_USAGE_ACTION: &str = "_track_usage";

/// Name of the background delivery thread.
const REPORTER_THREAD: &str = "applauncher-usage";

/// Interval between checks on deliveries in flight.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One integration used by one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageMetadata {
    /// Lowercased application label joined to its version with `_`.
    pub application: String,
    /// Lowercased integration name.
    pub name: String,
    /// Integration version, or `Unknown`.
    pub version: String,
    /// Description of the host operating system.
    pub os: String,
}

impl UsageMetadata {
    /// Describes `integration` as used by `application`.
    #[must_use]
    pub fn new(application: &Application, integration: &IntegrationDescriptor, os: &str) -> Self {
        Self {
            application: format!(
                "{}_{}",
                application.label().to_lowercase(),
                application.version()
            ),
            name: integration.name().to_lowercase(),
            version: integration.version_label(),
            os: os.to_owned(),
        }
    }
}

/// A named usage event with one metadata entry per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    name: String,
    metadata: Vec<UsageMetadata>,
}

impl UsageEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(name: impl Into<String>, metadata: Vec<UsageMetadata>) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    /// Records the integrations that contributed to a launch of `application`.
    #[must_use]
    pub fn integrations_used(application: &Application, integrations: &[IntegrationDescriptor]) -> Self {
        let os = os_description();
        let metadata = integrations
            .iter()
            .map(|integration| UsageMetadata::new(application, integration, &os))
            .collect();
        Self::new(INTEGRATION_USAGE_EVENT, metadata)
    }

    /// Returns the event name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the metadata entries.
    #[must_use]
    pub fn metadata(&self) -> &[UsageMetadata] {
        &self.metadata
    }

    /// Returns the wire payload: one tracking call per metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Encode`] when a metadata entry cannot be encoded.
    pub fn payload(&self) -> Result<Value, UsageError> {
        let calls = self
            .metadata
            .iter()
            .map(|metadata| -> Result<Value, UsageError> {
                let encoded = serde_json::to_value(metadata).map_err(|source| UsageError::Encode {
                    name: self.name.clone(),
                    source,
                })?;
                Ok(json!({
                    "action": TRACK_USAGE_ACTION,
                    "data": {
                        "type": "event",
                        "name": self.name,
                        "metadata": encoded,
                    },
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(calls))
    }
}

/// Returns a short description of the host, such as `linux-x86_64`.
#[must_use]
pub fn os_description() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Delivers usage events.
pub trait UsageReporter: Send + Sync {
    /// Sends `event`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] when the event cannot be encoded or delivered.
    fn report(&self, event: &UsageEvent) -> Result<(), UsageError>;
}

impl<R: UsageReporter + ?Sized> UsageReporter for Arc<R> {
    fn report(&self, event: &UsageEvent) -> Result<(), UsageError> {
        (**self).report(event)
    }
}

/// Reporter that writes the wire payload to the log.
///
/// Used when no server session is available to receive usage events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl UsageReporter for LogReporter {
    fn report(&self, event: &UsageEvent) -> Result<(), UsageError> {
        let payload = event.payload()?;
        info!(target: USAGE_TARGET, event = event.name(), %payload, "usage event");
        Ok(())
    }
}

/// Sends `event` through `reporter` on a background thread.
///
/// Failures, including failure to start the thread, are logged. The handle
/// is returned so tests can wait for delivery; callers normally drop it.
pub fn report_in_background(
    reporter: Arc<dyn UsageReporter>,
    event: UsageEvent,
) -> Option<JoinHandle<()>> {
    let name = event.name.clone();
    let spawned = thread::Builder::new()
        .name(REPORTER_THREAD.to_owned())
        .spawn(move || {
            if let Err(error) = reporter.report(&event) {
                warn!(target: USAGE_TARGET, %error, "usage event dropped");
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(error) => {
            warn!(target: USAGE_TARGET, event = %name, %error, "usage reporter thread failed to start");
            None
        }
    }
}

/// Usage deliveries started but not yet known to have finished.
#[derive(Debug, Default)]
pub struct PendingReports {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PendingReports {
    /// Tracks a delivery thread.
    pub fn track(&self, handle: JoinHandle<()>) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Returns the number of tracked deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no deliveries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits up to `timeout` for tracked deliveries to finish.
    ///
    /// Deliveries still running at the deadline are abandoned and stay
    /// detached. Returns how many were abandoned.
    pub fn wait(&self, timeout: Duration) -> usize {
        let deadline = Instant::now().checked_add(timeout);
        let mut pending = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(JoinHandle::is_finished);
            for handle in finished {
                if handle.join().is_err() {
                    warn!(target: USAGE_TARGET, "usage reporter thread panicked");
                }
            }
            pending = running;
            let expired = deadline.is_none_or(|deadline| Instant::now() >= deadline);
            if pending.is_empty() || expired {
                break;
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
        if !pending.is_empty() {
            warn!(
                target: USAGE_TARGET,
                abandoned = pending.len(),
                "usage events still in flight"
            );
        }
        pending.len()
    }
}

#[cfg(test)]
mod tests;
