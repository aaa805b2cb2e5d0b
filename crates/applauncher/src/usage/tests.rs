//! Unit tests for usage reporting.

use std::sync::Mutex;

use applauncher_discovery::LooseVersion;
use mockall::mock;
use rstest::{fixture, rstest};

use super::*;

mock! {
    Reporter {}
    impl UsageReporter for Reporter {
        fn report(&self, event: &UsageEvent) -> Result<(), UsageError>;
    }
}

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<UsageEvent>>,
}

impl UsageReporter for RecordingReporter {
    fn report(&self, event: &UsageEvent) -> Result<(), UsageError> {
        self.events
            .lock()
            .expect("reporter lock")
            .push(event.clone());
        Ok(())
    }
}

#[fixture]
fn maya() -> Application {
    Application::new(
        "maya_2024",
        "/usr/autodesk/maya2024/bin/maya",
        LooseVersion::parse("2024").expect("version"),
    )
    .with_label("Maya")
}

#[fixture]
fn integrations() -> Vec<IntegrationDescriptor> {
    vec![
        IntegrationDescriptor::new("ftrack-connect-Maya").with_version("1.4.0"),
        IntegrationDescriptor::new("Pipeline"),
    ]
}

#[rstest]
fn metadata_is_lowercased_and_versioned(
    maya: Application,
    integrations: Vec<IntegrationDescriptor>,
) {
    let event = UsageEvent::integrations_used(&maya, &integrations);

    assert_eq!(event.name(), INTEGRATION_USAGE_EVENT);
    let first = event.metadata().first().expect("first entry");
    assert_eq!(first.application, "maya_2024");
    assert_eq!(first.name, "ftrack-connect-maya");
    assert_eq!(first.version, "1.4.0");
    assert_eq!(first.os, os_description());

    let second = event.metadata().get(1).expect("second entry");
    assert_eq!(second.name, "pipeline");
    assert_eq!(second.version, "Unknown");
}

#[rstest]
fn payload_holds_one_call_per_integration(
    maya: Application,
    integrations: Vec<IntegrationDescriptor>,
) {
    let payload = UsageEvent::integrations_used(&maya, &integrations)
        .payload()
        .expect("payload encodes");

    let calls = payload.as_array().expect("array payload");
    assert_eq!(calls.len(), 2);
    let call = calls.first().expect("first call");
    assert_eq!(call["action"], TRACK_USAGE_ACTION);
    assert_eq!(call["data"]["type"], "event");
    assert_eq!(call["data"]["name"], INTEGRATION_USAGE_EVENT);
    assert_eq!(call["data"]["metadata"]["name"], "ftrack-connect-maya");
}

#[rstest]
fn background_delivery_reaches_reporter(
    maya: Application,
    integrations: Vec<IntegrationDescriptor>,
) {
    let reporter = Arc::new(RecordingReporter::default());
    let event = UsageEvent::integrations_used(&maya, &integrations);

    let handle = report_in_background(reporter.clone(), event.clone()).expect("thread starts");
    handle.join().expect("reporter thread joins");

    let events = reporter.events.lock().expect("reporter lock");
    assert_eq!(events.as_slice(), [event]);
}

#[rstest]
fn delivery_failures_are_swallowed(maya: Application) {
    let mut reporter = MockReporter::new();
    reporter.expect_report().times(1).returning(|event| {
        Err(UsageError::Delivery {
            name: event.name().to_owned(),
            message: String::from("server unavailable"),
        })
    });

    let event = UsageEvent::integrations_used(&maya, &[]);
    let handle = report_in_background(Arc::new(reporter), event).expect("thread starts");
    assert!(handle.join().is_ok());
}

#[test]
fn log_reporter_accepts_events() {
    let event = UsageEvent::new(INTEGRATION_USAGE_EVENT, Vec::new());
    assert!(LogReporter.report(&event).is_ok());
}

#[rstest]
fn pending_reports_are_delivered_before_wait_returns(
    maya: Application,
    integrations: Vec<IntegrationDescriptor>,
) {
    let reporter = Arc::new(RecordingReporter::default());
    let event = UsageEvent::integrations_used(&maya, &integrations);
    let pending = PendingReports::default();

    let handle = report_in_background(reporter.clone(), event.clone()).expect("thread starts");
    pending.track(handle);
    assert_eq!(pending.len(), 1);

    assert_eq!(pending.wait(Duration::from_secs(5)), 0);
    assert!(pending.is_empty());
    let events = reporter.events.lock().expect("reporter lock");
    assert_eq!(events.as_slice(), [event]);
}

#[test]
fn wait_abandons_reports_still_running_at_the_deadline() {
    let (release, blocked) = std::sync::mpsc::channel::<()>();
    let pending = PendingReports::default();
    pending.track(thread::spawn(move || {
        let _released = blocked.recv();
    }));

    assert_eq!(pending.wait(Duration::from_millis(20)), 1);
    assert!(pending.is_empty());
    release.send(()).expect("worker still listening");
}

#[test]
fn waiting_with_nothing_pending_returns_immediately() {
    assert_eq!(PendingReports::default().wait(Duration::ZERO), 0);
}
