//! Unit tests for event payloads.

use applauncher_discovery::LooseVersion;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn application() -> Application {
    Application::new(
        "nuke_13.2v4",
        "/usr/local/Nuke13.2v4/Nuke13.2",
        LooseVersion::parse("13.2v4").expect("valid version"),
    )
    .with_label("Nuke")
}

#[rstest]
fn discover_event_carries_application_context_and_platform(application: Application) {
    let context = json!({"selection": []});
    let event = Event::discover(&DiscoverPayload {
        application: &application,
        context: &context,
        platform: Platform::Linux,
    })
    .expect("serialisable payload");

    assert_eq!(event.topic(), DISCOVER_TOPIC);
    assert_eq!(event.application_identifier(), Some("nuke_13.2v4"));
    assert_eq!(event.application_version(), Some("13.2v4"));
    assert_eq!(event.data()["platform"], json!("linux"));
    assert_eq!(event.data()["context"], context);
}

#[rstest]
fn launch_event_has_empty_integration_placeholder(application: Application) {
    let payload = LaunchPayload::new(
        vec![String::from("/usr/local/Nuke13.2v4/Nuke13.2")],
        LaunchOptions::default(),
        application,
        json!({}),
        Platform::Linux,
    );
    let event = Event::launch(&payload).expect("serialisable payload");

    assert_eq!(event.topic(), LAUNCH_TOPIC);
    assert_eq!(
        event.data()["integration"],
        json!({"name": null, "version": null, "env": {}, "launch_arguments": []})
    );
}

#[rstest]
fn subscriber_edits_are_read_back(application: Application) {
    let payload = LaunchPayload::new(
        vec![String::from("/usr/local/Nuke13.2v4/Nuke13.2")],
        LaunchOptions::default(),
        application,
        json!({}),
        Platform::Linux,
    );
    let mut event = Event::launch(&payload).expect("serialisable payload");
    event.data_mut()["command"] = json!(["/usr/bin/wrapper", "--nukex"]);
    event.data_mut()["options"]["cwd"] = json!("/tmp");

    let read_back = event.to_launch_payload().expect("well-formed payload");
    assert_eq!(read_back.command, ["/usr/bin/wrapper", "--nukex"]);
    assert_eq!(read_back.options.cwd, Some(PathBuf::from("/tmp")));
}

#[rstest]
fn malformed_launch_data_is_reported(application: Application) {
    let payload = LaunchPayload::new(
        Vec::new(),
        LaunchOptions::default(),
        application,
        json!({}),
        Platform::Linux,
    );
    let mut event = Event::launch(&payload).expect("serialisable payload");
    event.data_mut()["command"] = json!("not a list");

    let err = event.to_launch_payload().expect_err("command must be a list");
    assert!(matches!(err, IntegrationError::MalformedEvent { .. }));
}

#[rstest]
#[case::missing(json!({"name": "a"}), "Unknown")]
#[case::null(json!({"name": "a", "version": null}), "Unknown")]
#[case::text(json!({"name": "a", "version": "2.1"}), "2.1")]
#[case::number(json!({"name": "a", "version": 3}), "3")]
fn version_label_tolerates_any_shape(#[case] raw: Value, #[case] expected: &str) {
    let descriptor: IntegrationDescriptor = serde_json::from_value(raw).expect("valid descriptor");
    assert_eq!(descriptor.version_label(), expected);
}

#[test]
fn responses_without_integration_deserialise() {
    let response: EventResponse = serde_json::from_value(json!({})).expect("valid response");
    assert!(response.descriptor().is_none());
}
