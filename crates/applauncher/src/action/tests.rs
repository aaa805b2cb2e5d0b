//! Unit tests for launch actions.

use applauncher_discovery::{CatalogHandle, LooseVersion, Platform};
use applauncher_integrations::{
    DISCOVER_TOPIC, Event, EventResponse, InProcessBus, Subscription,
};
use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::environment::Environment;
use crate::error::LaunchError;
use crate::process::ProcessRequest;

mock! {
    Spawner {}
    impl ProcessSpawner for Spawner {
        fn spawn(&self, request: &ProcessRequest) -> Result<u32, LaunchError>;
    }
}

type TestAction = LaunchAction<Arc<InProcessBus>, MockSpawner>;

fn application(identifier: &str, label: &str, version: &str) -> Application {
    Application::new(
        identifier,
        format!("/opt/{identifier}/bin/app"),
        LooseVersion::parse(version).expect("version"),
    )
    .with_label(label)
    .with_variant(version)
}

fn catalog() -> ApplicationCatalog {
    let mut groups = IntegrationGroups::new();
    groups.insert(String::from("nuke-studio"), vec![String::from("ftrack-connect-nuke-studio")]);
    ApplicationCatalog::new(vec![
        application("nuke_13.2", "Nuke", "13.2"),
        application("hiero_13.2", "Hiero", "13.2").with_icon(Some(String::from("hiero"))),
        application("nukestudio_13.2", "NukeStudio", "13.2").with_integrations(groups),
    ])
}

fn config(context: Vec<Option<String>>) -> ActionConfig {
    ActionConfig {
        identifier: String::from("ftrack-connect-launch-nuke"),
        label: String::from("Nuke"),
        variant: None,
        context,
        priority: 10,
    }
}

fn action_with(bus: InProcessBus, spawner: MockSpawner, context: Vec<Option<String>>) -> TestAction {
    let launcher = Launcher::new(
        CatalogHandle::new(catalog()),
        Arc::new(bus),
        spawner,
        Platform::Linux,
    )
    .with_base_environment(Environment::new(Platform::Linux));
    LaunchAction::new(config(context), launcher)
        .expect("valid action")
        .with_host("render-07")
}

fn studio_provider() -> InProcessBus {
    let mut bus = InProcessBus::new();
    bus.subscribe(
        Subscription::new(DISCOVER_TOPIC, |_event: &mut Event| {
            Some(EventResponse::integration(
                IntegrationDescriptor::new("ftrack-connect-nuke-studio").with_version("2.0"),
            ))
        })
        .for_identifier("nukestudio_*"),
    );
    bus
}

fn task_selection() -> ActionEvent {
    ActionEvent::new(json!({"selection": [{"entityId": "42", "entityType": "Task"}]}))
}

#[fixture]
fn task_action() -> TestAction {
    action_with(InProcessBus::new(), MockSpawner::new(), vec![Some(String::from("task"))])
}

#[test]
fn empty_context_is_a_configuration_error() {
    let launcher = Launcher::new(
        CatalogHandle::new(catalog()),
        Arc::new(InProcessBus::new()),
        MockSpawner::new(),
        Platform::Linux,
    );
    let err = LaunchAction::new(config(Vec::new()), launcher).expect_err("empty context");
    assert_eq!(
        err,
        ActionError::EmptyContext {
            identifier: String::from("ftrack-connect-launch-nuke"),
        }
    );
}

#[rstest]
fn entity_type_matches_ignoring_case(task_action: TestAction) {
    assert!(task_action.validate_selection(&task_selection().selection()));
}

#[rstest]
fn other_entity_types_are_rejected(task_action: TestAction) {
    let selection = vec![SelectionEntity {
        entity_id: String::from("7"),
        entity_type: String::from("Shot"),
    }];
    assert!(!task_action.validate_selection(&selection));
}

#[rstest]
fn empty_selection_needs_null_context(task_action: TestAction) {
    assert!(!task_action.validate_selection(&[]));

    let open = action_with(InProcessBus::new(), MockSpawner::new(), vec![None]);
    assert!(open.validate_selection(&[]));
}

#[rstest]
fn invalid_selection_discovers_nothing(task_action: TestAction) {
    assert!(task_action.discover(&ActionEvent::new(json!({}))).is_none());
}

#[test]
fn discovers_items_sorted_by_label() {
    let action = action_with(studio_provider(), MockSpawner::new(), vec![Some(String::from("task"))]);

    let items = action.discover(&task_selection()).expect("valid selection");

    let labels: Vec<_> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, ["Hiero", "Nuke", "NukeStudio"]);

    let hiero = items.first().expect("hiero item");
    assert_eq!(hiero.action_identifier, "ftrack-connect-launch-nuke");
    assert_eq!(hiero.icon, "hiero");
    assert_eq!(hiero.variant.as_deref(), Some("13.2"));
    assert_eq!(hiero.application_identifier, "hiero_13.2");
    assert_eq!(hiero.host, "render-07");

    let nuke = items.get(1).expect("nuke item");
    assert_eq!(nuke.icon, DEFAULT_ICON);
}

#[rstest]
fn applications_with_missing_integrations_are_dropped(task_action: TestAction) {
    let items = task_action.discover(&task_selection()).expect("valid selection");
    let identifiers: Vec<_> = items
        .iter()
        .map(|item| item.application_identifier.as_str())
        .collect();
    assert_eq!(identifiers, ["hiero_13.2", "nuke_13.2"]);
}

#[test]
fn items_serialise_with_client_field_names() {
    let action = action_with(studio_provider(), MockSpawner::new(), vec![Some(String::from("task"))]);
    let items = action.discover(&task_selection()).expect("valid selection");
    let encoded = serde_json::to_value(items.last().expect("studio item")).expect("encodes");
    assert_eq!(encoded["actionIdentifier"], "ftrack-connect-launch-nuke");
    assert_eq!(encoded["applicationIdentifier"], "nukestudio_13.2");
    assert_eq!(
        encoded["integrations"]["nuke-studio"],
        json!(["ftrack-connect-nuke-studio"])
    );
}

#[test]
fn launch_passes_event_context_to_launcher() {
    let mut spawner = MockSpawner::new();
    spawner
        .expect_spawn()
        .withf(|request| {
            request.command.first().map(String::as_str) == Some("/opt/hiero_13.2/bin/app")
                && request.command.iter().any(|argument| argument == "--player")
        })
        .times(1)
        .returning(|_| Ok(101));
    let action = action_with(InProcessBus::new(), spawner, vec![Some(String::from("task"))]);
    let event = ActionEvent::new(json!({
        "applicationIdentifier": "hiero_*",
        "launchArguments": ["--player"],
        "selection": [{"entityId": "42", "entityType": "task"}],
    }))
    .with_source(json!({"user": {"username": "artist"}}));

    let result = action
        .launch(&event)
        .expect("names an application")
        .expect("valid selection");

    assert!(result.success);
    assert_eq!(result.message, "Hiero 13.2 application started.");
}

#[rstest]
fn launch_rejects_invalid_selection(task_action: TestAction) {
    let event = ActionEvent::new(json!({"applicationIdentifier": "nuke_13.2"}));
    assert_eq!(task_action.launch(&event).expect("no error"), None);
}

#[rstest]
fn launch_requires_application_identifier(task_action: TestAction) {
    let err = task_action.launch(&task_selection()).expect_err("missing identifier");
    assert!(matches!(err, ActionError::MissingApplication { .. }));
}

#[test]
fn event_context_includes_source() {
    let event = ActionEvent::new(json!({"selection": []})).with_source(json!({"id": "abc"}));
    assert_eq!(event.context(), json!({"selection": [], "source": {"id": "abc"}}));
}

#[test]
fn version_information_is_deduplicated() {
    let mut bus = InProcessBus::new();
    bus.subscribe(Subscription::new(DISCOVER_TOPIC, |_event: &mut Event| {
        Some(EventResponse::integration(
            IntegrationDescriptor::new("ftrack-connect-nuke").with_version("1.0"),
        ))
    }));
    let action = action_with(bus, MockSpawner::new(), vec![None]);

    let found = action.version_information();

    assert_eq!(found, [IntegrationDescriptor::new("ftrack-connect-nuke").with_version("1.0")]);
}

#[rstest]
fn debug_output_names_the_action(task_action: TestAction) {
    let rendered = format!("{task_action:?}");
    assert!(rendered.contains("ftrack-connect-launch-nuke"));
    assert!(rendered.contains("render-07"));
}

#[test]
fn host_name_is_never_empty() {
    assert!(!host_name().is_empty());
}
