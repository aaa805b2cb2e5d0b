//! Unit tests for building actions from documents.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use applauncher_config::group_documents;
use applauncher_discovery::ApplicationCatalog;
use applauncher_integrations::InProcessBus;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::*;
use crate::process::DetachedSpawner;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, b"").expect("write fixture file");
}

#[fixture]
fn install_root() -> TempDir {
    let temp = TempDir::new().expect("temporary directory");
    for version in ["Nuke13.2v4", "Nuke14.0v1"] {
        touch(&temp.path().join(version).join("Nuke"));
    }
    touch(&temp.path().join("Hiero13.2v4").join("Hiero"));
    temp
}

fn current_platform_entry(entry: Value) -> Value {
    let mut search_path = serde_json::Map::new();
    search_path.insert(Platform::current().as_str().to_owned(), entry);
    Value::Object(search_path)
}

fn document(root: &Path, identifier: &str, label: &str, folder: &str, extra: Value) -> ApplicationDocument {
    let mut value = json!({
        "identifier": identifier,
        "applicationIdentifier": format!("{}_{{variant}}", label.to_lowercase()),
        "label": label,
        "variant": "{version}",
        "context": ["Task"],
        "search_path": current_platform_entry(json!({
            "prefix": [root.to_string_lossy()],
            "expression": [format!("{folder}.*"), format!("{folder}$")],
            "version_expression": format!("{folder}(?P<version>[\\d.v]+)")
        }))
    });
    if let (Value::Object(target), Value::Object(additions)) = (&mut value, extra) {
        target.extend(additions);
    }
    serde_json::from_value(value).expect("valid document")
}

fn bootstrap(engine: &DiscoveryEngine) -> Bootstrap<'_, Arc<InProcessBus>, DetachedSpawner> {
    Bootstrap::new(
        engine,
        Arc::new(InProcessBus::new()),
        DetachedSpawner,
        ConnectionSettings::default(),
    )
}

#[rstest]
fn groups_share_one_catalog(install_root: TempDir) {
    let root = install_root.path();
    let groups = group_documents(vec![
        document(root, "launch-nuke", "Nuke", "Nuke", json!({})),
        document(root, "launch-nuke", "Hiero", "Hiero", json!({})),
    ]);
    let engine = DiscoveryEngine::new(Platform::current());

    let actions = bootstrap(&engine).discover_actions(&groups);

    assert_eq!(actions.len(), 1);
    let action = actions.first().expect("one action");
    assert_eq!(action.config().identifier, "launch-nuke");
    assert_eq!(action.config().label, "Hiero");
    let identifiers: Vec<_> = action
        .catalog()
        .iter()
        .map(|application| application.identifier().to_owned())
        .collect();
    assert_eq!(identifiers, ["nuke_14.0v1", "nuke_13.2v4", "hiero_13.2v4"]);
}

#[rstest]
fn actions_are_ordered_by_priority(install_root: TempDir) {
    let root = install_root.path();
    let groups = group_documents(vec![
        document(root, "launch-nuke", "Nuke", "Nuke", json!({})),
        document(root, "launch-hiero", "Hiero", "Hiero", json!({"priority": 5})),
    ]);
    let engine = DiscoveryEngine::new(Platform::current());

    let actions = bootstrap(&engine).discover_actions(&groups);

    let order: Vec<_> = actions
        .iter()
        .map(|action| action.config().identifier.as_str())
        .collect();
    assert_eq!(order, ["launch-hiero", "launch-nuke"]);
    assert_eq!(
        actions.last().map(|action| action.config().priority),
        Some(i64::MAX)
    );
}

#[rstest]
fn actions_without_context_are_skipped(install_root: TempDir) {
    let groups = group_documents(vec![document(
        install_root.path(),
        "launch-nuke",
        "Nuke",
        "Nuke",
        json!({"context": []}),
    )]);
    let engine = DiscoveryEngine::new(Platform::current());
    assert!(bootstrap(&engine).discover_actions(&groups).is_empty());
}

#[test]
fn other_platform_documents_yield_no_search() {
    let document: ApplicationDocument = serde_json::from_value(json!({
        "identifier": "launch-rv",
        "applicationIdentifier": "rv_{variant}",
        "label": "RV",
        "context": ["Task"],
        "search_path": {"plan9": {"prefix": ["/"], "expression": ["rv"]}}
    }))
    .expect("valid document");
    assert!(
        search_for(&document, Platform::current())
            .expect("no error")
            .is_none()
    );
}

#[rstest]
fn malformed_templates_are_reported(install_root: TempDir) {
    let document = document(
        install_root.path(),
        "launch-nuke",
        "Nuke",
        "Nuke",
        json!({"label": "Nuke {release}"}),
    );
    let err = search_for(&document, Platform::current()).expect_err("unknown placeholder");
    assert!(matches!(err, BootstrapError::Template { field: "label", .. }));
}

#[test]
fn empty_search_path_is_reported() {
    let document: ApplicationDocument = serde_json::from_value(json!({
        "identifier": "launch-rv",
        "applicationIdentifier": "rv",
        "label": "RV",
        "context": [null],
        "search_path": current_platform_entry(json!({"prefix": [], "expression": []}))
    }))
    .expect("valid document");
    let err = search_for(&document, Platform::current()).expect_err("empty search path");
    assert!(matches!(err, BootstrapError::EmptySearchPath { .. }));
}

#[test]
fn connection_settings_follow_config() {
    let config = Config {
        server_url: Some("https://studio.example.com/".parse().expect("valid url")),
        api_key: Some(String::from("secret")),
        ..Config::default()
    };
    let connection = connection_settings(&config);
    assert_eq!(
        connection.event_server.as_deref(),
        Some("https://studio.example.com")
    );
    assert_eq!(connection.api_key.as_deref(), Some("secret"));
    assert!(connection.dependency_path.is_none());
}

fn identifiers(catalog: &ApplicationCatalog) -> Vec<String> {
    catalog
        .iter()
        .map(|application| application.identifier().to_owned())
        .collect()
}

#[rstest]
fn refresh_swaps_catalog_without_disturbing_open_lookups(install_root: TempDir) {
    let root = install_root.path();
    let groups = group_documents(vec![document(root, "launch-nuke", "Nuke", "Nuke", json!({}))]);
    let engine = DiscoveryEngine::new(Platform::current());
    let bootstrap = bootstrap(&engine);
    let actions = bootstrap.discover_actions(&groups);
    let action = actions.first().expect("one action");

    let before = action.catalog();
    touch(&root.join("Nuke15.0v1").join("Nuke"));

    assert_eq!(bootstrap.refresh_actions(&actions, &groups), 1);

    assert_eq!(identifiers(&before), ["nuke_14.0v1", "nuke_13.2v4"]);
    assert_eq!(
        before.lookup("nuke_*").map(|application| application.identifier()),
        Some("nuke_14.0v1")
    );
    let after = action.catalog();
    assert_eq!(identifiers(&after), ["nuke_15.0v1", "nuke_14.0v1", "nuke_13.2v4"]);
    assert_eq!(
        after.lookup("nuke_*").map(|application| application.identifier()),
        Some("nuke_15.0v1")
    );
}

#[rstest]
fn refresh_keeps_actions_whose_group_is_gone(install_root: TempDir) {
    let groups = group_documents(vec![document(
        install_root.path(),
        "launch-nuke",
        "Nuke",
        "Nuke",
        json!({}),
    )]);
    let engine = DiscoveryEngine::new(Platform::current());
    let bootstrap = bootstrap(&engine);
    let actions = bootstrap.discover_actions(&groups);

    assert_eq!(bootstrap.refresh_actions(&actions, &[]), 0);
    let action = actions.first().expect("one action");
    assert_eq!(action.catalog().len(), 2);
}
