//! Unit tests for the discovery engine.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, b"").expect("write fixture file");
}

#[fixture]
fn nuke_tree() -> TempDir {
    let temp = TempDir::new().expect("temporary directory");
    for version in ["Nuke12.2v5", "Nuke13.2v4", "Nuke13.10v1", "NukeBeta"] {
        touch(&temp.path().join(version).join("Nuke"));
    }
    temp
}

fn template(source: &str) -> Template {
    Template::parse(source).expect("valid template")
}

fn nuke_search(root: &Path) -> ApplicationSearch {
    let spec = SearchSpec::new(
        root.to_string_lossy().into_owned(),
        vec![String::from("Nuke.*"), String::from("Nuke$")],
    );
    ApplicationSearch::new(spec, template("Nuke"), template("nuke_{variant}"))
        .with_variant(template("{version}"))
        .with_version_expression(r"Nuke(?P<version>[\d.v]+)")
}

#[rstest]
fn sorts_newest_first_and_defaults_unversioned(nuke_tree: TempDir) {
    let engine = DiscoveryEngine::new(Platform::current());
    let applications = engine
        .discover(&nuke_search(nuke_tree.path()))
        .expect("discovery succeeds");

    let identifiers: Vec<_> = applications.iter().map(Application::identifier).collect();
    assert_eq!(
        identifiers,
        ["nuke_13.10v1", "nuke_13.2v4", "nuke_12.2v5", "nuke_0.0.0"]
    );
    assert!(applications.iter().all(|app| app.label() == "Nuke"));
}

#[rstest]
fn repeated_discovery_is_identical(nuke_tree: TempDir) {
    let engine = DiscoveryEngine::new(Platform::current());
    let search = nuke_search(nuke_tree.path());
    let first = engine.discover(&search).expect("first run");
    let second = engine.discover(&search).expect("second run");
    assert_eq!(first, second);
}

#[rstest]
fn integration_groups_extend_variant_and_identifier(nuke_tree: TempDir) {
    let mut groups = IntegrationGroups::new();
    groups.insert(String::from("studio"), vec![String::from("ftrack-nuke")]);
    groups.insert(String::from("review"), vec![String::from("ftrack-review")]);
    let search = nuke_search(nuke_tree.path()).with_integrations(groups);

    let applications = DiscoveryEngine::new(Platform::current())
        .discover(&search)
        .expect("discovery succeeds");
    let newest = applications.first().expect("at least one application");

    assert_eq!(newest.variant(), "13.10v1 [studio:review]");
    assert_eq!(newest.identifier(), "nuke_13.10v1 [studio:review]");
    assert!(newest.requires_integrations());
}

#[rstest]
fn resolves_well_known_icons(nuke_tree: TempDir) {
    let search = nuke_search(nuke_tree.path()).with_icon(Some(String::from("nuke")));
    let engine = DiscoveryEngine::new(Platform::current())
        .with_icon_resolver(IconResolver::new(Some(String::from("https://ftrack.test"))));
    let applications = engine.discover(&search).expect("discovery succeeds");
    assert!(
        applications
            .iter()
            .all(|app| app.icon() == Some("https://ftrack.test/application_icons/nuke.png"))
    );
}

#[test]
fn label_cannot_reference_variant() {
    let temp = TempDir::new().expect("temporary directory");
    touch(&temp.path().join("app1/app"));
    let spec = SearchSpec::new(
        temp.path().to_string_lossy().into_owned(),
        vec![String::from("app.*"), String::from("app$")],
    );
    let search = ApplicationSearch::new(spec, template("App {variant}"), template("app"));
    let err = DiscoveryEngine::new(Platform::current())
        .discover(&search)
        .expect_err("label has no variant value");
    assert!(matches!(err, DiscoveryError::Template { field: "label", .. }));
}

#[rstest]
fn discover_all_skips_broken_searches(nuke_tree: TempDir) {
    let broken = ApplicationSearch::new(
        SearchSpec::new("/definitely/not/here", vec![String::from("x")]),
        template("Broken"),
        template("broken"),
    );
    let working = nuke_search(nuke_tree.path());

    let catalog = DiscoveryEngine::new(Platform::current()).discover_all([&broken, &working]);

    assert_eq!(catalog.len(), 4);
    assert!(catalog.lookup("broken").is_none());
    assert_eq!(
        catalog.lookup("nuke_*").map(Application::identifier),
        Some("nuke_13.10v1")
    );
}
