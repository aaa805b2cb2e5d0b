//! Unit tests for application documents.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn maya() -> ApplicationDocument {
    serde_json::from_value(json!({
        "identifier": "ftrack-connect-launch-maya",
        "applicationIdentifier": "maya_{variant}",
        "label": "Maya",
        "variant": "{version}",
        "icon": "maya",
        "context": ["Task", null],
        "integrations": {"legacy": ["ftrack-connect-maya"], "pipeline": ["a", "b"]},
        "search_path": {
            "linux": {
                "prefix": ["/", "usr", "autodesk", "maya.+"],
                "expression": ["bin", "maya$"],
                "version_expression": "maya(?P<version>\\d{4})"
            },
            "windows": {
                "prefix": ["C:\\", "Program Files.*"],
                "expression": ["Autodesk", "Maya.+", "bin", "maya.exe"],
                "launch_arguments": ["-hideConsole"]
            }
        }
    }))
    .expect("valid document")
}

#[rstest]
fn joins_prefix_and_expression(maya: ApplicationDocument) {
    let linux = maya
        .search_path_for(Platform::Linux)
        .expect("linux entry");
    assert_eq!(
        linux.segments(),
        ["/", "usr", "autodesk", "maya.+", "bin", "maya$"]
    );
    assert_eq!(
        linux.version_expression.as_deref(),
        Some("maya(?P<version>\\d{4})")
    );
}

#[rstest]
fn missing_platform_entry_is_none(maya: ApplicationDocument) {
    assert!(maya.search_path_for(Platform::Darwin).is_none());
}

#[rstest]
fn keeps_integration_group_order(maya: ApplicationDocument) {
    let groups: Vec<_> = maya.integration_groups().keys().cloned().collect();
    assert_eq!(groups, ["legacy", "pipeline"]);
}

#[rstest]
fn context_allows_null_entries(maya: ApplicationDocument) {
    assert_eq!(maya.context, [Some(String::from("Task")), None]);
}

#[test]
fn optional_fields_default() {
    let document: ApplicationDocument = serde_json::from_value(json!({
        "identifier": "rv",
        "applicationIdentifier": "rv_{variant}",
        "label": "RV",
        "context": [null],
        "integrations": null,
        "search_path": {}
    }))
    .expect("valid document");

    assert_eq!(document.priority(), DEFAULT_PRIORITY);
    assert!(document.integration_groups().is_empty());
    assert!(document.variant.is_empty());
    assert!(document.icon.is_none());
}

#[test]
fn missing_search_path_is_rejected() {
    let result = serde_json::from_value::<ApplicationDocument>(json!({
        "identifier": "rv",
        "applicationIdentifier": "rv",
        "label": "RV",
        "context": []
    }));
    assert!(result.is_err());
}
