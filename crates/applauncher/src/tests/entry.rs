//! Unit tests for the command-line runner.

use std::ffi::OsString;
use std::process::ExitCode;

use rstest::rstest;
use tempfile::TempDir;

use crate::run;

fn invoke(arguments: &[&str]) -> (ExitCode, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let args = std::iter::once("applauncher")
        .chain(arguments.iter().copied())
        .map(OsString::from);
    let exit_code = run(args, &mut stdout, &mut stderr);
    (
        exit_code,
        String::from_utf8(stdout).expect("utf-8 stdout"),
        String::from_utf8(stderr).expect("utf-8 stderr"),
    )
}

#[test]
fn help_is_written_to_stdout() {
    let (exit_code, stdout, stderr) = invoke(&["--help"]);
    assert_eq!(exit_code, ExitCode::SUCCESS);
    assert!(stdout.contains("launch"));
    assert!(stderr.is_empty());
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let (exit_code, _, stderr) = invoke(&[]);
    assert_eq!(exit_code, ExitCode::FAILURE);
    assert!(stderr.contains("Usage"));
}

#[rstest]
#[case(&["launch", "nuke_*"], "no launch action offers application 'nuke_*'")]
#[case(&["launch", "nuke_*", "--action", "launch-nuke"], "launch action 'launch-nuke' is not configured")]
#[case(&["discover", "--context", "\"task\""], "invalid launch context")]
fn launch_errors_are_reported(#[case] arguments: &[&str], #[case] expected: &str) {
    let config = TempDir::new().expect("temporary directory");
    let path = config.path().to_string_lossy().into_owned();
    let mut full = vec!["--config-path", path.as_str()];
    full.extend_from_slice(arguments);

    let (exit_code, stdout, stderr) = invoke(&full);

    assert_eq!(exit_code, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains(expected), "unexpected stderr: {stderr}");
}

#[test]
fn discover_without_actions_prints_empty_list() {
    let config = TempDir::new().expect("temporary directory");
    let path = config.path().to_string_lossy().into_owned();

    let (exit_code, stdout, _) = invoke(&["--config-path", path.as_str(), "discover"]);

    assert_eq!(exit_code, ExitCode::SUCCESS);
    assert_eq!(stdout.trim(), "[]");
}
