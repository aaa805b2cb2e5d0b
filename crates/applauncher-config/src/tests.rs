//! Unit tests for command-line configuration parsing.

use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;

use super::*;

#[derive(Debug, Parser)]
struct Harness {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> Config {
    let argv = std::iter::once("applauncher").chain(args.iter().copied());
    Harness::try_parse_from(argv)
        .expect("arguments should parse")
        .config
}

#[test]
fn defaults_apply_without_flags() {
    let config = parse(&[]);
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format, LogFormat::Compact);
    assert!(config.server_url.is_none());
}

#[test]
fn config_path_flag_accepts_delimited_lists() {
    let joined = format!("/etc/apps{PATH_LIST_DELIMITER}/opt/apps");
    let config = parse(&["--config-path", &joined]);
    assert_eq!(
        config.document_paths(),
        [PathBuf::from("/etc/apps"), PathBuf::from("/opt/apps")]
    );
}

#[test]
fn empty_config_paths_fall_back_to_defaults() {
    let config = Config::default();
    assert_eq!(config.document_paths(), default_config_paths());
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("compact", LogFormat::Compact)]
fn log_format_flag_parses(#[case] text: &str, #[case] expected: LogFormat) {
    assert_eq!(parse(&["--log-format", text]).log_format, expected);
}

#[test]
fn rejects_invalid_server_url() {
    let argv = ["applauncher", "--server-url", "not a url"];
    assert!(Harness::try_parse_from(argv).is_err());
}

#[test]
fn server_url_text_drops_trailing_slash() {
    let config = parse(&["--server-url", "https://studio.example.com/"]);
    assert_eq!(
        config.server_url_text().as_deref(),
        Some("https://studio.example.com")
    );
}
