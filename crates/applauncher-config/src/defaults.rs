use std::path::PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Directory below the user configuration directory holding documents.
pub const APPLICATIONS_SUBDIRECTORY: &str = "applauncher/applications";

/// Separator between entries of the configuration path list.
#[cfg(windows)]
pub const PATH_LIST_DELIMITER: char = ';';

/// Separator between entries of the configuration path list.
#[cfg(not(windows))]
pub const PATH_LIST_DELIMITER: char = ':';

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Computes the directories searched when none are configured.
///
/// Falls back to a relative `applications` directory when the platform has
/// no user configuration directory.
pub fn default_config_paths() -> Vec<PathBuf> {
    let directory = dirs::config_dir().map_or_else(
        || PathBuf::from("applications"),
        |base| base.join(APPLICATIONS_SUBDIRECTORY),
    );
    vec![directory]
}
