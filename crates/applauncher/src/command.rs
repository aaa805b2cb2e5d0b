//! Builds the command line used to start an application.

use std::path::PathBuf;

use applauncher_discovery::{Application, Platform};

/// Wrapper used on macOS, where bundles are not directly executable.
const OPEN_COMMAND: &str = "open";

/// Returns the command line for `application` on `platform`.
///
/// The platform invocation comes first, followed by the application's own
/// launch arguments and then `extra` arguments supplied by the caller.
#[must_use]
pub fn build_command(platform: Platform, application: &Application, extra: &[String]) -> Vec<String> {
    let path = application.path().to_string_lossy().into_owned();
    let mut command = match platform {
        Platform::Darwin => vec![OPEN_COMMAND.to_owned(), path],
        Platform::Linux | Platform::Windows => vec![path],
    };
    if let Some(arguments) = application.launch_arguments() {
        command.extend(arguments.iter().cloned());
    }
    command.extend(extra.iter().cloned());
    command
}

/// Returns the directory containing the application's executable.
#[must_use]
pub fn working_directory(application: &Application) -> Option<PathBuf> {
    application
        .path()
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use applauncher_discovery::LooseVersion;
    use rstest::rstest;

    use super::*;

    fn nuke() -> Application {
        Application::new("nuke_13.2v4", "/opt/Nuke13.2v4/Nuke13.2", LooseVersion::lowest())
            .with_launch_arguments(Some(vec![String::from("--nukex")]))
    }

    #[rstest]
    #[case(Platform::Linux, &["/opt/Nuke13.2v4/Nuke13.2", "--nukex", "-q"])]
    #[case(Platform::Windows, &["/opt/Nuke13.2v4/Nuke13.2", "--nukex", "-q"])]
    #[case(Platform::Darwin, &["open", "/opt/Nuke13.2v4/Nuke13.2", "--nukex", "-q"])]
    fn appends_application_then_caller_arguments(
        #[case] platform: Platform,
        #[case] expected: &[&str],
    ) {
        let command = build_command(platform, &nuke(), &[String::from("-q")]);
        assert_eq!(command, expected);
    }

    #[test]
    fn applications_without_arguments_use_bare_path() {
        let application = Application::new("rv", "/usr/local/bin/rv", LooseVersion::lowest());
        assert_eq!(
            build_command(Platform::Linux, &application, &[]),
            ["/usr/local/bin/rv"]
        );
    }

    #[test]
    fn working_directory_is_executable_parent() {
        assert_eq!(
            working_directory(&nuke()).as_deref(),
            Some(Path::new("/opt/Nuke13.2v4"))
        );
        let bare = Application::new("rv", "rv", LooseVersion::lowest());
        assert!(working_directory(&bare).is_none());
    }
}
