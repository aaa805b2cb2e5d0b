//! Host platform identification.
//!
//! Configuration documents key their search paths by the lowercase operating
//! system name (`linux`, `darwin`, `windows`), and the same name travels in
//! integration events so providers can tailor their contributions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system family the launcher runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Linux and other Unix-like systems without bundle semantics.
    Linux,
    /// macOS, where applications are `.app` bundles started through `open`.
    Darwin,
    /// Windows, where console-subsystem semantics apply.
    Windows,
}

impl Platform {
    /// Returns the platform the current binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Darwin
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Returns the separator used between entries of path-list variables.
    #[must_use]
    pub const fn path_list_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::Linux | Self::Darwin => ':',
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            _ => Err(UnknownPlatform(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("linux", Platform::Linux)]
    #[case("Darwin", Platform::Darwin)]
    #[case("WINDOWS", Platform::Windows)]
    fn parses_case_insensitively(#[case] name: &str, #[case] expected: Platform) {
        assert_eq!(name.parse::<Platform>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("beos".parse::<Platform>().is_err());
    }

    #[test]
    fn windows_uses_semicolon_lists() {
        assert_eq!(Platform::Windows.path_list_separator(), ';');
        assert_eq!(Platform::Linux.path_list_separator(), ':');
    }
}
