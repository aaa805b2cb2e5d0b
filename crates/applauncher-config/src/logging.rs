//! Log output formats accepted by `--log-format`.
//!
//! Logs always go to stderr. `auto` picks the compact form for an
//! interactive terminal and JSON when stderr is redirected, which suits a
//! launcher started both by hand and from a desktop client that captures
//! its output.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// How log events are rendered.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    Json,
    /// One human-readable line per event.
    #[default]
    Compact,
    /// Compact on a terminal, JSON otherwise.
    Auto,
}

impl LogFormat {
    /// Returns whether events are written as JSON when stderr is or is not
    /// a terminal.
    #[must_use]
    pub const fn emits_json(self, stderr_is_terminal: bool) -> bool {
        match self {
            Self::Json => true,
            Self::Compact => false,
            Self::Auto => !stderr_is_terminal,
        }
    }
}

/// Error returned when `--log-format` names no known format.
pub type LogFormatParseError = strum::ParseError;
