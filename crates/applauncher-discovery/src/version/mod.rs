//! Loose version values and their extraction from discovered paths.
//!
//! Application installs rarely follow strict semantic versioning: paths such
//! as `Nuke13.2v4`, `maya2023`, or `Houdini 19.5.303` mix numbers, letters,
//! and dots freely. A [`LooseVersion`] splits such text into alternating
//! numeric and textual components and compares them component by component,
//! so `2.10` sorts above `2.9` and `2.0v10` above `2.0v2`.
//!
//! The [`VersionParser`] applies a regular expression with a named `version`
//! group to a full discovered path. A missing or unparsable match never fails
//! discovery; it yields [`VersionOutcome::Defaulted`] carrying `0.0.0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::DiscoveryError;

/// Tracing target for version extraction.
const VERSION_TARGET: &str = "applauncher_discovery::version";

/// Default expression matching the last run of version-like characters.
///
/// Matches a digit followed by digits, periods, or the letters `v`, `a`, `b`,
/// and `c`, provided no further digit appears later in the path. For example
/// `/opt/x86/app/v1.8v2b1/app.exe` yields `1.8v2b1`.
pub const DEFAULT_VERSION_EXPRESSION: &str = r"(?P<version>\d[\d.vabc]*?)[^\d]*$";

/// Text used for the lowest possible version.
const LOWEST_VERSION: &str = "0.0.0";

/// One component of a loose version.
#[derive(Debug, Clone)]
pub enum VersionComponent {
    /// A run of digits, stored without leading zeros.
    Number(String),
    /// A run of letters or other non-digit, non-dot characters.
    Text(String),
}

impl VersionComponent {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self::Number(if trimmed.is_empty() {
            String::from("0")
        } else {
            trimmed.to_owned()
        })
    }
}

impl PartialEq for VersionComponent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionComponent {}

impl Hash for VersionComponent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Number(digits) => {
                0_u8.hash(state);
                digits.hash(state);
            }
            Self::Text(text) => {
                1_u8.hash(state);
                text.hash(state);
            }
        }
    }
}

impl PartialOrd for VersionComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left
                .len()
                .cmp(&right.len())
                .then_with(|| left.cmp(right)),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            // Numbers outrank text at the same position: `2.0` > `2.v`.
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Lower,
    Dot,
    Other,
}

impl CharClass {
    const fn of(character: char) -> Self {
        match character {
            '0'..='9' => Self::Digit,
            'a'..='z' => Self::Lower,
            '.' => Self::Dot,
            _ => Self::Other,
        }
    }
}

/// A loosely ordered version value.
///
/// # Example
///
/// ```
/// use applauncher_discovery::LooseVersion;
///
/// let newer = LooseVersion::parse("2.10").expect("parses");
/// let older = LooseVersion::parse("2.9").expect("parses");
/// assert!(newer > older);
/// assert_eq!(LooseVersion::default().to_string(), "0.0.0");
/// ```
#[derive(Debug, Clone)]
pub struct LooseVersion {
    source: String,
    components: Vec<VersionComponent>,
}

impl LooseVersion {
    /// Parses `text` into a loose version.
    ///
    /// Returns `None` when `text` contains no components, for example when it
    /// is empty or consists only of dots.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let components = tokenize(text);
        if components.is_empty() {
            return None;
        }
        Some(Self {
            source: text.to_owned(),
            components,
        })
    }

    /// Returns the lowest possible version, equivalent to `0.0.0`.
    #[must_use]
    pub fn lowest() -> Self {
        Self {
            source: String::from(LOWEST_VERSION),
            components: tokenize(LOWEST_VERSION),
        }
    }

    /// Returns the text the version was parsed from.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.source.as_str()
    }

    /// Returns the parsed components.
    #[must_use]
    pub fn components(&self) -> &[VersionComponent] {
        &self.components
    }
}

fn tokenize(text: &str) -> Vec<VersionComponent> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut current_class: Option<CharClass> = None;

    let mut flush = |buffer: &mut String, class: Option<CharClass>| {
        if buffer.is_empty() {
            return;
        }
        match class {
            Some(CharClass::Digit) => components.push(VersionComponent::number(buffer)),
            Some(CharClass::Lower | CharClass::Other) => {
                components.push(VersionComponent::Text(buffer.clone()));
            }
            Some(CharClass::Dot) | None => {}
        }
        buffer.clear();
    };

    for character in text.chars() {
        let class = CharClass::of(character);
        if current_class != Some(class) || class == CharClass::Dot {
            flush(&mut current, current_class);
            current_class = Some(class);
        }
        current.push(character);
    }
    flush(&mut current, current_class);

    components
}

impl Default for LooseVersion {
    fn default() -> Self {
        Self::lowest()
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LooseVersion {}

impl Hash for LooseVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for LooseVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for LooseVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("'{text}' is not a loose version")))
    }
}

/// Result of extracting a version from a discovered path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOutcome {
    /// The expression matched and the captured text parsed.
    Parsed(LooseVersion),
    /// No usable version was found; the lowest version applies.
    Defaulted {
        /// Captured text that failed to parse, if the expression matched.
        captured: Option<String>,
    },
}

impl VersionOutcome {
    /// Returns the resolved version, falling back to `0.0.0`.
    #[must_use]
    pub fn into_version(self) -> LooseVersion {
        match self {
            Self::Parsed(version) => version,
            Self::Defaulted { .. } => LooseVersion::lowest(),
        }
    }

    /// Returns `true` when the version had to be defaulted.
    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// Extracts loose versions from discovered paths.
#[derive(Debug, Clone)]
pub struct VersionParser {
    expression: Regex,
}

impl VersionParser {
    /// Builds a parser from an optional custom expression.
    ///
    /// Without an expression the parser uses
    /// [`DEFAULT_VERSION_EXPRESSION`].
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidVersionExpression`] when the custom
    /// expression does not compile, and
    /// [`DiscoveryError::MissingVersionGroup`] when it lacks a named
    /// `version` group.
    pub fn new(expression: Option<&str>) -> Result<Self, DiscoveryError> {
        let pattern = expression.unwrap_or(DEFAULT_VERSION_EXPRESSION);
        let compiled =
            Regex::new(pattern).map_err(|source| DiscoveryError::InvalidVersionExpression {
                pattern: pattern.to_owned(),
                source,
            })?;
        if !compiled
            .capture_names()
            .any(|name| name == Some("version"))
        {
            return Err(DiscoveryError::MissingVersionGroup {
                pattern: pattern.to_owned(),
            });
        }
        Ok(Self {
            expression: compiled,
        })
    }

    /// Returns a parser using the default expression.
    #[must_use]
    pub fn default_expression() -> Self {
        Self {
            expression: default_regex(),
        }
    }

    /// Searches `path` for a version.
    ///
    /// Anomalies are logged at warning level and reported as
    /// [`VersionOutcome::Defaulted`].
    #[must_use]
    pub fn parse(&self, path: &Path) -> VersionOutcome {
        let text = path.to_string_lossy();
        let Some(captured) = self
            .expression
            .captures(&text)
            .and_then(|captures| captures.name("version"))
            .map(|matched| matched.as_str().to_owned())
        else {
            warn!(
                target: VERSION_TARGET,
                path = %text,
                expression = self.expression.as_str(),
                "no version found in path, defaulting to {LOWEST_VERSION}"
            );
            return VersionOutcome::Defaulted { captured: None };
        };

        match LooseVersion::parse(&captured) {
            Some(version) => VersionOutcome::Parsed(version),
            None => {
                warn!(
                    target: VERSION_TARGET,
                    path = %text,
                    captured = %captured,
                    "could not parse version, defaulting to {LOWEST_VERSION}"
                );
                VersionOutcome::Defaulted {
                    captured: Some(captured),
                }
            }
        }
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::default_expression()
    }
}

#[expect(
    clippy::expect_used,
    reason = "the default expression is a compile-time constant covered by tests"
)]
fn default_regex() -> Regex {
    Regex::new(DEFAULT_VERSION_EXPRESSION).expect("default version expression compiles")
}
