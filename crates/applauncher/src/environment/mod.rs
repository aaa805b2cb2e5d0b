//! Composes the environment handed to launched applications.
//!
//! The base environment is a copy of the host environment with launcher
//! specific variables removed. Integrations then patch it through keys of the
//! form `NAME.action`:
//!
//! | action    | effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `append`  | add the value after existing path-list entries (default)  |
//! | `prepend` | add the value before existing path-list entries           |
//! | `set`     | overwrite the variable                                    |
//! | `unset`   | remove the variable if present                            |
//! | `pop`     | remove one path-list entry equal to the value             |
//!
//! A key is only split when it contains exactly one `.`; anything else is
//! treated as a variable name with the default `append` action.
//!
//! Variable names are case-insensitive on Windows, where they are folded to
//! upper case on insert and on lookup.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use applauncher_discovery::Platform;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error};

const ENVIRONMENT_TARGET: &str = "applauncher::environment";

/// Host variables that are never inherited by launched applications.
pub const STRIPPED_VARIABLES: [&str; 2] = ["PYTHONHOME", "FTRACK_EVENT_PLUGIN_PATH"];

/// Path list of event server endpoints.
pub const EVENT_SERVER_VARIABLE: &str = "FTRACK_EVENT_SERVER";

/// Credential used by integrations to reach the server.
pub const API_KEY_VARIABLE: &str = "FTRACK_APIKEY";

/// Library search path receiving the launcher's dependency path.
pub const LIBRARY_PATH_VARIABLE: &str = "PYTHONPATH";

/// Base64 encoded JSON launch context.
pub const LAUNCH_CONTEXT_VARIABLE: &str = "FTRACK_CONNECT_EVENT";

/// Separator between the variable name and the action in a patch key.
const ACTION_SEPARATOR: char = '.';

/// How a patch modifies its variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnvAction {
    /// Join after the existing value with the path-list separator.
    #[default]
    Append,
    /// Join before the existing value with the path-list separator.
    Prepend,
    /// Overwrite unconditionally.
    Set,
    /// Remove the variable.
    Unset,
    /// Remove one path-list entry.
    Pop,
}

impl EnvAction {
    /// Returns the action name used in patch keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Set => "set",
            Self::Unset => "unset",
            Self::Pop => "pop",
        }
    }
}

impl fmt::Display for EnvAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an action name outside [`EnvAction`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("environment variable action '{action}' not recognised for {variable}")]
pub struct UnknownAction {
    /// Variable the patch targeted.
    pub variable: String,
    /// Action name as written.
    pub action: String,
}

impl FromStr for EnvAction {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            "set" => Ok(Self::Set),
            "unset" => Ok(Self::Unset),
            "pop" => Ok(Self::Pop),
            other => Err(UnknownAction {
                variable: String::new(),
                action: other.to_owned(),
            }),
        }
    }
}

/// One parsed environment modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPatch {
    variable: String,
    action: EnvAction,
    value: String,
}

impl EnvPatch {
    /// Creates a patch.
    #[must_use]
    pub fn new(variable: impl Into<String>, action: EnvAction, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            action,
            value: value.into(),
        }
    }

    /// Parses a `NAME.action` key and its JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAction`] when the key names an action outside
    /// [`EnvAction`].
    pub fn parse(key: &str, value: &Value) -> Result<Self, UnknownAction> {
        let (variable, action) = match key.split_once(ACTION_SEPARATOR) {
            Some((variable, action)) if !action.contains(ACTION_SEPARATOR) => {
                let parsed = action.parse().map_err(|error: UnknownAction| UnknownAction {
                    variable: variable.to_owned(),
                    action: error.action,
                })?;
                (variable, parsed)
            }
            _ => (key, EnvAction::default()),
        };
        Ok(Self::new(variable, action, coerce_value(value)))
    }

    /// Returns the variable name.
    #[must_use]
    pub const fn variable(&self) -> &str {
        self.variable.as_str()
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> EnvAction {
        self.action
    }

    /// Returns the coerced value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Renders a JSON value as environment text.
///
/// Strings are used verbatim and `null` becomes empty. Every other value,
/// nested objects included, is written as compact JSON.
#[must_use]
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A string-valued process environment.
///
/// # Example
///
/// ```
/// use applauncher::environment::Environment;
/// use applauncher_discovery::Platform;
///
/// let mut environment = Environment::new(Platform::Linux);
/// environment.append_path("PATH", "/usr/bin");
/// environment.prepend_path("PATH", "/opt/maya/bin");
/// assert_eq!(environment.get("PATH"), Some("/opt/maya/bin:/usr/bin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    variables: IndexMap<String, String>,
    separator: char,
    fold_case: bool,
}

impl Environment {
    /// Creates an empty environment using `platform`'s path-list separator.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            variables: IndexMap::new(),
            separator: platform.path_list_separator(),
            fold_case: platform == Platform::Windows,
        }
    }

    /// Copies the current process environment.
    ///
    /// [`STRIPPED_VARIABLES`] are dropped and non-UTF-8 entries are converted
    /// lossily.
    #[must_use]
    pub fn from_host(platform: Platform) -> Self {
        Self::from_os_vars(platform, std::env::vars_os())
    }

    /// Builds an environment from `vars`, dropping [`STRIPPED_VARIABLES`].
    #[must_use]
    pub fn from_vars<I, K, V>(platform: Platform, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut environment = Self::new(platform);
        for (key, value) in vars {
            let name = environment.owned_name(key.into());
            if STRIPPED_VARIABLES.contains(&name.as_str()) {
                debug!(target: ENVIRONMENT_TARGET, variable = %name, "stripping host variable");
                continue;
            }
            environment.variables.insert(name, value.into());
        }
        environment
    }

    fn from_os_vars(platform: Platform, vars: impl Iterator<Item = (OsString, OsString)>) -> Self {
        Self::from_vars(
            platform,
            vars.map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            }),
        )
    }

    /// Returns the value of `variable`.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.variables
            .get(&*self.name(variable))
            .map(String::as_str)
    }

    /// Returns whether `variable` is present.
    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.variables.contains_key(&*self.name(variable))
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns whether the environment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterates over variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Overwrites `variable`.
    pub fn set(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        let name = self.owned_name(variable.into());
        self.variables.insert(name, value.into());
    }

    /// Removes `variable`, returning its previous value.
    pub fn unset(&mut self, variable: &str) -> Option<String> {
        let name = self.owned_name(variable.to_owned());
        self.variables.shift_remove(&name)
    }

    /// Returns `variable` as stored, folded to upper case where names are
    /// case-insensitive.
    fn name<'a>(&self, variable: &'a str) -> Cow<'a, str> {
        if self.fold_case {
            Cow::Owned(variable.to_uppercase())
        } else {
            Cow::Borrowed(variable)
        }
    }

    fn owned_name(&self, variable: String) -> String {
        if self.fold_case {
            variable.to_uppercase()
        } else {
            variable
        }
    }

    /// Adds `value` as the last path-list entry of `variable`.
    pub fn append_path(&mut self, variable: &str, value: &str) {
        let joined = match self.get(variable) {
            Some(existing) => format!("{existing}{}{value}", self.separator),
            None => value.to_owned(),
        };
        self.set(variable, joined);
    }

    /// Adds `value` as the first path-list entry of `variable`.
    pub fn prepend_path(&mut self, variable: &str, value: &str) {
        let joined = match self.get(variable) {
            Some(existing) => format!("{value}{}{existing}", self.separator),
            None => value.to_owned(),
        };
        self.set(variable, joined);
    }

    /// Removes the last path-list entry of `variable` equal to `value`.
    ///
    /// Entries are compared with backslashes normalised to forward slashes.
    /// The variable is removed once no entries remain.
    pub fn pop_path(&mut self, variable: &str, value: &str) {
        let Some(existing) = self.get(variable) else {
            return;
        };
        let target = normalise_separators(value);
        let mut entries: Vec<&str> = existing.split(self.separator).collect();
        let Some(position) = entries
            .iter()
            .rposition(|entry| normalise_separators(entry) == target)
        else {
            return;
        };
        entries.remove(position);
        if entries.is_empty() {
            self.unset(variable);
        } else {
            let joined = entries.join(self.separator.to_string().as_str());
            self.set(variable, joined);
        }
    }

    /// Applies one patch.
    pub fn apply(&mut self, patch: &EnvPatch) {
        debug!(
            target: ENVIRONMENT_TARGET,
            variable = patch.variable(),
            action = %patch.action(),
            value = patch.value(),
            "applying environment patch"
        );
        match patch.action() {
            EnvAction::Append => self.append_path(patch.variable(), patch.value()),
            EnvAction::Prepend => self.prepend_path(patch.variable(), patch.value()),
            EnvAction::Set => self.set(patch.variable(), patch.value()),
            EnvAction::Unset => {
                self.unset(patch.variable());
            }
            EnvAction::Pop => self.pop_path(patch.variable(), patch.value()),
        }
    }

    /// Sets the variables every launched application receives.
    ///
    /// The launch context is serialised to JSON and base64 encoded. A null
    /// context leaves [`LAUNCH_CONTEXT_VARIABLE`] unset.
    pub fn inject_connection(&mut self, connection: &ConnectionSettings, context: &Value) {
        if let Some(server) = connection.event_server.as_deref() {
            self.prepend_path(EVENT_SERVER_VARIABLE, server);
        }
        if let Some(api_key) = connection.api_key.as_deref() {
            self.set(API_KEY_VARIABLE, api_key);
        }
        if let Some(dependencies) = connection.dependency_path.as_ref() {
            self.prepend_path(LIBRARY_PATH_VARIABLE, &dependencies.to_string_lossy());
        }
        if context.is_null() {
            return;
        }
        match serde_json::to_vec(context) {
            Ok(encoded) => self.set(LAUNCH_CONTEXT_VARIABLE, STANDARD.encode(encoded)),
            Err(source) => error!(
                target: ENVIRONMENT_TARGET,
                %source,
                "launch context could not be serialised"
            ),
        }
    }

    /// Consumes the environment, returning its variables.
    #[must_use]
    pub fn into_variables(self) -> IndexMap<String, String> {
        self.variables
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

fn normalise_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Connection details exported to every launched application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Event server endpoint, prepended to [`EVENT_SERVER_VARIABLE`].
    pub event_server: Option<String>,
    /// Credential written to [`API_KEY_VARIABLE`].
    pub api_key: Option<String>,
    /// Prepended to [`LIBRARY_PATH_VARIABLE`].
    pub dependency_path: Option<PathBuf>,
}

/// Applies `patches` to `base` in order.
///
/// Patch keys use the `NAME.action` form. Keys naming an unknown action are
/// logged and skipped; they never abort composition.
#[must_use]
pub fn compose<'a, I>(base: Environment, patches: I) -> Environment
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut environment = base;
    for (key, value) in patches {
        match EnvPatch::parse(key, value) {
            Ok(patch) => environment.apply(&patch),
            Err(unknown) => error!(target: ENVIRONMENT_TARGET, %unknown, "skipping environment patch"),
        }
    }
    environment
}
