//! Domain errors raised while discovering applications.
//!
//! Every variant describes a configuration problem with a single search. The
//! engine reports them per search so a malformed search never prevents its
//! siblings from populating the catalog.

use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateError;

/// Errors arising from a single application search.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The search specification did not contain any per-depth expression.
    #[error("search rooted at '{root}' declares no path expressions")]
    EmptySearchSpec {
        /// Root segment of the offending search.
        root: String,
    },

    /// The root segment does not name an existing filesystem entry.
    #[error(
        "first part '{root}' of search '{spec}' must match exactly to an existing entry on the filesystem"
    )]
    RootNotFound {
        /// Normalised root that was checked.
        root: PathBuf,
        /// Human-readable rendering of the full search.
        spec: String,
    },

    /// A per-depth expression is not a valid regular expression.
    #[error("invalid path expression '{pattern}' at depth {depth}: {source}")]
    InvalidExpression {
        /// Expression as written in the configuration.
        pattern: String,
        /// Directory depth the expression applies to, starting at 1.
        depth: usize,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The custom version expression is not a valid regular expression.
    #[error("invalid version expression '{pattern}': {source}")]
    InvalidVersionExpression {
        /// Expression as written in the configuration.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The custom version expression lacks a named `version` group.
    #[error("version expression '{pattern}' must declare a named 'version' group")]
    MissingVersionGroup {
        /// Expression as written in the configuration.
        pattern: String,
    },

    /// A label, variant, or identifier template failed to render.
    #[error("failed to render {field} template: {source}")]
    Template {
        /// Name of the record field being rendered.
        field: &'static str,
        /// Underlying template error.
        #[source]
        source: TemplateError,
    },
}
