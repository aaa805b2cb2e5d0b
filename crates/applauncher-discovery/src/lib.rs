//! Filesystem discovery of installed creative applications.
//!
//! The `applauncher-discovery` crate locates application executables on the
//! local machine and turns every hit into an immutable [`Application`] record.
//! A search is described by a [`SearchSpec`]: an exact root path followed by
//! one regular expression per directory depth. The [`PathMatcher`] walks the
//! tree and prunes every directory that fails its level's expression, so the
//! cost of a search stays proportional to the matching branches only.
//!
//! Each hit is versioned by a [`VersionParser`] that extracts a
//! [`LooseVersion`] from the full path, then rendered through [`Template`]
//! values for the label, variant, and identifier. The [`DiscoveryEngine`]
//! sorts the results newest first and collects them into an
//! [`ApplicationCatalog`].
//!
//! # Example
//!
//! ```rust,no_run
//! use applauncher_discovery::{
//!     ApplicationSearch, DiscoveryEngine, Platform, SearchSpec, Template,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = SearchSpec::new("/usr/autodesk", vec!["maya.+".into(), "bin".into(), "maya$".into()]);
//! let search = ApplicationSearch::new(
//!     spec,
//!     Template::parse("Maya")?,
//!     Template::parse("maya_{variant}")?,
//! )
//! .with_variant(Template::parse("{version}")?)
//! .with_version_expression(r"maya(?P<version>\d{4})");
//!
//! let engine = DiscoveryEngine::new(Platform::current());
//! let applications = engine.discover(&search)?;
//! for application in &applications {
//!     println!("{} -> {}", application.identifier(), application.path().display());
//! }
//! # Ok(()) }
//! ```

pub mod application;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod icon;
pub mod matcher;
pub mod platform;
pub mod template;
pub mod version;

pub use self::application::{Application, IntegrationGroups};
pub use self::catalog::{ApplicationCatalog, CatalogHandle};
pub use self::engine::{ApplicationSearch, DiscoveryEngine};
pub use self::error::DiscoveryError;
pub use self::icon::IconResolver;
pub use self::matcher::{PathMatcher, SearchSpec};
pub use self::platform::Platform;
pub use self::template::{Template, TemplateError, TemplateValues};
pub use self::version::{LooseVersion, VersionOutcome, VersionParser};

#[cfg(test)]
mod tests;
