//! Per-depth regular expression matching over a filesystem tree.
//!
//! A [`SearchSpec`] names an exact root followed by one expression per
//! directory depth below it. The [`PathMatcher`] walks the tree depth first
//! with [`walkdir`], testing every entry at depth `L` against expression `L`.
//! Directories that fail their expression are pruned without being read. Entries matching
//! the final expression are reported as hits whether they are files or
//! directories (macOS `.app` bundles are directories), and the walk never
//! descends below the final level.
//!
//! Expressions match at the start of an entry name only, so `maya.+` accepts
//! `maya2023` and `maya2023-beta`; authors anchor the end with `$` when they
//! need full-name equality.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::DiscoveryError;
use crate::platform::Platform;

/// Tracing target for filesystem traversal.
const MATCHER_TARGET: &str = "applauncher_discovery::matcher";

/// Root segment and per-depth expressions describing one search.
///
/// # Example
///
/// ```
/// use applauncher_discovery::SearchSpec;
///
/// let spec = SearchSpec::new("/Applications", vec!["Nuke.*".into(), "Nuke.*\\.app".into()]);
/// assert_eq!(spec.root(), "/Applications");
/// assert_eq!(spec.expressions().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    root: String,
    expressions: Vec<String>,
}

impl SearchSpec {
    /// Creates a search rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<String>, expressions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            expressions,
        }
    }

    /// Splits a flat segment list into root and expressions.
    ///
    /// Returns `None` when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: &[String]) -> Option<Self> {
        let (root, expressions) = segments.split_first()?;
        Some(Self::new(root.clone(), expressions.to_vec()))
    }

    /// Returns the root segment as configured.
    #[must_use]
    pub const fn root(&self) -> &str {
        self.root.as_str()
    }

    /// Returns the per-depth expressions.
    #[must_use]
    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// Returns the root normalised for `platform`.
    ///
    /// On Windows a bare drive designator such as `C:` denotes the current
    /// directory of that drive, so it is rewritten to the drive root `C:\`.
    #[must_use]
    pub fn normalised_root(&self, platform: Platform) -> PathBuf {
        if platform == Platform::Windows && self.root.ends_with(':') {
            return PathBuf::from(format!("{}\\", self.root));
        }
        PathBuf::from(&self.root)
    }
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for expression in &self.expressions {
            write!(f, "/{expression}")?;
        }
        Ok(())
    }
}

/// Compiled search ready to walk the filesystem.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    root: PathBuf,
    levels: Vec<Regex>,
}

impl PathMatcher {
    /// Validates `spec` and compiles its expressions.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::EmptySearchSpec`] when no expressions are
    /// given, [`DiscoveryError::RootNotFound`] when the normalised root does
    /// not exist, and [`DiscoveryError::InvalidExpression`] when an
    /// expression fails to compile.
    pub fn new(spec: &SearchSpec, platform: Platform) -> Result<Self, DiscoveryError> {
        if spec.expressions().is_empty() {
            return Err(DiscoveryError::EmptySearchSpec {
                root: spec.root().to_owned(),
            });
        }

        let root = spec.normalised_root(platform);
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound {
                root,
                spec: spec.to_string(),
            });
        }

        let levels = spec
            .expressions()
            .iter()
            .enumerate()
            .map(|(index, pattern)| compile_anchored(pattern, index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, levels })
    }

    /// Returns the normalised traversal root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the tree and returns every hit in traversal order.
    ///
    /// Entries are visited in name order so repeated walks over an unchanged
    /// tree return identical results. Symbolic links are followed.
    /// Unreadable directories are logged and skipped.
    #[must_use]
    pub fn find(&self) -> Vec<PathBuf> {
        let final_depth = self.levels.len();
        let hits: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(final_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.accepts(entry))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(error) => {
                    warn!(
                        target: MATCHER_TARGET,
                        path = ?error.path(),
                        depth = error.depth(),
                        %error,
                        "skipping unreadable entry"
                    );
                    None
                }
            })
            .filter(|entry| entry.depth() == final_depth)
            .map(DirEntry::into_path)
            .collect();
        debug!(
            target: MATCHER_TARGET,
            root = %self.root.display(),
            hits = hits.len(),
            "filesystem search complete"
        );
        hits
    }

    /// Tests `entry` against the expression of its depth.
    fn accepts(&self, entry: &DirEntry) -> bool {
        entry
            .depth()
            .checked_sub(1)
            .and_then(|level| self.levels.get(level))
            .is_none_or(|expression| expression.is_match(&entry.file_name().to_string_lossy()))
    }
}

fn compile_anchored(pattern: &str, depth: usize) -> Result<Regex, DiscoveryError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| DiscoveryError::InvalidExpression {
        pattern: pattern.to_owned(),
        depth,
        source,
    })
}
