//! Reads application documents from configuration directories.
//!
//! Every configured directory is scanned for `*.json` files in file-name
//! order. Missing directories, unreadable files, and documents that fail to
//! parse are logged at warning level and skipped; loading itself never fails.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::document::ApplicationDocument;
use crate::error::ConfigError;

/// Tracing target for document loading.
const LOADER_TARGET: &str = "applauncher_config::loader";

/// File extension of application documents.
const DOCUMENT_EXTENSION: &str = "json";

/// Documents sharing one action identifier, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    /// Shared action identifier.
    pub identifier: String,
    /// Documents in the order they were loaded.
    pub documents: Vec<ApplicationDocument>,
}

impl DocumentGroup {
    /// Returns the document whose action settings apply to the group.
    ///
    /// The last document loaded wins.
    #[must_use]
    pub fn primary(&self) -> Option<&ApplicationDocument> {
        self.documents.last()
    }
}

/// Loads every readable document below `directories`.
pub fn load_documents<P: AsRef<Path>>(directories: &[P]) -> Vec<ApplicationDocument> {
    let mut documents = Vec::new();
    for directory in directories {
        match load_directory(directory.as_ref()) {
            Ok(found) => documents.extend(found),
            Err(error) => warn!(target: LOADER_TARGET, %error, "skipping configuration path"),
        }
    }
    debug!(
        target: LOADER_TARGET,
        documents = documents.len(),
        "application documents loaded"
    );
    documents
}

/// Loads the documents directly inside `directory`.
///
/// Documents that fail to load are logged and skipped.
///
/// # Errors
///
/// Returns [`ConfigError::MissingDirectory`] when `directory` is not a
/// directory and [`ConfigError::Walk`] when it cannot be listed.
pub fn load_directory(directory: &Path) -> Result<Vec<ApplicationDocument>, ConfigError> {
    if !directory.is_dir() {
        return Err(ConfigError::MissingDirectory {
            path: directory.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let entries = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for result in entries {
        match result {
            Ok(entry) if is_document(&entry) => paths.push(entry.into_path()),
            Ok(_) => {}
            Err(error) if error.depth() == 0 => {
                return Err(ConfigError::Walk {
                    path: directory.to_path_buf(),
                    source: error,
                });
            }
            Err(error) => {
                warn!(target: LOADER_TARGET, %error, "skipping unreadable entry");
            }
        }
    }

    let documents = paths
        .iter()
        .filter_map(|path| match load_document(path) {
            Ok(document) => Some(document),
            Err(error) => {
                warn!(target: LOADER_TARGET, %error, "skipping application document");
                None
            }
        })
        .collect();
    Ok(documents)
}

fn is_document(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .is_some_and(|extension| extension == DOCUMENT_EXTENSION)
}

/// Reads and parses one document.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read and
/// [`ConfigError::Parse`] when it does not match the document schema.
pub fn load_document(path: &Path) -> Result<ApplicationDocument, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Groups `documents` by identifier, keeping first-seen group order.
#[must_use]
pub fn group_documents(documents: Vec<ApplicationDocument>) -> Vec<DocumentGroup> {
    let mut groups: IndexMap<String, Vec<ApplicationDocument>> = IndexMap::new();
    for document in documents {
        groups
            .entry(document.identifier.clone())
            .or_default()
            .push(document);
    }
    groups
        .into_iter()
        .map(|(identifier, documents)| DocumentGroup {
            identifier,
            documents,
        })
        .collect()
}
