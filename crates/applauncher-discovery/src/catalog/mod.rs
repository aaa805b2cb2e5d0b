//! In-memory catalog of discovered applications.
//!
//! The [`ApplicationCatalog`] keeps applications in discovery order (newest
//! version first) and resolves identifiers either exactly or, when the query
//! ends with `*`, by prefix. Prefix lookups return the first entry in catalog
//! order rather than the best match, so the order is observable behaviour.
//!
//! Catalogs are never edited in place. A refresh builds a new catalog and
//! swaps it into a [`CatalogHandle`], so lookups running concurrently with a
//! refresh observe either the old or the new catalog in full.

use std::sync::{Arc, PoisonError, RwLock};

use crate::application::Application;

/// Marker that turns an identifier query into a prefix query.
pub const WILDCARD: char = '*';

/// Ordered collection of applications with identifier lookup.
///
/// # Example
///
/// ```
/// use applauncher_discovery::{Application, ApplicationCatalog, LooseVersion};
///
/// let catalog = ApplicationCatalog::new(vec![
///     Application::new("maya_2022", "/usr/autodesk/maya2022/bin/maya", LooseVersion::default()),
///     Application::new("maya_2023", "/usr/autodesk/maya2023/bin/maya", LooseVersion::default()),
/// ]);
///
/// let found = catalog.lookup("maya_*").expect("prefix match");
/// assert_eq!(found.identifier(), "maya_2022");
/// assert!(catalog.lookup("nuke_*").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationCatalog {
    applications: Vec<Application>,
}

impl ApplicationCatalog {
    /// Creates a catalog holding `applications` in the given order.
    #[must_use]
    pub const fn new(applications: Vec<Application>) -> Self {
        Self { applications }
    }

    /// Resolves `identifier` to an application.
    ///
    /// An identifier ending in `*` matches the first application whose
    /// identifier starts with the text before the wildcard. Otherwise the
    /// identifier must match exactly.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&Application> {
        match identifier.strip_suffix(WILDCARD) {
            Some(prefix) => self
                .applications
                .iter()
                .find(|application| application.identifier().starts_with(prefix)),
            None => self
                .applications
                .iter()
                .find(|application| application.identifier() == identifier),
        }
    }

    /// Returns all applications in catalog order.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Returns an iterator over the applications in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Application> {
        self.applications.iter()
    }

    /// Returns the number of applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    /// Returns `true` when the catalog holds no applications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

impl<'a> IntoIterator for &'a ApplicationCatalog {
    type Item = &'a Application;
    type IntoIter = std::slice::Iter<'a, Application>;

    fn into_iter(self) -> Self::IntoIter {
        self.applications.iter()
    }
}

/// Shared, atomically replaceable reference to a catalog.
///
/// Clones share the same slot. Readers take a cheap [`Arc`] snapshot and keep
/// using it even if a refresh swaps in a new catalog meanwhile.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    slot: Arc<RwLock<Arc<ApplicationCatalog>>>,
}

impl CatalogHandle {
    /// Creates a handle holding `catalog`.
    #[must_use]
    pub fn new(catalog: ApplicationCatalog) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Returns the catalog current at the time of the call.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ApplicationCatalog> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in `catalog`, returning the previous one.
    pub fn replace(&self, catalog: ApplicationCatalog) -> Arc<ApplicationCatalog> {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }
}
