//! Extension points for customizing indexing, sorting and URLs.
//!
//! Each extension point is a trait with a single method. Closures with the
//! matching signature implement the trait, so most customizations are one
//! line:
//!
//! ```
//! use quire_catalog::Hooks;
//!
//! let hooks = Hooks::new()
//!     .with_url_decorator(|url: String, _: &quire_catalog::DocumentRecord| format!("{url}.html"));
//! ```
//!
//! Unset hooks keep the built-in behaviour.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_storage_fs::FileFilter;

use crate::record::{CollectionIndex, DocumentRecord};
use crate::sort::SortField;

/// Edits the list of roots scanned for a collection.
pub trait ScanDirFilter: Send + Sync {
    fn filter(&self, collection: &str, roots: Vec<PathBuf>) -> Vec<PathBuf>;
}

impl<F> ScanDirFilter for F
where
    F: Fn(&str, Vec<PathBuf>) -> Vec<PathBuf> + Send + Sync,
{
    fn filter(&self, collection: &str, roots: Vec<PathBuf>) -> Vec<PathBuf> {
        self(collection, roots)
    }
}

/// Post-processes a freshly built index before it is cached.
pub trait IndexFilter: Send + Sync {
    fn filter(&self, index: CollectionIndex) -> CollectionIndex;
}

impl<F> IndexFilter for F
where
    F: Fn(CollectionIndex) -> CollectionIndex + Send + Sync,
{
    fn filter(&self, index: CollectionIndex) -> CollectionIndex {
        self(index)
    }
}

/// Replaces the sort field chosen by configuration.
pub trait SortFieldSelector: Send + Sync {
    fn select(&self, collection: &str, field: SortField) -> SortField;
}

impl<F> SortFieldSelector for F
where
    F: Fn(&str, SortField) -> SortField + Send + Sync,
{
    fn select(&self, collection: &str, field: SortField) -> SortField {
        self(collection, field)
    }
}

/// Replaces the default record comparator.
pub trait SortComparator: Send + Sync {
    fn compare(&self, a: &DocumentRecord, b: &DocumentRecord, field: SortField) -> Ordering;
}

impl<F> SortComparator for F
where
    F: Fn(&DocumentRecord, &DocumentRecord, SortField) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &DocumentRecord, b: &DocumentRecord, field: SortField) -> Ordering {
        self(a, b, field)
    }
}

/// Rewrites a record's computed URL.
pub trait UrlDecorator: Send + Sync {
    fn decorate(&self, url: String, record: &DocumentRecord) -> String;
}

impl<F> UrlDecorator for F
where
    F: Fn(String, &DocumentRecord) -> String + Send + Sync,
{
    fn decorate(&self, url: String, record: &DocumentRecord) -> String {
        self(url, record)
    }
}

/// Rewrites a record's slug before the URL is built.
pub trait SlugDecorator: Send + Sync {
    fn decorate(&self, slug: String, path: &Path) -> String;
}

impl<F> SlugDecorator for F
where
    F: Fn(String, &Path) -> String + Send + Sync,
{
    fn decorate(&self, slug: String, path: &Path) -> String {
        self(slug, path)
    }
}

/// The set of installed hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) scan_dirs: Option<Arc<dyn ScanDirFilter>>,
    pub(crate) file_filter: Option<Arc<dyn FileFilter>>,
    pub(crate) index: Option<Arc<dyn IndexFilter>>,
    pub(crate) sort_field: Option<Arc<dyn SortFieldSelector>>,
    pub(crate) sort_comparator: Option<Arc<dyn SortComparator>>,
    pub(crate) url: Option<Arc<dyn UrlDecorator>>,
    pub(crate) slug: Option<Arc<dyn SlugDecorator>>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scan_dir_filter(mut self, hook: impl ScanDirFilter + 'static) -> Self {
        self.scan_dirs = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_file_filter(mut self, hook: impl FileFilter + 'static) -> Self {
        self.file_filter = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_index_filter(mut self, hook: impl IndexFilter + 'static) -> Self {
        self.index = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_sort_field_selector(mut self, hook: impl SortFieldSelector + 'static) -> Self {
        self.sort_field = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_sort_comparator(mut self, hook: impl SortComparator + 'static) -> Self {
        self.sort_comparator = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_url_decorator(mut self, hook: impl UrlDecorator + 'static) -> Self {
        self.url = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_slug_decorator(mut self, hook: impl SlugDecorator + 'static) -> Self {
        self.slug = Some(Arc::new(hook));
        self
    }

    pub(crate) fn scan_roots(&self, collection: &str, roots: Vec<PathBuf>) -> Vec<PathBuf> {
        match &self.scan_dirs {
            Some(hook) => hook.filter(collection, roots),
            None => roots,
        }
    }

    pub(crate) fn finish_index(&self, index: CollectionIndex) -> CollectionIndex {
        match &self.index {
            Some(hook) => hook.filter(index),
            None => index,
        }
    }

    pub(crate) fn select_sort_field(&self, collection: &str, field: SortField) -> SortField {
        match &self.sort_field {
            Some(hook) => hook.select(collection, field),
            None => field,
        }
    }

    pub(crate) fn decorate_slug(&self, slug: String, path: &Path) -> String {
        match &self.slug {
            Some(hook) => hook.decorate(slug, path),
            None => slug,
        }
    }

    pub(crate) fn decorate_url(&self, url: String, record: &DocumentRecord) -> String {
        match &self.url {
            Some(hook) => hook.decorate(url, record),
            None => url,
        }
    }

    pub(crate) fn comparator(&self) -> Option<&dyn SortComparator> {
        self.sort_comparator.as_deref()
    }
}
