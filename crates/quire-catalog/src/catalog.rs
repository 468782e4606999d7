//! The catalog: cached indexes plus listing and lookup.

use quire_cache::Cache;
use quire_config::{CollectionSettings, Config};

use crate::cache::IndexCache;
use crate::identifier::parse_hash_id;
use crate::indexer::ContentIndexer;
use crate::paginate::{Page, paginate};
use crate::record::{CollectionIndex, DocumentRecord};
use crate::sort::{SortField, sort_records};

/// The request being served, as far as the catalog cares.
pub trait RequestContext {
    /// Request path, e.g. `/blog/hello-abc1234567`.
    fn path(&self) -> &str;
}

impl RequestContext for &str {
    fn path(&self) -> &str {
        self
    }
}

impl RequestContext for String {
    fn path(&self) -> &str {
        self
    }
}

/// Listing parameters. Unset values come from the collection settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery {
    /// 1-based page; 0 is treated as 1.
    pub page: usize,
    pub per_page: Option<usize>,
    pub sort: Option<SortField>,
}

/// Content catalog over all configured collections.
///
/// Indexes are built on demand and kept in the cache for the collection's
/// TTL. Sorting and pagination happen per call on the cached index.
///
/// ```no_run
/// use quire_cache::MemoryCache;
/// use quire_catalog::{Catalog, ListQuery};
/// use quire_config::Config;
///
/// let config = Config::load(None, None)?;
/// let catalog = Catalog::new(config, &MemoryCache::new());
/// let page = catalog.list("blog", &ListQuery { page: 1, ..ListQuery::default() });
/// for record in &page.items {
///     println!("{} {}", record.url, record.title);
/// }
/// # Ok::<(), quire_config::ConfigError>(())
/// ```
pub struct Catalog {
    config: Config,
    indexer: ContentIndexer,
    cache: IndexCache,
}

impl Catalog {
    /// Create a catalog with the default indexer.
    #[must_use]
    pub fn new(config: Config, cache: &dyn Cache) -> Self {
        Self::with_indexer(config, cache, ContentIndexer::new())
    }

    /// Create a catalog with a customized indexer (parser, renderer, clock, hooks).
    #[must_use]
    pub fn with_indexer(config: Config, cache: &dyn Cache, indexer: ContentIndexer) -> Self {
        let cache = IndexCache::new(cache, &config.catalog.cache_namespace);
        Self {
            config,
            indexer,
            cache,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Effective settings for a collection.
    #[must_use]
    pub fn settings(&self, collection: &str) -> CollectionSettings {
        self.config.collection(collection)
    }

    /// The collection's index, from cache when possible.
    #[must_use]
    pub fn index(&self, collection: &str) -> CollectionIndex {
        let settings = self.settings(collection);
        let ttl = settings.cache_enabled.then_some(settings.cache_ttl);
        self.cache.get_or_build(collection, ttl, || {
            self.indexer.build(&settings, settings.roots())
        })
    }

    /// Sort field for a collection: configuration, then the selector hook.
    #[must_use]
    pub fn sort_field(&self, collection: &str) -> SortField {
        let settings = self.settings(collection);
        let field = SortField::from_config(settings.sort_by.as_deref());
        self.indexer.hooks().select_sort_field(collection, field)
    }

    /// One sorted page of a collection.
    #[must_use]
    pub fn list(&self, collection: &str, query: &ListQuery) -> Page<DocumentRecord> {
        let settings = self.settings(collection);
        let field = query.sort.unwrap_or_else(|| self.sort_field(collection));
        let per_page = query.per_page.unwrap_or(settings.per_page);

        let index = self.index(collection);
        let sorted = sort_records(&index, field, self.indexer.hooks().comparator());
        paginate(sorted, query.page, per_page).map(DocumentRecord::clone)
    }

    /// A single document, loaded in full with rendered content.
    #[must_use]
    pub fn document(&self, collection: &str, identifier: &str) -> Option<DocumentRecord> {
        let identifier = identifier.trim().to_lowercase();
        let index = self.index(collection);
        let Some(record) = index.get(&identifier) else {
            tracing::debug!(collection, identifier, "Document not in index");
            return None;
        };
        self.indexer
            .load_full(&record.source_path, &self.settings(collection))
    }

    /// Identifier of the document a request points at, if any.
    ///
    /// The path must contain the collection's URL prefix, end in a hash
    /// identifier, and that identifier must be in the index.
    #[must_use]
    pub fn resolve_request(
        &self,
        collection: &str,
        request: &dyn RequestContext,
    ) -> Option<String> {
        let path = request.path();
        let path = path.split(['?', '#']).next().unwrap_or(path);

        let settings = self.settings(collection);
        let prefix = settings.url_prefix.trim_end_matches('/');
        if !prefix.is_empty() && !path.contains(prefix) {
            return None;
        }

        let identifier = parse_hash_id(path)?;
        self.index(collection)
            .contains(&identifier)
            .then_some(identifier)
    }

    /// Drop a collection's cached index. Returns `true` if one was cached.
    pub fn invalidate(&self, collection: &str) -> bool {
        tracing::debug!(collection, "Invalidating collection index");
        self.cache.remove(collection)
    }

    /// Drop every cached index.
    pub fn invalidate_all(&self) {
        tracing::debug!("Invalidating all collection indexes");
        self.cache.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use quire_cache::{ManualClock, MemoryCache};

    use super::*;
    use crate::hooks::Hooks;
    use crate::record::parse_timestamp;

    fn write(root: &Path, name: &str, content: &str) {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join(name), content).unwrap();
    }

    fn catalog(base: &Path, cache: &MemoryCache, hooks: Hooks) -> Catalog {
        let config = Config::default_with_base(base);
        let clock = ManualClock::new(parse_timestamp("2024-06-01").unwrap());
        let indexer = ContentIndexer::new()
            .with_clock(Arc::new(clock))
            .with_hooks(hooks);
        Catalog::with_indexer(config, cache, indexer)
    }

    fn seed(base: &Path) {
        let root = base.join(".quire/content/blog");
        write(
            &root,
            "one.md",
            "---\ntitle: One\nid: one1234567\nsort_order: 3\n---\n# One\n",
        );
        write(
            &root,
            "two.md",
            "---\ntitle: Two\nid: two1234567\nsort_order: 1\n---\n# Two\n",
        );
        write(
            &root,
            "three.md",
            "---\ntitle: Three\nid: three12345\nsort_order: 2\n---\n",
        );
    }

    #[test]
    fn test_list_uses_configured_sort() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let mut catalog = catalog(dir.path(), &cache, Hooks::new());
        catalog.config.catalog.sort_by = Some("sort_order".to_owned());

        let page = catalog.list("blog", &ListQuery::default());
        let titles: Vec<&str> = page.items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Two", "Three", "One"]);
        assert_eq!(page.total_items, 3);

        let by_title = catalog.list(
            "blog",
            &ListQuery {
                sort: Some(SortField::Title),
                per_page: Some(2),
                page: 2,
            },
        );
        let titles: Vec<&str> = by_title.items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Two"]);
        assert_eq!(by_title.total_pages, 2);
    }

    #[test]
    fn test_sort_field_selector_hook() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let hooks =
            Hooks::new().with_sort_field_selector(|_: &str, _: SortField| SortField::SortOrder);
        let catalog = catalog(dir.path(), &cache, hooks);

        assert_eq!(catalog.sort_field("blog"), SortField::SortOrder);
        let page = catalog.list("blog", &ListQuery::default());
        assert_eq!(page.items[0].title, "Two");
    }

    #[test]
    fn test_unset_or_unknown_sort_orders_by_title() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".quire/content/blog");
        write(&root, "a.md", "---\ntitle: Zeta\nid: zeta123456\n---\n");
        write(&root, "b.md", "---\ntitle: alpha\nid: alpha12345\n---\n");
        write(&root, "c.md", "---\ntitle: Mu\nid: mu12345678\n---\n");
        let cache = MemoryCache::new();
        let mut catalog = catalog(dir.path(), &cache, Hooks::new());

        let titles = |catalog: &Catalog| -> Vec<String> {
            catalog
                .list("blog", &ListQuery::default())
                .items
                .into_iter()
                .map(|r| r.title)
                .collect()
        };

        assert_eq!(catalog.sort_field("blog"), SortField::Title);
        assert_eq!(titles(&catalog), vec!["alpha", "Mu", "Zeta"]);

        catalog.config.apply_override("sort_by", "colour");
        assert_eq!(catalog.sort_field("blog"), SortField::Title);
        assert_eq!(titles(&catalog), vec!["alpha", "Mu", "Zeta"]);
    }

    #[test]
    fn test_index_is_cached_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let catalog = catalog(dir.path(), &cache, Hooks::new());

        assert_eq!(catalog.index("blog").len(), 3);

        let root = dir.path().join(".quire/content/blog");
        write(&root, "four.md", "---\ntitle: Four\nid: four123456\n---\n");
        assert_eq!(catalog.index("blog").len(), 3);

        assert!(catalog.invalidate("blog"));
        assert_eq!(catalog.index("blog").len(), 4);

        catalog.invalidate_all();
        assert!(!catalog.invalidate("blog"));
    }

    #[test]
    fn test_disabled_cache_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let mut catalog = catalog(dir.path(), &cache, Hooks::new());
        catalog.config.apply_override("collections.blog.cache", "off");

        assert_eq!(catalog.index("blog").len(), 3);
        let root = dir.path().join(".quire/content/blog");
        write(&root, "four.md", "---\ntitle: Four\nid: four123456\n---\n");
        assert_eq!(catalog.index("blog").len(), 4);
        assert!(!catalog.invalidate("blog"));
    }

    #[test]
    fn test_document_renders_content() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let catalog = catalog(dir.path(), &cache, Hooks::new());

        let doc = catalog.document("blog", " ONE1234567 ").unwrap();
        assert_eq!(doc.title, "One");
        assert!(doc.content.contains("<h1>One</h1>"));

        assert!(catalog.document("blog", "missing123456").is_none());
        assert!(catalog.document("docs", "one1234567").is_none());
    }

    #[test]
    fn test_resolve_request() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let cache = MemoryCache::new();
        let catalog = catalog(dir.path(), &cache, Hooks::new());

        let url = catalog.index("blog").get("one1234567").unwrap().url.clone();
        assert_eq!(url, "/blog/one-one1234567");

        assert_eq!(
            catalog.resolve_request("blog", &url).as_deref(),
            Some("one1234567")
        );
        assert_eq!(
            catalog
                .resolve_request("blog", &"/blog/one-one1234567?ref=home")
                .as_deref(),
            Some("one1234567")
        );
        assert_eq!(catalog.resolve_request("blog", &"/docs/one-one1234567"), None);
        assert_eq!(catalog.resolve_request("blog", &"/blog/gone-gone123456"), None);
        assert_eq!(catalog.resolve_request("blog", &"/blog"), None);
    }
}
