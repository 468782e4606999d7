//! Building collection indexes from markdown files.
//!
//! A build scans every root of a collection, reads only the first
//! `partial_read_bytes` of each file for its frontmatter, drops drafts and
//! scheduled documents, derives the identifier, slug and URL, and collects
//! the survivors into a [`CollectionIndex`]. Bodies are not rendered during
//! a build; [`ContentIndexer::load_full`] does that for one document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use quire_cache::{Clock, SystemClock};
use quire_config::CollectionSettings;
use quire_storage_fs::{
    Frontmatter, FrontmatterError, FrontmatterParser, ReadMode, ScannedFile, Scanner,
    YamlFrontmatter,
};

use crate::hooks::Hooks;
use crate::identifier::parse_hash_id;
use crate::permalink::{UrlParts, build_url, record_slug};
use crate::record::{CollectionIndex, DocumentRecord, metadata_identifier};
use crate::render::{MarkdownRenderer, PulldownRenderer, RenderContext};

/// Result of [`ContentIndexer::build`].
#[derive(Debug)]
pub struct BuildOutcome {
    pub index: CollectionIndex,
    /// The scan hit its deadline; `index` is incomplete and must not be cached.
    pub truncated: bool,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Turns directories of markdown files into collection indexes.
#[derive(Clone)]
pub struct ContentIndexer {
    parser: Arc<dyn FrontmatterParser>,
    renderer: Arc<dyn MarkdownRenderer>,
    clock: Arc<dyn Clock>,
    hooks: Hooks,
}

impl Default for ContentIndexer {
    fn default() -> Self {
        Self {
            parser: Arc::new(YamlFrontmatter),
            renderer: Arc::new(PulldownRenderer::new()),
            clock: Arc::new(SystemClock),
            hooks: Hooks::default(),
        }
    }
}

impl ContentIndexer {
    /// Create an indexer with YAML frontmatter, `pulldown-cmark` rendering
    /// and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn FrontmatterParser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the clock used for visibility checks and build timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Build the index of `collection` from `roots`.
    ///
    /// Files whose frontmatter cannot be parsed are skipped. When two files
    /// share an identifier the one scanned later wins.
    pub fn build(&self, collection: &CollectionSettings, roots: Vec<PathBuf>) -> BuildOutcome {
        let start = Instant::now();
        let roots = self.hooks.scan_roots(&collection.id, roots);

        let mut scanner = Scanner::new().with_timeout(collection.scan_timeout);
        if let Some(filter) = &self.hooks.file_filter {
            scanner = scanner.with_filter(Arc::clone(filter));
        }
        let scan = scanner.scan_all(&roots);

        let now = self.clock.now();
        let mut index = CollectionIndex::new(&collection.id, now);
        let mode = ReadMode::Partial(collection.partial_read_bytes);

        for file in &scan.files {
            let Some(frontmatter) = self.read(&file.path, mode) else {
                continue;
            };
            let Some(record) = self.assemble(file, &frontmatter.meta, collection, now) else {
                continue;
            };
            if let Some(previous) = index.insert(record) {
                tracing::debug!(
                    identifier = %previous.identifier,
                    replaced = %previous.source_path.display(),
                    by = %file.path.display(),
                    "Duplicate identifier, keeping later file"
                );
            }
        }

        let index = self.hooks.finish_index(index);
        tracing::info!(
            collection = %collection.id,
            files = scan.files.len(),
            records = index.len(),
            truncated = scan.truncated,
            elapsed_ms = elapsed_ms(start),
            "Collection indexed"
        );

        BuildOutcome {
            index,
            truncated: scan.truncated,
        }
    }

    /// Load one document in full, with its body rendered to HTML.
    ///
    /// Returns `None` if the file is gone, unreadable, or no longer visible.
    pub fn load_full(
        &self,
        path: &Path,
        collection: &CollectionSettings,
    ) -> Option<DocumentRecord> {
        let roots = self.hooks.scan_roots(&collection.id, collection.roots());
        let root = roots
            .into_iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .or_else(|| path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let file = ScannedFile {
            root,
            path: path.to_path_buf(),
        };

        let frontmatter = self.read(path, ReadMode::Full)?;
        let mut record = self.assemble(&file, &frontmatter.meta, collection, self.clock.now())?;

        let ctx = RenderContext {
            path,
            meta: &frontmatter.meta,
        };
        let html = self.renderer.render(&frontmatter.body, &ctx);
        record.content = if html.trim().is_empty() {
            frontmatter.body
        } else {
            html
        };
        Some(record)
    }

    fn read(&self, path: &Path, mode: ReadMode) -> Option<Frontmatter> {
        match self.parser.parse(path, mode) {
            Ok(frontmatter) => Some(frontmatter),
            Err(FrontmatterError::Io(e)) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read document");
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Skipping document with invalid frontmatter"
                );
                None
            }
        }
    }

    /// Turn parsed metadata into a record, or `None` if it must be skipped.
    fn assemble(
        &self,
        file: &ScannedFile,
        meta: &HashMap<String, Value>,
        collection: &CollectionSettings,
        now: i64,
    ) -> Option<DocumentRecord> {
        let mut record = DocumentRecord::from_meta(meta);
        record.source_path.clone_from(&file.path);

        if !record.is_visible(now) {
            tracing::trace!(
                path = %file.path.display(),
                status = ?record.status,
                "Document not visible"
            );
            return None;
        }

        let Some(identifier) =
            metadata_identifier(meta).or_else(|| parse_hash_id(&file.path.to_string_lossy()))
        else {
            tracing::debug!(
                path = %file.path.display(),
                "No identifier in metadata or filename, skipping"
            );
            return None;
        };
        record.identifier = identifier;

        let meta_slug = meta.get("slug").and_then(Value::as_str).unwrap_or_default();
        let slug = record_slug(meta_slug, &file.path);
        record.slug = self.hooks.decorate_slug(slug, &file.path);

        let relative_dir = if collection.preserve_dirs {
            file.relative_dir()
        } else {
            String::new()
        };
        let url = build_url(&UrlParts {
            base_path: &collection.base_path,
            prefix: &collection.url_prefix,
            relative_dir: &relative_dir,
            slug: &record.slug,
            identifier: &record.identifier,
        });
        record.url = self.hooks.decorate_url(url, &record);

        Some(record)
    }
}
