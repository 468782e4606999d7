//! Markdown content catalogs for Quire.
//!
//! A collection (for example `blog` or `docs`) is one or more directory trees
//! of markdown files with YAML frontmatter. This crate turns a collection into
//! an index of [`DocumentRecord`]s, keeps that index in a cache, and serves
//! sorted, paginated listings and single documents from it.
//!
//! # Architecture
//!
//! - [`ContentIndexer`]: scans roots, reads frontmatter, filters drafts and
//!   scheduled documents, derives identifiers and URLs
//! - [`IndexCache`]: stores indexes per collection with a TTL and rebuilds
//!   each collection at most once at a time
//! - [`sort_records`] / [`paginate`]: per-request ordering and slicing
//! - [`Catalog`]: ties the pieces to a [`quire_config::Config`]
//!
//! Behaviour can be customized through [`Hooks`] without replacing any of
//! these types.
//!
//! # Identifiers and URLs
//!
//! Every record has an identifier, taken from the `hash_id` or `id`
//! frontmatter key or, failing that, from a trailing hash in the filename
//! (`my-post-abc1234567.md`). The URL ends in `<slug>-<identifier>`, so
//! [`parse_hash_id`] can recover the identifier from any document URL.

mod cache;
mod catalog;
mod hooks;
mod identifier;
mod indexer;
mod paginate;
mod permalink;
mod record;
mod render;
mod sort;

pub use cache::IndexCache;
pub use catalog::{Catalog, ListQuery, RequestContext};
pub use hooks::{
    Hooks, IndexFilter, ScanDirFilter, SlugDecorator, SortComparator, SortFieldSelector,
    UrlDecorator,
};
pub use identifier::parse_hash_id;
pub use indexer::{BuildOutcome, ContentIndexer};
pub use paginate::{Page, paginate, parse_page};
pub use permalink::{UrlParts, build_slug, build_url, record_slug, slug_with_identifier};
pub use quire_storage_fs::FileFilter;
pub use record::{CollectionIndex, DocumentRecord, Status, metadata_identifier, parse_timestamp};
pub use render::{MarkdownRenderer, PulldownRenderer, RenderContext};
pub use sort::{SortField, compare_records, sort_records};
