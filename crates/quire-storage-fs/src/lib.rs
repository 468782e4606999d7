//! Filesystem access for the Quire content catalog.
//!
//! This crate provides the two filesystem-facing pieces the catalog builds on:
//!
//! - [`Scanner`]: recursive discovery of markdown files under one or more roots
//! - [`YamlFrontmatter`]: reading a file's YAML frontmatter and body, either
//!   partially (metadata only) or in full
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use quire_storage_fs::{FrontmatterParser, ReadMode, Scanner, YamlFrontmatter};
//!
//! let outcome = Scanner::new().scan(Path::new("content/blog"));
//! for file in &outcome.files {
//!     let fm = YamlFrontmatter.parse(&file.path, ReadMode::Partial(512))?;
//!     println!("{}: {:?}", file.path.display(), fm.meta.get("title"));
//! }
//! ```

mod frontmatter;
mod scanner;

pub use frontmatter::{
    FULL_READ_LIMIT, Frontmatter, FrontmatterError, FrontmatterParser, ReadMode, YamlFrontmatter,
    parse_str,
};
pub use scanner::{
    FileFilter, ScanOutcome, ScannedFile, Scanner, is_markdown_file, normalize_root,
};
