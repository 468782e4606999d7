//! Document discovery by filesystem walking.
//!
//! The scanner only identifies files that could form documents; nothing is
//! read at this stage. The indexer parses the returned files afterwards.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Markdown file extension accepted by the default policy.
const MARKDOWN_EXTENSION: &str = "md";

/// A file discovered under a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Root the file was found under.
    pub root: PathBuf,
    /// Full path to the file.
    pub path: PathBuf,
}

impl ScannedFile {
    /// Directory of the file relative to its root, `/`-separated.
    ///
    /// Returns an empty string for files directly in the root.
    #[must_use]
    pub fn relative_dir(&self) -> String {
        self.path
            .strip_prefix(&self.root)
            .ok()
            .and_then(Path::parent)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }
}

/// Result of a scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files accepted by the inclusion predicate, in walk order.
    pub files: Vec<ScannedFile>,
    /// True if the scan stopped early because the deadline passed.
    pub truncated: bool,
}

/// Per-file include/exclude decision.
///
/// Receives the decision of the default policy ([`is_markdown_file`]) and
/// returns the final one.
pub trait FileFilter: Send + Sync {
    fn include(&self, path: &Path, default: bool) -> bool;
}

impl<F> FileFilter for F
where
    F: Fn(&Path, bool) -> bool + Send + Sync,
{
    fn include(&self, path: &Path, default: bool) -> bool {
        self(path, default)
    }
}

/// Default inclusion policy for plain files.
///
/// Rejects hidden files (leading `.`) and anything without the `.md`
/// extension.
#[must_use]
pub fn is_markdown_file(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if name.to_string_lossy().starts_with('.') {
        return false;
    }
    path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION)
}

/// Lexically normalize a root so duplicates compare equal.
///
/// Removes `.` segments and folds `..` into the preceding segment without
/// touching the filesystem.
#[must_use]
pub fn normalize_root(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Recursive markdown file scanner.
///
/// Descends into every subdirectory and applies the inclusion predicate to
/// plain files only. Missing roots produce no files rather than an error.
#[derive(Clone, Default)]
pub struct Scanner {
    filter: Option<Arc<dyn FileFilter>>,
    timeout: Option<Duration>,
}

impl Scanner {
    /// Create a scanner with the default inclusion policy and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-file inclusion decision.
    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn FileFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Stop walking once a scan has run longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Scan a single root.
    pub fn scan(&self, root: &Path) -> ScanOutcome {
        self.scan_all(std::slice::from_ref(&root.to_path_buf()))
    }

    /// Scan several roots and concatenate the results in root order.
    ///
    /// Roots that normalize to the same path are scanned once. The deadline,
    /// if any, covers the whole call.
    pub fn scan_all(&self, roots: &[PathBuf]) -> ScanOutcome {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut outcome = ScanOutcome::default();
        let mut seen: Vec<PathBuf> = Vec::with_capacity(roots.len());

        for root in roots {
            let normalized = normalize_root(root);
            if seen.contains(&normalized) {
                tracing::debug!(root = %root.display(), "Skipping duplicate scan root");
                continue;
            }
            seen.push(normalized);

            if !root.is_dir() {
                tracing::debug!(root = %root.display(), "Scan root does not exist");
                continue;
            }

            let walk = Walk {
                root,
                filter: self.filter.as_deref(),
                deadline,
            };
            if !walk.directory(root, &mut outcome.files) {
                outcome.truncated = true;
                tracing::warn!(
                    root = %root.display(),
                    found = outcome.files.len(),
                    "Scan deadline exceeded, returning partial results"
                );
                break;
            }
        }

        outcome
    }
}

struct Walk<'a> {
    root: &'a Path,
    filter: Option<&'a dyn FileFilter>,
    deadline: Option<Instant>,
}

impl Walk<'_> {
    /// Walk `dir`, pushing accepted files. Returns `false` if the deadline
    /// passed before the walk finished.
    fn directory(&self, dir: &Path, files: &mut Vec<ScannedFile>) -> bool {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return false;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            return true;
        };

        // Collect entries with cached file_type to avoid repeated stat calls
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_type().ok().map(|t| (e, t)))
            .collect();
        entries.sort_by_key(|(e, _)| e.file_name());

        for (entry, file_type) in entries {
            let path = entry.path();

            if file_type.is_dir() {
                if !self.directory(&path, files) {
                    return false;
                }
                continue;
            }

            let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
            if !is_file {
                continue;
            }

            let default = is_markdown_file(&path);
            let include = match self.filter {
                Some(filter) => filter.include(&path, default),
                None => default,
            };
            if include {
                files.push(ScannedFile {
                    root: self.root.to_path_buf(),
                    path,
                });
            } else {
                tracing::trace!(path = %path.display(), "Excluded by file filter");
            }
        }

        true
    }
}
