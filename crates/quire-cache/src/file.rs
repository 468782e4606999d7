//! On-disk cache.
//!
//! Every bucket is a directory under the cache root and every entry one file
//! in it. An entry file starts with an eight byte expiry header:
//!
//! ```text
//! [expires_at: i64 LE][data bytes]
//! ```
//!
//! `expires_at` is a unix timestamp in seconds, `0` for entries without a TTL.
//! Expired entries are detected from the header alone.
//!
//! The cache root holds a `VERSION` file. A root written by another version of
//! the binary (or with no `VERSION` at all) is emptied when the cache opens,
//! because the serialized index layout may have changed.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::{Cache, CacheBucket, Clock, SystemClock, expires_at, is_expired};

/// [`Cache`] persisted under a root directory.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- quire-catalog/     # bucket "quire-catalog"
/// |   +-- blog           # cache entry for key "blog"
/// +-- other/             # bucket "other"
///     +-- ...
/// ```
pub struct FileCache {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Open the cache at `root` for binary `version`.
    ///
    /// A root stamped with a different version is emptied first. Filesystem
    /// errors are logged; the cache then behaves as if empty.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        Self::with_clock(root, version, Arc::new(SystemClock))
    }

    /// Like [`FileCache::new`], measuring expiry against `clock`.
    #[must_use]
    pub fn with_clock(root: PathBuf, version: &str, clock: Arc<dyn Clock>) -> Self {
        validate_version(&root, version);
        Self { root, clock }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(sanitize_key(name)),
            clock: Arc::clone(&self.clock),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(sanitize_key(key))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let mut file = File::open(&path).ok()?;

        // Read expiry (i64 LE)
        let mut header = [0u8; 8];
        file.read_exact(&mut header).ok()?;
        let expires_at = i64::from_le_bytes(header);

        if is_expired(expires_at, self.clock.now()) {
            tracing::debug!(path = %path.display(), "cache entry expired");
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::debug!(error = %e, "Failed to create cache bucket directory");
            return;
        }

        let expires_at = expires_at(self.clock.now(), ttl);
        let mut buf = Vec::with_capacity(8 + value.len());
        buf.extend_from_slice(&expires_at.to_le_bytes());
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(self.entry_path(key), &buf) {
            tracing::debug!(error = %e, "Failed to write cache entry");
        }
    }

    fn remove(&self, key: &str) -> bool {
        fs::remove_file(self.entry_path(key)).is_ok()
    }

    fn clear(&self) {
        if self.dir.exists()
            && let Err(e) = fs::remove_dir_all(&self.dir)
        {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to clear cache bucket");
        }
    }
}

/// Map an arbitrary key onto a single safe file name.
///
/// Keys made of `[A-Za-z0-9._-]` without a leading `.` are used as is.
/// Anything else is rewritten with `_` in place of unsafe characters and
/// suffixed with a short SHA-256 of the raw key, so distinct keys never
/// share a file and no key escapes the bucket directory.
fn sanitize_key(key: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if !key.is_empty() && !key.starts_with('.') && key.chars().all(is_safe) {
        return key.to_owned();
    }

    let readable: String = key
        .chars()
        .map(|c| if is_safe(c) { c } else { '_' })
        .collect();
    let digest = Sha256::digest(key.as_bytes());
    format!("_{readable}-{}", hex::encode(&digest[..6]))
}

/// Empty `root` unless its `VERSION` stamp equals `version`, then stamp it.
fn validate_version(root: &Path, version: &str) {
    let stamp = root.join("VERSION");

    match fs::read_to_string(&stamp) {
        Ok(stored) if stored == version => return,
        Ok(stored) => {
            tracing::info!(
                root = %root.display(),
                %stored,
                current = version,
                "Cache written by another version, resetting"
            );
        }
        Err(_) => {
            tracing::debug!(root = %root.display(), "Initializing cache directory");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(root = %root.display(), error = %e, "Failed to reset cache directory");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!(root = %root.display(), error = %e, "Failed to create cache directory");
        return;
    }
    if let Err(e) = fs::write(&stamp, version) {
        tracing::warn!(root = %root.display(), error = %e, "Failed to stamp cache version");
    }
}
