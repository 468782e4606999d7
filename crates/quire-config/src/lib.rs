//! Configuration management for Quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! The file has a global `[catalog]` table and one `[collections.<id>]` table
//! per collection. Per-collection values take precedence over global ones;
//! [`Config::collection`] performs that resolution and returns the flattened
//! [`CollectionSettings`] the catalog works with.
//!
//! Flat `key = value` overrides (for example from the command line) are
//! applied with [`Config::apply_overrides`]. Unparsable override values are
//! ignored with a warning rather than rejected.
//!
//! ## Environment Variable Expansion
//!
//! Directory values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `catalog.private_dir`, `catalog.public_dir`, `catalog.cache_dir`
//! - `collections.<id>.scan_dirs`

mod expand;
mod overrides;
mod toggle;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub use toggle::Toggle;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Records per page when nothing else is configured.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Time-to-live of a cached collection index when nothing else is configured.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Bytes read from each file while building an index.
pub const DEFAULT_PARTIAL_READ_BYTES: usize = 512;

/// Upper bound for `partial_read_bytes`; matches the full-document read cap.
pub const MAX_PARTIAL_READ_BYTES: usize = 5 * 1024 * 1024;

/// Cache bucket holding collection indexes.
pub const DEFAULT_CACHE_NAMESPACE: &str = "quire-catalog";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the global cache toggle.
    pub cache_enabled: Option<bool>,
    /// Flat `key=value` overrides, applied in order.
    pub overrides: Vec<(String, String)>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global catalog settings.
    pub catalog: CatalogConfig,
    /// Per-collection settings keyed by collection id.
    pub collections: BTreeMap<String, CollectionConfig>,

    /// Directory relative paths are resolved against (set after loading).
    #[serde(skip)]
    pub base_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Global catalog settings (`[catalog]`).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Global cache switch.
    pub cache: Toggle,
    /// Lifetime of a cached index, in seconds.
    pub cache_ttl_secs: u64,
    /// Cache bucket name.
    pub cache_namespace: String,
    /// Directory for the file cache.
    pub cache_dir: String,
    /// Default sort field name.
    pub sort_by: Option<String>,
    /// Default records per page.
    pub per_page: usize,
    /// Frontmatter read budget while indexing.
    pub partial_read_bytes: usize,
    /// Abort directory scans that run longer than this.
    pub scan_timeout_ms: Option<u64>,
    /// Root of private collection storage.
    pub private_dir: String,
    /// Root of public collection storage.
    pub public_dir: String,
    /// Path every canonical URL starts with.
    pub base_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache: Toggle::Unset,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_owned(),
            cache_dir: ".quire/cache".to_owned(),
            sort_by: None,
            per_page: DEFAULT_PER_PAGE,
            partial_read_bytes: DEFAULT_PARTIAL_READ_BYTES,
            scan_timeout_ms: None,
            private_dir: ".quire/content".to_owned(),
            public_dir: "public".to_owned(),
            base_path: "/".to_owned(),
        }
    }
}

/// Per-collection settings (`[collections.<id>]`). Unset fields inherit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub cache: Toggle,
    pub sort_by: Option<String>,
    pub per_page: Option<usize>,
    /// URL segment between the base path and the document slug.
    /// Defaults to `/<collection id>`.
    pub url_prefix: Option<String>,
    pub storage: Option<StorageKind>,
    /// Extra roots scanned after the collection's default root.
    pub scan_dirs: ScanDirs,
    /// Mirror source subdirectories in URLs.
    pub preserve_dirs: Option<bool>,
}

/// Which storage root a collection's default content directory lives under.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Private,
    Public,
}

impl StorageKind {
    /// Parse `private` / `public` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// Directory list accepted either as a TOML array or a comma-separated string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanDirs(pub Vec<String>);

impl ScanDirs {
    /// Split a comma-separated list, dropping blank entries.
    #[must_use]
    pub fn from_csv(value: &str) -> Self {
        Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ScanDirs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Csv(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::List(dirs) => Self(
                dirs.into_iter()
                    .map(|d| d.trim().to_owned())
                    .filter(|d| !d.is_empty())
                    .collect(),
            ),
            Raw::Csv(csv) => Self::from_csv(&csv),
        })
    }
}

/// Fully resolved settings for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSettings {
    /// Collection id (e.g., "blog").
    pub id: String,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    /// Sort field name as configured; the catalog validates it.
    pub sort_by: Option<String>,
    pub per_page: usize,
    pub base_path: String,
    pub url_prefix: String,
    /// Default content root (`<private|public dir>/<id>`).
    pub content_root: PathBuf,
    /// Additional roots, scanned after `content_root`.
    pub extra_dirs: Vec<PathBuf>,
    pub preserve_dirs: bool,
    pub partial_read_bytes: usize,
    pub scan_timeout: Option<Duration>,
}

impl CollectionSettings {
    /// All roots to scan: the default root first, then the extra ones.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        std::iter::once(self.content_root.clone())
            .chain(self.extra_dirs.iter().cloned())
            .collect()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`collections.blog.scan_dirs`").
        field: String,
        /// Error message (e.g., "${`CONTENT_ROOT`} not set").
        message: String,
    },
}

/// Require a numeric field to be non-zero.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text, resolving paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, env expansion or validation fails.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.base_dir = base_dir.to_path_buf();
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(cache_enabled) = settings.cache_enabled {
            self.catalog.cache = cache_enabled.into();
        }
        self.apply_overrides(
            settings
                .overrides
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
    }

    /// Resolve the effective settings for a collection.
    ///
    /// Collections without a `[collections.<id>]` table get global values.
    #[must_use]
    pub fn collection(&self, id: &str) -> CollectionSettings {
        let fallback = CollectionConfig::default();
        let own = self.collections.get(id).unwrap_or(&fallback);
        let global = &self.catalog;

        let storage_dir = match own.storage.unwrap_or_default() {
            StorageKind::Private => &global.private_dir,
            StorageKind::Public => &global.public_dir,
        };

        CollectionSettings {
            id: id.to_owned(),
            cache_enabled: own.cache.or(global.cache).resolve(true),
            cache_ttl: Duration::from_secs(global.cache_ttl_secs),
            sort_by: own.sort_by.clone().or_else(|| global.sort_by.clone()),
            per_page: own.per_page.unwrap_or(global.per_page),
            base_path: global.base_path.clone(),
            url_prefix: own.url_prefix.clone().unwrap_or_else(|| format!("/{id}")),
            content_root: self.base_dir.join(storage_dir).join(id),
            extra_dirs: own.scan_dirs.0.iter().map(|d| self.base_dir.join(d)).collect(),
            preserve_dirs: own.preserve_dirs.unwrap_or(false),
            partial_read_bytes: global.partial_read_bytes.min(MAX_PARTIAL_READ_BYTES),
            scan_timeout: global.scan_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Directory for the file-based cache.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join(&self.catalog.cache_dir)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            catalog: CatalogConfig::default(),
            collections: BTreeMap::new(),
            base_dir: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.catalog.per_page as u64, "catalog.per_page")?;
        require_positive(self.catalog.cache_ttl_secs, "catalog.cache_ttl_secs")?;
        require_positive(
            self.catalog.partial_read_bytes as u64,
            "catalog.partial_read_bytes",
        )?;
        if self.catalog.partial_read_bytes > MAX_PARTIAL_READ_BYTES {
            return Err(ConfigError::Validation(format!(
                "catalog.partial_read_bytes cannot exceed {MAX_PARTIAL_READ_BYTES}"
            )));
        }
        if self.catalog.cache_namespace.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog.cache_namespace cannot be empty".to_owned(),
            ));
        }

        for (id, collection) in &self.collections {
            if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "invalid collection id: {id:?}"
                )));
            }
            if let Some(per_page) = collection.per_page {
                require_positive(per_page as u64, &format!("collections.{id}.per_page"))?;
            }
        }

        Ok(())
    }

    /// Expand environment variable references in directory values.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let catalog = &mut self.catalog;
        catalog.private_dir = expand::expand_env(&catalog.private_dir, "catalog.private_dir")?;
        catalog.public_dir = expand::expand_env(&catalog.public_dir, "catalog.public_dir")?;
        catalog.cache_dir = expand::expand_env(&catalog.cache_dir, "catalog.cache_dir")?;

        for (id, collection) in &mut self.collections {
            let field = format!("collections.{id}.scan_dirs");
            for dir in &mut collection.scan_dirs.0 {
                *dir = expand::expand_env(dir, &field)?;
            }
        }

        Ok(())
    }
}
