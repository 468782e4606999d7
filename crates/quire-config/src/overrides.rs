//! Flat `key = value` overrides on top of the loaded configuration.
//!
//! Keys are dotted paths: global keys (`cache`, `sort_by`, `per_page`, ...)
//! optionally prefixed with `catalog.`, and per-collection keys of the form
//! `collections.<id>.<field>`. Values that fail to parse are skipped with a
//! warning so a bad override degrades to the configured default.

use std::str::FromStr;

use crate::{Config, MAX_PARTIAL_READ_BYTES, ScanDirs, StorageKind, Toggle, expand};

impl Config {
    /// Apply several overrides in order. Later keys win.
    pub fn apply_overrides<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in pairs {
            if !self.apply_override(key, value) {
                tracing::warn!(key, value, "Ignoring configuration override");
            }
        }
    }

    /// Apply a single override. Returns `false` if the key is unknown or the
    /// value could not be parsed; the configuration is left unchanged then.
    pub fn apply_override(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim();
        let value = value.trim();

        if let Some(rest) = key.strip_prefix("collections.") {
            let Some((id, field)) = rest.rsplit_once('.') else {
                return false;
            };
            if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
                return false;
            }
            return self.apply_collection_override(id, field, value);
        }

        let key = key.strip_prefix("catalog.").unwrap_or(key);
        let catalog = &mut self.catalog;
        match key {
            "cache" => set_toggle(&mut catalog.cache, value),
            "cache_ttl_secs" => set_positive(&mut catalog.cache_ttl_secs, value),
            "cache_namespace" if !value.is_empty() => {
                catalog.cache_namespace = value.to_owned();
                true
            }
            "sort_by" => {
                catalog.sort_by = non_empty(value);
                true
            }
            "per_page" => set_positive(&mut catalog.per_page, value),
            "partial_read_bytes" => set_read_budget(&mut catalog.partial_read_bytes, value),
            "scan_timeout_ms" => match parse_positive::<u64>(value) {
                Some(ms) => {
                    catalog.scan_timeout_ms = Some(ms);
                    true
                }
                None => false,
            },
            "base_path" => {
                catalog.base_path = value.to_owned();
                true
            }
            "private_dir" => set_dir(&mut catalog.private_dir, value, "catalog.private_dir"),
            "public_dir" => set_dir(&mut catalog.public_dir, value, "catalog.public_dir"),
            "cache_dir" => set_dir(&mut catalog.cache_dir, value, "catalog.cache_dir"),
            _ => false,
        }
    }

    fn apply_collection_override(&mut self, id: &str, field: &str, value: &str) -> bool {
        let collection = self.collections.entry(id.to_owned()).or_default();
        match field {
            "cache" => set_toggle(&mut collection.cache, value),
            "sort_by" => {
                collection.sort_by = non_empty(value);
                true
            }
            "per_page" => match parse_positive::<usize>(value) {
                Some(n) => {
                    collection.per_page = Some(n);
                    true
                }
                None => false,
            },
            "url_prefix" => {
                collection.url_prefix = Some(value.to_owned());
                true
            }
            "storage" => match StorageKind::parse(value) {
                Some(kind) => {
                    collection.storage = Some(kind);
                    true
                }
                None => false,
            },
            "scan_dirs" => {
                let field = format!("collections.{id}.scan_dirs");
                let dirs: Result<Vec<_>, _> = ScanDirs::from_csv(value)
                    .0
                    .iter()
                    .map(|d| expand::expand_env(d, &field))
                    .collect();
                match dirs {
                    Ok(dirs) => {
                        collection.scan_dirs = ScanDirs(dirs);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to expand scan_dirs override");
                        false
                    }
                }
            }
            "preserve_dirs" => match Toggle::parse(value) {
                Toggle::Unset => false,
                toggle => {
                    collection.preserve_dirs = Some(toggle.resolve(false));
                    true
                }
            },
            _ => false,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn set_toggle(target: &mut Toggle, value: &str) -> bool {
    // An explicit empty value resets to unset; garbage is rejected.
    let toggle = Toggle::parse(value);
    if toggle == Toggle::Unset && !value.is_empty() {
        return false;
    }
    *target = toggle;
    true
}

fn parse_positive<T>(value: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    value.parse::<T>().ok().filter(|n| *n > T::default())
}

fn set_positive<T>(target: &mut T, value: &str) -> bool
where
    T: FromStr + PartialOrd + Default,
{
    match parse_positive(value) {
        Some(n) => {
            *target = n;
            true
        }
        None => false,
    }
}

fn set_read_budget(target: &mut usize, value: &str) -> bool {
    let Some(bytes) = parse_positive::<usize>(value) else {
        return false;
    };
    if bytes > MAX_PARTIAL_READ_BYTES {
        tracing::warn!(
            requested = bytes,
            max = MAX_PARTIAL_READ_BYTES,
            "partial_read_bytes too large, clamping"
        );
    }
    *target = bytes.min(MAX_PARTIAL_READ_BYTES);
    true
}

fn set_dir(target: &mut String, value: &str, field: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    match expand::expand_env(value, field) {
        Ok(expanded) => {
            *target = expanded;
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to expand directory override");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::{Config, MAX_PARTIAL_READ_BYTES, Toggle};

    fn config() -> Config {
        Config::default_with_base(Path::new("/site"))
    }

    #[test]
    fn test_global_overrides() {
        let mut config = config();
        config.apply_overrides([
            ("cache", "no"),
            ("catalog.sort_by", "title"),
            ("per_page", "25"),
            ("partial_read_bytes", "2048"),
            ("scan_timeout_ms", "100"),
        ]);

        assert_eq!(config.catalog.cache, Toggle::Disabled);
        assert_eq!(config.catalog.sort_by.as_deref(), Some("title"));
        assert_eq!(config.catalog.per_page, 25);
        assert_eq!(config.catalog.partial_read_bytes, 2048);
        assert_eq!(config.catalog.scan_timeout_ms, Some(100));
    }

    #[test]
    fn test_partial_read_bytes_is_clamped() {
        let mut config = config();
        assert!(config.apply_override("partial_read_bytes", "18446744073709551615"));
        assert_eq!(config.catalog.partial_read_bytes, MAX_PARTIAL_READ_BYTES);
        assert_eq!(
            config.collection("blog").partial_read_bytes,
            MAX_PARTIAL_READ_BYTES
        );

        assert!(!config.apply_override("partial_read_bytes", "0"));
        assert!(!config.apply_override("partial_read_bytes", "lots"));
        assert_eq!(config.catalog.partial_read_bytes, MAX_PARTIAL_READ_BYTES);
    }

    #[test]
    fn test_collection_overrides_create_collection() {
        let mut config = config();
        config.apply_overrides([
            ("collections.blog.cache", "disabled"),
            ("collections.blog.url_prefix", "/journal"),
            ("collections.blog.storage", "public"),
            ("collections.blog.scan_dirs", "a, b ,"),
            ("collections.blog.preserve_dirs", "yes"),
            ("collections.blog.per_page", "4"),
        ]);

        let blog = config.collection("blog");
        assert!(!blog.cache_enabled);
        assert_eq!(blog.url_prefix, "/journal");
        assert_eq!(blog.content_root, PathBuf::from("/site/public/blog"));
        assert_eq!(
            blog.extra_dirs,
            vec![PathBuf::from("/site/a"), PathBuf::from("/site/b")]
        );
        assert!(blog.preserve_dirs);
        assert_eq!(blog.per_page, 4);
    }

    #[test]
    fn test_invalid_values_degrade_to_existing() {
        let mut config = config();
        assert!(!config.apply_override("per_page", "abc"));
        assert!(!config.apply_override("per_page", "0"));
        assert!(!config.apply_override("per_page", "-3"));
        assert!(!config.apply_override("cache", "perhaps"));
        assert!(!config.apply_override("collections.blog.storage", "cloud"));
        assert!(!config.apply_override("collections.blog.per_page", "x"));
        assert!(!config.apply_override("unknown_key", "1"));
        assert!(!config.apply_override("collections.nofield", "1"));

        assert_eq!(config.catalog.per_page, 10);
        assert_eq!(config.catalog.cache, Toggle::Unset);
        assert_eq!(config.collection("blog").per_page, 10);
    }

    #[test]
    fn test_empty_toggle_resets_to_unset() {
        let mut config = config();
        assert!(config.apply_override("cache", "off"));
        assert!(config.apply_override("cache", ""));
        assert_eq!(config.catalog.cache, Toggle::Unset);
    }
}
