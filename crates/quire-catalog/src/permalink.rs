//! Slug and canonical URL construction.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Date or ordinal prefixes on filenames (`2024-01-05-`, `01_`).
static LEADING_ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\-_]+").expect("invalid ordinal prefix regex"));

/// Normalize free text into a URL slug.
///
/// Transliterates to ASCII, lowercases, collapses runs of other characters
/// into a single `-` and trims dashes from both ends.
#[must_use]
pub fn build_slug(raw: &str) -> String {
    slug::slugify(raw)
}

/// Slug for a document: explicit metadata slug, else the file stem without
/// its leading date or ordinal prefix.
#[must_use]
pub fn record_slug(meta_slug: &str, path: &Path) -> String {
    if !meta_slug.trim().is_empty() {
        return build_slug(meta_slug);
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    build_slug(&LEADING_ORDINAL_RE.replace(&stem, ""))
}

/// Join a slug and identifier into the final URL segment.
///
/// The identifier is appended unless it already occurs in the slug after a
/// `-` or `_` separator. An occurrence at the very start does not count.
#[must_use]
pub fn slug_with_identifier(slug: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        return build_slug(slug);
    }
    let append = match slug.find(identifier) {
        None | Some(0) => true,
        Some(pos) => !matches!(slug.as_bytes()[pos - 1], b'-' | b'_'),
    };
    if append {
        build_slug(&format!("{slug}-{identifier}"))
    } else {
        build_slug(slug)
    }
}

/// Inputs for [`build_url`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlParts<'a> {
    /// Site base path, e.g. `/` or `/en`.
    pub base_path: &'a str,
    /// Collection prefix, e.g. `/blog`.
    pub prefix: &'a str,
    /// Directory relative to the scan root; empty unless directories are preserved.
    pub relative_dir: &'a str,
    pub slug: &'a str,
    pub identifier: &'a str,
}

/// Build the canonical URL path for a document.
///
/// Always starts with `/`, never ends with one, and never contains empty
/// segments.
///
/// ```
/// use quire_catalog::{UrlParts, build_url};
///
/// let url = build_url(&UrlParts {
///     base_path: "/",
///     prefix: "/blog/",
///     slug: "hello-world",
///     identifier: "abc1234567",
///     ..UrlParts::default()
/// });
/// assert_eq!(url, "/blog/hello-world-abc1234567");
/// ```
#[must_use]
pub fn build_url(parts: &UrlParts<'_>) -> String {
    let last = slug_with_identifier(parts.slug, parts.identifier);
    let segments: Vec<&str> = [parts.base_path, parts.prefix, parts.relative_dir, &last]
        .into_iter()
        .flat_map(|part| part.split(['/', '\\']))
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_slug() {
        assert_eq!(build_slug("Hello, World!"), "hello-world");
        assert_eq!(build_slug("  --Crème brûlée--  "), "creme-brulee");
        assert_eq!(build_slug(""), "");
    }

    #[test]
    fn test_record_slug_from_filename() {
        assert_eq!(
            record_slug("", Path::new("/c/2024-01-05-hello.md")),
            "hello"
        );
        assert_eq!(
            record_slug("", Path::new("/c/01_Getting Started.md")),
            "getting-started"
        );
        assert_eq!(record_slug("", Path::new("/c/2024.md")), "");
    }

    #[test]
    fn test_record_slug_prefers_metadata() {
        assert_eq!(
            record_slug("My Custom Slug", Path::new("/c/2024-01-05-hello.md")),
            "my-custom-slug"
        );
        assert_eq!(
            record_slug("   ", Path::new("/c/hello.md")),
            "hello"
        );
    }

    #[test]
    fn test_identifier_appended_once() {
        assert_eq!(
            slug_with_identifier("my-post", "abc1234567"),
            "my-post-abc1234567"
        );
        assert_eq!(
            slug_with_identifier("my-post-abc1234567", "abc1234567"),
            "my-post-abc1234567"
        );
        assert_eq!(
            slug_with_identifier("my_post_abc1234567", "abc1234567"),
            "my-post-abc1234567"
        );
    }

    #[test]
    fn test_identifier_without_separator_is_appended() {
        assert_eq!(
            slug_with_identifier("postabc1234567", "abc1234567"),
            "postabc1234567-abc1234567"
        );
        assert_eq!(
            slug_with_identifier("abc1234567", "abc1234567"),
            "abc1234567-abc1234567"
        );
    }

    #[test]
    fn test_build_url_contains_identifier_once() {
        let url = build_url(&UrlParts {
            base_path: "/",
            prefix: "/blog",
            slug: "my-post-abc1234567",
            identifier: "abc1234567",
            ..UrlParts::default()
        });
        assert_eq!(url, "/blog/my-post-abc1234567");
        assert_eq!(url.matches("abc1234567").count(), 1);
    }

    #[test]
    fn test_build_url_collapses_separators() {
        let url = build_url(&UrlParts {
            base_path: "/site/",
            prefix: "//docs//",
            relative_dir: "guides/setup/",
            slug: "intro",
            identifier: "abc1234567",
        });
        assert_eq!(url, "/site/docs/guides/setup/intro-abc1234567");
    }

    #[test]
    fn test_build_url_empty_parts() {
        assert_eq!(build_url(&UrlParts::default()), "/");
    }

    #[test]
    fn test_round_trip_through_parse_hash_id() {
        let url = build_url(&UrlParts {
            base_path: "/",
            prefix: "/blog",
            slug: "release-notes",
            identifier: "f00dfacebeef",
            ..UrlParts::default()
        });
        assert_eq!(
            crate::parse_hash_id(&url).as_deref(),
            Some("f00dfacebeef")
        );
    }
}
