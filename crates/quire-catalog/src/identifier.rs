//! Identifier extraction from filenames and URLs.

use std::sync::LazyLock;

use regex::Regex;

/// Only this many trailing characters of the last segment are inspected.
const HASH_TAIL_CHARS: usize = 18;

static HASH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]([a-z0-9]{10,15})$").expect("invalid hash id regex"));

/// Extract a trailing hash identifier from a filename, path or URL.
///
/// The identifier is the 10 to 15 character alphanumeric run at the end of
/// the last path segment, after a `-` or `_` separator. `.md` and `.php`
/// are ignored. The result is lowercase.
///
/// ```
/// use quire_catalog::parse_hash_id;
///
/// assert_eq!(
///     parse_hash_id("/blog/getting-started-ABC123def456").as_deref(),
///     Some("abc123def456"),
/// );
/// assert_eq!(parse_hash_id("2024-01-05-hello.md"), None);
/// ```
#[must_use]
pub fn parse_hash_id(source: &str) -> Option<String> {
    let trimmed = source.trim_end_matches(['/', '\\']);
    let segment = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    let name = segment.replace(".md", "").replace(".php", "");

    let start = name
        .char_indices()
        .rev()
        .nth(HASH_TAIL_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let tail = &name[start..];

    if !tail.contains(['-', '_']) {
        return None;
    }
    if !tail
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }

    let tail = tail.to_ascii_lowercase();
    HASH_ID_RE
        .captures(&tail)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(
            parse_hash_id("/srv/content/blog/my-post-abc1234567.md").as_deref(),
            Some("abc1234567")
        );
        assert_eq!(
            parse_hash_id("C:\\content\\my_post_abcdef123456.md").as_deref(),
            Some("abcdef123456")
        );
    }

    #[test]
    fn test_from_url() {
        assert_eq!(
            parse_hash_id("/blog/getting-started-abc123def456").as_deref(),
            Some("abc123def456")
        );
        assert_eq!(
            parse_hash_id("/blog/getting-started-abc123def456/").as_deref(),
            Some("abc123def456")
        );
        assert_eq!(
            parse_hash_id("/blog/page-abc123def4.php").as_deref(),
            Some("abc123def4")
        );
    }

    #[test]
    fn test_lowercases() {
        assert_eq!(
            parse_hash_id("post-ABCDEF12345").as_deref(),
            Some("abcdef12345")
        );
    }

    #[test]
    fn test_length_bounds() {
        // 9 characters: too short
        assert_eq!(parse_hash_id("post-abc123456"), None);
        // 15 characters: longest accepted
        assert_eq!(
            parse_hash_id("p-abcdefghij12345").as_deref(),
            Some("abcdefghij12345")
        );
        // 16 characters: the run is not preceded by a separator
        assert_eq!(parse_hash_id("p-abcdefghij123456"), None);
    }

    #[test]
    fn test_rejects_without_separator() {
        assert_eq!(parse_hash_id("abcdef123456"), None);
        assert_eq!(parse_hash_id(""), None);
        assert_eq!(parse_hash_id("/"), None);
    }

    #[test]
    fn test_rejects_other_characters() {
        assert_eq!(parse_hash_id("post-abc1234567?page=2"), None);
        assert_eq!(parse_hash_id("pöst-abc1234567"), None);
    }

    #[test]
    fn test_only_tail_is_inspected() {
        // Non-ASCII before the inspected tail does not matter.
        assert_eq!(
            parse_hash_id("überlange-überschrift-abc1234567").as_deref(),
            Some("abc1234567")
        );
    }
}
