//! YAML frontmatter parsing for markdown files.
//!
//! A document starts with a `---` line, followed by YAML metadata, closed by
//! a `---` (or `...`) line. Everything after the closing line is the body.
//! Files without an opening delimiter have empty metadata and are all body.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

/// Upper bound on bytes read for a full document.
pub const FULL_READ_LIMIT: usize = 5 * 1024 * 1024;

/// How much of a file to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Read at most this many bytes, never more than [`FULL_READ_LIMIT`].
    Partial(usize),
    /// Read the whole file, capped at [`FULL_READ_LIMIT`].
    Full,
}

impl ReadMode {
    fn limit(self) -> usize {
        match self {
            Self::Partial(bytes) => bytes.min(FULL_READ_LIMIT),
            Self::Full => FULL_READ_LIMIT,
        }
    }
}

/// Parsed metadata and body of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub meta: HashMap<String, Value>,
    pub body: String,
}

/// Frontmatter parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frontmatter is not closed")]
    Unterminated,

    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error("frontmatter is not a mapping")]
    NotAMapping,
}

/// Reads a document file into metadata and body.
pub trait FrontmatterParser: Send + Sync {
    fn parse(&self, path: &Path, mode: ReadMode) -> Result<Frontmatter, FrontmatterError>;
}

/// Default parser: YAML between `---` fences.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontmatter;

impl FrontmatterParser for YamlFrontmatter {
    fn parse(&self, path: &Path, mode: ReadMode) -> Result<Frontmatter, FrontmatterError> {
        let (text, truncated) = read_prefix(path, mode.limit())?;
        if truncated && mode == ReadMode::Full {
            tracing::warn!(
                path = %path.display(),
                limit = FULL_READ_LIMIT,
                "Document truncated at read limit"
            );
        }
        parse_str(&text, truncated)
    }
}

/// Read at most `limit` bytes. Returns the text and whether more remained.
fn read_prefix(path: &Path, limit: usize) -> Result<(String, bool), std::io::Error> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    // One byte past the limit tells a cut-off file from one that fits exactly
    let budget = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    file.take(budget).read_to_end(&mut buf)?;

    let truncated = buf.len() > limit;
    buf.truncate(limit);
    Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
}

/// Split and parse frontmatter from document text.
///
/// `truncated` marks text cut off at a byte budget. An unclosed fence is
/// then tolerated: the last, possibly partial, line is dropped and the
/// complete lines before it are parsed as metadata.
pub fn parse_str(text: &str, truncated: bool) -> Result<Frontmatter, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(rest) = strip_fence_line(text, "---") else {
        return Ok(Frontmatter {
            meta: HashMap::new(),
            body: text.to_owned(),
        });
    };

    let (yaml, body) = match find_closing_fence(rest) {
        Some((yaml_end, body_start)) => (&rest[..yaml_end], &rest[body_start..]),
        None if truncated => {
            let complete = rest.rfind('\n').map_or("", |i| &rest[..i]);
            (complete, "")
        }
        None => return Err(FrontmatterError::Unterminated),
    };

    Ok(Frontmatter {
        meta: parse_yaml(yaml)?,
        body: body.to_owned(),
    })
}

/// If `text` starts with a line equal to `fence`, return what follows it.
fn strip_fence_line<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(fence)?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix('\n')
}

/// Locate the closing fence. Returns (end of YAML, start of body).
fn find_closing_fence(rest: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content == "---" || content == "..." {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

fn parse_yaml(yaml: &str) -> Result<HashMap<String, Value>, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;

    let mapping = match value {
        serde_yaml::Value::Null => return Ok(HashMap::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => return Err(FrontmatterError::NotAMapping),
    };

    let mut meta = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        match serde_json::to_value(&value) {
            Ok(value) => {
                meta.insert(key, value);
            }
            Err(e) => tracing::debug!(key, error = %e, "Skipping unrepresentable metadata value"),
        }
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_simple_frontmatter() {
        let text = "---\ntitle: Hello\nhash_id: abcdef1234\ntags: [a, b]\n---\n# Body\n";
        let fm = parse_str(text, false).unwrap();
        assert_eq!(fm.meta["title"], json!("Hello"));
        assert_eq!(fm.meta["hash_id"], json!("abcdef1234"));
        assert_eq!(fm.meta["tags"], json!(["a", "b"]));
        assert_eq!(fm.body, "# Body\n");
    }

    #[test]
    fn test_no_frontmatter_is_all_body() {
        let fm = parse_str("# Just markdown\n\ntext", false).unwrap();
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, "# Just markdown\n\ntext");
    }

    #[test]
    fn test_dashes_not_on_own_line_are_body() {
        let fm = parse_str("----\ntitle: x\n", false).unwrap();
        assert!(fm.meta.is_empty());
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody";
        let fm = parse_str(text, false).unwrap();
        assert_eq!(fm.meta["title"], json!("Windows"));
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_dot_closing_fence() {
        let fm = parse_str("---\ntitle: Dots\n...\nBody", false).unwrap();
        assert_eq!(fm.meta["title"], json!("Dots"));
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_empty_frontmatter() {
        let fm = parse_str("---\n---\nBody", false).unwrap();
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_unterminated_is_error_when_complete() {
        let err = parse_str("---\ntitle: Open\n", false).unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }

    #[test]
    fn test_truncated_drops_partial_line() {
        let text = "---\ntitle: Cut\nhash_id: abc123defg\ndescription: \"unfinis";
        let fm = parse_str(text, true).unwrap();
        assert_eq!(fm.meta["title"], json!("Cut"));
        assert_eq!(fm.meta["hash_id"], json!("abc123defg"));
        assert!(!fm.meta.contains_key("description"));
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = parse_str("---\n- a\n- b\n---\n", false).unwrap_err();
        assert!(matches!(err, FrontmatterError::NotAMapping));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let err = parse_str("---\ntitle: [unclosed\n---\n", false).unwrap_err();
        assert!(matches!(err, FrontmatterError::Yaml(_)));
    }

    #[test]
    fn test_numeric_keys_and_values() {
        let text = "---\n1: one\nsort_order: 5\nid: 12345\n---\n";
        let fm = parse_str(text, false).unwrap();
        assert_eq!(fm.meta["1"], json!("one"));
        assert_eq!(fm.meta["sort_order"], json!(5));
        assert_eq!(fm.meta["id"], json!(12345));
    }

    #[test]
    fn test_parser_partial_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("post.md");
        let body = "x".repeat(4096);
        std::fs::write(&path, format!("---\ntitle: Big\n---\n{body}")).unwrap();

        let partial = YamlFrontmatter.parse(&path, ReadMode::Partial(512)).unwrap();
        assert_eq!(partial.meta["title"], json!("Big"));
        assert!(partial.body.len() < 512);

        let full = YamlFrontmatter.parse(&path, ReadMode::Full).unwrap();
        assert_eq!(full.body, body);
    }

    #[test]
    fn test_parser_partial_read_inside_frontmatter() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("post.md");
        let padding = "y".repeat(600);
        std::fs::write(&path, format!("---\ntitle: Early\nnotes: {padding}\n---\nBody")).unwrap();

        let fm = YamlFrontmatter.parse(&path, ReadMode::Partial(64)).unwrap();
        assert_eq!(fm.meta["title"], json!("Early"));
        assert!(!fm.meta.contains_key("notes"));
    }

    #[test]
    fn test_partial_budget_beyond_full_limit() {
        assert_eq!(ReadMode::Partial(usize::MAX).limit(), FULL_READ_LIMIT);
        assert_eq!(ReadMode::Partial(512).limit(), 512);

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("post.md");
        std::fs::write(&path, "---\ntitle: Huge budget\n---\nBody\n").unwrap();

        let fm = YamlFrontmatter
            .parse(&path, ReadMode::Partial(usize::MAX))
            .unwrap();
        assert_eq!(fm.meta["title"], json!("Huge budget"));
        assert_eq!(fm.body, "Body\n");

        let (text, truncated) = read_prefix(&path, usize::MAX).unwrap();
        assert!(!truncated);
        assert!(text.ends_with("Body\n"));
    }

    #[test]
    fn test_parser_missing_file() {
        let err = YamlFrontmatter
            .parse(Path::new("/nonexistent/post.md"), ReadMode::Full)
            .unwrap_err();
        assert!(matches!(err, FrontmatterError::Io(_)));
    }
}
