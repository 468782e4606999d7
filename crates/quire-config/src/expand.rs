//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Unset variables without a default are an error naming the config field.
/// Bare `$VAR` is left alone so paths containing a literal `$` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_content_root() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUIRE_TEST_CONTENT", "/srv/content");
        }
        let result = expand_env("${QUIRE_TEST_CONTENT}/blog", "catalog.private_dir").unwrap();
        assert_eq!(result, "/srv/content/blog");
        unsafe {
            std::env::remove_var("QUIRE_TEST_CONTENT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_TEST_UNSET");
        }
        let result = expand_env("${QUIRE_TEST_UNSET:-posts}", "catalog.scan_dirs").unwrap();
        assert_eq!(result, "posts");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_TEST_MISSING");
        }
        let err = expand_env("${QUIRE_TEST_MISSING}", "collections.blog.scan_dirs").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("QUIRE_TEST_MISSING"));
        assert!(err.to_string().contains("collections.blog.scan_dirs"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("posts/$draft", "x").unwrap(), "posts/$draft");
    }
}
