//! Tri-state switches with layered precedence.

use serde::{Deserialize, Deserializer};

/// An on/off setting that may be left unset.
///
/// Settings are layered (collection over global over built-in default).
/// [`Toggle::Unset`] defers to the next layer; the first explicit value wins.
///
/// ```
/// use quire_config::Toggle;
///
/// let global = Toggle::Disabled;
/// let collection = Toggle::Unset;
/// assert!(!collection.or(global).resolve(true));
/// assert!(Toggle::Enabled.or(global).resolve(true));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl Toggle {
    /// Parse a loosely formatted switch value.
    ///
    /// `1`, `yes`, `true`, `on`, `enabled` enable; `0`, `no`, `false`, `off`,
    /// `disabled` disable (case-insensitive). Anything else, including the
    /// empty string, is [`Toggle::Unset`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" | "enabled" => Self::Enabled,
            "0" | "no" | "false" | "off" | "disabled" => Self::Disabled,
            _ => Self::Unset,
        }
    }

    /// Use `self` if set, otherwise `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        match self {
            Self::Unset => fallback,
            set => set,
        }
    }

    /// Collapse to a boolean, using `default` when unset.
    #[must_use]
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Self::Unset => default,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Self::Enabled } else { Self::Disabled }
    }
}

impl<'de> Deserialize<'de> for Toggle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => b.into(),
            Raw::Int(i) => (i != 0).into(),
            Raw::Str(s) => Self::parse(&s),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default)]
        cache: Toggle,
    }

    #[test]
    fn test_parse_values() {
        for on in ["1", "yes", "TRUE", "on", "Enabled"] {
            assert_eq!(Toggle::parse(on), Toggle::Enabled, "{on}");
        }
        for off in ["0", "no", "false", "OFF", "disabled"] {
            assert_eq!(Toggle::parse(off), Toggle::Disabled, "{off}");
        }
        for unset in ["", "  ", "maybe"] {
            assert_eq!(Toggle::parse(unset), Toggle::Unset, "{unset:?}");
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(Toggle::Unset.or(Toggle::Disabled), Toggle::Disabled);
        assert_eq!(Toggle::Enabled.or(Toggle::Disabled), Toggle::Enabled);
        assert_eq!(Toggle::Disabled.or(Toggle::Enabled), Toggle::Disabled);
        assert!(Toggle::Unset.or(Toggle::Unset).resolve(true));
    }

    #[test]
    fn test_deserialize_bool_int_and_string() {
        let h: Holder = toml::from_str("cache = false").unwrap();
        assert_eq!(h.cache, Toggle::Disabled);

        let h: Holder = toml::from_str("cache = 1").unwrap();
        assert_eq!(h.cache, Toggle::Enabled);

        let h: Holder = toml::from_str("cache = \"off\"").unwrap();
        assert_eq!(h.cache, Toggle::Disabled);

        let h: Holder = toml::from_str("").unwrap();
        assert_eq!(h.cache, Toggle::Unset);
    }
}
