use serde::{Deserialize, Serialize};

/// Pattern used for temporal fields that declare no format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Key naming the schema of a list element whose type is not declared.
pub const DEFAULT_TYPE_TAG: &str = "@type";

/// Language of rendered change messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    /// `Name changed from [a] to [b]`
    #[default]
    En,
    /// `Name 由 [a] 变更成 [b]`
    ZhCn,
}

/// Configuration for a [`Differ`](crate::Differ).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// `strftime` pattern for temporal fields without their own format.
    pub default_date_format: String,
    /// Object key consulted when a list's element type is undeclared.
    pub type_tag: String,
    /// Language of rendered messages.
    pub locale: Locale,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            default_date_format: DEFAULT_DATE_FORMAT.to_string(),
            type_tag: DEFAULT_TYPE_TAG.to_string(),
            locale: Locale::En,
        }
    }
}

impl DiffConfig {
    /// Default configuration rendering messages in the given locale.
    pub fn with_locale(locale: Locale) -> Self {
        Self {
            locale,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: DiffConfig = serde_json::from_str(r#"{"locale":"zh-cn"}"#).unwrap();
        assert_eq!(config.locale, Locale::ZhCn);
        assert_eq!(config.default_date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.type_tag, DEFAULT_TYPE_TAG);
    }
}
