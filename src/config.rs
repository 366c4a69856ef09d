use serde::Deserialize;

/// Characters that a backslash turns into literals by default.
pub const DEFAULT_ESCAPED_CHARS: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '>', '#', '+', '-', '.', '!',
];

/// Inline scanning configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Characters a preceding backslash escapes. Anything else keeps its
    /// backslash.
    pub escaped_chars: Vec<char>,
    /// Names of default patterns to leave out of the pipeline, e.g.
    /// `["html", "entity"]`.
    pub disabled_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escaped_chars: DEFAULT_ESCAPED_CHARS.to_vec(),
            disabled_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Read a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Config>(s).map_err(|e| ConfigError(e.to_string()))?;
        log::debug!(
            "Config: {} escapable chars, disabled patterns {:?}",
            config.escaped_chars.len(),
            config.disabled_patterns
        );
        Ok(config)
    }

    pub fn is_escapable(&self, ch: char) -> bool {
        self.escaped_chars.contains(&ch)
    }
}

/// TOML that does not describe a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid inline config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Default, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn escaped_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.config.escaped_chars = chars.into_iter().collect();
        self
    }

    pub fn escape_char(mut self, ch: char) -> Self {
        if !self.config.escaped_chars.contains(&ch) {
            self.config.escaped_chars.push(ch);
        }
        self
    }

    pub fn disable_pattern(mut self, name: impl Into<String>) -> Self {
        self.config.disabled_patterns.push(name.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let cfg = Config::from_toml_str("disabled_patterns = [\"html\"]").unwrap();
        assert_eq!(cfg.escaped_chars, DEFAULT_ESCAPED_CHARS);
        assert_eq!(cfg.disabled_patterns, vec!["html".to_string()]);
    }

    #[test]
    fn test_escaped_chars_from_toml() {
        let cfg = Config::from_toml_str(r#"escaped_chars = ["*", "\\", "~"]"#).unwrap();
        assert!(cfg.is_escapable('~'));
        assert!(cfg.is_escapable('\\'));
        assert!(!cfg.is_escapable('_'));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_multi_char_string_is_rejected() {
        let err = Config::from_toml_str(r#"escaped_chars = ["ab"]"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid inline config"));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(Config::from_toml_str("escaped_chars = 3").is_err());
    }

    #[test]
    fn test_builder_adds_without_duplicates() {
        let cfg = ConfigBuilder::default()
            .escape_char('~')
            .escape_char('*')
            .disable_pattern("entity")
            .build();
        assert_eq!(cfg.escaped_chars.iter().filter(|&&c| c == '*').count(), 1);
        assert!(cfg.is_escapable('~'));
        assert_eq!(cfg.disabled_patterns, vec!["entity".to_string()]);
    }
}
