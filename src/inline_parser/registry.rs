//! Priority-ordered registry of inline patterns.
//!
//! Entries are kept sorted by descending priority, so the scanner can walk
//! them in order and use the position as a tie-breaker.

use super::patterns::{Delimiter, InlinePattern, LinkKind, NestOrder};
use crate::config::Config;

/// Errors raised while assembling a pattern pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A pattern with this name is already registered
    DuplicateName(String),
    /// Another pattern already holds this priority
    DuplicatePriority {
        name: String,
        existing: String,
        priority: i32,
    },
    /// No pattern with this name is registered
    NotFound(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "inline pattern '{}' is already registered", name),
            Self::DuplicatePriority {
                name,
                existing,
                priority,
            } => write!(
                f,
                "cannot register '{}': priority {} is taken by '{}'",
                name, priority, existing
            ),
            Self::NotFound(name) => write!(f, "no inline pattern named '{}'", name),
        }
    }
}

impl std::error::Error for RegistryError {}

/// A registered pattern with its name and priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: InlinePattern,
    pub name: String,
    pub priority: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    entries: Vec<PatternEntry>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default inline pipeline, highest priority first.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (pattern, name, priority) in default_patterns() {
            registry.entries.push(PatternEntry {
                pattern,
                name: name.to_string(),
                priority,
            });
        }
        registry
    }

    /// The default pipeline with the patterns named in
    /// `config.disabled_patterns` removed.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::with_defaults();
        for name in &config.disabled_patterns {
            registry.deregister(name)?;
        }
        Ok(registry)
    }

    /// Add a pattern. Names and priorities must both be unique.
    pub fn register(
        &mut self,
        pattern: InlinePattern,
        name: impl Into<String>,
        priority: i32,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if let Some(existing) = self.entries.iter().find(|e| e.priority == priority) {
            return Err(RegistryError::DuplicatePriority {
                name,
                existing: existing.name.clone(),
                priority,
            });
        }

        log::debug!("Registering inline pattern '{}' at priority {}", name, priority);
        let at = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            PatternEntry {
                pattern,
                name,
                priority,
            },
        );
        Ok(())
    }

    /// Remove a pattern by name, returning its entry.
    pub fn deregister(&mut self, name: &str) -> Result<PatternEntry, RegistryError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        log::debug!("Deregistering inline pattern '{}'", name);
        Ok(self.entries.remove(idx))
    }

    pub fn get(&self, name: &str) -> Result<&InlinePattern, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.pattern)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Entries in descending priority order.
    pub fn ordered(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_patterns() -> [(InlinePattern, &'static str, i32); 19] {
    use Delimiter::{Star, Underscore};
    [
        (InlinePattern::Backtick, "backtick", 190),
        (InlinePattern::Escape, "escape", 180),
        (InlinePattern::Reference(LinkKind::Link), "reference", 170),
        (InlinePattern::Link(LinkKind::Link), "link", 160),
        (InlinePattern::Link(LinkKind::Image), "image_link", 150),
        (InlinePattern::Reference(LinkKind::Image), "image_reference", 140),
        (InlinePattern::ShortReference, "short_reference", 130),
        (InlinePattern::Autolink, "autolink", 120),
        (InlinePattern::Automail, "automail", 110),
        (InlinePattern::LineBreak, "linebreak", 100),
        (InlinePattern::RawHtml, "html", 90),
        (InlinePattern::Entity, "entity", 80),
        (InlinePattern::StrayDelimiter, "not_strong", 70),
        (InlinePattern::DoubleTag(NestOrder::StrongEm), "em_strong", 60),
        (InlinePattern::DoubleTag(NestOrder::EmStrong), "strong_em", 50),
        (InlinePattern::strong(Star), "strong", 40),
        (InlinePattern::emphasis(Star), "emphasis", 30),
        (InlinePattern::strong(Underscore), "strong2", 20),
        (InlinePattern::emphasis(Underscore), "emphasis2", 10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sorted_and_unique() {
        let registry = PatternRegistry::with_defaults();
        assert_eq!(registry.len(), 19);
        let priorities: Vec<i32> = registry.ordered().iter().map(|e| e.priority).collect();
        assert!(priorities.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(registry.ordered()[0].name, "backtick");
        assert_eq!(registry.ordered()[18].name, "emphasis2");
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut registry = PatternRegistry::with_defaults();
        let err = registry
            .register(InlinePattern::Escape, "escape", 500)
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("escape".to_string()));
    }

    #[test]
    fn test_register_rejects_duplicate_priority() {
        let mut registry = PatternRegistry::with_defaults();
        let err = registry
            .register(InlinePattern::Escape, "escape_again", 180)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePriority {
                name: "escape_again".to_string(),
                existing: "escape".to_string(),
                priority: 180,
            }
        );
        assert!(err.to_string().contains("priority 180"));
    }

    #[test]
    fn test_register_inserts_in_priority_order() {
        let mut registry = PatternRegistry::new();
        registry.register(InlinePattern::Escape, "low", 1).unwrap();
        registry.register(InlinePattern::Backtick, "high", 9).unwrap();
        registry.register(InlinePattern::Entity, "mid", 5).unwrap();
        let names: Vec<&str> = registry.ordered().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_get_and_deregister() {
        let mut registry = PatternRegistry::with_defaults();
        assert_eq!(registry.get("linebreak"), Ok(&InlinePattern::LineBreak));
        let removed = registry.deregister("linebreak").unwrap();
        assert_eq!(removed.priority, 100);
        assert_eq!(
            registry.get("linebreak"),
            Err(RegistryError::NotFound("linebreak".to_string()))
        );
        assert!(registry.deregister("linebreak").is_err());
    }

    #[test]
    fn test_from_config_drops_disabled_patterns() {
        let config = crate::config::ConfigBuilder::default()
            .disable_pattern("html")
            .disable_pattern("entity")
            .build();
        let registry = PatternRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 17);
        assert!(!registry.contains("html"));
    }

    #[test]
    fn test_from_config_unknown_name_fails() {
        let config = crate::config::ConfigBuilder::default()
            .disable_pattern("strikeout")
            .build();
        assert_eq!(
            PatternRegistry::from_config(&config).unwrap_err(),
            RegistryError::NotFound("strikeout".to_string())
        );
    }
}
