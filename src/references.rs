//! Reference table consulted by reference-style links and images.
//!
//! The table is filled by whoever parses `[label]: url "title"` definitions
//! and is read-only while inline scanning runs. Labels are stored in
//! normalized form (lowercase, whitespace collapsed) so lookups are
//! case-insensitive.

use std::collections::HashMap;

/// A reference definition: where the label points and its optional title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub label: String,
    pub href: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    definitions: HashMap<String, Reference>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Add a definition. A later definition for the same label wins.
    pub fn insert(&mut self, label: impl Into<String>, href: impl Into<String>, title: Option<String>) {
        let label = label.into();
        let normalized = normalize_label(&label);
        self.definitions.insert(
            normalized,
            Reference {
                label,
                href: href.into(),
                title,
            },
        );
    }

    /// Look up a definition by label (case-insensitive).
    pub fn get(&self, label: &str) -> Option<&Reference> {
        self.definitions.get(&normalize_label(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.definitions.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Normalize a label for case-insensitive matching.
/// Collapses whitespace and converts to lowercase.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
