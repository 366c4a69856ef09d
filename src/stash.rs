//! Placeholder stash for content that must bypass later matchers.
//!
//! Raw HTML and entities are stored here during a scan and replaced in the
//! output by a `SOH <index> EOT` token. The serializer substitutes the tokens
//! back with [`Stash::resolve`].

use crate::tree::Element;
use crate::utils::{PLACEHOLDER_END, PLACEHOLDER_START};

/// A value held in the stash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stashed {
    Text(String),
    Element(Element),
}

impl Stashed {
    /// The plain-text form used when a token is resolved.
    pub fn text_content(&self) -> String {
        match self {
            Stashed::Text(text) => text.clone(),
            Stashed::Element(element) => element.text_content(),
        }
    }
}

impl From<String> for Stashed {
    fn from(text: String) -> Self {
        Stashed::Text(text)
    }
}

impl From<&str> for Stashed {
    fn from(text: &str) -> Self {
        Stashed::Text(text.to_string())
    }
}

impl From<Element> for Stashed {
    fn from(element: Element) -> Self {
        Stashed::Element(element)
    }
}

/// Build the token for a stash index.
pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_START}{index}{PLACEHOLDER_END}")
}

/// Append-only store, one per conversion run.
#[derive(Debug, Clone, Default)]
pub struct Stash {
    entries: Vec<Stashed>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value and return its placeholder token.
    ///
    /// Tokens already present in stored text are resolved first, so a
    /// single [`Stash::resolve`] pass never yields new tokens.
    pub fn store(&mut self, value: impl Into<Stashed>) -> String {
        let value = match value.into() {
            Stashed::Text(text) => Stashed::Text(self.resolve(&text)),
            element => element,
        };
        let index = self.entries.len();
        self.entries.push(value);
        placeholder(index)
    }

    pub fn get(&self, index: usize) -> Option<&Stashed> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stashed> {
        self.entries.iter()
    }

    /// Drop every entry. Called at the start of a conversion run.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace every known placeholder token in `text` with its value.
    ///
    /// Unknown or malformed tokens are copied through unchanged.
    pub fn resolve(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(PLACEHOLDER_START) {
            out.push_str(&rest[..start]);
            let after = &rest[start + PLACEHOLDER_START.len_utf8()..];
            match self.lookup_token(after) {
                Some((value, consumed)) => {
                    out.push_str(&value.text_content());
                    rest = &after[consumed..];
                }
                None => {
                    out.push(PLACEHOLDER_START);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn lookup_token(&self, after_start: &str) -> Option<(&Stashed, usize)> {
        let end = after_start.find(PLACEHOLDER_END)?;
        let digits = &after_start[..end];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = self.get(digits.parse().ok()?)?;
        Some((value, end + PLACEHOLDER_END.len_utf8()))
    }
}
