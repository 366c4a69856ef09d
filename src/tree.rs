//! Inline markup nodes produced by the scanner.
//!
//! The model follows the element/text/tail shape used by XML-ish trees: an
//! element owns optional leading `text`, ordered `children`, and each child
//! may carry a `tail` holding the text between it and its next sibling.

/// A markup node such as `em`, `a`, `img` or `code`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub text: Option<String>,
    /// When set, `text` is final and never scanned by any matcher.
    pub atomic: bool,
    pub children: Vec<Element>,
    pub tail: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set text that later matchers must not touch (code spans, autolinks).
    pub fn with_atomic_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self.atomic = true;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Concatenated text of this element and its descendants, excluding the
    /// element's own tail.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
            if let Some(tail) = &child.tail {
                out.push_str(tail);
            }
        }
    }

    /// Append text after the current content: into `text` when there are no
    /// children yet, otherwise onto the last child's tail.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let slot = match self.children.last_mut() {
            Some(last) => &mut last.tail,
            None => &mut self.text,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    /// Append scanner output as content of this element.
    pub fn extend_fragments(&mut self, fragments: impl IntoIterator<Item = Fragment>) {
        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => self.push_text(&text),
                Fragment::Element(element) => self.children.push(element),
            }
        }
    }
}

/// One piece of scanner output: residual text or a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Element(Element),
}

impl Fragment {
    pub fn text_content(&self) -> String {
        match self {
            Fragment::Text(text) => text.clone(),
            Fragment::Element(element) => element.text_content(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(text),
            Fragment::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Fragment::Text(_) => None,
            Fragment::Element(element) => Some(element),
        }
    }
}

impl From<Element> for Fragment {
    fn from(element: Element) -> Self {
        Fragment::Element(element)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

/// Flatten a fragment sequence to plain text.
pub fn fragments_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::text_content).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_includes_child_tails() {
        let mut em = Element::new("em").with_text("a");
        em.tail = Some("b".to_string());
        let strong = Element::new("strong").with_child(em);
        assert_eq!(strong.text_content(), "ab");
    }

    #[test]
    fn test_text_content_excludes_own_tail() {
        let mut el = Element::new("em").with_text("x");
        el.tail = Some("y".to_string());
        assert_eq!(el.text_content(), "x");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut a = Element::new("a");
        a.set("href", "/one");
        a.set("title", "t");
        a.set("href", "/two");
        let attrs: Vec<_> = a.attributes().collect();
        assert_eq!(attrs, vec![("href", "/two"), ("title", "t")]);
    }

    #[test]
    fn test_extend_fragments_places_text_and_tails() {
        let mut parent = Element::new("a");
        parent.extend_fragments(vec![
            Fragment::Text("lead ".into()),
            Fragment::Element(Element::new("em").with_text("x")),
            Fragment::Text(" trail".into()),
            Fragment::Text("!".into()),
        ]);
        assert_eq!(parent.text.as_deref(), Some("lead "));
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].tail.as_deref(), Some(" trail!"));
    }

    #[test]
    fn test_push_empty_text_is_noop() {
        let mut el = Element::new("em");
        el.push_text("");
        assert_eq!(el.text, None);
    }
}
