//! Raw inline HTML and character entities. Both are stashed verbatim and
//! replaced by a placeholder token so no later matcher looks inside them.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#[0-9]+|#x[0-9a-fA-F]+|[a-zA-Z0-9]+);").unwrap());

/// Try to parse a tag (`<a href="x">`, `</a>`) or a comment at the start of
/// `text`. Returns the byte length of the markup.
pub fn try_parse_raw_html(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    match bytes.get(1) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'/' => {
            let close = bytes[2..].iter().position(|&b| b == b'<' || b == b'>')? + 2;
            (bytes[close] == b'>').then_some(close + 1)
        }
        Some(b'!') if text.starts_with("<!--") => try_parse_comment(text),
        _ => None,
    }
}

/// A comment ends at the first `-->` and may not contain another `<!--`.
fn try_parse_comment(text: &str) -> Option<usize> {
    let body = &text[4..];
    let close = body.find("-->")?;
    if body.find("<!--").is_some_and(|nested| nested < close) {
        return None;
    }
    Some(4 + close + 3)
}

/// Find the first entity at or after `from`.
/// Returns its start and end byte offsets.
pub fn try_parse_entity(text: &str, from: usize) -> Option<(usize, usize)> {
    ENTITY_RE.find_at(text, from).map(|m| (m.start(), m.end()))
}
