//! Test-only helpers: a minimal HTML renderer for scanner output and a
//! reader for `[label]: href "title"` definition lines.

#![allow(dead_code)]

use std::sync::LazyLock;

use panache_inline::utils::{substitute_ampersands, unescape};
use panache_inline::{Element, Fragment, ParsedInline, ReferenceTable, Stash};
use regex::Regex;

static ENTITY_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#[0-9]+|#x[0-9a-fA-F]+|[a-zA-Z0-9]+);").unwrap());

static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[([^\]]+)\]:\s*(\S+)(?:\s+"([^"]*)")?\s*$"#).unwrap());

const VOID_TAGS: &[&str] = &["br", "img"];

/// Split a test document into inline text and reference definitions.
/// Blank lines are dropped.
pub fn read_document(input: &str) -> (String, ReferenceTable) {
    let mut references = ReferenceTable::new();
    let mut lines = Vec::new();
    for line in input.lines() {
        if let Some(caps) = DEFINITION_RE.captures(line) {
            references.insert(
                &caps[1],
                &caps[2],
                caps.get(3).map(|m| m.as_str().to_string()),
            );
        } else if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    (lines.join("\n"), references)
}

pub fn render(parsed: &ParsedInline) -> String {
    let mut out = String::new();
    for fragment in &parsed.fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(&render_text(text, &parsed.stash, false)),
            Fragment::Element(el) => render_element(el, &parsed.stash, &mut out),
        }
    }
    out
}

fn render_element(el: &Element, stash: &Stash, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in el.attributes() {
        out.push_str(&format!(" {}=\"{}\"", name, render_text(value, stash, true)));
    }
    if VOID_TAGS.contains(&el.tag.as_str()) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    if let Some(text) = &el.text {
        out.push_str(&render_text(text, stash, false));
    }
    for child in &el.children {
        render_element(child, stash, out);
        if let Some(tail) = &child.tail {
            out.push_str(&render_text(tail, stash, false));
        }
    }
    out.push_str(&format!("</{}>", el.tag));
}

/// Decode escape markers, escape markup characters, then put stashed raw
/// HTML back in.
fn render_text(text: &str, stash: &Stash, attribute: bool) -> String {
    let escaped = escape_html(&unescape(text), attribute);
    substitute_ampersands(&stash.resolve(&escaped))
}

fn escape_html(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if ENTITY_TAIL_RE.is_match(&text[idx + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
