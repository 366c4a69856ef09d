//! Marker characters shared between the inline scanner and the serializer.
//!
//! Two control envelopes are in use and neither appears in text that has
//! been through the upstream escaping layer:
//!
//! - `STX <code point> ETX` carries a backslash-escaped character.
//! - `SOH <stash index> EOT` is a placeholder for a stashed value (see
//!   [`crate::stash`]).
//!
//! `STX amp ETX` stands in for `&` inside obfuscated email links.

/// Start of an inline escape marker.
pub const STX: char = '\u{2}';
/// End of an inline escape marker.
pub const ETX: char = '\u{3}';
/// Start of a stash placeholder token.
pub const PLACEHOLDER_START: char = '\u{1}';
/// End of a stash placeholder token.
pub const PLACEHOLDER_END: char = '\u{4}';
/// Private stand-in for `&`, swapped back by [`substitute_ampersands`].
pub const AMP_SUBSTITUTE: &str = "\u{2}amp\u{3}";

/// Encode a single escaped character as an inline marker.
pub fn escape_marker(ch: char) -> String {
    format!("{STX}{}{ETX}", ch as u32)
}

/// Replace every `\c` whose `c` is escapable with the inline marker for `c`.
///
/// Used for attribute values (href, title, alt) that are taken straight from
/// the buffer and never pass through the escape matcher.
pub fn encode_escapes(text: &str, escapable: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && escapable.contains(&next)
        {
            chars.next();
            out.push_str(&escape_marker(next));
            continue;
        }
        out.push(ch);
    }
    out
}

/// Decode every `STX <code point> ETX` marker back into its character.
///
/// Markers whose payload is not a valid code point are left untouched, so
/// [`AMP_SUBSTITUTE`] survives this pass.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(STX) {
        out.push_str(&rest[..start]);
        let after = &rest[start + STX.len_utf8()..];
        let decoded = after.find(ETX).and_then(|end| {
            let payload = &after[..end];
            if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let ch = payload.parse::<u32>().ok().and_then(char::from_u32)?;
            Some((ch, end + ETX.len_utf8()))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &after[consumed..];
            }
            None => {
                out.push(STX);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Swap the private ampersand marker for a literal `&`.
pub fn substitute_ampersands(text: &str) -> String {
    text.replace(AMP_SUBSTITUTE, "&")
}

/// Escape the HTML-significant characters of code span content.
pub fn code_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Collapse every whitespace run into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Remove one pair of matching surrounding quotes (`"` or `'`).
pub fn dequote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
