//! Delimiter-run matchers: `*em*`, `**strong**`, `_em_`, `__strong__`,
//! triple runs that nest both, lone delimiters that must stay literal, and
//! hard line breaks.
//!
//! Underscore runs only open after a non-word character and only close
//! before one, so `snake_case_name` stays plain text.

use super::patterns::{Delimiter, NestOrder, SimpleTag};
use super::{is_word_char, next_boundary, preceding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    pub end: usize,
    pub inner: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedMatch<'a> {
    pub end: usize,
    /// Content of the inner element
    pub inner: &'a str,
    /// Text after the inner element, still inside the outer one
    pub tail: &'a str,
}

/// Try to parse a fixed-width delimiter pair starting at `pos`.
///
/// `shield` gives the end of any span that outranks this tag; closing runs
/// inside such a span do not count.
pub fn try_parse_simple_tag<'a>(
    text: &'a str,
    pos: usize,
    floor: usize,
    tag: &SimpleTag,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<TagMatch<'a>> {
    if tag.width == 0 {
        return None;
    }
    let byte = tag.delimiter.as_byte();
    let bytes = text.as_bytes();
    let content_start = pos + tag.width;
    if content_start >= bytes.len() || !bytes[pos..content_start].iter().all(|&b| b == byte) {
        return None;
    }

    match (tag.delimiter, tag.width) {
        (Delimiter::Star, 1) => {
            // Content may not contain a bare delimiter at all.
            let mut at = content_start;
            while at < bytes.len() {
                if let Some(end) = shield(at) {
                    at = end;
                    continue;
                }
                if bytes[at] == byte {
                    if at == content_start {
                        return None;
                    }
                    return Some(TagMatch {
                        end: at + 1,
                        inner: &text[content_start..at],
                    });
                }
                at = next_boundary(text, at);
            }
            None
        }
        (Delimiter::Star, width) => {
            let from = step(text, content_start, shield);
            let close = find_run(text, from, byte, width, shield)?;
            Some(TagMatch {
                end: close + width,
                inner: &text[content_start..close],
            })
        }
        (Delimiter::Underscore, width) => {
            if !preceding(text, pos, floor).is_not(is_word_char) || bytes[content_start] == byte {
                return None;
            }
            let mut from = step(text, content_start, shield);
            while let Some(close) = find_run(text, from, byte, width, shield) {
                let after = text[close + width..].chars().next();
                if bytes[close - 1] != byte && !after.is_some_and(is_word_char) {
                    return Some(TagMatch {
                        end: close + width,
                        inner: &text[content_start..close],
                    });
                }
                from = next_boundary(text, close);
            }
            None
        }
    }
}

/// Try to parse a triple run whose closing runs nest two elements.
///
/// `***a*b**` closes the inner em after one delimiter and the outer strong
/// after two more; [`NestOrder::EmStrong`] is the mirror image.
pub fn try_parse_double_tag<'a>(
    text: &'a str,
    pos: usize,
    order: NestOrder,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<NestedMatch<'a>> {
    let bytes = text.as_bytes();
    let byte = *bytes.get(pos)?;
    if byte != b'*' && byte != b'_' {
        return None;
    }
    let content_start = pos + 3;
    if content_start >= bytes.len() || bytes[pos + 1] != byte || bytes[pos + 2] != byte {
        return None;
    }

    let (first_width, second_width) = order.close_widths();
    // Only the first inner close matters: any later one leaves less room
    // for the outer close.
    let first = find_run(text, step(text, content_start, shield), byte, first_width, shield)?;
    let second = find_run(text, first + first_width, byte, second_width, shield)?;
    Some(NestedMatch {
        end: second + second_width,
        inner: &text[content_start..first],
        tail: &text[first + first_width..second],
    })
}

/// Try to parse a lone `*` or `_` with whitespace (or the buffer edge) on
/// both sides. Returns the end of the span to keep literal.
pub fn try_parse_stray_delimiter(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let is_delim = |idx: usize| matches!(bytes.get(idx), Some(b'*') | Some(b'_'));

    if pos == 0
        && is_delim(0)
        && let Some(end) = whitespace_or_end(text, 1)
    {
        return Some(end);
    }

    let ws = text[pos..].chars().next().filter(|c| c.is_whitespace())?;
    let delim = pos + ws.len_utf8();
    if !is_delim(delim) {
        return None;
    }
    whitespace_or_end(text, delim + 1)
}

/// End of the whitespace (or end of buffer) after a lone delimiter.
fn whitespace_or_end(text: &str, pos: usize) -> Option<usize> {
    match text[pos..].chars().next() {
        Some(c) if c.is_whitespace() => Some(pos + c.len_utf8()),
        None => Some(pos),
        Some(_) => None,
    }
}

/// Two spaces and a newline force a line break.
pub fn try_parse_line_break(text: &str) -> Option<usize> {
    text.starts_with("  \n").then_some(3)
}

/// Past the shielded span at `pos`, or past one character.
fn step(text: &str, pos: usize, shield: &dyn Fn(usize) -> Option<usize>) -> usize {
    shield(pos).unwrap_or_else(|| next_boundary(text, pos))
}

/// First position at or after `from` holding `width` copies of `byte`,
/// outside shielded spans.
fn find_run(
    text: &str,
    from: usize,
    byte: u8,
    width: usize,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos + width <= bytes.len() {
        if let Some(end) = shield(pos) {
            pos = end;
            continue;
        }
        if bytes[pos..pos + width].iter().all(|&b| b == byte) {
            return Some(pos);
        }
        pos = next_boundary(text, pos);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline_parser::{InlinePattern, unshielded};

    fn simple(delimiter: Delimiter, width: usize) -> SimpleTag {
        let pattern = if width == 1 {
            InlinePattern::emphasis(delimiter)
        } else {
            InlinePattern::strong(delimiter)
        };
        match pattern {
            InlinePattern::SimpleTag(tag) => tag,
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    fn inner(text: &str, delimiter: Delimiter, width: usize) -> Option<&str> {
        try_parse_simple_tag(text, 0, 0, &simple(delimiter, width), &unshielded).map(|m| m.inner)
    }

    #[test]
    fn test_star_emphasis() {
        assert_eq!(inner("*foo* bar", Delimiter::Star, 1), Some("foo"));
        assert_eq!(inner("**", Delimiter::Star, 1), None);
        assert_eq!(inner("*foo", Delimiter::Star, 1), None);
    }

    #[test]
    fn test_star_strong_is_lazy() {
        assert_eq!(inner("**a** and **b**", Delimiter::Star, 2), Some("a"));
        assert_eq!(inner("**a*b**", Delimiter::Star, 2), Some("a*b"));
        assert_eq!(inner("****", Delimiter::Star, 2), None);
    }

    #[test]
    fn test_underscore_needs_word_boundaries() {
        assert_eq!(inner("_foo_ bar", Delimiter::Underscore, 1), Some("foo"));
        assert_eq!(inner("_foo_bar", Delimiter::Underscore, 1), None);
        assert_eq!(inner("_snake_case_", Delimiter::Underscore, 1), Some("snake_case"));
        let tag = simple(Delimiter::Underscore, 1);
        assert_eq!(try_parse_simple_tag("a_b_", 1, 0, &tag, &unshielded), None);
        // A replaced element before the run is not a word character.
        assert!(try_parse_simple_tag("a_b_", 1, 1, &tag, &unshielded).is_some());
    }

    #[test]
    fn test_underscore_strong() {
        assert_eq!(inner("__bold__ text", Delimiter::Underscore, 2), Some("bold"));
        assert_eq!(inner("___x__", Delimiter::Underscore, 2), None);
    }

    #[test]
    fn test_double_tag_strong_em() {
        let m = try_parse_double_tag("***a*b**", 0, NestOrder::StrongEm, &unshielded).unwrap();
        assert_eq!(m, NestedMatch { end: 8, inner: "a", tail: "b" });
        let m = try_parse_double_tag("***a***", 0, NestOrder::StrongEm, &unshielded).unwrap();
        assert_eq!(m, NestedMatch { end: 7, inner: "a", tail: "" });
    }

    #[test]
    fn test_double_tag_em_strong() {
        let m = try_parse_double_tag("___a__b_", 0, NestOrder::EmStrong, &unshielded).unwrap();
        assert_eq!(m, NestedMatch { end: 8, inner: "a", tail: "b" });
        assert_eq!(try_parse_double_tag("***a**", 0, NestOrder::EmStrong, &unshielded), None);
    }

    #[test]
    fn test_shielded_span_hides_closers() {
        // `\*` at 3..5 belongs to a higher-priority pattern.
        let shield = |pos: usize| (pos == 3).then_some(5);
        let tag = simple(Delimiter::Star, 1);
        let m = try_parse_simple_tag(r"*a \* b*", 0, 0, &tag, &shield).unwrap();
        assert_eq!(m, TagMatch { end: 8, inner: r"a \* b" });

        let code = |pos: usize| (pos == 4).then_some(8);
        let tag = simple(Delimiter::Star, 2);
        let m = try_parse_simple_tag("**a `**` b**", 0, 0, &tag, &code).unwrap();
        assert_eq!(m.inner, "a `**` b");
        assert_eq!(m.end, 12);
    }

    #[test]
    fn test_shielded_span_at_content_start() {
        let code = |pos: usize| (pos == 2).then_some(6);
        let tag = simple(Delimiter::Star, 2);
        let m = try_parse_simple_tag("**`**`**", 0, 0, &tag, &code).unwrap();
        assert_eq!(m.inner, "`**`");
    }

    #[test]
    fn test_double_tag_skips_shielded_span() {
        let code = |pos: usize| (pos == 5).then_some(8);
        let m = try_parse_double_tag("***a `*` b*c**", 0, NestOrder::StrongEm, &code).unwrap();
        assert_eq!(m, NestedMatch { end: 14, inner: "a `*` b", tail: "c" });
    }

    #[test]
    fn test_stray_delimiter() {
        assert_eq!(try_parse_stray_delimiter("* a", 0), Some(2));
        assert_eq!(try_parse_stray_delimiter("a * b", 1), Some(4));
        assert_eq!(try_parse_stray_delimiter("a _", 1), Some(3));
        assert_eq!(try_parse_stray_delimiter("a *b", 1), None);
        assert_eq!(try_parse_stray_delimiter("a*b", 1), None);
    }

    #[test]
    fn test_line_break() {
        assert_eq!(try_parse_line_break("  \nnext"), Some(3));
        assert_eq!(try_parse_line_break(" \n"), None);
    }
}
