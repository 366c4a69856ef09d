//! Inline links `[text](href "title")` and images `![alt](src "title")`.
//!
//! The bracketed text may nest brackets. Link text is scanned again as
//! inline content; image alt text is flattened to a plain string.

use super::link_target::parse_link_target;
use super::patterns::{LinkKind, Outcome};
use super::{PatternSet, Preceding, ScanContext, Shield, preceding};
use crate::tree::Element;
use crate::utils::{collapse_whitespace, dequote, encode_escapes};

/// `[` that is not the second half of `![`.
pub fn is_link_start(text: &str, pos: usize, floor: usize) -> bool {
    text.as_bytes().get(pos) == Some(&b'[') && preceding(text, pos, floor) != Preceding::Char('!')
}

pub fn is_image_start(text: &str, pos: usize) -> bool {
    text.get(pos..).is_some_and(|rest| rest.starts_with("!["))
}

/// Parse bracketed text whose opening `[` ends just before `from`.
/// Returns the text and the offset just past the matching `]`.
///
/// Brackets inside a shielded span (a code span, say) do not count.
pub fn try_parse_bracketed_text<'a>(
    text: &'a str,
    from: usize,
    escapable: &[char],
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<(&'a str, usize)> {
    let mut depth = 1;
    let mut pos = from;

    while let Some(ch) = text.get(pos..)?.chars().next() {
        if let Some(end) = shield(pos) {
            pos = end;
            continue;
        }
        match ch {
            '\\' => {
                let next = text[pos + 1..].chars().next();
                if let Some(next) = next.filter(|c| escapable.contains(c)) {
                    pos += 1 + next.len_utf8();
                    continue;
                }
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[from..pos], pos + 1));
                }
            }
            _ => {}
        }
        pos += ch.len_utf8();
    }
    None
}

/// Offset just past the label's opening bracket, if `start` opens one.
pub(crate) fn label_start(text: &str, start: usize, floor: usize, kind: LinkKind) -> Option<usize> {
    match kind {
        LinkKind::Link => is_link_start(text, start, floor).then_some(start + 1),
        LinkKind::Image => is_image_start(text, start).then_some(start + 2),
    }
}

/// End of the inline link or image at `start`.
pub(crate) fn link_end(
    ctx: &ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    kind: LinkKind,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<usize> {
    let text_start = label_start(text, start, floor, kind)?;
    let (_, after) = try_parse_bracketed_text(text, text_start, ctx.escaped_chars(), shield)?;
    parse_link_target(text, after, ctx.escaped_chars()).map(|target| target.end)
}

/// Href as stored on the element: stash tokens resolved, escapes encoded.
pub fn clean_href(ctx: &ScanContext<'_>, raw: &str) -> String {
    let resolved = ctx.stash().resolve(raw);
    encode_escapes(resolved.trim(), ctx.escaped_chars())
}

/// Title as stored on the element: trimmed, unquoted, whitespace collapsed.
pub fn clean_title(ctx: &ScanContext<'_>, raw: &str) -> String {
    let resolved = ctx.stash().resolve(raw);
    let encoded = encode_escapes(resolved.trim(), ctx.escaped_chars());
    collapse_whitespace(dequote(&encoded))
}

pub(crate) fn handle_link(
    ctx: &mut ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    kind: LinkKind,
    here: usize,
    set: &PatternSet,
) -> Outcome {
    let Some(text_start) = label_start(text, start, floor, kind) else {
        return Outcome::Decline;
    };
    let label = {
        let shield = Shield::new(ctx, text, floor, set, here);
        try_parse_bracketed_text(text, text_start, ctx.escaped_chars(), &|at| shield.end_at(at))
    };
    let Some((label, after)) = label else {
        return Outcome::Decline;
    };
    let Some(target) = parse_link_target(text, after, ctx.escaped_chars()) else {
        return Outcome::Decline;
    };

    let href = clean_href(ctx, target.href);
    let title = target.title.map(|raw| clean_title(ctx, raw));

    let el = match kind {
        LinkKind::Link => {
            let mut el = Element::new("a").with_text(label);
            el.set("href", href);
            if let Some(title) = title {
                el.set("title", title);
            }
            el
        }
        LinkKind::Image => {
            let alt = ctx.flatten(label, &set.above(here));
            let mut el = Element::new("img");
            el.set("src", href);
            if let Some(title) = title {
                el.set("title", title);
            }
            el.set("alt", alt);
            el
        }
    };
    Outcome::Replace {
        end: target.end,
        fragment: el.into(),
    }
}
