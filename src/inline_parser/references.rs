//! Reference links `[text][id]`, `[text][]`, `[text]` and reference images
//! `![alt][id]`, resolved against the [`ReferenceTable`].
//!
//! An id missing from the table is not an error: the whole span stays
//! literal text and scanning continues after it.
//!
//! [`ReferenceTable`]: crate::references::ReferenceTable

use std::sync::LazyLock;

use regex::Regex;

use super::links::{label_start, try_parse_bracketed_text};
use super::patterns::{LinkKind, Outcome};
use super::{PatternSet, ScanContext, Shield};
use crate::tree::Element;
use crate::utils::collapse_whitespace;

/// Optional single whitespace, then `[id]`.
static REFERENCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s?\[([^\]]*)\]").unwrap());

/// Parse the `[id]` that follows the link text at `index`.
/// Returns the id (the lowercased text when empty) and the span end.
pub fn try_parse_reference_id(text: &str, index: usize, label: &str) -> Option<(String, usize)> {
    let caps = REFERENCE_ID_RE.captures(text.get(index..)?)?;
    let end = index + caps.get(0)?.end();
    let id = caps.get(1)?.as_str().to_lowercase();
    if id.is_empty() {
        Some((label.to_lowercase(), end))
    } else {
        Some((id, end))
    }
}

/// Label and id of the reference span at `start`, and the span end.
fn parse_full<'t>(
    ctx: &ScanContext<'_>,
    text: &'t str,
    start: usize,
    floor: usize,
    kind: LinkKind,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<(&'t str, String, usize)> {
    let text_start = label_start(text, start, floor, kind)?;
    let (label, after) = try_parse_bracketed_text(text, text_start, ctx.escaped_chars(), shield)?;
    let (id, end) = try_parse_reference_id(text, after, label)?;
    Some((label, id, end))
}

fn parse_short<'t>(
    ctx: &ScanContext<'_>,
    text: &'t str,
    start: usize,
    floor: usize,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<(&'t str, usize)> {
    let text_start = label_start(text, start, floor, LinkKind::Link)?;
    try_parse_bracketed_text(text, text_start, ctx.escaped_chars(), shield)
}

/// End of the reference at `start`, if its id resolves.
pub(crate) fn reference_end(
    ctx: &ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    kind: LinkKind,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<usize> {
    let (_, id, end) = parse_full(ctx, text, start, floor, kind, shield)?;
    ctx.references().contains(&collapse_whitespace(&id)).then_some(end)
}

pub(crate) fn short_reference_end(
    ctx: &ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    shield: &dyn Fn(usize) -> Option<usize>,
) -> Option<usize> {
    let (label, end) = parse_short(ctx, text, start, floor, shield)?;
    ctx.references().contains(&collapse_whitespace(label)).then_some(end)
}

pub(crate) fn handle_reference(
    ctx: &mut ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    kind: LinkKind,
    here: usize,
    set: &PatternSet,
) -> Outcome {
    let parsed = {
        let shield = Shield::new(ctx, text, floor, set, here);
        parse_full(ctx, text, start, floor, kind, &|at| shield.end_at(at))
    };
    let Some((label, id, end)) = parsed else {
        return Outcome::Decline;
    };
    resolve(ctx, &id, label, end, kind, &set.above(here))
}

pub(crate) fn handle_short_reference(
    ctx: &mut ScanContext<'_>,
    text: &str,
    start: usize,
    floor: usize,
    here: usize,
    set: &PatternSet,
) -> Outcome {
    let parsed = {
        let shield = Shield::new(ctx, text, floor, set, here);
        parse_short(ctx, text, start, floor, &|at| shield.end_at(at))
    };
    let Some((label, end)) = parsed else {
        return Outcome::Decline;
    };
    resolve(ctx, label, label, end, LinkKind::Link, &set.above(here))
}

/// `alt_set` flattens image alt text the way inline images do.
fn resolve(
    ctx: &mut ScanContext<'_>,
    id: &str,
    label: &str,
    end: usize,
    kind: LinkKind,
    alt_set: &PatternSet,
) -> Outcome {
    let id = collapse_whitespace(id);
    let Some(reference) = ctx.references().get(&id) else {
        log::debug!("Unresolved reference id {:?}, keeping text", id);
        return Outcome::PassThrough { end };
    };

    let title = reference.title.as_deref().filter(|t| !t.is_empty());
    let el = match kind {
        LinkKind::Link => {
            let mut el = Element::new("a").with_text(label);
            el.set("href", reference.href.as_str());
            if let Some(title) = title {
                el.set("title", title);
            }
            el
        }
        LinkKind::Image => {
            let mut el = Element::new("img");
            el.set("src", reference.href.as_str());
            if let Some(title) = title {
                el.set("title", title);
            }
            el.set("alt", ctx.flatten(label, alt_set));
            el
        }
    };
    Outcome::Replace {
        end,
        fragment: el.into(),
    }
}
