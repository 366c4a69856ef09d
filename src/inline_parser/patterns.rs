//! The closed set of inline matchers and their shared capability.
//!
//! Every matcher answers two questions: where its earliest candidate starts
//! ([`InlinePattern::find`]), and what a candidate turns into
//! ([`InlinePattern::handle`]).

use super::autolinks::{handle_autolink, handle_automail, try_parse_autolink, try_parse_automail};
use super::code_spans::{CodeSpanMatch, try_parse_code_span};
use super::emphasis::{
    try_parse_double_tag, try_parse_line_break, try_parse_simple_tag, try_parse_stray_delimiter,
};
use super::escapes::try_parse_escape;
use super::links::{handle_link, is_image_start, is_link_start, link_end};
use super::raw_html::{try_parse_entity, try_parse_raw_html};
use super::references::{
    handle_reference, handle_short_reference, reference_end, short_reference_end,
};
use super::{PatternSet, ScanContext, Shield, next_boundary, unshielded};
use crate::tree::{Element, Fragment};
use crate::utils::{code_escape, escape_marker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `[text]...` producing an `a` element
    Link,
    /// `![alt]...` producing an `img` element
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Star,
    /// Underscore runs only count at word boundaries
    Underscore,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Star => b'*',
            Delimiter::Underscore => b'_',
        }
    }
}

/// Nesting produced by a triple-delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestOrder {
    /// `***a*b**`: strong wrapping em, `b` is the em's tail
    StrongEm,
    /// `***a**b*`: em wrapping strong, `b` is the strong's tail
    EmStrong,
}

impl NestOrder {
    /// (outer tag, inner tag)
    pub fn tags(self) -> (&'static str, &'static str) {
        match self {
            NestOrder::StrongEm => ("strong", "em"),
            NestOrder::EmStrong => ("em", "strong"),
        }
    }

    /// Widths of the first and second closing runs.
    pub(crate) fn close_widths(self) -> (usize, usize) {
        match self {
            NestOrder::StrongEm => (1, 2),
            NestOrder::EmStrong => (2, 1),
        }
    }
}

/// A delimiter run of fixed width wrapping content in one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTag {
    pub delimiter: Delimiter,
    pub width: usize,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlinePattern {
    /// `` `code` `` spans and backslash pairs in front of a backtick
    Backtick,
    /// `\c` for configured escapable characters
    Escape,
    /// `[text][id]` or `![alt][id]`
    Reference(LinkKind),
    /// `[text]` resolved with the text as id
    ShortReference,
    /// `[text](href "title")` or `![alt](src "title")`
    Link(LinkKind),
    /// `<http://...>`
    Autolink,
    /// `<user@host>`
    Automail,
    /// two spaces before a newline
    LineBreak,
    /// `<tag ...>`, `</tag>`, `<!-- ... -->`
    RawHtml,
    /// `&name;`, `&#10;`, `&#xA;`
    Entity,
    /// a lone `*` or `_` surrounded by whitespace
    StrayDelimiter,
    DoubleTag(NestOrder),
    SimpleTag(SimpleTag),
}

/// Result of handling a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Consume up to `end` and emit `fragment` in place of the span.
    Replace { end: usize, fragment: Fragment },
    /// Leave the span up to `end` as literal text for this matcher, which
    /// resumes its search after it. Other matchers are unaffected.
    PassThrough { end: usize },
    /// Not a match after all; search again one character later.
    Decline,
}

impl InlinePattern {
    pub fn emphasis(delimiter: Delimiter) -> Self {
        InlinePattern::SimpleTag(SimpleTag {
            delimiter,
            width: 1,
            tag: "em".to_string(),
        })
    }

    pub fn strong(delimiter: Delimiter) -> Self {
        InlinePattern::SimpleTag(SimpleTag {
            delimiter,
            width: 2,
            tag: "strong".to_string(),
        })
    }

    /// Earliest candidate start at or after `from`.
    ///
    /// `floor` is the scan cursor: the character before it has already
    /// been consumed and is invisible to lookbehind checks.
    pub fn find(&self, text: &str, from: usize, floor: usize) -> Option<usize> {
        if from >= text.len() {
            return None;
        }
        match self {
            InlinePattern::LineBreak => text[from..].find("  \n").map(|i| from + i),
            InlinePattern::Autolink | InlinePattern::Automail | InlinePattern::Entity => {
                // Plain regexes without lookaround: the first hit is the candidate.
                self.regex_find(text, from)
            }
            _ => {
                let mut pos = from;
                while pos < text.len() {
                    if self.matches_at(text, pos, floor) {
                        return Some(pos);
                    }
                    pos = next_boundary(text, pos);
                }
                None
            }
        }
    }

    /// Whether a candidate starts exactly at `pos`.
    pub fn matches_at(&self, text: &str, pos: usize, floor: usize) -> bool {
        match self {
            InlinePattern::Backtick => try_parse_code_span(text, pos, floor).is_some(),
            InlinePattern::Escape => try_parse_escape(&text[pos..]).is_some(),
            InlinePattern::Reference(LinkKind::Link)
            | InlinePattern::ShortReference
            | InlinePattern::Link(LinkKind::Link) => is_link_start(text, pos, floor),
            InlinePattern::Reference(LinkKind::Image) | InlinePattern::Link(LinkKind::Image) => {
                is_image_start(text, pos)
            }
            InlinePattern::Autolink | InlinePattern::Automail | InlinePattern::Entity => {
                self.regex_find(text, pos) == Some(pos)
            }
            InlinePattern::LineBreak => try_parse_line_break(&text[pos..]).is_some(),
            InlinePattern::RawHtml => try_parse_raw_html(&text[pos..]).is_some(),
            InlinePattern::StrayDelimiter => try_parse_stray_delimiter(text, pos).is_some(),
            InlinePattern::DoubleTag(order) => {
                try_parse_double_tag(text, pos, *order, &unshielded).is_some()
            }
            InlinePattern::SimpleTag(tag) => {
                try_parse_simple_tag(text, pos, floor, tag, &unshielded).is_some()
            }
        }
    }

    /// End of the span [`handle`](Self::handle) would replace at `pos`,
    /// worked out without touching the stash.
    pub(crate) fn span_end(
        &self,
        ctx: &ScanContext<'_>,
        text: &str,
        pos: usize,
        floor: usize,
        here: usize,
        set: &PatternSet,
    ) -> Option<usize> {
        let shield = Shield::new(ctx, text, floor, set, here);
        let skip = |at: usize| shield.end_at(at);
        let rest = &text[pos..];
        match self {
            InlinePattern::Backtick => try_parse_code_span(text, pos, floor).map(|m| m.end()),
            InlinePattern::Escape => try_parse_escape(rest)
                .filter(|&(_, ch)| ctx.is_escapable(ch))
                .map(|(len, _)| pos + len),
            InlinePattern::Reference(kind) => reference_end(ctx, text, pos, floor, *kind, &skip),
            InlinePattern::ShortReference => short_reference_end(ctx, text, pos, floor, &skip),
            InlinePattern::Link(kind) => link_end(ctx, text, pos, floor, *kind, &skip),
            InlinePattern::Autolink if rest.starts_with('<') => try_parse_autolink(text, pos)
                .filter(|&(found, _, _)| found == pos)
                .map(|(_, end, _)| end),
            InlinePattern::Automail if rest.starts_with('<') => try_parse_automail(text, pos)
                .filter(|&(found, _, _)| found == pos)
                .map(|(_, end, _)| end),
            InlinePattern::Entity if rest.starts_with('&') => try_parse_entity(text, pos)
                .filter(|&(found, _)| found == pos)
                .map(|(_, end)| end),
            InlinePattern::Autolink | InlinePattern::Automail | InlinePattern::Entity => None,
            InlinePattern::LineBreak => try_parse_line_break(rest).map(|len| pos + len),
            InlinePattern::RawHtml => try_parse_raw_html(rest).map(|len| pos + len),
            InlinePattern::StrayDelimiter => try_parse_stray_delimiter(text, pos),
            InlinePattern::DoubleTag(order) => {
                try_parse_double_tag(text, pos, *order, &skip).map(|m| m.end)
            }
            InlinePattern::SimpleTag(tag) => {
                try_parse_simple_tag(text, pos, floor, tag, &skip).map(|m| m.end)
            }
        }
    }

    fn regex_find(&self, text: &str, from: usize) -> Option<usize> {
        match self {
            InlinePattern::Autolink => try_parse_autolink(text, from).map(|(start, _, _)| start),
            InlinePattern::Automail => try_parse_automail(text, from).map(|(start, _, _)| start),
            InlinePattern::Entity => try_parse_entity(text, from).map(|(start, _)| start),
            _ => None,
        }
    }

    /// Turn the candidate at `start` into an [`Outcome`].
    ///
    /// `here` is this pattern's index in the registry and `set` the
    /// patterns enabled for the current scan.
    pub(crate) fn handle(
        &self,
        ctx: &mut ScanContext<'_>,
        text: &str,
        start: usize,
        floor: usize,
        here: usize,
        set: &PatternSet,
    ) -> Outcome {
        match self {
            InlinePattern::Backtick => match try_parse_code_span(text, start, floor) {
                Some(CodeSpanMatch::Span { end, content }) => Outcome::Replace {
                    end,
                    fragment: Element::new("code")
                        .with_atomic_text(code_escape(content.trim()))
                        .into(),
                },
                Some(CodeSpanMatch::EscapedBackslashes { end, pairs }) => Outcome::Replace {
                    end,
                    fragment: Fragment::Text(escape_marker('\\').repeat(pairs)),
                },
                None => Outcome::Decline,
            },
            InlinePattern::Escape => match try_parse_escape(&text[start..]) {
                Some((len, ch)) if ctx.is_escapable(ch) => Outcome::Replace {
                    end: start + len,
                    fragment: Fragment::Text(escape_marker(ch)),
                },
                _ => Outcome::Decline,
            },
            InlinePattern::Reference(kind) => {
                handle_reference(ctx, text, start, floor, *kind, here, set)
            }
            InlinePattern::ShortReference => {
                handle_short_reference(ctx, text, start, floor, here, set)
            }
            InlinePattern::Link(kind) => handle_link(ctx, text, start, floor, *kind, here, set),
            InlinePattern::Autolink => handle_autolink(ctx, text, start),
            InlinePattern::Automail => handle_automail(ctx, text, start),
            InlinePattern::LineBreak => match try_parse_line_break(&text[start..]) {
                Some(len) => Outcome::Replace {
                    end: start + len,
                    fragment: Element::new("br").into(),
                },
                None => Outcome::Decline,
            },
            InlinePattern::RawHtml => match try_parse_raw_html(&text[start..]) {
                Some(len) => stash_literal(ctx, &text[start..start + len], start + len),
                None => Outcome::Decline,
            },
            InlinePattern::Entity => match try_parse_entity(text, start) {
                Some((found, end)) if found == start => stash_literal(ctx, &text[start..end], end),
                _ => Outcome::Decline,
            },
            InlinePattern::StrayDelimiter => match try_parse_stray_delimiter(text, start) {
                Some(end) => Outcome::Replace {
                    end,
                    fragment: Fragment::Text(text[start..end].to_string()),
                },
                None => Outcome::Decline,
            },
            InlinePattern::DoubleTag(order) => match shielded(ctx, text, floor, here, set, |skip| {
                try_parse_double_tag(text, start, *order, skip)
            }) {
                Some(m) => {
                    let (outer_tag, inner_tag) = order.tags();
                    let mut inner = Element::new(inner_tag).with_text(m.inner);
                    if !m.tail.is_empty() {
                        inner.tail = Some(m.tail.to_string());
                    }
                    Outcome::Replace {
                        end: m.end,
                        fragment: Element::new(outer_tag).with_child(inner).into(),
                    }
                }
                None => Outcome::Decline,
            },
            InlinePattern::SimpleTag(tag) => match shielded(ctx, text, floor, here, set, |skip| {
                try_parse_simple_tag(text, start, floor, tag, skip)
            }) {
                Some(m) => Outcome::Replace {
                    end: m.end,
                    fragment: Element::new(tag.tag.as_str()).with_text(m.inner).into(),
                },
                None => Outcome::Decline,
            },
        }
    }
}

/// Run `parse` with the spans of every pattern above `here` shielded.
fn shielded<T>(
    ctx: &ScanContext<'_>,
    text: &str,
    floor: usize,
    here: usize,
    set: &PatternSet,
    parse: impl FnOnce(&dyn Fn(usize) -> Option<usize>) -> Option<T>,
) -> Option<T> {
    let shield = Shield::new(ctx, text, floor, set, here);
    parse(&|at| shield.end_at(at))
}

/// Stash raw markup and emit its placeholder in its place.
fn stash_literal(ctx: &mut ScanContext<'_>, raw: &str, end: usize) -> Outcome {
    let token = ctx.stash_mut().store(raw);
    Outcome::Replace {
        end,
        fragment: Fragment::Text(token),
    }
}
