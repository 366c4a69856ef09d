//! Inline scanning over a priority-ordered set of matchers.
//!
//! A scan walks the buffer left to right. At every step each enabled
//! matcher proposes its earliest candidate at or after the cursor; the
//! earliest one wins and ties go to the higher-priority matcher. Accepted
//! nodes have their non-atomic text scanned again with the producing
//! matcher removed from the set.

use crate::config::Config;
use crate::references::ReferenceTable;
use crate::stash::Stash;
use crate::tree::{Element, Fragment, fragments_text};

mod autolinks;
mod code_spans;
mod emphasis;
mod escapes;
mod link_target;
mod links;
mod patterns;
mod raw_html;
mod references;
mod registry;

pub use link_target::{LinkTarget, parse_link_target};
pub use patterns::{Delimiter, InlinePattern, LinkKind, NestOrder, Outcome, SimpleTag};
pub use registry::{PatternEntry, PatternRegistry, RegistryError};

/// What a lookbehind check sees in front of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Preceding {
    /// Start of the buffer
    Start,
    /// Content already replaced by an earlier match
    Opaque,
    Char(char),
}

impl Preceding {
    /// Negative lookbehind: passes unless a visible preceding character
    /// satisfies `pred`.
    pub(crate) fn is_not(self, pred: impl Fn(char) -> bool) -> bool {
        !matches!(self, Preceding::Char(c) if pred(c))
    }
}

/// Classify the character before `pos`. Text before `floor` has been
/// consumed by a replacement.
pub(crate) fn preceding(text: &str, pos: usize, floor: usize) -> Preceding {
    if pos == 0 {
        Preceding::Start
    } else if pos <= floor {
        Preceding::Opaque
    } else {
        text[..pos]
            .chars()
            .next_back()
            .map_or(Preceding::Start, Preceding::Char)
    }
}

/// Byte offset of the character after the one at `pos`.
pub(crate) fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

/// Word character for the underscore lookarounds.
pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// The registry indices enabled for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternSet {
    enabled: Vec<bool>,
}

impl PatternSet {
    pub(crate) fn all(len: usize) -> Self {
        Self {
            enabled: vec![true; len],
        }
    }

    pub(crate) fn contains(&self, idx: usize) -> bool {
        self.enabled.get(idx).copied().unwrap_or(false)
    }

    pub(crate) fn without(&self, idx: usize) -> Self {
        let mut enabled = self.enabled.clone();
        if let Some(slot) = enabled.get_mut(idx) {
            *slot = false;
        }
        Self { enabled }
    }

    /// Only the enabled patterns with higher priority than `idx`.
    pub(crate) fn above(&self, idx: usize) -> Self {
        let enabled = self
            .enabled
            .iter()
            .enumerate()
            .map(|(i, &on)| on && i < idx)
            .collect();
        Self { enabled }
    }
}

/// Spans claimed by patterns that outrank the one being matched.
///
/// Closing delimiters and brackets are only searched for outside these
/// spans, so `*a \* b*` or ``*a `*` b*`` close on the last `*`.
pub(crate) struct Shield<'s, 'a> {
    ctx: &'s ScanContext<'a>,
    text: &'s str,
    floor: usize,
    set: &'s PatternSet,
    /// Registry index of the pattern being matched
    limit: usize,
}

impl<'s, 'a> Shield<'s, 'a> {
    pub(crate) fn new(
        ctx: &'s ScanContext<'a>,
        text: &'s str,
        floor: usize,
        set: &'s PatternSet,
        limit: usize,
    ) -> Self {
        Self {
            ctx,
            text,
            floor,
            set,
            limit,
        }
    }

    /// End of the span a higher-priority pattern would replace at `pos`.
    pub(crate) fn end_at(&self, pos: usize) -> Option<usize> {
        let entries = self.ctx.registry.ordered();
        (0..self.limit.min(entries.len()))
            .filter(|&i| self.set.contains(i))
            .find_map(|i| {
                entries[i]
                    .pattern
                    .span_end(self.ctx, self.text, pos, self.floor, i, self.set)
            })
            .filter(|&end| end > pos)
    }
}

/// A shield that protects nothing.
pub(crate) fn unshielded(_: usize) -> Option<usize> {
    None
}

/// Per-run state shared by every matcher: read-only inputs plus the stash.
pub struct ScanContext<'a> {
    registry: &'a PatternRegistry,
    references: &'a ReferenceTable,
    escaped_chars: &'a [char],
    stash: Stash,
}

impl<'a> ScanContext<'a> {
    pub fn new(
        registry: &'a PatternRegistry,
        references: &'a ReferenceTable,
        escaped_chars: &'a [char],
        stash: Stash,
    ) -> Self {
        Self {
            registry,
            references,
            escaped_chars,
            stash,
        }
    }

    pub fn references(&self) -> &'a ReferenceTable {
        self.references
    }

    pub fn escaped_chars(&self) -> &'a [char] {
        self.escaped_chars
    }

    pub fn is_escapable(&self, ch: char) -> bool {
        self.escaped_chars.contains(&ch)
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn stash_mut(&mut self) -> &mut Stash {
        &mut self.stash
    }

    pub fn into_stash(self) -> Stash {
        self.stash
    }

    /// Scan `text` with every registered pattern.
    pub fn scan(&mut self, text: &str) -> Vec<Fragment> {
        let set = PatternSet::all(self.registry.len());
        self.scan_with(text, &set)
    }

    /// Scan `text` and flatten the result, resolving stash tokens.
    pub(crate) fn flatten(&mut self, text: &str, set: &PatternSet) -> String {
        let fragments = self.scan_with(text, set);
        self.stash.resolve(&fragments_text(&fragments))
    }

    pub(crate) fn scan_with(&mut self, text: &str, set: &PatternSet) -> Vec<Fragment> {
        let registry = self.registry;
        let entries = registry.ordered();
        let mut out = Vec::new();
        // Everything before the cursor was consumed by a replacement.
        let mut cursor = 0;

        let mut candidates: Vec<Option<usize>> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if set.contains(i) {
                    entry.pattern.find(text, 0, 0)
                } else {
                    None
                }
            })
            .collect();

        while let Some((idx, start)) = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|start| (i, start)))
            .min_by_key(|&(i, start)| (start, i))
        {
            let entry = &entries[idx];
            match entry.pattern.handle(self, text, start, cursor, idx, set) {
                Outcome::Replace { end, fragment } => {
                    log::trace!("Pattern '{}' matched {}..{}", entry.name, start, end);
                    push_text(&mut out, &text[cursor..start]);
                    let fragment = match fragment {
                        Fragment::Element(element) => {
                            Fragment::Element(self.expand(element, &set.without(idx)))
                        }
                        other => other,
                    };
                    push_fragment(&mut out, fragment);
                    cursor = end;
                }
                Outcome::PassThrough { end } => {
                    log::trace!("Pattern '{}' left {}..{} as text", entry.name, start, end);
                    candidates[idx] = entry.pattern.find(text, end, cursor);
                    continue;
                }
                Outcome::Decline => {
                    candidates[idx] = entry.pattern.find(text, next_boundary(text, start), cursor);
                    continue;
                }
            }
            refresh_candidates(&mut candidates, entries, set, text, cursor);
        }

        push_text(&mut out, &text[cursor..]);
        out
    }

    /// Scan an accepted node's text and its children's text and tails.
    fn expand(&mut self, mut element: Element, set: &PatternSet) -> Element {
        if element.atomic {
            return element;
        }
        let children = std::mem::take(&mut element.children);
        if let Some(text) = element.text.take() {
            let fragments = self.scan_with(&text, set);
            element.extend_fragments(fragments);
        }
        for mut child in children {
            let tail = child.tail.take();
            let child = self.expand(child, set);
            element.children.push(child);
            if let Some(tail) = tail {
                let fragments = self.scan_with(&tail, set);
                element.extend_fragments(fragments);
            }
        }
        element
    }
}

/// Bring cached candidates up to date after the cursor moved.
///
/// Positions after the cursor keep their lookbehind context, so a cached
/// start beyond the cursor stays valid; only the cursor position itself
/// needs a fresh look.
fn refresh_candidates(
    candidates: &mut [Option<usize>],
    entries: &[PatternEntry],
    set: &PatternSet,
    text: &str,
    cursor: usize,
) {
    for (i, (slot, entry)) in candidates.iter_mut().zip(entries).enumerate() {
        if !set.contains(i) {
            continue;
        }
        if cursor >= text.len() {
            *slot = None;
            continue;
        }
        *slot = match *slot {
            Some(start) if start > cursor => {
                if entry.pattern.matches_at(text, cursor, cursor) {
                    Some(cursor)
                } else {
                    Some(start)
                }
            }
            Some(_) => entry.pattern.find(text, cursor, cursor),
            None => entry
                .pattern
                .matches_at(text, cursor, cursor)
                .then_some(cursor),
        };
    }
}

/// Append text, merging with a trailing text fragment.
fn push_text(out: &mut Vec<Fragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Fragment::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Fragment::Text(text.to_string()));
    }
}

fn push_fragment(out: &mut Vec<Fragment>, fragment: Fragment) {
    match fragment {
        Fragment::Text(text) => push_text(out, &text),
        element => out.push(element),
    }
}

/// Scanner output plus the stash holding everything its tokens refer to.
#[derive(Debug, Clone)]
pub struct ParsedInline {
    pub fragments: Vec<Fragment>,
    pub stash: Stash,
}

impl ParsedInline {
    /// Flattened text with stash tokens resolved.
    pub fn text_content(&self) -> String {
        self.stash.resolve(&fragments_text(&self.fragments))
    }
}

/// Runs scans against a fixed registry, reference table and config.
///
/// Holds only shared references, so one parser can serve many threads.
#[derive(Debug, Clone, Copy)]
pub struct InlineParser<'a> {
    registry: &'a PatternRegistry,
    references: &'a ReferenceTable,
    config: &'a Config,
}

impl<'a> InlineParser<'a> {
    pub fn new(
        registry: &'a PatternRegistry,
        references: &'a ReferenceTable,
        config: &'a Config,
    ) -> Self {
        Self {
            registry,
            references,
            config,
        }
    }

    pub fn parse(&self, text: &str) -> ParsedInline {
        self.parse_with_stash(text, Stash::new())
    }

    /// Scan `text` continuing an existing stash, so tokens already handed
    /// out stay valid.
    pub fn parse_with_stash(&self, text: &str, stash: Stash) -> ParsedInline {
        log::trace!(
            "Parsing inline text: {:?} ({} bytes)",
            &text[..floor_char_boundary(text, 40)],
            text.len()
        );
        let mut ctx = ScanContext::new(
            self.registry,
            self.references,
            &self.config.escaped_chars,
            stash,
        );
        let fragments = ctx.scan(text);
        ParsedInline {
            fragments,
            stash: ctx.into_stash(),
        }
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}
