//! Scanner for the `(href "title")` part of inline links and images.
//!
//! The angle form `(<href> "title")` is matched by a regex. Everything else
//! is resolved by a character scan that counts parentheses and keeps two
//! competing hypotheses about where a title starts: the first quote seen
//! (primary) and the first quote of the other kind (secondary). A title
//! only counts if its closing quote is the last non-space character before
//! the final `)`. If the primary quote never closes, the scan falls back
//! to the `)` that balanced the parentheses counted before the quote.

use std::sync::LazyLock;

use regex::Regex;

static ANGLE_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\(\s*<([^<>]*)>\s*(?:('[^']*'|"[^"]*")\s*)?\)"#).unwrap()
});

/// A parsed link target, still raw: callers trim, dequote and decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTarget<'a> {
    pub href: &'a str,
    /// Title text without its surrounding quotes
    pub title: Option<&'a str>,
    /// Byte offset just past the closing `)`
    pub end: usize,
}

/// Parse a link target whose `(` sits at `index`.
///
/// Backslash-escaped characters from `escapable` are skipped over, so
/// `\)` and `\"` never count as structure.
pub fn parse_link_target<'a>(
    text: &'a str,
    index: usize,
    escapable: &[char],
) -> Option<LinkTarget<'a>> {
    let rest = text.get(index..)?;
    if !rest.starts_with('(') {
        return None;
    }

    if let Some(caps) = ANGLE_TARGET_RE.captures(rest) {
        let whole = caps.get(0)?;
        let href = caps.get(1)?.as_str();
        let title = caps.get(2).map(|m| {
            let quoted = m.as_str();
            &quoted[1..quoted.len() - 1]
        });
        return Some(LinkTarget {
            href,
            title,
            end: index + whole.end(),
        });
    }

    let after_paren = &rest[1..];
    let start = index + 1 + (after_paren.len() - after_paren.trim_start().len());
    TargetScanner::new(text, start).run(escapable)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Counting parentheses, no quote seen yet
    Scanning,
    /// A quote opened; parentheses inside it no longer nest
    InPrimaryQuote,
    /// A quote of the other kind opened after the primary one
    InSecondaryQuote,
    Closed,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Quote {
    ch: char,
    /// Offset just past the opening quote
    open: usize,
    /// Offset just past the latest closing quote
    close: Option<usize>,
}

impl Quote {
    fn new(ch: char, open: usize) -> Self {
        Self {
            ch,
            open,
            close: None,
        }
    }

    /// Closed, and the closing quote was the last thing before `)`.
    fn ends_at(&self, last: Option<char>) -> bool {
        self.close.is_some() && last == Some(self.ch)
    }
}

struct TargetScanner<'a> {
    text: &'a str,
    start: usize,
    state: State,
    /// Open parentheses, counting the link's own
    depth: usize,
    /// Closing parentheses still needed if the title hypothesis fails
    backtrack: usize,
    /// Offset past the `)` that would close the link without a title
    fallback: Option<usize>,
    primary: Option<Quote>,
    secondary: Option<Quote>,
    /// Last character that was not a plain space; escapes clear it
    last: Option<char>,
}

impl<'a> TargetScanner<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        Self {
            text,
            start,
            state: State::Scanning,
            depth: 1,
            backtrack: 1,
            fallback: None,
            primary: None,
            secondary: None,
            last: None,
        }
    }

    fn in_quote(&self) -> bool {
        matches!(self.state, State::InPrimaryQuote | State::InSecondaryQuote)
    }

    fn run(mut self, escapable: &[char]) -> Option<LinkTarget<'a>> {
        let text = self.text;
        let mut chars = text[self.start..].char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            let pos = self.start + offset;

            if c == '\\'
                && let Some(&(_, next)) = chars.peek()
                && escapable.contains(&next)
            {
                chars.next();
                self.last = None;
                continue;
            }

            let next_pos = pos + c.len_utf8();
            match c {
                '(' => self.open_paren(),
                ')' => self.close_paren(next_pos),
                '"' | '\'' => self.quote(c, next_pos),
                _ => {}
            }

            if self.depth == 0 {
                return Some(self.resolve(pos, next_pos));
            }
            if c != ' ' {
                self.last = Some(c);
            }
        }

        // An unclosed title falls back to the paren that balanced the href.
        self.state = if self.fallback.is_some() {
            State::Closed
        } else {
            State::Failed
        };
        log::trace!("Link target from {} ended {:?}", self.start, self.state);
        let end = self.fallback?;
        Some(LinkTarget {
            href: &text[self.start..end - 1],
            title: None,
            end,
        })
    }

    fn open_paren(&mut self) {
        if !self.in_quote() {
            self.depth += 1;
        } else if self.fallback.is_none() {
            // Nested parens inside a would-be title still need closing
            // if the title turns out to be part of the href.
            self.backtrack += 1;
        }
    }

    fn close_paren(&mut self, next_pos: usize) {
        let title_closed = self.primary.is_some_and(|q| q.ends_at(self.last))
            || self.secondary.is_some_and(|q| q.ends_at(self.last));
        if title_closed {
            self.depth = 0;
        } else if !self.in_quote() {
            self.depth -= 1;
        } else if self.backtrack > 0 {
            self.backtrack -= 1;
            if self.backtrack == 0 {
                self.fallback = Some(next_pos);
            }
        }
    }

    fn quote(&mut self, c: char, next_pos: usize) {
        let Some(primary) = self.primary.as_mut() else {
            // Assume a title from here on; parentheses are quoted text now.
            self.state = State::InPrimaryQuote;
            self.backtrack = self.depth;
            self.depth = 1;
            self.primary = Some(Quote::new(c, next_pos));
            return;
        };
        if c == primary.ch {
            primary.close = Some(next_pos);
            return;
        }
        match self.secondary.as_mut() {
            None => {
                self.state = State::InSecondaryQuote;
                self.secondary = Some(Quote::new(c, next_pos));
            }
            Some(secondary) if c == secondary.ch => secondary.close = Some(next_pos),
            Some(_) => {}
        }
    }

    /// The link closed at the `)` at `pos`; pick the title hypothesis.
    fn resolve(&mut self, pos: usize, next_pos: usize) -> LinkTarget<'a> {
        self.state = State::Closed;
        let text = self.text;
        let titled = [self.primary, self.secondary]
            .into_iter()
            .flatten()
            .find(|q| q.ends_at(self.last));
        match titled {
            Some(Quote {
                open,
                close: Some(close),
                ..
            }) => LinkTarget {
                href: &text[self.start..open - 1],
                title: Some(&text[open..close - 1]),
                end: next_pos,
            },
            _ => LinkTarget {
                href: &text[self.start..pos],
                title: None,
                end: next_pos,
            },
        }
    }
}
