/// Parsing for inline code spans (`code`) and backslash pairs before a backtick
use super::{Preceding, next_boundary, preceding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSpanMatch<'a> {
    /// An even run of backslashes directly before a backtick; each pair is
    /// one literal backslash and the backtick stays for the next matcher.
    EscapedBackslashes { end: usize, pairs: usize },
    /// A code span; `content` is the raw text between the fences.
    Span { end: usize, content: &'a str },
}

impl CodeSpanMatch<'_> {
    pub fn end(&self) -> usize {
        match *self {
            CodeSpanMatch::EscapedBackslashes { end, .. } | CodeSpanMatch::Span { end, .. } => end,
        }
    }
}

/// Try to parse a code span or a backslash run starting at `pos`.
///
/// Neither form may follow a backslash. A fence of `n` backticks closes on
/// the first later run of exactly `n` backticks; when the full opening run
/// never closes, shorter openings are tried.
pub fn try_parse_code_span(text: &str, pos: usize, floor: usize) -> Option<CodeSpanMatch<'_>> {
    let bytes = text.as_bytes();
    let first = *bytes.get(pos)?;
    if first != b'\\' && first != b'`' {
        return None;
    }
    if preceding(text, pos, floor) == Preceding::Char('\\') {
        return None;
    }

    if first == b'\\' {
        let run = count_run(bytes, pos, b'\\');
        if run >= 2 && run % 2 == 0 && bytes.get(pos + run) == Some(&b'`') {
            return Some(CodeSpanMatch::EscapedBackslashes {
                end: pos + run,
                pairs: run / 2,
            });
        }
        return None;
    }

    let run = count_run(bytes, pos, b'`');
    for fence in (1..=run).rev() {
        if let Some(close) = find_closing_fence(text, pos + fence, fence) {
            return Some(CodeSpanMatch::Span {
                end: close + fence,
                content: &text[pos + fence..close],
            });
        }
    }
    None
}

fn count_run(bytes: &[u8], pos: usize, byte: u8) -> usize {
    bytes[pos..].iter().take_while(|&&b| b == byte).count()
}

/// Start of the first closing fence after at least one content character.
fn find_closing_fence(text: &str, content_start: usize, fence: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if content_start >= text.len() {
        return None;
    }
    let mut pos = next_boundary(text, content_start);
    while pos + fence <= bytes.len() {
        if bytes[pos..pos + fence].iter().all(|&b| b == b'`')
            && bytes[pos - 1] != b'`'
            && bytes.get(pos + fence) != Some(&b'`')
        {
            return Some(pos);
        }
        pos = next_boundary(text, pos);
    }
    None
}
