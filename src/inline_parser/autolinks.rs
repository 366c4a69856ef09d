//! Angle-bracket autolinks: `<http://example.com>` and `<me@example.com>`.
//!
//! Email addresses are obfuscated: every character of the visible text and
//! of the `mailto:` href becomes an entity reference whose `&` is
//! [`AMP_SUBSTITUTE`], to be swapped back by the serializer.

use std::sync::LazyLock;

use regex::Regex;

use super::ScanContext;
use super::patterns::Outcome;
use crate::entities;
use crate::tree::Element;
use crate::utils::AMP_SUBSTITUTE;

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:[Ff]|[Hh][Tt])[Tt][Pp][Ss]?://[^<>]*)>").unwrap()
});

static AUTOMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<> !]*@[^@<> ]*)>").unwrap());

/// Find the first URL autolink at or after `from`.
/// Returns (start, end, url).
pub fn try_parse_autolink(text: &str, from: usize) -> Option<(usize, usize, &str)> {
    capture(&AUTOLINK_RE, text, from)
}

/// Find the first email autolink at or after `from`.
/// Returns (start, end, address).
pub fn try_parse_automail(text: &str, from: usize) -> Option<(usize, usize, &str)> {
    capture(&AUTOMAIL_RE, text, from)
}

fn capture<'a>(re: &Regex, text: &'a str, from: usize) -> Option<(usize, usize, &'a str)> {
    let caps = re.captures_at(text, from)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1)?;
    Some((whole.start(), whole.end(), inner.as_str()))
}

pub fn handle_autolink(ctx: &mut ScanContext<'_>, text: &str, start: usize) -> Outcome {
    let Some((found, end, url)) = try_parse_autolink(text, start) else {
        return Outcome::Decline;
    };
    if found != start {
        return Outcome::Decline;
    }
    let href = ctx.stash().resolve(url);
    let mut el = Element::new("a").with_atomic_text(href.clone());
    el.set("href", href);
    Outcome::Replace {
        end,
        fragment: el.into(),
    }
}

pub fn handle_automail(ctx: &mut ScanContext<'_>, text: &str, start: usize) -> Outcome {
    let Some((found, end, address)) = try_parse_automail(text, start) else {
        return Outcome::Decline;
    };
    if found != start {
        return Outcome::Decline;
    }
    let resolved = ctx.stash().resolve(address);
    let email = resolved.strip_prefix("mailto:").unwrap_or(resolved.as_str());

    let visible: String = email.chars().map(obfuscate_named).collect();
    let href: String = "mailto:"
        .chars()
        .chain(email.chars())
        .map(obfuscate_numeric)
        .collect();

    let mut el = Element::new("a").with_atomic_text(visible);
    el.set("href", href);
    Outcome::Replace {
        end,
        fragment: el.into(),
    }
}

/// `&name;` when HTML 4 names the character, `&#code;` otherwise.
fn obfuscate_named(ch: char) -> String {
    match entities::name_for(ch) {
        Some(name) => format!("{AMP_SUBSTITUTE}{name};"),
        None => obfuscate_numeric(ch),
    }
}

fn obfuscate_numeric(ch: char) -> String {
    format!("{AMP_SUBSTITUTE}#{};", ch as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::substitute_ampersands;

    #[test]
    fn test_autolink_schemes() {
        assert_eq!(
            try_parse_autolink("see <http://x.org/a?b=c>", 0),
            Some((4, 24, "http://x.org/a?b=c"))
        );
        assert!(try_parse_autolink("<HTTPS://x>", 0).is_some());
        assert!(try_parse_autolink("<ftp://x>", 0).is_some());
        assert!(try_parse_autolink("<mailto:x>", 0).is_none());
    }

    #[test]
    fn test_automail_shape() {
        assert_eq!(
            try_parse_automail("<a@b.c>", 0),
            Some((0, 7, "a@b.c"))
        );
        assert!(try_parse_automail("<a b@c>", 0).is_none());
        assert!(try_parse_automail("<a@b@c>", 0).is_none());
    }

    #[test]
    fn test_obfuscation_decodes_to_address() {
        let visible: String = "a@b".chars().map(obfuscate_named).collect();
        assert_eq!(substitute_ampersands(&visible), "&#97;&#64;&#98;");
        assert_eq!(obfuscate_named('&'), format!("{AMP_SUBSTITUTE}amp;"));
    }
}
