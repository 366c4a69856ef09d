/// Backslash escapes. Whether the character is escapable is decided by the
/// configured set at handling time.

/// Try to parse `\c` at the start of `text`.
/// Returns the byte length consumed and the escaped character.
pub fn try_parse_escape(text: &str) -> Option<(usize, char)> {
    let rest = text.strip_prefix('\\')?;
    let ch = rest.chars().next()?;
    Some((1 + ch.len_utf8(), ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_ascii() {
        assert_eq!(try_parse_escape("\\*foo"), Some((2, '*')));
        assert_eq!(try_parse_escape("\\\\"), Some((2, '\\')));
    }

    #[test]
    fn test_escape_multibyte() {
        assert_eq!(try_parse_escape("\\é"), Some((3, 'é')));
    }

    #[test]
    fn test_not_an_escape() {
        assert_eq!(try_parse_escape("\\"), None);
        assert_eq!(try_parse_escape("a\\*"), None);
    }
}
