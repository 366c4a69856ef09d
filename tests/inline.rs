mod common;

use panache_inline::inline_parser::{Delimiter, SimpleTag};
use panache_inline::{
    Config, ConfigBuilder, InlineParser, InlinePattern, PatternRegistry, ReferenceTable,
    RegistryError, Stash, parse_inline,
};

fn render(input: &str) -> String {
    let (text, references) = common::read_document(input);
    let parsed = parse_inline(&text, &references, None).unwrap();
    common::render(&parsed)
}

#[test]
fn test_emphasis_and_strong() {
    similar_asserts::assert_eq!(
        render("*a* and **b**"),
        "<em>a</em> and <strong>b</strong>"
    );
}

#[test]
fn test_triple_delimiters() {
    insta::assert_snapshot!(render("***both***"), @"<strong><em>both</em></strong>");
}

#[test]
fn test_intraword_underscores() {
    insta::assert_snapshot!(render("a_b_c and _d_"), @"a_b_c and <em>d</em>");
}

#[test]
fn test_inline_link() {
    insta::assert_snapshot!(
        render(r#"[link](http://example.com/a_(b) "Title")"#),
        @r#"<a href="http://example.com/a_(b)" title="Title">link</a>"#
    );
}

#[test]
fn test_image() {
    insta::assert_snapshot!(render("![img](/i.png)"), @r#"<img src="/i.png" alt="img" />"#);
}

#[test]
fn test_code_is_escaped_once() {
    similar_asserts::assert_eq!(
        render("`<code>` & x"),
        "<code>&lt;code&gt;</code> &amp; x"
    );
}

#[test]
fn test_raw_html_and_entities_pass_through() {
    similar_asserts::assert_eq!(render("AT&amp;T <b>bold</b>"), "AT&amp;T <b>bold</b>");
}

#[test]
fn test_automail_renders_as_entities() {
    let expected = concat!(
        r#"<a href="&#109;&#97;&#105;&#108;&#116;&#111;&#58;"#,
        r#"&#109;&#101;&#64;&#120;&#46;&#111;&#114;&#103;">"#,
        "&#109;&#101;&#64;&#120;&#46;&#111;&#114;&#103;</a>",
    );
    similar_asserts::assert_eq!(render("<me@x.org>"), expected);
}

#[test]
fn test_escaped_delimiters() {
    insta::assert_snapshot!(render(r"\*not em\*"), @"*not em*");
}

#[test]
fn test_line_break() {
    similar_asserts::assert_eq!(render("one  \ntwo"), "one<br />two");
}

#[test]
fn test_unresolved_reference_left_as_text() {
    insta::assert_snapshot!(render("[x][y]"), @"[x][y]");
}

#[test]
fn test_reference_definitions() {
    let input = "See [the docs][docs] and [Home].\n\n[docs]: https://docs.example \"Docs\"\n[home]: /\n";
    similar_asserts::assert_eq!(
        render(input),
        r#"See <a href="https://docs.example" title="Docs">the docs</a> and <a href="/">Home</a>."#
    );
}

#[test]
fn test_disabled_pattern_from_config() {
    let config = ConfigBuilder::default().disable_pattern("html").build();
    let parsed = parse_inline("<i>x</i>", &ReferenceTable::new(), Some(config)).unwrap();
    assert!(parsed.stash.is_empty());
    similar_asserts::assert_eq!(common::render(&parsed), "&lt;i&gt;x&lt;/i&gt;");
}

#[test]
fn test_unknown_disabled_pattern_is_an_error() {
    let config = ConfigBuilder::default().disable_pattern("strikeout").build();
    let err = parse_inline("x", &ReferenceTable::new(), Some(config)).unwrap_err();
    assert_eq!(err, RegistryError::NotFound("strikeout".to_string()));
}

#[test]
fn test_custom_tag_replaces_strong() {
    let mut registry = PatternRegistry::with_defaults();
    let strong = registry.deregister("strong").unwrap();
    registry
        .register(
            InlinePattern::SimpleTag(SimpleTag {
                delimiter: Delimiter::Star,
                width: 2,
                tag: "b".to_string(),
            }),
            "bold",
            strong.priority,
        )
        .unwrap();

    let refs = ReferenceTable::new();
    let config = Config::default();
    let parsed = InlineParser::new(&registry, &refs, &config).parse("**x**");
    similar_asserts::assert_eq!(common::render(&parsed), "<b>x</b>");
}

#[test]
fn test_stash_continues_across_parses() {
    let registry = PatternRegistry::with_defaults();
    let refs = ReferenceTable::new();
    let config = Config::default();
    let parser = InlineParser::new(&registry, &refs, &config);

    let first = parser.parse_with_stash("<b>", Stash::new());
    let second = parser.parse_with_stash("<i>", first.stash);
    assert_eq!(second.stash.len(), 2);
    assert_eq!(second.text_content(), "<i>");
    similar_asserts::assert_eq!(common::render(&second), "<i>");
}

#[test]
fn test_parser_shared_across_threads() {
    let registry = PatternRegistry::with_defaults();
    let mut refs = ReferenceTable::new();
    refs.insert("home", "/", None);
    let config = Config::default();
    let parser = InlineParser::new(&registry, &refs, &config);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| s.spawn(move || common::render(&parser.parse(&format!("*{i}* [home]")))))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap(),
                format!(r#"<em>{i}</em> <a href="/">home</a>"#)
            );
        }
    });
}
