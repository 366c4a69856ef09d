pub mod config;
pub mod entities;
pub mod inline_parser;
pub mod references;
pub mod stash;
pub mod tree;
pub mod utils;

pub use config::{Config, ConfigBuilder, ConfigError};
pub use inline_parser::{InlineParser, InlinePattern, ParsedInline, PatternRegistry, RegistryError};
pub use references::ReferenceTable;
pub use stash::Stash;
pub use tree::{Element, Fragment};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scans one inline text buffer with the default pattern pipeline.
///
/// Patterns listed in `config.disabled_patterns` are left out; an unknown
/// name there is an error.
///
/// # Examples
///
/// ```no_run
/// use panache_inline::{ReferenceTable, parse_inline};
///
/// let mut refs = ReferenceTable::new();
/// refs.insert("home", "/", None);
///
/// let parsed = parse_inline("*Go* [home]", &refs, None).unwrap();
/// assert_eq!(parsed.fragments.len(), 3);
/// ```
///
/// # Arguments
///
/// * `text` - The inline content of one block
/// * `references` - Reference definitions collected from the document
/// * `config` - Optional configuration (defaults to default config)
pub fn parse_inline(
    text: &str,
    references: &ReferenceTable,
    config: Option<Config>,
) -> Result<ParsedInline, RegistryError> {
    #[cfg(debug_assertions)]
    {
        init_logger();
    }

    let config = config.unwrap_or_default();
    let registry = PatternRegistry::from_config(&config)?;
    Ok(InlineParser::new(&registry, references, &config).parse(text))
}
