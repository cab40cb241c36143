use crate::common::{DialectMode, Edition};

/// Options accepted by [`crate::reader::EventReader`] (spec §6 Options table).
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// `1.0` (default) or `1.1`. `EventReader` itself is edition-agnostic; this value is carried
    /// here only so callers can read it back off the same config they hand to `namespace::Resolver`
    /// (QName rules, empty-URI undeclaration) and `validate::CharacterValidator` (which `Char`
    /// production is accepted), each of which takes its own `edition` independently.
    pub edition: Edition,
    /// `Xml` (default, strict) or `Html` (recover-and-continue on DOCTYPE errors).
    pub mode: DialectMode,
    /// Whether to emit `Event::Comment`. Defaults to `false`.
    pub include_comments: bool,
    /// Whether to emit `Event::Prolog` for a leading `<?xml ...?>`. Defaults to `false`.
    pub include_prolog: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            edition: Edition::Xml10,
            mode: DialectMode::Xml,
            include_comments: false,
            include_prolog: false,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

gen_setters!(ParserConfig,
    /// XML edition used to validate names and interpret empty-URI namespace undeclarations.
    edition: val Edition,
    /// Strict XML or recover-and-continue HTML dialect.
    mode: val DialectMode,
    /// Emit `Event::Comment` events.
    include_comments: val bool,
    /// Emit an `Event::Prolog` event for the XML declaration.
    include_prolog: val bool
);
