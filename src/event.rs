//! The tagged event stream that every pipeline stage accepts and produces.
//!
//! `Event` is the one type `reader::parser`, `namespace`, `dtd::validator`, `validate` and
//! `dom` all share — the contract described in spec §6. Stages that don't care about a given
//! variant simply pass it through unchanged, so new variants can be added without breaking
//! unaware consumers (the enum is `#[non_exhaustive]`).

use std::fmt;

use crate::common::TextPosition;

/// One lexical or semantic item produced by the parser, or inserted by a downstream stage.
#[derive(Clone, PartialEq, Debug)]
#[non_exhaustive]
pub enum Event {
    StartDocument,
    EndDocument,
    /// The `<?xml ...?>` declaration. Only emitted when `ParserConfig::include_prolog` is set.
    Prolog {
        attributes: Vec<(String, String)>,
        location: TextPosition,
    },
    StartElement {
        tag: String,
        attributes: Vec<(String, String)>,
        location: TextPosition,
    },
    EndElement {
        tag: String,
        location: TextPosition,
    },
    Characters {
        text: String,
        location: TextPosition,
    },
    CData {
        content: String,
        location: TextPosition,
    },
    /// Only emitted when `ParserConfig::include_comments` is set.
    Comment {
        content: String,
        location: TextPosition,
    },
    ProcessingInstruction {
        target: String,
        content: Option<String>,
        location: TextPosition,
    },
    /// The raw text of a `<!DOCTYPE ...>` declaration, including its brackets.
    Dtd {
        content: String,
        location: TextPosition,
    },
    Error {
        kind: ErrorKind,
        message: Option<String>,
        location: TextPosition,
    },
    DtdError {
        kind: DtdErrorKind,
        location: TextPosition,
        context: Option<String>,
    },
}

impl Event {
    /// The location carried by this event, if it carries one at all (`StartDocument` and
    /// `EndDocument` do not).
    #[must_use]
    pub fn location(&self) -> Option<TextPosition> {
        match self {
            Event::StartDocument | Event::EndDocument => None,
            Event::Prolog { location, .. }
            | Event::StartElement { location, .. }
            | Event::EndElement { location, .. }
            | Event::Characters { location, .. }
            | Event::CData { location, .. }
            | Event::Comment { location, .. }
            | Event::ProcessingInstruction { location, .. }
            | Event::Dtd { location, .. }
            | Event::Error { location, .. }
            | Event::DtdError { location, .. } => Some(*location),
        }
    }
}

/// Parser-stage error taxonomy (spec §7).
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A one-shot input ended mid-token; no further events follow.
    Incomplete,
    /// `<` was followed by something that isn't `?`, `!`, `/` or a name start character.
    BadTagStart,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedCData,
    UnterminatedPi,
    UnterminatedDoctypeString,
    /// An unexpected character followed a quoted identifier inside a DOCTYPE. Carries the
    /// offending byte.
    UnexpectedCharInDoctype(u8),
    /// An entity reference had no predefined or DTD-declared meaning. Carries its name.
    UndefinedEntity(String),
    /// A closing tag didn't match the innermost open tag. Carries the expected and found names.
    MismatchedEndTag { expected: String, found: String },
    /// A code point outside the `Char` production appeared in text, CDATA, a comment, or an
    /// attribute value (see `validate::CharacterValidator`). Carries the code point.
    InvalidXmlCharacter(u32),
    /// A comment contained `--` (see `validate::CommentValidator`).
    DoubleHyphenInComment,
    /// A qualified name used a prefix with no binding in scope. Carries the prefix.
    UndeclaredPrefix(String),
    /// A namespace declaration violated the reserved-prefix rules in spec §3. Carries the
    /// prefix.
    ReservedPrefix(String),
    /// A namespace declaration bound a prefix to a reserved URI. Carries the URI.
    ReservedNamespace(String),
    /// An empty-URI prefix undeclaration was used under XML 1.0, where it is illegal. Carries
    /// the prefix.
    EmptyPrefixBinding(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Incomplete => "incomplete document",
            ErrorKind::BadTagStart => "invalid character after '<'",
            ErrorKind::UnterminatedString => "unterminated quoted string",
            ErrorKind::UnterminatedComment => "unterminated comment",
            ErrorKind::UnterminatedCData => "unterminated CDATA section",
            ErrorKind::UnterminatedPi => "unterminated processing instruction",
            ErrorKind::UnterminatedDoctypeString => "unterminated quoted string in DOCTYPE",
            ErrorKind::UnexpectedCharInDoctype(b) => return write!(f, "unexpected character {b:#04x} in DOCTYPE"),
            ErrorKind::UndefinedEntity(name) => return write!(f, "reference to undefined entity '{name}'"),
            ErrorKind::MismatchedEndTag { expected, found } => {
                return write!(f, "mismatched closing tag: expected '{expected}', found '{found}'")
            }
            ErrorKind::InvalidXmlCharacter(cp) => return write!(f, "invalid XML character U+{cp:04X}"),
            ErrorKind::DoubleHyphenInComment => "comment contains '--'",
            ErrorKind::UndeclaredPrefix(p) => return write!(f, "undeclared namespace prefix: {p}"),
            ErrorKind::ReservedPrefix(p) => return write!(f, "reserved prefix cannot be rebound: {p}"),
            ErrorKind::ReservedNamespace(u) => return write!(f, "namespace URI is reserved: {u}"),
            ErrorKind::EmptyPrefixBinding(p) => {
                return write!(f, "prefix '{p}' cannot be undeclared in XML 1.0")
            }
        })
    }
}

/// DTD-stage error taxonomy (spec §7): declaration-parser errors and validator errors.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum DtdErrorKind {
    InvalidElementDecl,
    InvalidEntityDecl,
    InvalidAttlistDecl,
    InvalidNotationDecl,
    UnknownAttributeType,
    InvalidContentModel,
    UnsupportedMixedOperators,
    ColonInEntityName,
    ColonInNotationName,
}

impl fmt::Display for DtdErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DtdErrorKind::InvalidElementDecl => "invalid <!ELEMENT> declaration",
            DtdErrorKind::InvalidEntityDecl => "invalid <!ENTITY> declaration",
            DtdErrorKind::InvalidAttlistDecl => "invalid <!ATTLIST> declaration",
            DtdErrorKind::InvalidNotationDecl => "invalid <!NOTATION> declaration",
            DtdErrorKind::UnknownAttributeType => "unknown attribute type",
            DtdErrorKind::InvalidContentModel => "invalid content model",
            DtdErrorKind::UnsupportedMixedOperators => "content model mixes ',' and '|' in one group",
            DtdErrorKind::ColonInEntityName => "entity name contains a colon",
            DtdErrorKind::ColonInNotationName => "notation name contains a colon",
        })
    }
}
