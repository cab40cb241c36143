//! Contains several types that are used throughout the crate: source positions, the XML
//! edition marker and the character classification predicates that the parser, the
//! namespace resolver and the DTD validator all share.

use std::fmt;

/// A trait for types that track their current position in a source document.
pub trait Position {
    /// Returns the position of the most recently produced item.
    fn position(&self) -> TextPosition;
}

/// A precise location in a source document.
///
/// A location is always a byte triple: the 1-based line number, the byte offset of the
/// start of that line, and the absolute byte offset of the item being located. The column
/// is derived on demand from the latter two (`absolute_byte_offset - line_start_byte_offset`)
/// rather than stored, so moving through a line never requires revisiting earlier bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
pub struct TextPosition {
    pub line: u64,
    pub line_start_byte_offset: u64,
    pub absolute_byte_offset: u64,
}

impl TextPosition {
    /// The position at the very start of a document.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        TextPosition { line: 0, line_start_byte_offset: 0, absolute_byte_offset: 0 }
    }

    /// The byte column of this position within its line.
    #[inline]
    #[must_use]
    pub const fn column(&self) -> u64 {
        self.absolute_byte_offset - self.line_start_byte_offset
    }

    #[inline]
    pub(crate) fn advance(&mut self, bytes: u64) {
        self.absolute_byte_offset += bytes;
    }

    #[inline]
    pub(crate) fn new_line(&mut self) {
        self.line += 1;
        self.line_start_byte_offset = self.absolute_byte_offset;
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column() + 1)
    }
}

impl Position for TextPosition {
    #[inline]
    fn position(&self) -> TextPosition { *self }
}

/// XML edition selected for a parse or namespace session.
///
/// Affects QName validation and whether an empty namespace URI may undeclare a prefix
/// binding (legal only under `Xml11`, see `namespace` module docs).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Edition {
    #[default]
    Xml10,
    Xml11,
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edition::Xml10 => "1.0",
            Edition::Xml11 => "1.1",
        })
    }
}

/// The version recorded in (or implied by) an XML declaration.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum XmlVersion {
    #[default]
    Version10,
    Version11,
}

impl fmt::Display for XmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            XmlVersion::Version10 => "1.0",
            XmlVersion::Version11 => "1.1",
        })
    }
}

impl From<Edition> for XmlVersion {
    fn from(e: Edition) -> Self {
        match e {
            Edition::Xml10 => XmlVersion::Version10,
            Edition::Xml11 => XmlVersion::Version11,
        }
    }
}

/// Whether the parser halts on malformed input (`Xml`) or tries to recover and keep
/// producing events (`Html`), per the DOCTYPE recovery algorithm described in
/// `reader::parser`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DialectMode {
    #[default]
    Xml,
    Html,
}

/// `#x9 | #xA | #xD | #x20` — the four ASCII whitespace characters XML recognizes.
#[inline]
#[must_use]
pub const fn is_whitespace_char(c: char) -> bool {
    matches!(c, '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}')
}

/// First character of a `Name` production (`NameStartChar`), simplified to the common case:
/// any alphabetic character, `_` or `:`.
#[inline]
#[must_use]
pub fn is_name_start_char(c: char) -> bool {
    c == '_' || c == ':' || c.is_alphabetic()
}

/// First character of an `NCName` (a `Name` without the colon production).
#[inline]
#[must_use]
pub fn is_ncname_start_char(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Trailing characters of a `Name` production.
#[inline]
#[must_use]
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c == '-' || c == '.' || c.is_numeric() || c == '\u{B7}'
}

/// Trailing characters of an `NCName` production (no colon).
#[inline]
#[must_use]
pub fn is_ncname_char(c: char) -> bool {
    is_ncname_start_char(c) || c == '-' || c == '.' || c.is_numeric() || c == '\u{B7}'
}

/// The XML 1.0 `Char` production: `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] |
/// [#x10000-#x10FFFF]`. Surrogate halves and most C0 controls are excluded.
#[inline]
#[must_use]
pub const fn is_xml10_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// The XML 1.1 `Char` production: any Unicode scalar value except `#x0`, the surrogate
/// range (already unrepresentable in `char`) and the noncharacters `#xFFFE`/`#xFFFF`.
#[inline]
#[must_use]
pub const fn is_xml11_char(c: char) -> bool {
    !matches!(c, '\u{0}' | '\u{FFFE}' | '\u{FFFF}')
}

#[inline]
#[must_use]
pub(crate) const fn is_xml_char(c: char, edition: Edition) -> bool {
    match edition {
        Edition::Xml10 => is_xml10_char(c),
        Edition::Xml11 => is_xml11_char(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_column_is_relative_to_line_start() {
        let mut pos = TextPosition::new();
        pos.advance(5);
        assert_eq!(pos.column(), 5);
        pos.new_line();
        pos.advance(2);
        assert_eq!(pos.column(), 2);
        assert_eq!(pos.line, 1);
    }

    #[test]
    fn char_classes() {
        assert!(is_xml10_char('\u{9}'));
        assert!(!is_xml10_char('\u{0}'));
        assert!(!is_xml10_char('\u{FFFE}'));
        assert!(is_xml11_char('\u{1}'));
        assert!(!is_xml11_char('\u{0}'));
        assert!(is_name_start_char('_'));
        assert!(!is_ncname_start_char(':'));
        assert!(is_name_char('-'));
    }
}
