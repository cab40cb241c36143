//! Small shared utilities that don't belong to any single pipeline stage.

use std::fmt;

/// The encoding of a raw byte input, as detected by `preprocess::detect_bom` /
/// `preprocess::sniff_declared_latin1`, or as declared in a parsed XML prologue.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Iso88591,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Iso88591 => "ISO-8859-1",
        })
    }
}

/// Splits `haystack` on occurrences of `needle` at the top paren-nesting level only — used by
/// the DTD content-model parser to separate sequence/choice group members without being
/// confused by commas or pipes nested inside a sub-group.
///
/// `(` increases depth, `)` decreases it; a split point is only recognized at depth 0.
pub(crate) fn split_top_level(haystack: &str, needle: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in haystack.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == needle && depth == 0 => {
                parts.push(&haystack[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&haystack[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_top_level_ignores_nested() {
        assert_eq!(split_top_level("a,(b,c),d", ','), vec!["a", "(b,c)", "d"]);
        assert_eq!(split_top_level("a|b|c", '|'), vec!["a", "b", "c"]);
        assert_eq!(split_top_level("solo", ','), vec!["solo"]);
    }
}
