//! Qualified names: parsing and validating the `NCName`/`QName` productions used by element
//! and attribute tags, and the borrowed/owned name types used throughout the event stream.

use std::fmt;

use crate::common::{is_name_char, is_name_start_char};

/// A syntactically-invalid qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    /// The name is empty.
    Empty,
    /// The first character is not a valid `NameStartChar`.
    InvalidStart(char),
    /// A later character is not a valid `NameChar`.
    InvalidChar(char),
    /// More than one colon was found; a `QName` allows at most one.
    MultipleColons,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => f.write_str("name is empty"),
            NameError::InvalidStart(c) => write!(f, "'{c}' is not a valid name start character"),
            NameError::InvalidChar(c) => write!(f, "'{c}' is not a valid name character"),
            NameError::MultipleColons => f.write_str("qualified name has more than one colon"),
        }
    }
}

impl std::error::Error for NameError {}

/// Checks that `s` is a valid `NCName`: an XML `Name` with no colon.
#[must_use]
pub fn is_valid_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => return false,
        Some(c) if c == ':' || !is_name_start_char(c) => return false,
        _ => {}
    }
    chars.all(|c| c != ':' && is_name_char(c))
}

/// Splits a raw tag/attribute name into an optional prefix and a local part, validating both
/// against the `QName` production (`NCName` or `NCName:NCName`, exactly one colon).
pub fn parse_qname(s: &str) -> Result<(Option<&str>, &str), NameError> {
    if s.is_empty() {
        return Err(NameError::Empty);
    }
    let mut parts = s.split(':');
    let first = parts.next().unwrap();
    match parts.next() {
        None => {
            validate_ncname_parts(first)?;
            Ok((None, first))
        }
        Some(second) => {
            if parts.next().is_some() {
                return Err(NameError::MultipleColons);
            }
            validate_ncname_parts(first)?;
            validate_ncname_parts(second)?;
            Ok((Some(first), second))
        }
    }
}

fn validate_ncname_parts(s: &str) -> Result<(), NameError> {
    let mut chars = s.chars();
    match chars.next() {
        None => return Err(NameError::Empty),
        Some(c) if !is_name_start_char(c) => return Err(NameError::InvalidStart(c)),
        _ => {}
    }
    for c in chars {
        if !is_name_char(c) {
            return Err(NameError::InvalidChar(c));
        }
    }
    Ok(())
}

/// A borrowed qualified name: an optional namespace prefix plus a local name.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Name<'a> {
    pub prefix: Option<&'a str>,
    pub local_name: &'a str,
}

impl<'a> Name<'a> {
    #[must_use]
    pub const fn new(prefix: Option<&'a str>, local_name: &'a str) -> Self {
        Name { prefix, local_name }
    }

    #[must_use]
    pub const fn local(local_name: &'a str) -> Self {
        Name { prefix: None, local_name }
    }

    #[must_use]
    pub fn to_owned(&self) -> OwnedName {
        OwnedName {
            prefix: self.prefix.map(str::to_owned),
            local_name: self.local_name.to_owned(),
        }
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(p) => write!(f, "{p}:{}", self.local_name),
            None => f.write_str(self.local_name),
        }
    }
}

impl<'a> From<&'a str> for Name<'a> {
    fn from(s: &'a str) -> Self {
        Name::local(s)
    }
}

/// An owned qualified name, used wherever a name must outlive the event that carried it.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct OwnedName {
    pub prefix: Option<String>,
    pub local_name: String,
}

impl OwnedName {
    #[must_use]
    pub fn local(local_name: impl Into<String>) -> Self {
        OwnedName { prefix: None, local_name: local_name.into() }
    }

    #[must_use]
    pub fn borrow(&self) -> Name<'_> {
        Name { prefix: self.prefix.as_deref(), local_name: &self.local_name }
    }
}

impl fmt::Display for OwnedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.borrow().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ncname_ok() {
        assert!(is_valid_ncname("foo"));
        assert!(is_valid_ncname("_foo.bar-1"));
        assert!(!is_valid_ncname("foo:bar"));
        assert!(!is_valid_ncname("1foo"));
        assert!(!is_valid_ncname(""));
    }

    #[test]
    fn qname_single_colon() {
        assert_eq!(parse_qname("ns:foo"), Ok((Some("ns"), "foo")));
        assert_eq!(parse_qname("foo"), Ok((None, "foo")));
        assert_eq!(parse_qname("a:b:c"), Err(NameError::MultipleColons));
        assert_eq!(parse_qname(""), Err(NameError::Empty));
    }

    #[test]
    fn display_roundtrip() {
        let n = Name::new(Some("ns"), "foo");
        assert_eq!(n.to_string(), "ns:foo");
        assert_eq!(Name::local("bar").to_string(), "bar");
    }
}
