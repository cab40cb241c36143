//! Attribute types shared by the event stream and the DOM builder.

use crate::name::{Name, OwnedName};

/// A borrowed attribute: a qualified name paired with its (already reference-expanded)
/// value.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Attribute<'a> {
    pub name: Name<'a>,
    pub value: &'a str,
}

impl<'a> Attribute<'a> {
    #[must_use]
    pub const fn new(name: Name<'a>, value: &'a str) -> Self {
        Attribute { name, value }
    }

    #[must_use]
    pub fn to_owned(&self) -> OwnedAttribute {
        OwnedAttribute { name: self.name.to_owned(), value: self.value.to_owned() }
    }
}

/// An owned attribute, used once a value must outlive the buffer it was parsed from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OwnedAttribute {
    pub name: OwnedName,
    pub value: String,
}

impl OwnedAttribute {
    #[must_use]
    pub fn new(name: OwnedName, value: impl Into<String>) -> Self {
        OwnedAttribute { name, value: value.into() }
    }

    #[must_use]
    pub fn borrow(&self) -> Attribute<'_> {
        Attribute { name: self.name.borrow(), value: &self.value }
    }
}
