//! The structured representation a raw internal subset is parsed into (spec §3 "DTD model").

use std::collections::HashMap;

/// An element's allowed content, per DTD §3.2 of the XML spec.
///
/// `Seq`/`Choice`/`Mixed` hold their member items as nested `ContentModel`s so that an
/// occurrence wrapper (`ZeroOrMore`/`OneOrMore`/`Optional`) can sit on an individual item as
/// well as on the whole group, exactly as the grammar allows.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ContentModel {
    Empty,
    Any,
    PCData,
    /// A bare element-name reference, only ever found as a leaf inside `Seq`/`Choice`.
    Name(String),
    Seq(Vec<ContentModel>),
    Choice(Vec<ContentModel>),
    /// `(#PCDATA | a | b)*` — the element names allowed to mix with text.
    Mixed(Vec<String>),
    ZeroOrMore(Box<ContentModel>),
    OneOrMore(Box<ContentModel>),
    Optional(Box<ContentModel>),
}

/// The declared type of an `ATTLIST` attribute.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum AttrType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Enumeration(Vec<String>),
    Notation(Vec<String>),
}

impl AttrType {
    /// `CDATA` attributes are left verbatim by attribute-value normalization (spec §4.4); all
    /// other types are trimmed and whitespace-collapsed.
    #[must_use]
    pub fn is_cdata(&self) -> bool {
        matches!(self, AttrType::CData)
    }
}

/// The default-value clause of an `ATTLIST` attribute declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum AttrDefault {
    Required,
    Implied,
    Fixed(String),
    Default(String),
}

/// One `(name type default)` triple out of an `<!ATTLIST elem ...>` declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AttrDef {
    pub name: String,
    pub attr_type: AttrType,
    pub default: AttrDefault,
}

/// The value or external reference an `<!ENTITY>` declaration binds a name to.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum EntityDef {
    Internal(String),
    External {
        system_id: String,
        public_id: Option<String>,
    },
    ExternalUnparsed {
        system_id: String,
        public_id: Option<String>,
        notation: String,
    },
}

/// A `<!NOTATION>` declaration's external identifier.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NotationDef {
    pub system_id: Option<String>,
    pub public_id: Option<String>,
}

/// The structured model a DOCTYPE's internal subset is parsed into.
///
/// Built incrementally by `dtd::parser::parse_internal_subset` and consulted by
/// `dtd::validator::DtdValidator` while it rewrites attribute events on the way past.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DtdModel {
    pub elements: HashMap<String, ContentModel>,
    pub attributes: HashMap<String, Vec<AttrDef>>,
    pub entities: HashMap<String, EntityDef>,
    pub param_entities: HashMap<String, String>,
    pub notations: HashMap<String, NotationDef>,
    pub root_element: Option<String>,
}

impl DtdModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attribute definition for `elem_name`'s `attr_name`, if declared.
    #[must_use]
    pub fn attr_def(&self, elem_name: &str, attr_name: &str) -> Option<&AttrDef> {
        self.attributes.get(elem_name)?.iter().find(|a| a.name == attr_name)
    }
}
