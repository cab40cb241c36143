//! Layered namespace context: binds `xmlns`/`xmlns:*` declarations to a stack of frames keyed
//! by element depth, and expands qualified names against the nearest enclosing binding.
//!
//! A [`NamespaceContext`] is an immutable, reference-counted linked list of frames — pushing
//! a new frame never mutates an existing one, so a context handed to a deeply nested element
//! can be cheaply retained by anything that saw it on the way down (an error event, a DOM
//! node) without pinning the whole stack in a single owned tree.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::common::Edition;
use crate::event::{ErrorKind, Event};
use crate::name::{is_valid_ncname, parse_qname, NameError};

/// `http://www.w3.org/XML/1998/namespace`, permanently bound to the `xml` prefix.
pub const NS_XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// `http://www.w3.org/2000/xmlns/`, permanently bound to the `xmlns` prefix.
pub const NS_XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";
/// The reserved `xml` prefix.
pub const NS_XML_PREFIX: &str = "xml";
/// The reserved `xmlns` prefix.
pub const NS_XMLNS_PREFIX: &str = "xmlns";
/// The pseudo-prefix used as a map key for the default (no-prefix) namespace binding.
pub const NS_NO_PREFIX: &str = "";

/// An error raised while pushing a namespace frame or expanding a qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NamespaceError {
    /// A qualified name used a prefix with no binding in scope.
    UndeclaredPrefix(String),
    /// An attempt was made to bind `xml` to a URI other than its canonical one, bind some
    /// other prefix to the `xml` URI, or use `xmlns` as an element/attribute prefix.
    ReservedPrefix(String),
    /// An attempt was made to bind a prefix to the reserved `xmlns` URI.
    ReservedNamespace(String),
    /// An empty-URI binding was used to undeclare a prefix under XML 1.0, where that is
    /// illegal (it is only legal under XML 1.1).
    EmptyPrefixBinding(String),
    /// The qualified name itself was syntactically invalid.
    InvalidName(NameError),
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceError::UndeclaredPrefix(p) => write!(f, "undeclared namespace prefix: {p}"),
            NamespaceError::ReservedPrefix(p) => write!(f, "reserved prefix cannot be rebound: {p}"),
            NamespaceError::ReservedNamespace(u) => write!(f, "namespace URI is reserved: {u}"),
            NamespaceError::EmptyPrefixBinding(p) => write!(f, "prefix '{p}' cannot be undeclared in XML 1.0"),
            NamespaceError::InvalidName(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for NamespaceError {}

impl From<NameError> for NamespaceError {
    fn from(e: NameError) -> Self { NamespaceError::InvalidName(e) }
}

/// Options controlling a single `push` call.
#[derive(Copy, Clone, Debug)]
pub struct PushOptions {
    pub edition: Edition,
    pub strip_declarations: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        PushOptions { edition: Edition::Xml10, strip_declarations: false }
    }
}

gen_setters!(PushOptions,
    edition: val Edition,
    strip_declarations: val bool
);

struct Frame {
    default_uri: Option<Rc<str>>,
    bindings: HashMap<Rc<str>, Rc<str>>,
    parent: Option<NamespaceContext>,
}

/// A namespace context: the set of prefix/default bindings in scope at some point in the
/// element stack.
///
/// Cloning is O(1) (it clones an `Rc`); [`NamespaceContext::push`] returns a new context that
/// shares its parent's frame rather than copying it.
#[derive(Clone)]
pub struct NamespaceContext {
    frame: Rc<Frame>,
}

impl NamespaceContext {
    /// A fresh root context pre-binding `xml` and `xmlns` as required by §3.
    #[must_use]
    pub fn new() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Rc::from(NS_XML_PREFIX), Rc::from(NS_XML_URI));
        bindings.insert(Rc::from(NS_XMLNS_PREFIX), Rc::from(NS_XMLNS_URI));
        NamespaceContext {
            frame: Rc::new(Frame { default_uri: None, bindings, parent: None }),
        }
    }

    /// Scans `attrs` for `xmlns`/`xmlns:<prefix>` declarations, validates them against the
    /// reserved-prefix/namespace invariants, and returns the child context together with the
    /// attribute list to carry forward (the namespace declarations themselves removed, if
    /// `opts.strip_declarations` is set; left as-is otherwise).
    pub fn push<'a>(
        &self,
        attrs: &[(&'a str, &'a str)],
        opts: PushOptions,
    ) -> Result<(NamespaceContext, Vec<(&'a str, &'a str)>), NamespaceError> {
        let mut default_uri = self.frame.default_uri.clone();
        let mut bindings = self.frame.bindings.clone();
        let mut filtered = Vec::with_capacity(attrs.len());

        for &(name, value) in attrs {
            if name == NS_XMLNS_PREFIX {
                validate_binding(NS_NO_PREFIX, value, opts.edition)?;
                if value.is_empty() {
                    default_uri = None;
                } else {
                    default_uri = Some(Rc::from(value));
                }
                if !opts.strip_declarations {
                    filtered.push((name, value));
                }
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                validate_binding(prefix, value, opts.edition)?;
                if value.is_empty() {
                    bindings.remove(prefix);
                } else {
                    bindings.insert(Rc::from(prefix), Rc::from(value));
                }
                if !opts.strip_declarations {
                    filtered.push((name, value));
                }
            } else {
                filtered.push((name, value));
            }
        }

        let child = NamespaceContext {
            frame: Rc::new(Frame { default_uri, bindings, parent: Some(self.clone()) }),
        };
        Ok((child, filtered))
    }

    /// Returns the parent context (the state before the most recent `push`).
    ///
    /// Popping the root context returns a clone of the root itself, mirroring the invariant
    /// `pop(push(ctx, attrs).0) == ctx`: the root has no parent to ascend to.
    #[must_use]
    pub fn pop(&self) -> NamespaceContext {
        self.frame.parent.clone().unwrap_or_else(|| self.clone())
    }

    /// Resolves a prefix to its bound URI, walking outward through enclosing frames.
    #[must_use]
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return self.default_namespace();
        }
        let mut frame = &self.frame;
        loop {
            if let Some(uri) = frame.bindings.get(prefix) {
                return Some(uri);
            }
            match &frame.parent {
                Some(p) => frame = &p.frame,
                None => return None,
            }
        }
    }

    /// The default (no-prefix) namespace URI in scope, if any.
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        let mut frame = &self.frame;
        loop {
            if let Some(uri) = &frame.default_uri {
                return Some(uri);
            }
            match &frame.parent {
                Some(p) => frame = &p.frame,
                None => return None,
            }
        }
    }

    /// Expands an element's qualified name: an unprefixed name takes the default namespace
    /// (or none); a prefixed name takes its prefix's bound URI, or fails if unbound.
    pub fn expand_element<'n>(&self, qname: &'n str) -> Result<(Option<&str>, &'n str), NamespaceError> {
        let (prefix, local) = parse_qname(qname)?;
        match prefix {
            None => Ok((self.default_namespace(), local)),
            Some(p) => match self.resolve_prefix(p) {
                Some(uri) => Ok((Some(uri), local)),
                None => Err(NamespaceError::UndeclaredPrefix(p.to_owned())),
            },
        }
    }

    /// Expands an attribute's qualified name. Unlike elements, an unprefixed attribute name
    /// is never placed in the default namespace (it has no namespace at all); `xmlns`/
    /// `xmlns:*` attributes are themselves reported as being in the xmlns URI.
    pub fn expand_attribute<'n>(&self, qname: &'n str) -> Result<(Option<&str>, &'n str), NamespaceError> {
        if qname == NS_XMLNS_PREFIX {
            return Ok((Some(NS_XMLNS_URI), NS_XMLNS_PREFIX));
        }
        let (prefix, local) = parse_qname(qname)?;
        match prefix {
            None => Ok((None, local)),
            Some(NS_XMLNS_PREFIX) => Ok((Some(NS_XMLNS_URI), local)),
            Some(p) => match self.resolve_prefix(p) {
                Some(uri) => Ok((Some(uri), local)),
                None => Err(NamespaceError::UndeclaredPrefix(p.to_owned())),
            },
        }
    }

    /// Whether `uri` is bound to anything (a prefix, or the default) at this point in scope.
    #[must_use]
    pub fn in_scope(&self, uri: &str) -> bool {
        if self.default_namespace() == Some(uri) {
            return true;
        }
        let mut frame = &self.frame;
        loop {
            if frame.bindings.values().any(|v| &**v == uri) {
                return true;
            }
            match &frame.parent {
                Some(p) => frame = &p.frame,
                None => return false,
            }
        }
    }

    /// All prefix bindings visible at this point, innermost binding winning on conflicts.
    #[must_use]
    pub fn all_prefixes(&self) -> HashMap<String, String> {
        let mut out = HashMap::new();
        let mut stack = Vec::new();
        let mut frame = Some(&self.frame);
        while let Some(f) = frame {
            stack.push(f);
            frame = f.parent.as_ref().map(|p| &p.frame);
        }
        for f in stack.into_iter().rev() {
            for (k, v) in &f.bindings {
                out.insert(k.to_string(), v.to_string());
            }
        }
        out
    }
}

impl Default for NamespaceContext {
    fn default() -> Self { Self::new() }
}

fn validate_binding(prefix: &str, uri: &str, edition: Edition) -> Result<(), NamespaceError> {
    if prefix == NS_XMLNS_PREFIX {
        return Err(NamespaceError::ReservedPrefix(prefix.to_owned()));
    }
    if prefix == NS_XML_PREFIX && uri != NS_XML_URI {
        return Err(NamespaceError::ReservedPrefix(prefix.to_owned()));
    }
    if prefix != NS_XML_PREFIX && uri == NS_XML_URI {
        return Err(NamespaceError::ReservedNamespace(uri.to_owned()));
    }
    if uri == NS_XMLNS_URI {
        return Err(NamespaceError::ReservedNamespace(uri.to_owned()));
    }
    if uri.is_empty() && !prefix.is_empty() && edition == Edition::Xml10 {
        return Err(NamespaceError::EmptyPrefixBinding(prefix.to_owned()));
    }
    if !prefix.is_empty() && !is_valid_ncname(prefix) {
        return Err(NameError::InvalidStart(prefix.chars().next().unwrap_or('?')).into());
    }
    Ok(())
}

impl From<NamespaceError> for ErrorKind {
    fn from(e: NamespaceError) -> Self {
        match e {
            NamespaceError::UndeclaredPrefix(p) => ErrorKind::UndeclaredPrefix(p),
            NamespaceError::ReservedPrefix(p) => ErrorKind::ReservedPrefix(p),
            NamespaceError::ReservedNamespace(u) => ErrorKind::ReservedNamespace(u),
            NamespaceError::EmptyPrefixBinding(p) => ErrorKind::EmptyPrefixBinding(p),
            NamespaceError::InvalidName(_) => ErrorKind::BadTagStart,
        }
    }
}

/// Options accepted by [`Resolver`] (spec §4.3/§6).
#[derive(Copy, Clone, Debug)]
pub struct ResolveOptions {
    pub edition: Edition,
    /// Remove `xmlns`/`xmlns:*` declarations from the attribute list a `start_element` carries
    /// forward. Defaults to `false`.
    pub strip_declarations: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions { edition: Edition::Xml10, strip_declarations: false }
    }
}

gen_setters!(ResolveOptions,
    edition: val Edition,
    strip_declarations: val bool
);

/// The `Namespaces.resolve` stream stage (spec §2): layers a [`NamespaceContext`] frame per
/// open element, validates and expands every `start_element`'s tag and attribute names, and
/// emits an `Event::Error` ahead of the original event for any binding or expansion failure.
///
/// Attribute and element tags in the emitted events remain the raw (possibly prefixed) strings
/// the parser produced — per the event contract's `start_element` payload — only the attribute
/// *list* is filtered when `strip_declarations` is set. Callers that need expanded
/// `(uri, local)` pairs call [`NamespaceContext::expand_element`]/`expand_attribute` themselves
/// against the context this stage would have built; `Resolver` exists to validate eagerly and
/// to carry the stack so a consumer can track it without reimplementing push/pop bookkeeping.
pub struct Resolver<I> {
    inner: I,
    opts: ResolveOptions,
    stack: Vec<NamespaceContext>,
    pending: VecDeque<Event>,
}

impl<I: Iterator<Item = Event>> Resolver<I> {
    #[must_use]
    pub fn new(inner: I, opts: ResolveOptions) -> Self {
        Resolver { inner, opts, stack: vec![NamespaceContext::new()], pending: VecDeque::new() }
    }

    /// The context in scope right now (after the most recently yielded event).
    #[must_use]
    pub fn context(&self) -> &NamespaceContext {
        self.stack.last().expect("root frame is never popped")
    }

    fn handle_start_element(
        &mut self,
        tag: String,
        attributes: Vec<(String, String)>,
        location: crate::common::TextPosition,
    ) -> Event {
        let push_opts = PushOptions { edition: self.opts.edition, strip_declarations: self.opts.strip_declarations };
        let borrowed: Vec<(&str, &str)> = attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let parent = self.context().clone();

        let (child, filtered) = match parent.push(&borrowed, push_opts) {
            Ok(pair) => pair,
            Err(e) => {
                self.pending.push_back(Event::Error { kind: e.into(), message: None, location });
                self.stack.push(parent.clone());
                return Event::StartElement { tag, attributes, location };
            }
        };

        if let Err(e) = child.expand_element(&tag) {
            self.pending.push_back(Event::Error { kind: e.into(), message: None, location });
        }
        for (name, _) in &attributes {
            if name == NS_XMLNS_PREFIX || name.starts_with("xmlns:") {
                continue;
            }
            if let Err(e) = child.expand_attribute(name) {
                self.pending.push_back(Event::Error { kind: e.into(), message: None, location });
            }
        }

        let attributes = if self.opts.strip_declarations {
            filtered.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
        } else {
            attributes
        };
        self.stack.push(child);
        Event::StartElement { tag, attributes, location }
    }
}

impl<I: Iterator<Item = Event>> Iterator for Resolver<I> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            let ev = self.inner.next()?;
            let out = match ev {
                Event::StartElement { tag, attributes, location } => {
                    self.handle_start_element(tag, attributes, location)
                }
                Event::EndElement { tag, location } => {
                    if self.stack.len() > 1 {
                        self.stack.pop();
                    }
                    Event::EndElement { tag, location }
                }
                other => other,
            };
            self.pending.push_back(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_prebinds_xml_and_xmlns() {
        let ctx = NamespaceContext::new();
        assert_eq!(ctx.resolve_prefix("xml"), Some(NS_XML_URI));
        assert_eq!(ctx.resolve_prefix("xmlns"), Some(NS_XMLNS_URI));
        assert_eq!(ctx.resolve_prefix("nope"), None);
    }

    #[test]
    fn push_then_pop_restores_parent() {
        let root = NamespaceContext::new();
        let (child, _) = root.push(&[("xmlns:ns", "http://example.com")], PushOptions::default()).unwrap();
        assert_eq!(child.resolve_prefix("ns"), Some("http://example.com"));
        let popped = child.pop();
        assert_eq!(popped.resolve_prefix("ns"), None);
    }

    #[test]
    fn default_namespace_inherits_and_can_be_undeclared() {
        let root = NamespaceContext::new();
        let (child, _) = root.push(&[("xmlns", "http://a")], PushOptions::default()).unwrap();
        assert_eq!(child.default_namespace(), Some("http://a"));

        let (grandchild, _) = child.push(&[], PushOptions::default()).unwrap();
        assert_eq!(grandchild.default_namespace(), Some("http://a"));

        let (undeclared, _) = child.push(&[("xmlns", "")], PushOptions::default()).unwrap();
        assert_eq!(undeclared.default_namespace(), None);
    }

    #[test]
    fn expand_element_and_attribute() {
        let root = NamespaceContext::new();
        let (ctx, _) = root.push(&[("xmlns:ns", "http://ns.org")], PushOptions::default()).unwrap();
        assert_eq!(ctx.expand_element("ns:x").unwrap(), (Some("http://ns.org"), "x"));
        assert_eq!(ctx.expand_attribute("id").unwrap(), (None, "id"));
        assert_eq!(ctx.expand_attribute("ns:id").unwrap(), (Some("http://ns.org"), "id"));
    }

    #[test]
    fn reserved_rules() {
        let root = NamespaceContext::new();
        assert!(matches!(
            root.push(&[("xmlns:xml", "http://other")], PushOptions::default()),
            Err(NamespaceError::ReservedPrefix(_))
        ));
        assert!(matches!(
            root.push(&[("xmlns:ns", NS_XMLNS_URI)], PushOptions::default()),
            Err(NamespaceError::ReservedNamespace(_))
        ));
        assert!(matches!(
            root.push(&[("xmlns:ns", "")], PushOptions::default()),
            Err(NamespaceError::EmptyPrefixBinding(_))
        ));
        let opts11 = PushOptions::default().edition(Edition::Xml11);
        assert!(root.push(&[("xmlns:ns", "")], opts11).is_ok());
    }

    #[test]
    fn strip_declarations_removes_xmlns_attrs() {
        let root = NamespaceContext::new();
        let opts = PushOptions::default().strip_declarations(true);
        let (_, attrs) = root.push(&[("xmlns:ns", "http://ns.org"), ("id", "1")], opts).unwrap();
        assert_eq!(attrs, vec![("id", "1")]);
    }

    fn loc() -> crate::common::TextPosition {
        crate::common::TextPosition::new()
    }

    #[test]
    fn resolver_tracks_scope_across_push_and_pop() {
        let events = vec![
            Event::StartElement {
                tag: "root".into(),
                attributes: vec![("xmlns:ns".into(), "http://ns.org".into())],
                location: loc(),
            },
            Event::StartElement { tag: "ns:x".into(), attributes: vec![], location: loc() },
            Event::EndElement { tag: "ns:x".into(), location: loc() },
            Event::EndElement { tag: "root".into(), location: loc() },
        ];
        let mut resolver = Resolver::new(events.into_iter(), ResolveOptions::default());
        assert!(matches!(resolver.next(), Some(Event::StartElement { .. })));
        assert_eq!(resolver.context().resolve_prefix("ns"), Some("http://ns.org"));
        assert!(matches!(resolver.next(), Some(Event::StartElement { .. })));
        assert!(matches!(resolver.next(), Some(Event::EndElement { .. })));
        assert!(matches!(resolver.next(), Some(Event::EndElement { .. })));
        assert_eq!(resolver.context().resolve_prefix("ns"), None);
        assert_eq!(resolver.next(), None);
    }

    #[test]
    fn resolver_reports_undeclared_prefix() {
        let events = vec![Event::StartElement { tag: "ns:x".into(), attributes: vec![], location: loc() }];
        let out: Vec<_> = Resolver::new(events.into_iter(), ResolveOptions::default()).collect();
        assert!(matches!(out[0], Event::Error { kind: ErrorKind::UndeclaredPrefix(_), .. }));
        assert!(matches!(out[1], Event::StartElement { .. }));
    }

    #[test]
    fn resolver_strips_declarations_when_asked() {
        let events = vec![Event::StartElement {
            tag: "root".into(),
            attributes: vec![("xmlns:ns".into(), "http://ns.org".into()), ("id".into(), "1".into())],
            location: loc(),
        }];
        let opts = ResolveOptions::default().strip_declarations(true);
        let out: Vec<_> = Resolver::new(events.into_iter(), opts).collect();
        let Event::StartElement { attributes, .. } = &out[0] else { panic!("expected start_element") };
        assert_eq!(attributes, &vec![("id".to_owned(), "1".to_owned())]);
    }
}
