//! DOM / "simple form" tree builder (spec §4.6).
//!
//! [`build`] folds an event stream into a [`Document`] using a stack of in-progress
//! [`Element`]s; `writer::to_stream`/`writer::to_iodata` perform the inverse, so a document can
//! be round-tripped back through the same event contract every other stage understands.

use std::fmt;

use crate::common::TextPosition;
use crate::event::Event;

/// One child of an [`Element`]: text, a nested element, a CDATA section, or a comment.
#[derive(Clone, PartialEq, Debug)]
#[non_exhaustive]
pub enum Node {
    Text(String),
    CData(String),
    Comment(String),
    Element(Element),
}

/// A materialized element: its tag, its attributes in source order, and its children.
#[derive(Clone, PartialEq, Debug)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Element { tag: tag.into(), attributes: Vec::new(), children: Vec::new() }
    }

    /// The concatenation of every direct text/CDATA child, ignoring nested elements and
    /// comments — the common case of "just give me this element's text".
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(s) | Node::CData(s) => out.push_str(s),
                _ => {}
            }
        }
        out
    }
}

/// A parsed document: an optional prolog and a single root element.
#[derive(Clone, PartialEq, Debug)]
pub struct Document {
    pub prolog: Option<Vec<(String, String)>>,
    pub root: Element,
}

/// Options accepted by [`build`].
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Keep `Event::Comment` nodes in the tree. Defaults to `false`.
    pub include_comments: bool,
    /// Keep the `Event::Prolog` attributes on the returned `Document`. Defaults to `false`.
    pub include_prolog: bool,
    /// Strict mode fails (`BuildError::UnbalancedAtEof`) on an unbalanced stream; lenient mode
    /// closes whatever elements are still open at end-of-stream, innermost first, re-parenting
    /// each into its still-open parent (or making it the root, if none remain open), with no
    /// diagnostic node recording that anything was unbalanced. See
    /// `unbalanced_stream_best_effort_in_lenient_mode` below. Defaults to strict (`true`).
    pub strict: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildOptions {
    #[must_use]
    pub fn new() -> Self {
        BuildOptions { include_comments: false, include_prolog: false, strict: true }
    }
}

gen_setters!(BuildOptions,
    include_comments: val bool,
    include_prolog: val bool,
    strict: val bool
);

/// An error raised while folding an event stream into a tree.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// The stream ended, or an `end_element` arrived, before any `start_element` was seen.
    NoRootElement,
    /// The stream ended while elements were still open.
    UnbalancedAtEof,
    /// An `end_element` arrived while no element was open.
    UnexpectedEndElement(TextPosition),
    /// The upstream event sequence itself carried a parse error.
    UpstreamError(TextPosition),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::NoRootElement => f.write_str("document has no root element"),
            BuildError::UnbalancedAtEof => f.write_str("document ended with unclosed elements"),
            BuildError::UnexpectedEndElement(pos) => write!(f, "{pos}: unexpected end tag"),
            BuildError::UpstreamError(pos) => write!(f, "{pos}: upstream parse error"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Folds `events` into a [`Document`] using a stack of in-progress elements: `start_element`
/// pushes a new frame, `characters`/`cdata` append to the innermost frame, `end_element` pops
/// and attaches the finished element to its new parent (or finalizes the root at depth 0).
pub fn build(events: impl Iterator<Item = Event>, opts: &BuildOptions) -> Result<Document, BuildError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut prolog = None;
    let mut root: Option<Element> = None;

    for event in events {
        match event {
            Event::StartDocument | Event::EndDocument => {}
            Event::Prolog { attributes, .. } => {
                if opts.include_prolog {
                    prolog = Some(attributes);
                }
            }
            Event::StartElement { tag, attributes, .. } => {
                stack.push(Element { tag, attributes, children: Vec::new() });
            }
            Event::EndElement { location, .. } => {
                let Some(finished) = stack.pop() else {
                    if opts.strict {
                        return Err(BuildError::UnexpectedEndElement(location));
                    }
                    continue;
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(finished)),
                    None => root = Some(finished),
                }
            }
            Event::Characters { text, .. } => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::Text(text));
                }
            }
            Event::CData { content, .. } => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::CData(content));
                }
            }
            Event::Comment { content, .. } => {
                if opts.include_comments {
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Comment(content));
                    }
                }
            }
            Event::ProcessingInstruction { .. } | Event::Dtd { .. } | Event::DtdError { .. } => {}
            Event::Error { location, .. } => {
                if opts.strict {
                    return Err(BuildError::UpstreamError(location));
                }
            }
        }
    }

    if !stack.is_empty() {
        if opts.strict {
            return Err(BuildError::UnbalancedAtEof);
        }
        // Lenient mode: close out whatever is left, innermost first, best-effort.
        while let Some(finished) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(Node::Element(finished)),
                None => root = Some(finished),
            }
        }
    }

    match root {
        Some(root) => Ok(Document { prolog, root }),
        None => Err(BuildError::NoRootElement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TextPosition;

    fn loc() -> TextPosition {
        TextPosition::new()
    }

    #[test]
    fn builds_nested_tree() {
        let events = vec![
            Event::StartDocument,
            Event::StartElement { tag: "root".into(), attributes: vec![], location: loc() },
            Event::StartElement {
                tag: "child".into(),
                attributes: vec![("id".into(), "1".into())],
                location: loc(),
            },
            Event::Characters { text: "text".into(), location: loc() },
            Event::EndElement { tag: "child".into(), location: loc() },
            Event::EndElement { tag: "root".into(), location: loc() },
            Event::EndDocument,
        ];
        let doc = build(events.into_iter(), &BuildOptions::new()).unwrap();
        assert_eq!(doc.root.tag, "root");
        assert_eq!(doc.root.children.len(), 1);
        let Node::Element(child) = &doc.root.children[0] else { panic!("expected element") };
        assert_eq!(child.tag, "child");
        assert_eq!(child.text_content(), "text");
    }

    #[test]
    fn unbalanced_stream_is_an_error_in_strict_mode() {
        let events = vec![
            Event::StartElement { tag: "root".into(), attributes: vec![], location: loc() },
        ];
        let err = build(events.into_iter(), &BuildOptions::new()).unwrap_err();
        assert_eq!(err, BuildError::UnbalancedAtEof);
    }

    #[test]
    fn unbalanced_stream_best_effort_in_lenient_mode() {
        let events = vec![
            Event::StartElement { tag: "root".into(), attributes: vec![], location: loc() },
            Event::StartElement { tag: "child".into(), attributes: vec![], location: loc() },
        ];
        let opts = BuildOptions::new().strict(false);
        let doc = build(events.into_iter(), &opts).unwrap();
        assert_eq!(doc.root.tag, "root");
        assert_eq!(doc.root.children.len(), 1);
    }

    #[test]
    fn no_root_element_is_an_error() {
        let events: Vec<Event> = vec![Event::StartDocument, Event::EndDocument];
        assert_eq!(build(events.into_iter(), &BuildOptions::new()).unwrap_err(), BuildError::NoRootElement);
    }
}
