//! The inverse of [`dom::build`]: turns a [`dom::Document`] back into an `Event` sequence or
//! into serialized XML text (spec §4.6).
//!
//! [`to_stream`] is a pure tree walk that hands the pipeline-shaped `Event` sequence back out —
//! useful for re-feeding a document through `namespace`/`validate` unchanged. [`to_iodata`]
//! renders straight to text, with optional pretty-printing and an optional `<?xml ?>`
//! declaration, escaping content the way `escape::escape_pcdata`/`escape_attribute` define.

use crate::dom::{Document, Element, Node};
use crate::escape::{escape_attribute, escape_pcdata};
use crate::event::Event;

/// Options accepted by [`to_iodata`].
#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Insert newlines and indentation between element children. Defaults to `false` (compact
    /// output, byte-for-byte minimal).
    pub pretty: bool,
    /// The string repeated once per nesting level when `pretty` is set. Defaults to two spaces.
    pub indent: String,
    /// Emit a leading `<?xml version="1.0"?>` declaration (or `version="1.1"` for
    /// [`crate::common::XmlVersion::Version11`]). Defaults to `false`.
    pub xml_declaration: bool,
    /// The XML version recorded in the declaration, when `xml_declaration` is set.
    pub version: crate::common::XmlVersion,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            pretty: false,
            indent: "  ".to_string(),
            xml_declaration: false,
            version: crate::common::XmlVersion::Version10,
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

gen_setters!(WriterOptions,
    pretty: val bool,
    indent: into String,
    xml_declaration: val bool,
    version: val crate::common::XmlVersion
);

/// Replays `document` as the `Event` sequence that `dom::build` would have consumed to produce
/// it: `StartDocument`, an optional `Prolog`, the root element's `StartElement`/children/
/// `EndElement`, and `EndDocument`. All locations are [`crate::common::TextPosition::new`] since
/// a materialized tree carries no source position of its own.
#[must_use]
pub fn to_stream(document: &Document) -> Vec<Event> {
    let loc = crate::common::TextPosition::new();
    let mut out = vec![Event::StartDocument];
    if let Some(attributes) = &document.prolog {
        out.push(Event::Prolog { attributes: attributes.clone(), location: loc });
    }
    emit_element(&document.root, loc, &mut out);
    out.push(Event::EndDocument);
    out
}

fn emit_element(element: &Element, loc: crate::common::TextPosition, out: &mut Vec<Event>) {
    out.push(Event::StartElement {
        tag: element.tag.clone(),
        attributes: element.attributes.clone(),
        location: loc,
    });
    for child in &element.children {
        match child {
            Node::Text(text) => out.push(Event::Characters { text: text.clone(), location: loc }),
            Node::CData(content) => out.push(Event::CData { content: content.clone(), location: loc }),
            Node::Comment(content) => out.push(Event::Comment { content: content.clone(), location: loc }),
            Node::Element(child) => emit_element(child, loc, out),
        }
    }
    out.push(Event::EndElement { tag: element.tag.clone(), location: loc });
}

/// Renders `document` to XML text.
#[must_use]
pub fn to_iodata(document: &Document, opts: &WriterOptions) -> String {
    let mut out = String::new();
    if opts.xml_declaration {
        out.push_str(&format!(r#"<?xml version="{}"?>"#, opts.version));
        if opts.pretty {
            out.push('\n');
        }
    }
    if let Some(attributes) = &document.prolog {
        if !opts.xml_declaration {
            write_pi_like(&mut out, "xml", attributes);
            if opts.pretty {
                out.push('\n');
            }
        }
    }
    write_element(&mut out, &document.root, 0, opts);
    out
}

fn write_pi_like(out: &mut String, target: &str, attributes: &[(String, String)]) {
    out.push_str("<?");
    out.push_str(target);
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push_str("?>");
}

fn write_indent(out: &mut String, depth: usize, opts: &WriterOptions) {
    if !opts.pretty {
        return;
    }
    out.push('\n');
    for _ in 0..depth {
        out.push_str(&opts.indent);
    }
}

fn write_element(out: &mut String, element: &Element, depth: usize, opts: &WriterOptions) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    // A child list that is pure text never gets pretty-printed line breaks, so round-tripping
    // `<a>text</a>` never grows a spurious newline around the only thing it contains.
    let only_text = element.children.iter().all(|c| matches!(c, Node::Text(_)));
    for child in &element.children {
        if !only_text {
            write_indent(out, depth + 1, opts);
        }
        match child {
            Node::Text(text) => out.push_str(&escape_pcdata(text)),
            Node::CData(content) => {
                out.push_str("<![CDATA[");
                out.push_str(content);
                out.push_str("]]>");
            }
            Node::Comment(content) => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            Node::Element(child) => write_element(out, child, depth + 1, opts),
        }
    }
    if !only_text {
        write_indent(out, depth, opts);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::BuildOptions;

    fn doc_from(xml: &str) -> Document {
        let events = crate::reader::EventReader::new(xml);
        crate::dom::build(events, &BuildOptions::new()).unwrap()
    }

    #[test]
    fn to_stream_round_trips_through_build() {
        let doc = doc_from(r#"<root><child id="1">text</child></root>"#);
        let replayed = to_stream(&doc);
        let rebuilt = crate::dom::build(replayed.into_iter(), &BuildOptions::new()).unwrap();
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn to_iodata_compact() {
        let doc = doc_from(r#"<root><child id="1">text</child></root>"#);
        let xml = to_iodata(&doc, &WriterOptions::new());
        assert_eq!(xml, r#"<root><child id="1">text</child></root>"#);
    }

    #[test]
    fn to_iodata_pretty_indents_element_children_not_text_runs() {
        let doc = doc_from("<root><child>text</child></root>");
        let xml = to_iodata(&doc, &WriterOptions::new().pretty(true));
        assert_eq!(xml, "<root>\n  <child>text</child>\n</root>");
    }

    #[test]
    fn to_iodata_escapes_attribute_and_text_content() {
        let doc = doc_from(r#"<a x="1&amp;2">5 &gt; 3</a>"#);
        let xml = to_iodata(&doc, &WriterOptions::new());
        assert_eq!(xml, r#"<a x="1&amp;2">5 &gt; 3</a>"#);
    }

    #[test]
    fn to_iodata_self_closes_empty_elements() {
        let doc = doc_from("<a><empty/></a>");
        let xml = to_iodata(&doc, &WriterOptions::new());
        assert_eq!(xml, "<a><empty/></a>");
    }

    #[test]
    fn to_iodata_emits_xml_declaration_when_requested() {
        let doc = doc_from("<a/>");
        let xml = to_iodata(&doc, &WriterOptions::new().xml_declaration(true));
        assert_eq!(xml, r#"<?xml version="1.0"?><a/>"#);
    }
}
