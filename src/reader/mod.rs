//! The streaming tokenizer that turns preprocessed UTF-8 text into the `Event` sequence every
//! other stage consumes (spec §4.2). [`EventReader`] accepts either a complete in-memory
//! document or a lazily produced sequence of byte chunks, and implements `Iterator<Item =
//! Event>` directly: malformed input becomes an `Event::Error` in the stream rather than a
//! `Result`, consistent with every downstream stage (`namespace`, `validate`, `dtd::validator`).
//!
//! Text fed to [`EventReader`] is expected to already be valid UTF-8 with normalized line
//! endings; BOM stripping, encoding conversion and CRLF normalization are `preprocess`'s job,
//! run ahead of the reader.

pub mod config;

pub use config::ParserConfig;

use std::collections::{HashMap, VecDeque};

use crate::common::{is_name_start_char, is_whitespace_char, DialectMode, Position, TextPosition};
use crate::dtd::parser::quick_scan_internal_entities;
use crate::escape::{decode_char_ref, resolve_predefined_entity};
use crate::event::{ErrorKind, Event};

const DOCTYPE_PREFIX: usize = "<!DOCTYPE".len();
const CDATA_PREFIX: usize = "<![CDATA[".len();

#[inline]
fn is_ws_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Where [`EventReader`] pulls its raw bytes from.
enum Source {
    /// A complete in-memory document; running out of buffer means end-of-input.
    Complete,
    /// A lazily pulled sequence of byte chunks; running out of buffer means pulling another
    /// chunk before declaring end-of-input.
    Chunked(Box<dyn Iterator<Item = Vec<u8>>>),
}

/// A pull parser over a UTF-8 XML document (spec §4.2).
///
/// Construct with [`EventReader::new`] for a complete string, or [`EventReader::from_chunks`]
/// for incremental input; either way the reader is an `Iterator<Item = Event>` that starts with
/// `Event::StartDocument` and ends with `Event::EndDocument` (or an `Event::Error` of kind
/// `ErrorKind::Incomplete` if the input ran out mid-construct in strict mode).
pub struct EventReader {
    buf: String,
    pos: usize,
    source: Source,
    config: ParserConfig,
    loc: TextPosition,
    pending: VecDeque<Event>,
    stack: Vec<String>,
    entities: HashMap<String, String>,
    started: bool,
    finished: bool,
    any_markup_seen: bool,
}

impl EventReader {
    /// Parses a complete in-memory document with the default [`ParserConfig`].
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    /// Parses a complete in-memory document.
    #[must_use]
    pub fn with_config(input: &str, config: ParserConfig) -> Self {
        EventReader {
            buf: input.to_owned(),
            pos: 0,
            source: Source::Complete,
            config,
            loc: TextPosition::new(),
            pending: VecDeque::new(),
            stack: Vec::new(),
            entities: HashMap::new(),
            started: false,
            finished: false,
            any_markup_seen: false,
        }
    }

    /// Parses a lazily produced sequence of byte chunks; each chunk must be valid UTF-8 on its
    /// own (callers that split multi-byte characters across chunk boundaries should buffer
    /// first, as `preprocess::Utf16ChunkDecoder` does for UTF-16 input).
    #[must_use]
    pub fn from_chunks<I>(chunks: I, config: ParserConfig) -> Self
    where
        I: Iterator<Item = Vec<u8>> + 'static,
    {
        EventReader {
            buf: String::new(),
            pos: 0,
            source: Source::Chunked(Box::new(chunks)),
            config,
            loc: TextPosition::new(),
            pending: VecDeque::new(),
            stack: Vec::new(),
            entities: HashMap::new(),
            started: false,
            finished: false,
            any_markup_seen: false,
        }
    }

    fn pull_more(&mut self) -> bool {
        match &mut self.source {
            Source::Complete => false,
            Source::Chunked(iter) => match iter.next() {
                Some(bytes) => match String::from_utf8(bytes) {
                    Ok(s) => {
                        self.buf.push_str(&s);
                        true
                    }
                    Err(_) => false,
                },
                None => false,
            },
        }
    }

    /// Ensures at least one more byte is available past `self.pos`, pulling chunks as needed.
    fn has_more(&mut self) -> bool {
        while self.pos >= self.buf.len() {
            if !self.pull_more() {
                return false;
            }
        }
        true
    }

    /// Finds `needle` at or after `start`, pulling chunks until it's found or the source is
    /// exhausted.
    fn find_from(&mut self, start: usize, needle: &str) -> Option<usize> {
        loop {
            if let Some(i) = self.buf[start..].find(needle) {
                return Some(start + i);
            }
            if !self.pull_more() {
                return None;
            }
        }
    }

    /// Returns up to `n` bytes from `self.pos`, pulling chunks as needed; shorter than `n` only
    /// when the source is genuinely exhausted.
    fn peek_prefix(&mut self, n: usize) -> String {
        while self.buf.len() - self.pos < n {
            if !self.pull_more() {
                break;
            }
        }
        let end = (self.pos + n).min(self.buf.len());
        self.buf[self.pos..end].to_owned()
    }

    fn loc_for(&self, target: usize) -> TextPosition {
        let mut loc = self.loc;
        for c in self.buf[self.pos..target].chars() {
            if c == '\n' {
                loc.new_line();
            } else {
                loc.advance(c.len_utf8() as u64);
            }
        }
        loc
    }

    fn advance_to(&mut self, target: usize) {
        for c in self.buf[self.pos..target].chars() {
            if c == '\n' {
                self.loc.new_line();
            } else {
                self.loc.advance(c.len_utf8() as u64);
            }
        }
        self.pos = target;
    }

    /// Scans from `start` for the first unquoted byte equal to `target` (an ASCII byte),
    /// treating `"`/`'` as opening a quoted run that shields everything, including `target`,
    /// until its matching close quote.
    fn scan_unquoted_byte(&mut self, start: usize, target: u8) -> Option<usize> {
        let mut i = start;
        let mut quote: Option<u8> = None;
        loop {
            if i >= self.buf.len() {
                if !self.pull_more() {
                    return None;
                }
                continue;
            }
            let b = self.buf.as_bytes()[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    _ if b == target => return Some(i),
                    _ => {}
                },
            }
            i += 1;
        }
    }

    /// Substitutes predefined entities, numeric character references and DTD-declared internal
    /// entities in `s`; unresolvable references are reported as `ErrorKind::UndefinedEntity` and
    /// dropped from the output.
    fn expand_references(&self, s: &str, location: TextPosition) -> (String, Vec<Event>) {
        if !s.contains('&') {
            return (s.to_owned(), Vec::new());
        }
        let mut out = String::with_capacity(s.len());
        let mut errors = Vec::new();
        let mut rest = s;
        loop {
            match rest.find('&') {
                None => {
                    out.push_str(rest);
                    break;
                }
                Some(i) => {
                    out.push_str(&rest[..i]);
                    let after = &rest[i + 1..];
                    match after.find(';') {
                        Some(j) => {
                            let name = &after[..j];
                            if let Some(body) = name.strip_prefix('#') {
                                match decode_char_ref(body) {
                                    Some(c) => out.push(c),
                                    None => errors.push(Event::Error {
                                        kind: ErrorKind::UndefinedEntity(format!("#{body}")),
                                        message: None,
                                        location,
                                    }),
                                }
                            } else if let Some(c) = resolve_predefined_entity(name) {
                                out.push(c);
                            } else if let Some(value) = self.entities.get(name) {
                                out.push_str(value);
                            } else {
                                errors.push(Event::Error {
                                    kind: ErrorKind::UndefinedEntity(name.to_owned()),
                                    message: None,
                                    location,
                                });
                            }
                            rest = &after[j + 1..];
                        }
                        None => {
                            out.push('&');
                            out.push_str(after);
                            break;
                        }
                    }
                }
            }
        }
        (out, errors)
    }

    fn next_event(&mut self) -> Option<Event> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            if self.finished {
                return None;
            }
            if !self.started {
                self.started = true;
                self.pending.push_back(Event::StartDocument);
                continue;
            }
            if !self.has_more() {
                self.finish_at_eof();
                continue;
            }
            self.step();
        }
    }

    fn finish_at_eof(&mut self) {
        self.finished = true;
        if self.stack.is_empty() {
            self.pending.push_back(Event::EndDocument);
            return;
        }
        if self.config.mode == DialectMode::Html {
            let loc = self.loc;
            while let Some(tag) = self.stack.pop() {
                self.pending.push_back(Event::EndElement { tag, location: loc });
            }
            self.pending.push_back(Event::EndDocument);
        } else {
            self.pending.push_back(Event::Error {
                kind: ErrorKind::Incomplete,
                message: None,
                location: self.loc,
            });
        }
    }

    fn step(&mut self) {
        if self.buf.as_bytes()[self.pos] == b'<' {
            self.dispatch_markup();
        } else {
            self.parse_text();
        }
    }

    fn dispatch_markup(&mut self) {
        let prefix = self.peek_prefix(DOCTYPE_PREFIX);
        if prefix.starts_with("<?") {
            self.parse_pi_or_prolog();
        } else if prefix.starts_with("<!--") {
            self.parse_comment();
        } else if prefix.starts_with("<![CDATA[") {
            self.parse_cdata();
        } else if prefix == "<!DOCTYPE" {
            self.parse_doctype();
        } else if prefix.starts_with("</") {
            self.parse_tag();
        } else if prefix.len() > 1 && is_name_start_char(prefix[1..].chars().next().unwrap_or(' ')) {
            self.parse_tag();
        } else {
            let loc = self.loc;
            self.advance_to((self.pos + 1).min(self.buf.len()));
            self.pending.push_back(Event::Error { kind: ErrorKind::BadTagStart, message: None, location: loc });
        }
    }

    fn handle_unterminated(&mut self, kind: ErrorKind, loc: TextPosition) {
        self.advance_to(self.buf.len());
        if self.config.mode == DialectMode::Xml {
            self.pending.push_back(Event::Error { kind: ErrorKind::Incomplete, message: None, location: loc });
            self.finished = true;
        } else {
            self.pending.push_back(Event::Error { kind, message: None, location: loc });
        }
    }

    fn parse_text(&mut self) {
        let loc = self.loc;
        let start = self.pos;
        let end = self.find_from(start, "<").unwrap_or(self.buf.len());
        if end == start {
            // Guard against a degenerate call; step() only reaches here when buf[pos] != '<'.
            self.advance_to(start + 1);
            return;
        }
        let raw = self.buf[start..end].to_owned();
        self.advance_to(end);
        let (text, errors) = self.expand_references(&raw, loc);
        self.pending.extend(errors);
        if !text.is_empty() {
            self.pending.push_back(Event::Characters { text, location: loc });
        }
    }

    fn parse_comment(&mut self) {
        let loc = self.loc;
        let start = self.pos;
        match self.find_from(start + 4, "-->") {
            Some(end) => {
                let content = self.buf[start + 4..end].to_owned();
                self.advance_to(end + 3);
                if self.config.include_comments {
                    self.pending.push_back(Event::Comment { content, location: loc });
                }
                self.any_markup_seen = true;
            }
            None => self.handle_unterminated(ErrorKind::UnterminatedComment, loc),
        }
    }

    fn parse_cdata(&mut self) {
        let loc = self.loc;
        let start = self.pos;
        match self.find_from(start + CDATA_PREFIX, "]]>") {
            Some(end) => {
                let content = self.buf[start + CDATA_PREFIX..end].to_owned();
                self.advance_to(end + 3);
                self.pending.push_back(Event::CData { content, location: loc });
                self.any_markup_seen = true;
            }
            None => self.handle_unterminated(ErrorKind::UnterminatedCData, loc),
        }
    }

    fn parse_pi_or_prolog(&mut self) {
        let loc = self.loc;
        let start = self.pos;
        let Some(end) = self.find_from(start + 2, "?>") else {
            self.handle_unterminated(ErrorKind::UnterminatedPi, loc);
            return;
        };
        let body = self.buf[start + 2..end].to_owned();
        self.advance_to(end + 2);
        let target_end = body.find(is_whitespace_char).unwrap_or(body.len());
        let target = body[..target_end].to_owned();
        let rest = body[target_end..].trim_start().to_owned();

        if target == "xml" && !self.any_markup_seen {
            let (attributes, _) = self.parse_attributes(&rest, loc);
            if self.config.include_prolog {
                self.pending.push_back(Event::Prolog { attributes, location: loc });
            }
        } else {
            let content = if rest.is_empty() { None } else { Some(rest) };
            self.pending.push_back(Event::ProcessingInstruction { target, content, location: loc });
        }
        self.any_markup_seen = true;
    }

    fn parse_doctype(&mut self) {
        let loc = self.loc;
        let tag_start = self.pos;
        let mut i = tag_start + DOCTYPE_PREFIX;
        let mut quote: Option<u8> = None;
        let mut bracket_depth: i32 = 0;
        loop {
            if i >= self.buf.len() {
                if !self.pull_more() {
                    self.finish_doctype_eof(tag_start, loc);
                    return;
                }
                continue;
            }
            let b = self.buf.as_bytes()[i];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    } else if b == b'>' && bracket_depth <= 0 {
                        self.finish_doctype_recovered(tag_start, i, loc);
                        return;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'[' => bracket_depth += 1,
                    b']' => bracket_depth -= 1,
                    b'>' if bracket_depth <= 0 => {
                        self.finish_doctype_normal(tag_start, i, loc);
                        return;
                    }
                    _ => {}
                },
            }
            i += 1;
        }
    }

    fn finish_doctype_normal(&mut self, tag_start: usize, gt_idx: usize, loc: TextPosition) {
        let content = self.buf[tag_start + 2..gt_idx].to_owned();
        self.advance_to(gt_idx + 1);
        self.entities.extend(quick_scan_internal_entities(&content));
        self.pending.push_back(Event::Dtd { content, location: loc });
        self.any_markup_seen = true;
    }

    /// HTML-mode recovery: a quoted literal inside the DOCTYPE never closed before the `>` that
    /// would end the declaration appeared, so that `>` is treated as both the offending
    /// character and the resync point. In strict mode this is an incomplete document; there is
    /// no recovery to fall back on.
    fn finish_doctype_recovered(&mut self, tag_start: usize, gt_idx: usize, loc: TextPosition) {
        let content = self.buf[tag_start + 2..gt_idx].to_owned();
        let error_loc = self.loc_for(gt_idx);
        self.advance_to(gt_idx + 1);
        if self.config.mode == DialectMode::Xml {
            self.pending.push_back(Event::Error { kind: ErrorKind::Incomplete, message: None, location: loc });
            self.finished = true;
        } else {
            self.pending.push_back(Event::Dtd { content, location: loc });
            self.pending.push_back(Event::Error {
                kind: ErrorKind::UnterminatedDoctypeString,
                message: None,
                location: error_loc,
            });
        }
        self.any_markup_seen = true;
    }

    fn finish_doctype_eof(&mut self, tag_start: usize, loc: TextPosition) {
        let content = self.buf[tag_start + 2..].to_owned();
        self.advance_to(self.buf.len());
        if self.config.mode == DialectMode::Xml {
            self.pending.push_back(Event::Error { kind: ErrorKind::Incomplete, message: None, location: loc });
            self.finished = true;
        } else {
            self.pending.push_back(Event::Dtd { content, location: loc });
            self.pending.push_back(Event::Error {
                kind: ErrorKind::UnterminatedDoctypeString,
                message: None,
                location: self.loc,
            });
        }
        self.any_markup_seen = true;
    }

    fn parse_tag(&mut self) {
        let loc = self.loc;
        let tag_start = self.pos;
        let is_end = self.buf.as_bytes().get(tag_start + 1) == Some(&b'/');
        let name_start = if is_end { tag_start + 2 } else { tag_start + 1 };
        let Some(gt_idx) = self.scan_unquoted_byte(name_start, b'>') else {
            self.handle_unterminated(ErrorKind::UnterminatedString, loc);
            return;
        };
        let mut content_end = gt_idx;
        let mut self_closing = false;
        if !is_end && content_end > name_start && self.buf.as_bytes()[content_end - 1] == b'/' {
            self_closing = true;
            content_end -= 1;
        }
        let interior = self.buf[name_start..content_end].to_owned();
        self.advance_to(gt_idx + 1);
        self.any_markup_seen = true;
        if is_end {
            self.finish_end_tag(interior.trim_matches(is_whitespace_char).to_owned(), loc);
        } else {
            self.finish_start_tag(&interior, self_closing, loc);
        }
    }

    fn finish_start_tag(&mut self, interior: &str, self_closing: bool, loc: TextPosition) {
        let name_end = interior.find(is_whitespace_char).unwrap_or(interior.len());
        let (name_part, attr_part) = interior.split_at(name_end);
        if name_part.is_empty() || !name_part.chars().next().map(is_name_start_char).unwrap_or(false) {
            self.pending.push_back(Event::Error { kind: ErrorKind::BadTagStart, message: None, location: loc });
            return;
        }
        let tag = name_part.to_owned();
        let (attributes, errors) = self.parse_attributes(attr_part, loc);
        self.pending.extend(errors);
        self.pending.push_back(Event::StartElement { tag: tag.clone(), attributes, location: loc });
        if self_closing {
            self.pending.push_back(Event::EndElement { tag, location: loc });
        } else {
            self.stack.push(tag);
        }
    }

    fn finish_end_tag(&mut self, tag: String, loc: TextPosition) {
        match self.stack.pop() {
            Some(expected) if expected == tag => {}
            Some(expected) => self.pending.push_back(Event::Error {
                kind: ErrorKind::MismatchedEndTag { expected, found: tag.clone() },
                message: None,
                location: loc,
            }),
            None => self.pending.push_back(Event::Error {
                kind: ErrorKind::MismatchedEndTag { expected: String::new(), found: tag.clone() },
                message: None,
                location: loc,
            }),
        }
        self.pending.push_back(Event::EndElement { tag, location: loc });
    }

    /// Parses `name="value"` pairs separated by whitespace; malformed tokens (no `=`, an
    /// unquoted value) are skipped rather than aborting the whole tag, matching the parser's
    /// general best-effort posture for attribute syntax.
    fn parse_attributes(&self, s: &str, loc: TextPosition) -> (Vec<(String, String)>, Vec<Event>) {
        let mut attrs = Vec::new();
        let mut errors = Vec::new();
        let bytes = s.as_bytes();
        let mut i = 0usize;
        while i < bytes.len() {
            while i < bytes.len() && is_ws_byte(bytes[i]) {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            let name_start = i;
            while i < bytes.len() && !is_ws_byte(bytes[i]) && bytes[i] != b'=' {
                i += 1;
            }
            let name = &s[name_start..i];
            if name.is_empty() {
                break;
            }
            while i < bytes.len() && is_ws_byte(bytes[i]) {
                i += 1;
            }
            if i >= bytes.len() || bytes[i] != b'=' {
                continue;
            }
            i += 1;
            while i < bytes.len() && is_ws_byte(bytes[i]) {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            let quote = bytes[i];
            if quote != b'"' && quote != b'\'' {
                continue;
            }
            i += 1;
            let val_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            let raw_value = &s[val_start..i.min(s.len())];
            if i < bytes.len() {
                i += 1;
            }
            let (value, ref_errors) = self.expand_references(raw_value, loc);
            errors.extend(ref_errors);
            attrs.push((name.to_owned(), value));
        }
        (attrs, errors)
    }
}

impl Iterator for EventReader {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.next_event()
    }
}

impl Position for EventReader {
    fn position(&self) -> TextPosition {
        self.loc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<Event> {
        EventReader::new(input).collect()
    }

    fn events_with(input: &str, config: ParserConfig) -> Vec<Event> {
        EventReader::with_config(input, config).collect()
    }

    #[test]
    fn basic_nesting_with_attributes() {
        let out = events(r#"<root><child id="1">text</child></root>"#);
        assert_eq!(out[0], Event::StartDocument);
        assert!(matches!(&out[1], Event::StartElement { tag, attributes, .. } if tag == "root" && attributes.is_empty()));
        assert!(matches!(&out[2], Event::StartElement { tag, attributes, .. }
            if tag == "child" && attributes == &vec![("id".to_string(), "1".to_string())]));
        assert_eq!(out[3], Event::Characters { text: "text".into(), location: out[3].location().unwrap() });
        assert!(matches!(&out[4], Event::EndElement { tag, .. } if tag == "child"));
        assert!(matches!(&out[5], Event::EndElement { tag, .. } if tag == "root"));
        assert_eq!(out[6], Event::EndDocument);
    }

    #[test]
    fn self_closing_tag_yields_start_and_end_pair() {
        let out = events("<a/>");
        assert!(matches!(&out[1], Event::StartElement { tag, .. } if tag == "a"));
        assert!(matches!(&out[2], Event::EndElement { tag, .. } if tag == "a"));
        assert_eq!(out[3], Event::EndDocument);
    }

    #[test]
    fn comments_excluded_by_default_and_included_when_configured() {
        let out = events("<a><!-- hi --></a>");
        assert!(!out.iter().any(|e| matches!(e, Event::Comment { .. })));

        let config = ParserConfig::new().include_comments(true);
        let out = events_with("<a><!-- hi --></a>", config);
        assert!(matches!(&out[2], Event::Comment { content, .. } if content == " hi "));
    }

    #[test]
    fn cdata_section_round_trips_content() {
        let out = events("<a><![CDATA[<raw>&amp;]]></a>");
        assert!(matches!(&out[2], Event::CData { content, .. } if content == "<raw>&amp;"));
    }

    #[test]
    fn processing_instruction_and_optional_prolog() {
        let out = events(r#"<?xml version="1.0"?><a/>"#);
        assert!(!out.iter().any(|e| matches!(e, Event::Prolog { .. })));

        let config = ParserConfig::new().include_prolog(true);
        let out = events_with(r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#, config);
        assert!(matches!(&out[1], Event::Prolog { attributes, .. }
            if attributes.contains(&("version".to_string(), "1.0".to_string()))
                && attributes.contains(&("encoding".to_string(), "UTF-8".to_string()))));

        let out = events(r#"<a><?target some data?></a>"#);
        assert!(matches!(&out[2], Event::ProcessingInstruction { target, content, .. }
            if target == "target" && content.as_deref() == Some("some data")));
    }

    #[test]
    fn doctype_populates_internal_entities_for_later_expansion() {
        let out = events(r#"<!DOCTYPE a [<!ENTITY greeting "hi">]><a>&greeting;</a>"#);
        assert!(matches!(&out[1], Event::Dtd { content, .. }
            if content == r#"DOCTYPE a [<!ENTITY greeting "hi">]"#));
        assert!(matches!(&out[3], Event::Characters { text, .. } if text == "hi"));
    }

    #[test]
    fn html_mode_recovers_from_unterminated_doctype_string() {
        let config = ParserConfig::new().mode(DialectMode::Html);
        let out = events_with(r#"<!DOCTYPE potato taco "ddd>Hello"#, config);
        assert!(matches!(&out[1], Event::Dtd { content, .. } if content.contains("DOCTYPE potato")));
        assert!(matches!(&out[2], Event::Error { kind: ErrorKind::UnterminatedDoctypeString, .. }));
        assert!(matches!(&out[3], Event::Characters { text, .. } if text == "Hello"));
    }

    #[test]
    fn xml_mode_treats_unterminated_doctype_as_incomplete() {
        let out = events(r#"<!DOCTYPE potato taco "ddd>Hello"#);
        assert!(matches!(out.last().unwrap(), Event::Error { kind: ErrorKind::Incomplete, .. }));
        assert!(!out.iter().any(|e| matches!(e, Event::Dtd { .. })));
    }

    #[test]
    fn mismatched_end_tag_is_reported() {
        let out = events("<a><b></c></a>");
        assert!(matches!(&out[3], Event::Error { kind: ErrorKind::MismatchedEndTag { expected, found }, .. }
            if expected == "b" && found == "c"));
    }

    #[test]
    fn truncated_start_tag_is_incomplete_in_strict_mode() {
        let out = events("<a><b id=\"1\"");
        assert!(matches!(out.last().unwrap(), Event::Error { kind: ErrorKind::Incomplete, .. }));
    }

    #[test]
    fn unbalanced_stream_closes_envelope_in_html_mode() {
        let config = ParserConfig::new().mode(DialectMode::Html);
        let out = events_with("<a><b>text", config);
        let tags: Vec<&str> = out
            .iter()
            .filter_map(|e| match e {
                Event::EndElement { tag, .. } => Some(tag.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tags, vec!["b", "a"]);
        assert_eq!(out.last(), Some(&Event::EndDocument));
    }

    #[test]
    fn chunked_input_splits_a_tag_across_chunk_boundary() {
        let chunks = vec![b"<ro".to_vec(), b"ot>hi</root>".to_vec()];
        let out: Vec<_> = EventReader::from_chunks(chunks.into_iter(), ParserConfig::default()).collect();
        assert!(matches!(&out[1], Event::StartElement { tag, .. } if tag == "root"));
        assert!(matches!(&out[2], Event::Characters { text, .. } if text == "hi"));
    }

    #[test]
    fn undefined_entity_is_reported_and_dropped() {
        let out = events("<a>&bogus;</a>");
        assert!(matches!(&out[2], Event::Error { kind: ErrorKind::UndefinedEntity(name), .. } if name == "bogus"));
    }
}
