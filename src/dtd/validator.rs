//! The DTD-driven stream validator: watches for `Event::Dtd`, builds a [`DtdModel`] from it,
//! flags namespace-unsafe names declared in the subset, and rewrites `start_element` attribute
//! values according to XML §3.3.3 attribute-value normalization.

use std::collections::VecDeque;

use crate::event::{DtdErrorKind, Event};
use crate::policy::ErrorPolicy;

use super::model::DtdModel;
use super::parser::parse_internal_subset;

/// Options accepted by [`DtdValidator`] (spec §4.4/§6).
#[derive(Clone, Debug)]
pub struct DtdValidatorOptions {
    /// How to surface `dtd_error` findings: report (default), skip, or raise.
    ///
    /// `ErrorPolicy::Replace` has no meaning for DTD structural errors and is treated the same
    /// as `Report`.
    pub on_error: ErrorPolicy,
    /// Whether non-`CDATA` attribute values are trimmed/collapsed on the way past. Defaults to
    /// `true`.
    pub normalize_attributes: bool,
}

impl Default for DtdValidatorOptions {
    fn default() -> Self {
        DtdValidatorOptions { on_error: ErrorPolicy::Report, normalize_attributes: true }
    }
}

gen_setters!(DtdValidatorOptions,
    on_error: val ErrorPolicy,
    normalize_attributes: val bool
);

/// A stream adapter that parses the DOCTYPE's internal subset the first time it sees one, and
/// normalizes subsequent `start_element` attribute values against it.
///
/// Events the validator doesn't understand (everything other than `Dtd` and `StartElement`)
/// pass through completely unchanged — it holds no other state.
pub struct DtdValidator<I> {
    inner: I,
    opts: DtdValidatorOptions,
    model: DtdModel,
    pending: VecDeque<Event>,
    raised: bool,
}

impl<I: Iterator<Item = Event>> DtdValidator<I> {
    #[must_use]
    pub fn new(inner: I, opts: DtdValidatorOptions) -> Self {
        DtdValidator { inner, opts, model: DtdModel::new(), pending: VecDeque::new(), raised: false }
    }

    fn handle_dtd(&mut self, content: String, location: crate::common::TextPosition) -> Event {
        let (model, _parse_errors) = parse_internal_subset(&content);

        for name in model.entities.keys() {
            if name.contains(':') {
                self.report(DtdErrorKind::ColonInEntityName, location, Some(name.clone()));
            }
        }
        for name in model.notations.keys() {
            if name.contains(':') {
                self.report(DtdErrorKind::ColonInNotationName, location, Some(name.clone()));
            }
        }

        self.model = model;
        Event::Dtd { content, location }
    }

    fn report(&mut self, kind: DtdErrorKind, location: crate::common::TextPosition, context: Option<String>) {
        match &self.opts.on_error {
            ErrorPolicy::Skip => {}
            ErrorPolicy::Raise => {
                self.pending.push_back(Event::DtdError { kind, location, context });
                self.raised = true;
            }
            ErrorPolicy::Report | ErrorPolicy::Replace(_) => {
                self.pending.push_back(Event::DtdError { kind, location, context });
            }
        }
    }

    fn normalize_start_element(&self, tag: String, attributes: Vec<(String, String)>, location: crate::common::TextPosition) -> Event {
        if !self.opts.normalize_attributes {
            return Event::StartElement { tag, attributes, location };
        }
        let local_tag = tag.rsplit(':').next().unwrap_or(&tag);
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| {
                let local_attr = name.rsplit(':').next().unwrap_or(&name);
                let is_cdata = self
                    .model
                    .attr_def(local_tag, local_attr)
                    .map_or(true, |def| def.attr_type.is_cdata());
                let value = if is_cdata { value } else { normalize_attribute_value(&value) };
                (name, value)
            })
            .collect();
        Event::StartElement { tag, attributes, location }
    }
}

/// Trims leading/trailing whitespace and collapses internal whitespace runs to a single space,
/// per XML §3.3.3 attribute-value normalization.
fn normalize_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for c in value.trim_matches(|c: char| c.is_whitespace()).chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

impl<I: Iterator<Item = Event>> Iterator for DtdValidator<I> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if let Some(ev) = self.pending.pop_front() {
            return Some(ev);
        }
        if self.raised {
            return None;
        }
        match self.inner.next()? {
            Event::Dtd { content, location } => Some(self.handle_dtd(content, location)),
            Event::StartElement { tag, attributes, location } => {
                Some(self.normalize_start_element(tag, attributes, location))
            }
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TextPosition;

    fn at(events: Vec<Event>) -> Vec<Event> {
        DtdValidator::new(events.into_iter(), DtdValidatorOptions::default()).collect()
    }

    #[test]
    fn flags_colon_in_entity_name() {
        let loc = TextPosition::new();
        let out = at(vec![Event::Dtd {
            content: "DOCTYPE a [<!ELEMENT a EMPTY><!ENTITY a:b \"x\">]".into(),
            location: loc,
        }]);
        assert!(out.iter().any(|e| matches!(e, Event::DtdError { kind: DtdErrorKind::ColonInEntityName, .. })));
    }

    #[test]
    fn normalizes_non_cdata_attributes() {
        let loc = TextPosition::new();
        let out = at(vec![
            Event::Dtd {
                content: "DOCTYPE a [<!ELEMENT a EMPTY><!ATTLIST a id NMTOKEN #IMPLIED>]".into(),
                location: loc,
            },
            Event::StartElement {
                tag: "a".into(),
                attributes: vec![("id".into(), "  hello  world  ".into())],
                location: loc,
            },
        ]);
        assert_eq!(
            out[1],
            Event::StartElement {
                tag: "a".into(),
                attributes: vec![("id".into(), "hello world".into())],
                location: loc,
            }
        );
    }

    #[test]
    fn cdata_attributes_pass_through_untouched() {
        let loc = TextPosition::new();
        let out = at(vec![
            Event::Dtd {
                content: "DOCTYPE a [<!ELEMENT a EMPTY><!ATTLIST a note CDATA #IMPLIED>]".into(),
                location: loc,
            },
            Event::StartElement {
                tag: "a".into(),
                attributes: vec![("note".into(), "  raw   text  ".into())],
                location: loc,
            },
        ]);
        assert_eq!(
            out[1],
            Event::StartElement {
                tag: "a".into(),
                attributes: vec![("note".into(), "  raw   text  ".into())],
                location: loc,
            }
        );
    }
}
