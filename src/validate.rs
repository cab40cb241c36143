//! Stream-composable character and comment well-formedness validators (spec §4.5).
//!
//! Both [`CharacterValidator`] and [`CommentValidator`] are plain iterator adapters sharing the
//! four-way [`ErrorPolicy`] dispatch: `Report` emits an `Event::Error` ahead of the original
//! event and passes it through unchanged; `Skip` drops the offending content; `Replace`
//! substitutes it; `Raise` emits one final error and ends the stream.

use std::collections::VecDeque;

use crate::common::{is_xml_char, Edition};
use crate::event::{ErrorKind, Event};
use crate::policy::ErrorPolicy;

/// Options shared by [`CharacterValidator`] and [`CommentValidator`].
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    pub edition: Edition,
    pub on_error: ErrorPolicy,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions { edition: Edition::Xml10, on_error: ErrorPolicy::Report }
    }
}

gen_setters!(ValidateOptions,
    edition: val Edition,
    on_error: val ErrorPolicy
);

/// Rejects any code point outside the XML `Char` production in `characters`, `cdata`,
/// `comment` content and every `start_element` attribute value.
pub struct CharacterValidator<I> {
    inner: I,
    opts: ValidateOptions,
    pending: VecDeque<Event>,
    raised: bool,
    /// The location of the most recently seen `Error { kind: InvalidXmlCharacter(_), .. }`
    /// event, if the one before it came straight from `inner` with nothing in between. Lets a
    /// second pass over an already-`Report`-ed stream recognize "this content was already
    /// flagged at this exact location" instead of reporting the same offending code points a
    /// second time, which is what keeps the stage idempotent under `Report` (spec §8).
    last_reported_at: Option<crate::common::TextPosition>,
}

impl<I: Iterator<Item = Event>> CharacterValidator<I> {
    #[must_use]
    pub fn new(inner: I, opts: ValidateOptions) -> Self {
        CharacterValidator { inner, opts, pending: VecDeque::new(), raised: false, last_reported_at: None }
    }

    /// Scans `text` for invalid code points, reporting each one through `self.opts.on_error`
    /// (pushing `Event::Error`s onto `self.pending` for `Report`/`Raise`), and returns the text
    /// to actually carry forward (`text` unchanged, with offenders removed, or with offenders
    /// replaced, depending on policy). `already_reported` suppresses the `Report` push: the
    /// errors for this exact location already precede it in the stream.
    fn scan(&mut self, text: &str, location: crate::common::TextPosition, already_reported: bool) -> String {
        let edition = self.opts.edition;
        if text.chars().all(|c| is_xml_char(c, edition)) {
            return text.to_owned();
        }
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if is_xml_char(c, edition) {
                out.push(c);
                continue;
            }
            match &self.opts.on_error {
                ErrorPolicy::Report => {
                    if !already_reported {
                        self.pending.push_back(error_event(c, location));
                    }
                    out.push(c);
                }
                ErrorPolicy::Skip => {}
                ErrorPolicy::Replace(s) => out.push_str(s),
                ErrorPolicy::Raise => {
                    self.pending.push_back(error_event(c, location));
                    self.raised = true;
                    return out;
                }
            }
        }
        out
    }

    /// Applies [`Self::scan`] to the event's content, returning the event to carry forward, or
    /// `None` if `Raise` fired partway through (the error already sits in `self.pending`; no
    /// partial event follows it).
    fn process(&mut self, ev: Event, already_reported: bool) -> Option<Event> {
        match ev {
            Event::Characters { text, location } => {
                let text = self.scan(&text, location, already_reported);
                (!self.raised).then_some(Event::Characters { text, location })
            }
            Event::CData { content, location } => {
                let content = self.scan(&content, location, already_reported);
                (!self.raised).then_some(Event::CData { content, location })
            }
            Event::Comment { content, location } => {
                let content = self.scan(&content, location, already_reported);
                (!self.raised).then_some(Event::Comment { content, location })
            }
            Event::StartElement { tag, attributes, location } => {
                let mut out = Vec::with_capacity(attributes.len());
                for (name, value) in attributes {
                    if self.raised {
                        break;
                    }
                    out.push((name, self.scan(&value, location, already_reported)));
                }
                (!self.raised).then_some(Event::StartElement { tag, attributes: out, location })
            }
            other => Some(other),
        }
    }
}

fn error_event(c: char, location: crate::common::TextPosition) -> Event {
    Event::Error {
        kind: ErrorKind::InvalidXmlCharacter(c as u32),
        message: None,
        location,
    }
}

impl<I: Iterator<Item = Event>> Iterator for CharacterValidator<I> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            if self.raised {
                return None;
            }
            let ev = self.inner.next()?;
            if let Event::Error { kind: ErrorKind::InvalidXmlCharacter(_), location, .. } = &ev {
                self.last_reported_at = Some(*location);
                self.pending.push_back(ev);
                continue;
            }
            let already_reported = ev.location().is_some() && self.last_reported_at == ev.location();
            self.last_reported_at = None;
            if let Some(out) = self.process(ev, already_reported) {
                self.pending.push_back(out);
            }
        }
    }
}

/// Rejects any comment containing `--` (single hyphens are permitted).
pub struct CommentValidator<I> {
    inner: I,
    opts: ValidateOptions,
    pending: VecDeque<Event>,
    raised: bool,
    /// Mirrors `CharacterValidator::last_reported_at`: the location of the most recently seen
    /// `Error { kind: DoubleHyphenInComment, .. }` event, so a second pass over an already-
    /// `Report`-ed stream doesn't report the same comment again (spec §8 idempotence).
    last_reported_at: Option<crate::common::TextPosition>,
}

impl<I: Iterator<Item = Event>> CommentValidator<I> {
    #[must_use]
    pub fn new(inner: I, opts: ValidateOptions) -> Self {
        CommentValidator { inner, opts, pending: VecDeque::new(), raised: false, last_reported_at: None }
    }

    fn process(&mut self, ev: Event, already_reported: bool) -> Option<Event> {
        let Event::Comment { content, location } = ev else { return Some(ev) };
        if !content.contains("--") {
            return Some(Event::Comment { content, location });
        }
        match &self.opts.on_error {
            ErrorPolicy::Report => {
                if !already_reported {
                    self.pending.push_back(Event::Error {
                        kind: ErrorKind::DoubleHyphenInComment,
                        message: None,
                        location,
                    });
                }
                Some(Event::Comment { content, location })
            }
            ErrorPolicy::Skip => None,
            ErrorPolicy::Replace(s) => Some(Event::Comment { content: content.replace("--", s), location }),
            ErrorPolicy::Raise => {
                self.pending.push_back(Event::Error {
                    kind: ErrorKind::DoubleHyphenInComment,
                    message: None,
                    location,
                });
                self.raised = true;
                None
            }
        }
    }
}

impl<I: Iterator<Item = Event>> Iterator for CommentValidator<I> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            if self.raised {
                return None;
            }
            let ev = self.inner.next()?;
            if let Event::Error { kind: ErrorKind::DoubleHyphenInComment, location, .. } = &ev {
                self.last_reported_at = Some(*location);
                self.pending.push_back(ev);
                continue;
            }
            let already_reported = ev.location().is_some() && self.last_reported_at == ev.location();
            self.last_reported_at = None;
            if let Some(out) = self.process(ev, already_reported) {
                self.pending.push_back(out);
            }
            // Skip policy dropped a comment entirely; keep pulling.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TextPosition;

    #[test]
    fn passes_through_valid_characters() {
        let loc = TextPosition::new();
        let events = vec![Event::Characters { text: "hi".into(), location: loc }];
        let out: Vec<_> = CharacterValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        assert_eq!(out, vec![Event::Characters { text: "hi".into(), location: loc }]);
    }

    #[test]
    fn reports_invalid_character_before_original_event() {
        let loc = TextPosition::new();
        let events = vec![Event::Characters { text: "hi\u{0}".into(), location: loc }];
        let out: Vec<_> = CharacterValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        assert!(matches!(out[0], Event::Error { .. }));
        assert_eq!(out[1], Event::Characters { text: "hi\u{0}".into(), location: loc });
    }

    #[test]
    fn skip_policy_drops_offending_code_point() {
        let loc = TextPosition::new();
        let opts = ValidateOptions::default().on_error(ErrorPolicy::Skip);
        let events = vec![Event::Characters { text: "hi\u{0}there".into(), location: loc }];
        let out: Vec<_> = CharacterValidator::new(events.into_iter(), opts).collect();
        assert_eq!(out, vec![Event::Characters { text: "hithere".into(), location: loc }]);
    }

    #[test]
    fn character_validator_is_idempotent_under_report() {
        let loc = TextPosition::new();
        let events = vec![Event::Characters { text: "hi\u{0}".into(), location: loc }];
        let once: Vec<_> = CharacterValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        let twice: Vec<_> = CharacterValidator::new(once.clone().into_iter(), ValidateOptions::default()).collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn comment_validator_rejects_double_hyphen() {
        let loc = TextPosition::new();
        let events = vec![Event::Comment { content: "a--b".into(), location: loc }];
        let out: Vec<_> = CommentValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        assert!(matches!(out[0], Event::Error { .. }));
        assert_eq!(out[1], Event::Comment { content: "a--b".into(), location: loc });
    }

    #[test]
    fn comment_validator_allows_single_hyphen() {
        let loc = TextPosition::new();
        let events = vec![Event::Comment { content: "a-b".into(), location: loc }];
        let out: Vec<_> = CommentValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        assert_eq!(out, vec![Event::Comment { content: "a-b".into(), location: loc }]);
    }

    #[test]
    fn comment_validator_skip_drops_comment_entirely() {
        let loc = TextPosition::new();
        let opts = ValidateOptions::default().on_error(ErrorPolicy::Skip);
        let events = vec![
            Event::Comment { content: "a--b".into(), location: loc },
            Event::StartDocument,
        ];
        let out: Vec<_> = CommentValidator::new(events.into_iter(), opts).collect();
        assert_eq!(out, vec![Event::StartDocument]);
    }

    #[test]
    fn comment_validator_is_idempotent_under_report() {
        let loc = TextPosition::new();
        let events = vec![Event::Comment { content: "a--b".into(), location: loc }];
        let once: Vec<_> = CommentValidator::new(events.into_iter(), ValidateOptions::default()).collect();
        let twice: Vec<_> = CommentValidator::new(once.clone().into_iter(), ValidateOptions::default()).collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
