//! The four-way error-handling policy shared by `validate` and `dtd::validator`.

/// How a stream-validating stage should react to a violation it finds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorPolicy {
    /// Emit an `Event::Error`/`Event::DtdError` event and pass the original event through
    /// unchanged. The default.
    Report,
    /// Drop the offending content (a code point, or an entire comment) and pass the rest of
    /// the event through; no error event is emitted.
    Skip,
    /// Substitute the offending content with a fixed string; no error event is emitted.
    Replace(String),
    /// Stop iterating immediately: the adapter's `next()` panics is never done — instead it
    /// yields one final `Event::Error` and then ends the stream, so "raise" degrades to a
    /// terminating report rather than an unwind across an iterator boundary.
    Raise,
}

impl Default for ErrorPolicy {
    fn default() -> Self { ErrorPolicy::Report }
}
