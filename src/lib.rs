//! A streaming XML 1.0/1.1 pipeline: a pull parser, namespace resolution, DTD parsing and
//! validation, character/comment well-formedness checks, and a DOM "simple form" with its
//! serializer.
//!
//! The pipeline stages compose as plain iterator adapters over a single shared [`Event`] type —
//! `reader::EventReader` produces them, `namespace::Resolver`, `validate::CharacterValidator`,
//! `validate::CommentValidator` and `dtd::DtdValidator` each wrap an inner iterator and forward
//! a transformed stream, and `dom::build`/`writer::to_stream` fold the far end of the pipeline
//! into (and back out of) a materialized tree:
//!
//! ```ignore
//! let events = xmlstream::reader::EventReader::new(xml);
//! let events = xmlstream::namespace::Resolver::new(events, Default::default());
//! let doc = xmlstream::dom::build(events, &Default::default())?;
//! ```
//!
//! No stage panics or returns `Err` on malformed input by default: failures surface as
//! `Event::Error`/`Event::DtdError` items in the stream itself, so a consumer that doesn't care
//! about well-formedness can simply ignore variants it doesn't match.

#[macro_use]
mod macros;

pub mod attribute;
pub mod common;
pub mod dom;
pub mod dtd;
pub mod escape;
pub mod event;
pub mod name;
pub mod namespace;
pub mod policy;
pub mod preprocess;
pub mod reader;
pub mod util;
pub mod validate;
pub mod writer;

pub use attribute::{Attribute, OwnedAttribute};
pub use common::{DialectMode, Edition, Position, TextPosition, XmlVersion};
pub use dom::{build, BuildError, BuildOptions, Document, Element, Node};
pub use event::{DtdErrorKind, ErrorKind, Event};
pub use name::{Name, OwnedName};
pub use policy::ErrorPolicy;
pub use reader::{EventReader, ParserConfig};
pub use util::Encoding;
