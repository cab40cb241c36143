//! DTD declaration parsing and DTD-driven stream validation (spec §4.4).
//!
//! [`parser::parse_internal_subset`] turns the raw text an `Event::Dtd` carries into a
//! structured [`model::DtdModel`]; [`validator::DtdValidator`] is the stream stage that
//! consumes that model to flag namespace-unsafe declared names and normalize attribute values.

pub mod model;
pub mod parser;
pub mod validator;

pub use model::{AttrDef, AttrDefault, AttrType, ContentModel, DtdModel, EntityDef, NotationDef};
pub use parser::parse_internal_subset;
pub use validator::{DtdValidator, DtdValidatorOptions};
