//! Static schemas and schema-validity checks for TLV containers.
//!
//! A [`Schema`] declares, for one container, which context tags exist, what
//! type each carries, and whether it is mandatory. [`validate_container`]
//! walks a received container once and reports the first violation:
//! unknown tag (in closed schemas), duplicate tag, wrong element type, or a
//! missing mandatory field.
//!
//! Schemas are plain `static` declarations; nothing is allocated to validate.

pub mod error;
pub mod schema;
pub mod tag_set;
pub mod validator;

pub use error::{Result, SchemaError};
pub use schema::{Extensibility, Field, FieldKind, Layout, Presence, Schema};
pub use tag_set::TagSet;
pub use validator::validate_container;
