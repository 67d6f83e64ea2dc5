//! Schema-checked builders and parsers over the TLV primitive stream.
//!
//! A message is produced by a tree of [`Builder`]s sharing one [`Encoder`],
//! and consumed by a tree of [`Parser`]s borrowing the received buffer. Both
//! are driven by a `&'static Schema`, so every message type is a thin typed
//! wrapper around the same two state machines.
//!
//! Outbound:
//! 1. `Builder::open(&mut encoder, &SCHEMA, Tag::Anonymous)`
//! 2. field writes and `create_child` in declaration order
//! 3. `end()` on every builder, then `encoder.finish()`
//!
//! Inbound:
//! 1. `Parser::from_message(&SCHEMA, &bytes, config)`
//! 2. `check_schema_validity()` once
//! 3. tag-keyed `get_*` lookups and `get_child` descents

pub mod builder;
pub mod encoder;
pub mod error;
pub mod parser;

pub use builder::{Builder, BuilderState};
pub use encoder::Encoder;
pub use error::{CodecError, Result};
pub use parser::{Elements, ListParser, Parser};
