//! TLV primitive stream.
//!
//! The lowest layer of imtlv: a cursor that writes and reads single tagged
//! elements. Every element on the wire is:
//! - A 1-byte control field (3 bits tag control, 5 bits element type)
//! - A tag of 0, 1, 2, 4, 6 or 8 bytes
//! - An optional little-endian length, then the value
//!
//! Containers (structure, array, list) are closed by a single end-of-container
//! byte. Everything above this crate works on [`TlvWriter`] and [`TlvReader`].

pub mod config;
pub mod element;
pub mod error;
pub mod reader;
pub mod tag;
pub mod writer;

pub use config::{TlvConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENCODED_LEN};
pub use element::{Container, ContainerType, Element, TlvType, Value};
pub use error::{Result, TlvError};
pub use reader::{read_message, TlvReader};
pub use tag::Tag;
pub use writer::TlvWriter;
