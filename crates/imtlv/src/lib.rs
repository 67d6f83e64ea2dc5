//! Schema-validated TLV encoding for Interaction Model messages.
//!
//! # Crate Structure
//!
//! - [`stream`]: TLV primitive writer and reader
//! - [`schema`]: static schemas and the schema-validity check
//! - [`codec`]: schema-checked `Builder`/`Parser` over the stream
//! - [`messages`]: typed message builders, parsers and models (behind the
//!   `messages` feature)

/// Re-export stream types.
pub mod stream {
    pub use imtlv_stream::*;
}

/// Re-export schema types.
pub mod schema {
    pub use imtlv_schema::*;
}

/// Re-export codec types.
pub mod codec {
    pub use imtlv_codec::*;
}

/// Re-export message types (requires `messages` feature).
#[cfg(feature = "messages")]
pub mod messages {
    pub use imtlv_messages::*;
}
