use imtlv_schema::SchemaError;
use imtlv_stream::{TlvError, TlvType};

use crate::builder::BuilderState;

/// Errors raised by builders and parsers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The primitive stream refused a write.
    #[error("encoding failed in {context}: {source}")]
    Encoding {
        context: &'static str,
        source: TlvError,
    },

    /// The received buffer is truncated or corrupt.
    #[error("decoding failed in {context}: {source}")]
    Decoding {
        context: &'static str,
        source: TlvError,
    },

    /// A schema contract was violated.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The requested field is not present in the container.
    #[error("{schema}: field {field} not present")]
    EndOfTlv {
        schema: &'static str,
        field: &'static str,
    },

    /// A present element does not have the requested type.
    #[error("{schema}.{field}: wrong TLV type (expected {expected}, found {found})")]
    WrongTlvType {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
        found: TlvType,
    },

    /// An integer does not fit the requested width.
    #[error("{schema}.{field}: integer out of range")]
    IntegerOutOfRange {
        schema: &'static str,
        field: &'static str,
    },

    /// The operation is not allowed in the builder's current state.
    #[error("{context}: builder is {state}")]
    InvalidState {
        context: &'static str,
        state: BuilderState,
    },

    /// A child container is still open below this builder.
    #[error("{schema}: child container still open")]
    ChildInProgress { schema: &'static str },

    /// A field was written before an earlier mandatory field.
    #[error("{schema}: field {field} written before an earlier mandatory field")]
    OutOfOrder {
        schema: &'static str,
        field: &'static str,
    },
}

impl CodecError {
    /// True if a lookup found no element with the requested tag.
    pub fn is_end_of_tlv(&self) -> bool {
        matches!(self, CodecError::EndOfTlv { .. })
    }

    /// True if the input was well-formed TLV but broke a schema contract.
    pub fn is_schema_violation(&self) -> bool {
        match self {
            CodecError::Schema(SchemaError::Tlv(_)) => false,
            CodecError::Schema(_) | CodecError::WrongTlvType { .. } => true,
            _ => false,
        }
    }

    /// True if the underlying TLV stream is truncated or corrupt.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            CodecError::Decoding { .. } | CodecError::Schema(SchemaError::Tlv(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
