use imtlv_codec::CodecError;

/// Errors raised by message models and the schema registry.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Builder or parser failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No schema is registered under the requested name.
    #[error("unknown message: {0}")]
    UnknownMessage(String),
}

impl MessageError {
    /// True if the input was well-formed TLV but broke a schema contract.
    pub fn is_schema_violation(&self) -> bool {
        match self {
            MessageError::Codec(err) => err.is_schema_violation(),
            _ => false,
        }
    }

    /// True if the input was truncated or corrupt TLV.
    pub fn is_corrupt(&self) -> bool {
        match self {
            MessageError::Codec(err) => err.is_corrupt(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
