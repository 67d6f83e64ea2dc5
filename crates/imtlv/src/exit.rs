use std::fmt;
use std::io;

use imtlv_messages::MessageError;
use imtlv_stream::TlvError;

pub const SUCCESS: i32 = 0;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const SCHEMA_INVALID: i32 = 61;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn tlv_error(context: &str, err: TlvError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn message_error(context: &str, err: MessageError) -> CliError {
    let code = match &err {
        MessageError::UnknownMessage(_) => USAGE,
        MessageError::Json(_) => DATA_INVALID,
        err if err.is_schema_violation() => SCHEMA_INVALID,
        err if err.is_corrupt() => DATA_INVALID,
        MessageError::Codec(codec) if codec.is_end_of_tlv() => DATA_INVALID,
        MessageError::Codec(imtlv_codec::CodecError::Encoding { .. })
        | MessageError::Codec(imtlv_codec::CodecError::IntegerOutOfRange { .. }) => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
