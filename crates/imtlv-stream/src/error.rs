use crate::element::ContainerType;
use crate::tag::Tag;

/// Errors raised by the TLV primitive stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// The writer's size ceiling would be exceeded.
    #[error("buffer too small ({needed} bytes needed, {available} available)")]
    BufferTooSmall { needed: usize, available: usize },

    /// The input ended in the middle of an element.
    #[error("TLV underrun ({needed} bytes needed, {available} remaining)")]
    Underrun { needed: usize, available: usize },

    /// The control byte carries a reserved element type.
    #[error("invalid TLV control byte 0x{0:02x}")]
    InvalidControlByte(u8),

    /// A UTF-8 string element holds invalid UTF-8.
    #[error("UTF-8 string element is not valid UTF-8")]
    InvalidUtf8,

    /// The tag form is not allowed in the enclosing container.
    #[error("tag {tag} is not allowed inside a {container}")]
    InvalidTag { tag: Tag, container: ContainerType },

    /// Container nesting exceeds the configured limit.
    #[error("container nesting exceeds max depth {max}")]
    DepthExceeded { max: usize },

    /// An end-of-container was requested for a container that is not open.
    #[error("end of container does not match the open container")]
    ContainerMismatch,

    /// The stream was finished while containers were still open.
    #[error("{depth} container(s) still open")]
    UnclosedContainer { depth: usize },

    /// An end-of-container marker appeared outside of any container.
    #[error("unexpected end-of-container marker")]
    UnexpectedEndOfContainer,

    /// Bytes follow the top-level element of a message.
    #[error("{remaining} trailing bytes after top-level element")]
    TrailingBytes { remaining: usize },

    /// The received message is larger than the configured ceiling.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// An encoded length does not fit in the address space.
    #[error("element length {0} does not fit in memory")]
    LengthOverflow(u64),
}

impl TlvError {
    /// True for errors caused by input that ended early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, TlvError::Underrun { .. })
    }
}

pub type Result<T> = std::result::Result<T, TlvError>;
