/// Default maximum container nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default maximum encoded message size: the largest application payload of a
/// single unsegmented message.
pub const DEFAULT_MAX_ENCODED_LEN: usize = 1200;

/// Limits applied to one TLV buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvConfig {
    /// Maximum number of simultaneously open containers. Default: 16.
    pub max_depth: usize,
    /// Maximum encoded size in bytes, enforced by the writer and checked by
    /// [`read_message`](crate::read_message). Default: 1200.
    pub max_encoded_len: usize,
}

impl Default for TlvConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_encoded_len: DEFAULT_MAX_ENCODED_LEN,
        }
    }
}

impl TlvConfig {
    /// Config with the default depth and an explicit size ceiling.
    pub fn with_max_encoded_len(max_encoded_len: usize) -> Self {
        Self {
            max_encoded_len,
            ..Self::default()
        }
    }
}
