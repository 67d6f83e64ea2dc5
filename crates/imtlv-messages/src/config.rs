use imtlv_stream::TlvConfig;

/// Controls how the registry encodes and decodes messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, `decode` runs the schema check before extracting fields.
    pub validate_on_decode: bool,
    /// Limits applied to every encoded and received buffer.
    pub tlv: TlvConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validate_on_decode: true,
            tlv: TlvConfig::default(),
        }
    }
}
