use bytes::Bytes;
use imtlv_codec::{Encoder, Parser};
use imtlv_schema::Schema;
use imtlv_stream::TlvConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// An owned message model with a static schema.
///
/// Implementors provide the two schema-driven halves; encoding and decoding
/// of whole buffers come for free.
pub trait Message: Serialize + DeserializeOwned {
    /// Registry name, e.g. `write-response`.
    const NAME: &'static str;

    fn schema() -> &'static Schema;

    /// Write the whole message, top-level container included.
    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()>;

    /// Extract the model from a parser bound to [`Message::schema`].
    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self>;

    fn encode(&self, config: TlvConfig) -> Result<Bytes> {
        let mut encoder = Encoder::with_config(config);
        self.encode_into(&mut encoder)?;
        Ok(encoder.finish()?)
    }

    /// Decode a received buffer after a full schema check.
    fn decode(bytes: &[u8], config: TlvConfig) -> Result<Self> {
        let parser = Parser::from_message(Self::schema(), bytes, config)?;
        parser.check_schema_validity()?;
        Ok(Self::from_parser(parser)?)
    }

    /// Decode without the schema check; lookups still fail on bad types.
    fn decode_unchecked(bytes: &[u8], config: TlvConfig) -> Result<Self> {
        let parser = Parser::from_message(Self::schema(), bytes, config)?;
        Ok(Self::from_parser(parser)?)
    }
}

/// Turn a missing optional field into `None`.
pub(crate) fn optional<T>(result: imtlv_codec::Result<T>) -> imtlv_codec::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_end_of_tlv() => Ok(None),
        Err(err) => Err(err),
    }
}

