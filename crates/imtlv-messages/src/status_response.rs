use imtlv_codec::{Builder, BuilderState, Encoder, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Tag, TlvConfig};
use serde::{Deserialize, Serialize};

use crate::message::{optional, Message};
use crate::status_code::StatusCode;

/// Context tags of `StatusResponseMessage`.
pub mod tags {
    pub const STATUS: u8 = 0;
    pub const INTERACTION_MODEL_REVISION: u8 = 0xFF;
}

static STATUS_RESPONSE_FIELDS: [Field; 2] = [
    Field::mandatory("Status", tags::STATUS, FieldKind::Unsigned),
    Field::optional(
        "InteractionModelRevision",
        tags::INTERACTION_MODEL_REVISION,
        FieldKind::Unsigned,
    ),
];

pub static STATUS_RESPONSE_MESSAGE: Schema =
    Schema::structure("StatusResponseMessage", &STATUS_RESPONSE_FIELDS).open();

#[derive(Debug)]
pub struct StatusResponseBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> StatusResponseBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self {
            inner: Builder::open(encoder, &STATUS_RESPONSE_MESSAGE, Tag::Anonymous),
        }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.inner.put_unsigned(tags::STATUS, u64::from(status.code()));
        self
    }

    pub fn interaction_model_revision(&mut self, revision: u8) -> &mut Self {
        self.inner
            .put_unsigned(tags::INTERACTION_MODEL_REVISION, u64::from(revision));
        self
    }

    pub fn end_of_status_response(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatusResponseParser<'a> {
    inner: Parser<'a>,
}

impl<'a> StatusResponseParser<'a> {
    pub fn from_message(bytes: &'a [u8], config: TlvConfig) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::from_message(
            &STATUS_RESPONSE_MESSAGE,
            bytes,
            config,
        )?))
    }

    pub(crate) fn wrap(inner: Parser<'a>) -> Self {
        Self { inner }
    }

    pub fn check_schema_validity(&self) -> imtlv_codec::Result<()> {
        self.inner.check_schema_validity()
    }

    pub fn get_status(&self) -> imtlv_codec::Result<StatusCode> {
        self.inner.get_u8(tags::STATUS).map(StatusCode::from)
    }

    pub fn get_interaction_model_revision(&self) -> imtlv_codec::Result<u8> {
        self.inner.get_u8(tags::INTERACTION_MODEL_REVISION)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_model_revision: Option<u8>,
}

impl StatusResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            interaction_model_revision: None,
        }
    }

    pub fn write(&self, builder: &mut StatusResponseBuilder<'_>) -> imtlv_codec::Result<()> {
        builder.status(self.status);
        if let Some(revision) = self.interaction_model_revision {
            builder.interaction_model_revision(revision);
        }
        builder.end_of_status_response()
    }

    pub fn read(parser: &StatusResponseParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            status: parser.get_status()?,
            interaction_model_revision: optional(parser.get_interaction_model_revision())?,
        })
    }
}

impl Message for StatusResponse {
    const NAME: &'static str = "status-response";

    fn schema() -> &'static Schema {
        &STATUS_RESPONSE_MESSAGE
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut StatusResponseBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&StatusResponseParser::wrap(parser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_wire_bytes() {
        let response = StatusResponse {
            interaction_model_revision: Some(11),
            ..StatusResponse::new(StatusCode::UnsupportedAttribute)
        };
        let bytes = response.encode(TlvConfig::default()).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x15, 0x24, 0x00, 0x86, 0x24, 0xFF, 0x0B, 0x18]
        );
        assert_eq!(
            StatusResponse::decode(&bytes, TlvConfig::default()).unwrap(),
            response
        );
    }

    #[test]
    fn unnamed_code_survives_round_trip() {
        let response = StatusResponse::new(StatusCode::Other(0x42));
        let bytes = response.encode(TlvConfig::default()).unwrap();
        let parser = StatusResponseParser::from_message(&bytes, TlvConfig::default()).unwrap();
        assert_eq!(parser.get_status().unwrap(), StatusCode::Other(0x42));
        assert!(parser
            .get_interaction_model_revision()
            .unwrap_err()
            .is_end_of_tlv());
    }
}
