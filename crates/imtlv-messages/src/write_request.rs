use imtlv_codec::{Builder, BuilderState, Encoder, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Tag, TlvConfig};
use serde::{Deserialize, Serialize};

use crate::attribute_data::{
    AttributeData, AttributeDataListBuilder, AttributeDataListParser, ATTRIBUTE_DATA_IBS,
};
use crate::message::{optional, Message};

/// Context tags of `WriteRequestMessage`.
pub mod tags {
    pub const SUPPRESS_RESPONSE: u8 = 0;
    pub const TIMED_REQUEST: u8 = 1;
    pub const WRITE_REQUESTS: u8 = 2;
    pub const MORE_CHUNKED_MESSAGES: u8 = 3;
    pub const INTERACTION_MODEL_REVISION: u8 = 0xFF;
}

static WRITE_REQUEST_FIELDS: [Field; 5] = [
    Field::optional("SuppressResponse", tags::SUPPRESS_RESPONSE, FieldKind::Bool),
    Field::mandatory("TimedRequest", tags::TIMED_REQUEST, FieldKind::Bool),
    Field::mandatory(
        "WriteRequests",
        tags::WRITE_REQUESTS,
        FieldKind::Nested(&ATTRIBUTE_DATA_IBS),
    ),
    Field::optional(
        "MoreChunkedMessages",
        tags::MORE_CHUNKED_MESSAGES,
        FieldKind::Bool,
    ),
    Field::optional(
        "InteractionModelRevision",
        tags::INTERACTION_MODEL_REVISION,
        FieldKind::Unsigned,
    ),
];

pub static WRITE_REQUEST_MESSAGE: Schema =
    Schema::structure("WriteRequestMessage", &WRITE_REQUEST_FIELDS).open();

#[derive(Debug)]
pub struct WriteRequestBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> WriteRequestBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self {
            inner: Builder::open(encoder, &WRITE_REQUEST_MESSAGE, Tag::Anonymous),
        }
    }

    pub fn suppress_response(&mut self, suppress: bool) -> &mut Self {
        self.inner.put_bool(tags::SUPPRESS_RESPONSE, suppress);
        self
    }

    pub fn timed_request(&mut self, timed: bool) -> &mut Self {
        self.inner.put_bool(tags::TIMED_REQUEST, timed);
        self
    }

    pub fn create_write_requests(&mut self) -> AttributeDataListBuilder<'_> {
        AttributeDataListBuilder::wrap(
            self.inner
                .create_child(tags::WRITE_REQUESTS, &ATTRIBUTE_DATA_IBS),
        )
    }

    pub fn get_write_requests(&mut self) -> AttributeDataListBuilder<'_> {
        AttributeDataListBuilder::wrap(
            self.inner
                .get_child(tags::WRITE_REQUESTS, &ATTRIBUTE_DATA_IBS),
        )
    }

    pub fn more_chunked_messages(&mut self, more: bool) -> &mut Self {
        self.inner.put_bool(tags::MORE_CHUNKED_MESSAGES, more);
        self
    }

    pub fn interaction_model_revision(&mut self, revision: u8) -> &mut Self {
        self.inner
            .put_unsigned(tags::INTERACTION_MODEL_REVISION, u64::from(revision));
        self
    }

    pub fn end_of_write_request(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WriteRequestParser<'a> {
    inner: Parser<'a>,
}

impl<'a> WriteRequestParser<'a> {
    pub fn from_message(bytes: &'a [u8], config: TlvConfig) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::from_message(
            &WRITE_REQUEST_MESSAGE,
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

    pub fn get_suppress_response(&self) -> imtlv_codec::Result<bool> {
        self.inner.get_bool(tags::SUPPRESS_RESPONSE)
    }

    pub fn get_timed_request(&self) -> imtlv_codec::Result<bool> {
        self.inner.get_bool(tags::TIMED_REQUEST)
    }

    pub fn get_write_requests(&self) -> imtlv_codec::Result<AttributeDataListParser<'a>> {
        self.inner
            .get_list(tags::WRITE_REQUESTS, &ATTRIBUTE_DATA_IBS)
            .map(AttributeDataListParser::wrap)
    }

    pub fn get_more_chunked_messages(&self) -> imtlv_codec::Result<bool> {
        self.inner.get_bool(tags::MORE_CHUNKED_MESSAGES)
    }

    pub fn get_interaction_model_revision(&self) -> imtlv_codec::Result<u8> {
        self.inner.get_u8(tags::INTERACTION_MODEL_REVISION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_response: Option<bool>,
    #[serde(default)]
    pub timed_request: bool,
    pub write_requests: Vec<AttributeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_chunked_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_model_revision: Option<u8>,
}

impl WriteRequest {
    pub fn write(&self, builder: &mut WriteRequestBuilder<'_>) -> imtlv_codec::Result<()> {
        if let Some(suppress) = self.suppress_response {
            builder.suppress_response(suppress);
        }
        builder.timed_request(self.timed_request);
        AttributeData::write_all(&self.write_requests, &mut builder.create_write_requests())?;
        if let Some(more) = self.more_chunked_messages {
            builder.more_chunked_messages(more);
        }
        if let Some(revision) = self.interaction_model_revision {
            builder.interaction_model_revision(revision);
        }
        builder.end_of_write_request()
    }

    pub fn read(parser: &WriteRequestParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            suppress_response: optional(parser.get_suppress_response())?,
            timed_request: parser.get_timed_request()?,
            write_requests: AttributeData::read_all(parser.get_write_requests()?)?,
            more_chunked_messages: optional(parser.get_more_chunked_messages())?,
            interaction_model_revision: optional(parser.get_interaction_model_revision())?,
        })
    }
}

impl Message for WriteRequest {
    const NAME: &'static str = "write-request";

    fn schema() -> &'static Schema {
        &WRITE_REQUEST_MESSAGE
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut WriteRequestBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&WriteRequestParser::wrap(parser))
    }
}

#[cfg(test)]
mod tests {
    use imtlv_codec::CodecError;

    use super::*;
    use crate::data::DataValue;
    use crate::path::AttributePath;

    fn on_off(value: bool) -> AttributeData {
        AttributeData::new(AttributePath::new(1, 0x0006, 0x4003), DataValue::Bool(value))
    }

    #[test]
    fn write_request_round_trip() {
        let request = WriteRequest {
            suppress_response: Some(false),
            timed_request: true,
            write_requests: vec![on_off(true), on_off(false)],
            more_chunked_messages: Some(false),
            interaction_model_revision: Some(11),
        };
        let bytes = request.encode(TlvConfig::default()).unwrap();
        let parser = WriteRequestParser::from_message(&bytes, TlvConfig::default()).unwrap();
        parser.check_schema_validity().unwrap();
        assert!(parser.get_timed_request().unwrap());
        assert_eq!(WriteRequest::read(&parser).unwrap(), request);
    }

    #[test]
    fn timed_request_must_precede_write_requests() {
        let mut encoder = Encoder::new();
        let mut request = WriteRequestBuilder::open(&mut encoder);
        let list = request.create_write_requests();
        assert_eq!(list.state(), BuilderState::Error);
        assert_eq!(
            request.end_of_write_request(),
            Err(CodecError::OutOfOrder {
                schema: "WriteRequestMessage",
                field: "WriteRequests"
            })
        );
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let json = r#"{
            "write_requests": [
                {"path": {"endpoint": 1, "cluster": 6, "attribute": 0}, "data": {"bool": true}}
            ]
        }"#;
        let request: WriteRequest = serde_json::from_str(json).unwrap();
        assert!(!request.timed_request);
        assert_eq!(request.write_requests.len(), 1);
        let bytes = request.encode(TlvConfig::default()).unwrap();
        assert_eq!(WriteRequest::decode(&bytes, TlvConfig::default()).unwrap(), request);
    }
}
