use imtlv_codec::{Builder, BuilderState, Encoder, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Tag, TlvConfig};
use serde::{Deserialize, Serialize};

use crate::attribute_status::{
    AttributeStatus, AttributeStatusesBuilder, AttributeStatusesParser, ATTRIBUTE_STATUS_IBS,
};
use crate::message::{optional, Message};

/// Context tags of `WriteResponseMessage`.
pub mod tags {
    pub const WRITE_RESPONSES: u8 = 0;
    pub const INTERACTION_MODEL_REVISION: u8 = 0xFF;
}

static WRITE_RESPONSE_FIELDS: [Field; 2] = [
    Field::mandatory(
        "WriteResponses",
        tags::WRITE_RESPONSES,
        FieldKind::Nested(&ATTRIBUTE_STATUS_IBS),
    ),
    Field::optional(
        "InteractionModelRevision",
        tags::INTERACTION_MODEL_REVISION,
        FieldKind::Unsigned,
    ),
];

/// Reply to a write request: one status per written attribute.
pub static WRITE_RESPONSE_MESSAGE: Schema =
    Schema::structure("WriteResponseMessage", &WRITE_RESPONSE_FIELDS).open();

/// Builder for a whole write response.
///
/// ```
/// use imtlv_codec::Encoder;
/// use imtlv_messages::{AttributePath, Status, StatusCode, WriteResponseBuilder};
///
/// let mut encoder = Encoder::new();
/// let mut response = WriteResponseBuilder::open(&mut encoder);
/// {
///     let mut statuses = response.create_write_responses();
///     let mut status = statuses.create_attribute_status();
///     AttributePath::new(1, 0x0006, 0x0000)
///         .write(&mut status.create_path())
///         .unwrap();
///     Status::new(StatusCode::Success)
///         .write(&mut status.create_status())
///         .unwrap();
///     status.end_of_attribute_status().unwrap();
///     statuses.end_of_attribute_statuses().unwrap();
/// }
/// response.end_of_write_response().unwrap();
/// let bytes = encoder.finish().unwrap();
/// assert_eq!(bytes[0], 0x15);
/// ```
#[derive(Debug)]
pub struct WriteResponseBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> WriteResponseBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self {
            inner: Builder::open(encoder, &WRITE_RESPONSE_MESSAGE, Tag::Anonymous),
        }
    }

    pub fn create_write_responses(&mut self) -> AttributeStatusesBuilder<'_> {
        AttributeStatusesBuilder::wrap(
            self.inner
                .create_child(tags::WRITE_RESPONSES, &ATTRIBUTE_STATUS_IBS),
        )
    }

    /// Re-attach to the status array while it is still open.
    pub fn get_write_responses(&mut self) -> AttributeStatusesBuilder<'_> {
        AttributeStatusesBuilder::wrap(
            self.inner
                .get_child(tags::WRITE_RESPONSES, &ATTRIBUTE_STATUS_IBS),
        )
    }

    pub fn interaction_model_revision(&mut self, revision: u8) -> &mut Self {
        self.inner
            .put_unsigned(tags::INTERACTION_MODEL_REVISION, u64::from(revision));
        self
    }

    pub fn end_of_write_response(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WriteResponseParser<'a> {
    inner: Parser<'a>,
}

impl<'a> WriteResponseParser<'a> {
    pub fn from_message(bytes: &'a [u8], config: TlvConfig) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::from_message(
            &WRITE_RESPONSE_MESSAGE,
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

    pub fn get_write_responses(&self) -> imtlv_codec::Result<AttributeStatusesParser<'a>> {
        self.inner
            .get_list(tags::WRITE_RESPONSES, &ATTRIBUTE_STATUS_IBS)
            .map(AttributeStatusesParser::wrap)
    }

    pub fn get_interaction_model_revision(&self) -> imtlv_codec::Result<u8> {
        self.inner.get_u8(tags::INTERACTION_MODEL_REVISION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub write_responses: Vec<AttributeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_model_revision: Option<u8>,
}

impl WriteResponse {
    pub fn write(&self, builder: &mut WriteResponseBuilder<'_>) -> imtlv_codec::Result<()> {
        AttributeStatus::write_all(&self.write_responses, &mut builder.create_write_responses())?;
        if let Some(revision) = self.interaction_model_revision {
            builder.interaction_model_revision(revision);
        }
        builder.end_of_write_response()
    }

    pub fn read(parser: &WriteResponseParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            write_responses: AttributeStatus::read_all(parser.get_write_responses()?)?,
            interaction_model_revision: optional(parser.get_interaction_model_revision())?,
        })
    }
}

impl Message for WriteResponse {
    const NAME: &'static str = "write-response";

    fn schema() -> &'static Schema {
        &WRITE_RESPONSE_MESSAGE
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut WriteResponseBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&WriteResponseParser::wrap(parser))
    }
}
