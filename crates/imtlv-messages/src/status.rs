use imtlv_codec::{Builder, BuilderState, Encoder, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Element, Tag};
use serde::{Deserialize, Serialize};

use crate::message::{optional, Message};
use crate::status_code::StatusCode;

/// Context tags of `StatusIB`.
pub mod tags {
    pub const STATUS: u8 = 0;
    pub const CLUSTER_STATUS: u8 = 1;
}

static STATUS_FIELDS: [Field; 2] = [
    Field::mandatory("Status", tags::STATUS, FieldKind::Unsigned),
    Field::optional("ClusterStatus", tags::CLUSTER_STATUS, FieldKind::Unsigned),
];

pub static STATUS_IB: Schema = Schema::structure("StatusIB", &STATUS_FIELDS);

#[derive(Debug)]
pub struct StatusBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> StatusBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self::wrap(Builder::open(encoder, &STATUS_IB, Tag::Anonymous))
    }

    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.inner.put_unsigned(tags::STATUS, u64::from(status.code()));
        self
    }

    pub fn cluster_status(&mut self, cluster_status: u8) -> &mut Self {
        self.inner
            .put_unsigned(tags::CLUSTER_STATUS, u64::from(cluster_status));
        self
    }

    pub fn end_of_status(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatusParser<'a> {
    inner: Parser<'a>,
}

impl<'a> StatusParser<'a> {
    pub fn new(element: &Element<'a>) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::new(&STATUS_IB, element)?))
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

    pub fn get_cluster_status(&self) -> imtlv_codec::Result<u8> {
        self.inner.get_u8(tags::CLUSTER_STATUS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub status: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_status: Option<u8>,
}

impl Status {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            cluster_status: None,
        }
    }

    pub fn write(&self, builder: &mut StatusBuilder<'_>) -> imtlv_codec::Result<()> {
        builder.status(self.status);
        if let Some(cluster_status) = self.cluster_status {
            builder.cluster_status(cluster_status);
        }
        builder.end_of_status()
    }

    pub fn read(parser: &StatusParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            status: parser.get_status()?,
            cluster_status: optional(parser.get_cluster_status())?,
        })
    }
}

impl From<StatusCode> for Status {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

impl Message for Status {
    const NAME: &'static str = "status";

    fn schema() -> &'static Schema {
        &STATUS_IB
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut StatusBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&StatusParser::wrap(parser))
    }
}
