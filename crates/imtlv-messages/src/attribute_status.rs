use imtlv_codec::{Builder, BuilderState, Encoder, ListParser, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Element, Tag};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::path::{AttributePath, AttributePathBuilder, AttributePathParser, ATTRIBUTE_PATH_IB};
use crate::status::{Status, StatusBuilder, StatusParser, STATUS_IB};
use crate::status_code::StatusCode;

/// Context tags of `AttributeStatusIB`.
pub mod tags {
    pub const PATH: u8 = 0;
    pub const STATUS: u8 = 1;
}

static ATTRIBUTE_STATUS_FIELDS: [Field; 2] = [
    Field::mandatory("Path", tags::PATH, FieldKind::Nested(&ATTRIBUTE_PATH_IB)),
    Field::mandatory("Status", tags::STATUS, FieldKind::Nested(&STATUS_IB)),
];

/// Outcome of one attribute operation.
pub static ATTRIBUTE_STATUS_IB: Schema =
    Schema::structure("AttributeStatusIB", &ATTRIBUTE_STATUS_FIELDS);

/// Array of `AttributeStatusIB`.
pub static ATTRIBUTE_STATUS_IBS: Schema =
    Schema::array_of("AttributeStatusIBs", FieldKind::Nested(&ATTRIBUTE_STATUS_IB));

#[derive(Debug)]
pub struct AttributeStatusBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> AttributeStatusBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self::wrap(Builder::open(encoder, &ATTRIBUTE_STATUS_IB, Tag::Anonymous))
    }

    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    pub fn create_path(&mut self) -> AttributePathBuilder<'_> {
        AttributePathBuilder::wrap(self.inner.create_child(tags::PATH, &ATTRIBUTE_PATH_IB))
    }

    pub fn create_status(&mut self) -> StatusBuilder<'_> {
        StatusBuilder::wrap(self.inner.create_child(tags::STATUS, &STATUS_IB))
    }

    pub fn end_of_attribute_status(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeStatusParser<'a> {
    inner: Parser<'a>,
}

impl<'a> AttributeStatusParser<'a> {
    pub fn new(element: &Element<'a>) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::new(&ATTRIBUTE_STATUS_IB, element)?))
    }

    pub(crate) fn wrap(inner: Parser<'a>) -> Self {
        Self { inner }
    }

    pub fn check_schema_validity(&self) -> imtlv_codec::Result<()> {
        self.inner.check_schema_validity()
    }

    pub fn get_path(&self) -> imtlv_codec::Result<AttributePathParser<'a>> {
        self.inner
            .get_child(tags::PATH, &ATTRIBUTE_PATH_IB)
            .map(AttributePathParser::wrap)
    }

    pub fn get_status(&self) -> imtlv_codec::Result<StatusParser<'a>> {
        self.inner
            .get_child(tags::STATUS, &STATUS_IB)
            .map(StatusParser::wrap)
    }
}

/// Builder for an `AttributeStatusIBs` array; one element at a time.
#[derive(Debug)]
pub struct AttributeStatusesBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> AttributeStatusesBuilder<'e> {
    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    /// Append one status. Close it before creating the next.
    pub fn create_attribute_status(&mut self) -> AttributeStatusBuilder<'_> {
        AttributeStatusBuilder::wrap(self.inner.create_element(&ATTRIBUTE_STATUS_IB))
    }

    pub fn end_of_attribute_statuses(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

/// Forward-only cursor over an `AttributeStatusIBs` array.
#[derive(Debug, Clone)]
pub struct AttributeStatusesParser<'a> {
    list: ListParser<'a>,
}

impl<'a> AttributeStatusesParser<'a> {
    pub(crate) fn wrap(list: ListParser<'a>) -> Self {
        Self { list }
    }

    /// Next status, or `None` after the last one.
    pub fn next_attribute_status(&mut self) -> imtlv_codec::Result<Option<AttributeStatusParser<'a>>> {
        Ok(self.list.next_parser()?.map(AttributeStatusParser::wrap))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStatus {
    pub path: AttributePath,
    pub status: Status,
}

impl AttributeStatus {
    pub fn new(path: AttributePath, status: impl Into<Status>) -> Self {
        Self {
            path,
            status: status.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.status == StatusCode::Success
    }

    pub fn write(&self, builder: &mut AttributeStatusBuilder<'_>) -> imtlv_codec::Result<()> {
        self.path.write(&mut builder.create_path())?;
        self.status.write(&mut builder.create_status())?;
        builder.end_of_attribute_status()
    }

    pub fn read(parser: &AttributeStatusParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            path: AttributePath::read(&parser.get_path()?)?,
            status: Status::read(&parser.get_status()?)?,
        })
    }

    /// Write a whole `AttributeStatusIBs` array and close it.
    pub fn write_all(
        statuses: &[AttributeStatus],
        builder: &mut AttributeStatusesBuilder<'_>,
    ) -> imtlv_codec::Result<()> {
        for status in statuses {
            status.write(&mut builder.create_attribute_status())?;
        }
        builder.end_of_attribute_statuses()
    }

    /// Collect every element of an `AttributeStatusIBs` array, in order.
    pub fn read_all(
        mut parser: AttributeStatusesParser<'_>,
    ) -> imtlv_codec::Result<Vec<AttributeStatus>> {
        let mut statuses = Vec::new();
        while let Some(status) = parser.next_attribute_status()? {
            statuses.push(Self::read(&status)?);
        }
        Ok(statuses)
    }
}

impl Message for AttributeStatus {
    const NAME: &'static str = "attribute-status";

    fn schema() -> &'static Schema {
        &ATTRIBUTE_STATUS_IB
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut AttributeStatusBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&AttributeStatusParser::wrap(parser))
    }
}
