use imtlv_codec::{Builder, BuilderState, Encoder, ListParser, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Element, Tag};
use serde::{Deserialize, Serialize};

use crate::data::DataValue;
use crate::message::{optional, Message};
use crate::path::{AttributePath, AttributePathBuilder, AttributePathParser, ATTRIBUTE_PATH_IB};

/// Context tags of `AttributeDataIB`.
pub mod tags {
    pub const DATA_VERSION: u8 = 0;
    pub const PATH: u8 = 1;
    pub const DATA: u8 = 2;
}

static ATTRIBUTE_DATA_FIELDS: [Field; 3] = [
    Field::optional("DataVersion", tags::DATA_VERSION, FieldKind::Unsigned),
    Field::mandatory("Path", tags::PATH, FieldKind::Nested(&ATTRIBUTE_PATH_IB)),
    Field::mandatory("Data", tags::DATA, FieldKind::Any),
];

/// One attribute value addressed by path.
pub static ATTRIBUTE_DATA_IB: Schema = Schema::structure("AttributeDataIB", &ATTRIBUTE_DATA_FIELDS);

pub static ATTRIBUTE_DATA_IBS: Schema =
    Schema::array_of("AttributeDataIBs", FieldKind::Nested(&ATTRIBUTE_DATA_IB));

#[derive(Debug)]
pub struct AttributeDataBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> AttributeDataBuilder<'e> {
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self::wrap(Builder::open(encoder, &ATTRIBUTE_DATA_IB, Tag::Anonymous))
    }

    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    pub fn data_version(&mut self, version: u32) -> &mut Self {
        self.inner
            .put_unsigned(tags::DATA_VERSION, u64::from(version));
        self
    }

    pub fn create_path(&mut self) -> AttributePathBuilder<'_> {
        AttributePathBuilder::wrap(self.inner.create_child(tags::PATH, &ATTRIBUTE_PATH_IB))
    }

    /// Write the attribute value. Containers are closed before returning.
    pub fn data(&mut self, value: &DataValue) -> imtlv_codec::Result<()> {
        value.put_field(&mut self.inner, tags::DATA)
    }

    pub fn end_of_attribute_data(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeDataParser<'a> {
    inner: Parser<'a>,
}

impl<'a> AttributeDataParser<'a> {
    pub fn new(element: &Element<'a>) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::new(&ATTRIBUTE_DATA_IB, element)?))
    }

    pub(crate) fn wrap(inner: Parser<'a>) -> Self {
        Self { inner }
    }

    pub fn check_schema_validity(&self) -> imtlv_codec::Result<()> {
        self.inner.check_schema_validity()
    }

    pub fn get_data_version(&self) -> imtlv_codec::Result<u32> {
        self.inner.get_u32(tags::DATA_VERSION)
    }

    pub fn get_path(&self) -> imtlv_codec::Result<AttributePathParser<'a>> {
        self.inner
            .get_child(tags::PATH, &ATTRIBUTE_PATH_IB)
            .map(AttributePathParser::wrap)
    }

    /// Raw data element; its type depends on the attribute.
    pub fn get_data(&self) -> imtlv_codec::Result<Element<'a>> {
        self.inner.get(tags::DATA)
    }
}

#[derive(Debug)]
pub struct AttributeDataListBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> AttributeDataListBuilder<'e> {
    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    pub fn create_attribute_data(&mut self) -> AttributeDataBuilder<'_> {
        AttributeDataBuilder::wrap(self.inner.create_element(&ATTRIBUTE_DATA_IB))
    }

    pub fn end_of_attribute_data_list(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone)]
pub struct AttributeDataListParser<'a> {
    list: ListParser<'a>,
}

impl<'a> AttributeDataListParser<'a> {
    pub(crate) fn wrap(list: ListParser<'a>) -> Self {
        Self { list }
    }

    pub fn next_attribute_data(&mut self) -> imtlv_codec::Result<Option<AttributeDataParser<'a>>> {
        Ok(self.list.next_parser()?.map(AttributeDataParser::wrap))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<u32>,
    pub path: AttributePath,
    pub data: DataValue,
}

impl AttributeData {
    pub fn new(path: AttributePath, data: DataValue) -> Self {
        Self {
            data_version: None,
            path,
            data,
        }
    }

    pub fn write(&self, builder: &mut AttributeDataBuilder<'_>) -> imtlv_codec::Result<()> {
        if let Some(version) = self.data_version {
            builder.data_version(version);
        }
        self.path.write(&mut builder.create_path())?;
        builder.data(&self.data)?;
        builder.end_of_attribute_data()
    }

    pub fn read(parser: &AttributeDataParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            data_version: optional(parser.get_data_version())?,
            path: AttributePath::read(&parser.get_path()?)?,
            data: DataValue::from_element(&parser.get_data()?)?,
        })
    }

    pub fn write_all(
        items: &[AttributeData],
        builder: &mut AttributeDataListBuilder<'_>,
    ) -> imtlv_codec::Result<()> {
        for item in items {
            item.write(&mut builder.create_attribute_data())?;
        }
        builder.end_of_attribute_data_list()
    }

    pub fn read_all(
        mut parser: AttributeDataListParser<'_>,
    ) -> imtlv_codec::Result<Vec<AttributeData>> {
        let mut items = Vec::new();
        while let Some(item) = parser.next_attribute_data()? {
            items.push(Self::read(&item)?);
        }
        Ok(items)
    }
}

impl Message for AttributeData {
    const NAME: &'static str = "attribute-data";

    fn schema() -> &'static Schema {
        &ATTRIBUTE_DATA_IB
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut AttributeDataBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&AttributeDataParser::wrap(parser))
    }
}

#[cfg(test)]
mod tests {
    use imtlv_codec::CodecError;
    use imtlv_stream::TlvConfig;

    use super::*;
    use crate::data::DataMember;

    #[test]
    fn attribute_data_round_trip() {
        let data = AttributeData {
            data_version: Some(0x1234_5678),
            ..AttributeData::new(
                AttributePath::new(1, 0x0008, 0x0000),
                DataValue::Unsigned(254),
            )
        };
        let bytes = data.encode(TlvConfig::default()).unwrap();
        assert_eq!(AttributeData::decode(&bytes, TlvConfig::default()).unwrap(), data);
    }

    #[test]
    fn data_is_mandatory() {
        let mut encoder = Encoder::new();
        let mut builder = AttributeDataBuilder::open(&mut encoder);
        AttributePath::new(1, 6, 0)
            .write(&mut builder.create_path())
            .unwrap();
        assert!(matches!(
            builder.end_of_attribute_data(),
            Err(CodecError::Schema(
                imtlv_schema::SchemaError::MissingMandatoryField { field: "Data", .. }
            ))
        ));
        assert_eq!(builder.state(), BuilderState::Error);
    }

    #[test]
    fn structured_data_round_trips() {
        let data = AttributeData::new(
            AttributePath::new(2, 0x0028, 0x0005),
            DataValue::Structure(vec![
                DataMember::new(Tag::Context(0), DataValue::Utf8("Living room".into())),
                DataMember::new(Tag::Context(1), DataValue::Bool(false)),
            ]),
        );
        let bytes = data.encode(TlvConfig::default()).unwrap();
        assert_eq!(AttributeData::decode(&bytes, TlvConfig::default()).unwrap(), data);
    }
}
