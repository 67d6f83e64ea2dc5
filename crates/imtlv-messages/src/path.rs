use imtlv_codec::{Builder, BuilderState, Encoder, Parser};
use imtlv_schema::{Field, FieldKind, Schema};
use imtlv_stream::{Element, Tag};
use serde::{Deserialize, Serialize};

use crate::message::{optional, Message};

/// Context tags of `AttributePathIB`.
pub mod tags {
    pub const ENABLE_TAG_COMPRESSION: u8 = 0;
    pub const NODE: u8 = 1;
    pub const ENDPOINT: u8 = 2;
    pub const CLUSTER: u8 = 3;
    pub const ATTRIBUTE: u8 = 4;
    pub const LIST_INDEX: u8 = 5;
}

static ATTRIBUTE_PATH_FIELDS: [Field; 6] = [
    Field::optional("EnableTagCompression", tags::ENABLE_TAG_COMPRESSION, FieldKind::Bool),
    Field::optional("Node", tags::NODE, FieldKind::Unsigned),
    Field::optional("Endpoint", tags::ENDPOINT, FieldKind::Unsigned),
    Field::optional("Cluster", tags::CLUSTER, FieldKind::Unsigned),
    Field::optional("Attribute", tags::ATTRIBUTE, FieldKind::Unsigned),
    Field::optional("ListIndex", tags::LIST_INDEX, FieldKind::Unsigned).nullable(),
];

/// Path to one attribute, encoded as a list of context-tagged fields.
pub static ATTRIBUTE_PATH_IB: Schema =
    Schema::tagged_list("AttributePathIB", &ATTRIBUTE_PATH_FIELDS);

#[derive(Debug)]
pub struct AttributePathBuilder<'e> {
    inner: Builder<'e>,
}

impl<'e> AttributePathBuilder<'e> {
    /// Open a stand-alone path as the top-level container.
    pub fn open(encoder: &'e mut Encoder) -> Self {
        Self::wrap(Builder::open(encoder, &ATTRIBUTE_PATH_IB, Tag::Anonymous))
    }

    pub(crate) fn wrap(inner: Builder<'e>) -> Self {
        Self { inner }
    }

    pub fn enable_tag_compression(&mut self, enable: bool) -> &mut Self {
        self.inner.put_bool(tags::ENABLE_TAG_COMPRESSION, enable);
        self
    }

    pub fn node(&mut self, node: u64) -> &mut Self {
        self.inner.put_unsigned(tags::NODE, node);
        self
    }

    pub fn endpoint(&mut self, endpoint: u16) -> &mut Self {
        self.inner.put_unsigned(tags::ENDPOINT, u64::from(endpoint));
        self
    }

    pub fn cluster(&mut self, cluster: u32) -> &mut Self {
        self.inner.put_unsigned(tags::CLUSTER, u64::from(cluster));
        self
    }

    pub fn attribute(&mut self, attribute: u32) -> &mut Self {
        self.inner.put_unsigned(tags::ATTRIBUTE, u64::from(attribute));
        self
    }

    /// List index; `None` is encoded as null and means "append".
    pub fn list_index(&mut self, index: Option<u16>) -> &mut Self {
        match index {
            Some(index) => self.inner.put_unsigned(tags::LIST_INDEX, u64::from(index)),
            None => self.inner.put_null(tags::LIST_INDEX),
        };
        self
    }

    pub fn end_of_attribute_path(&mut self) -> imtlv_codec::Result<()> {
        self.inner.end()
    }

    pub fn state(&self) -> BuilderState {
        self.inner.state()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributePathParser<'a> {
    inner: Parser<'a>,
}

impl<'a> AttributePathParser<'a> {
    pub fn new(element: &Element<'a>) -> imtlv_codec::Result<Self> {
        Ok(Self::wrap(Parser::new(&ATTRIBUTE_PATH_IB, element)?))
    }

    pub(crate) fn wrap(inner: Parser<'a>) -> Self {
        Self { inner }
    }

    pub fn check_schema_validity(&self) -> imtlv_codec::Result<()> {
        self.inner.check_schema_validity()
    }

    pub fn get_enable_tag_compression(&self) -> imtlv_codec::Result<bool> {
        self.inner.get_bool(tags::ENABLE_TAG_COMPRESSION)
    }

    pub fn get_node(&self) -> imtlv_codec::Result<u64> {
        self.inner.get_u64(tags::NODE)
    }

    pub fn get_endpoint(&self) -> imtlv_codec::Result<u16> {
        self.inner.get_u16(tags::ENDPOINT)
    }

    pub fn get_cluster(&self) -> imtlv_codec::Result<u32> {
        self.inner.get_u32(tags::CLUSTER)
    }

    pub fn get_attribute(&self) -> imtlv_codec::Result<u32> {
        self.inner.get_u32(tags::ATTRIBUTE)
    }

    /// `Ok(None)` when the index is present and null.
    pub fn get_list_index(&self) -> imtlv_codec::Result<Option<u16>> {
        if self.inner.is_null(tags::LIST_INDEX)? {
            return Ok(None);
        }
        self.inner.get_u16(tags::LIST_INDEX).map(Some)
    }
}

/// Position inside a list attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListIndex {
    /// Null on the wire: append to the list.
    Append,
    Index(u16),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_tag_compression: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_index: Option<ListIndex>,
}

impl AttributePath {
    /// Concrete path to one attribute of one cluster instance.
    pub fn new(endpoint: u16, cluster: u32, attribute: u32) -> Self {
        Self {
            endpoint: Some(endpoint),
            cluster: Some(cluster),
            attribute: Some(attribute),
            ..Self::default()
        }
    }

    /// Write every present field and close the path.
    pub fn write(&self, builder: &mut AttributePathBuilder<'_>) -> imtlv_codec::Result<()> {
        if let Some(enable) = self.enable_tag_compression {
            builder.enable_tag_compression(enable);
        }
        if let Some(node) = self.node {
            builder.node(node);
        }
        if let Some(endpoint) = self.endpoint {
            builder.endpoint(endpoint);
        }
        if let Some(cluster) = self.cluster {
            builder.cluster(cluster);
        }
        if let Some(attribute) = self.attribute {
            builder.attribute(attribute);
        }
        match self.list_index {
            Some(ListIndex::Index(index)) => {
                builder.list_index(Some(index));
            }
            Some(ListIndex::Append) => {
                builder.list_index(None);
            }
            None => {}
        }
        builder.end_of_attribute_path()
    }

    pub fn read(parser: &AttributePathParser<'_>) -> imtlv_codec::Result<Self> {
        Ok(Self {
            enable_tag_compression: optional(parser.get_enable_tag_compression())?,
            node: optional(parser.get_node())?,
            endpoint: optional(parser.get_endpoint())?,
            cluster: optional(parser.get_cluster())?,
            attribute: optional(parser.get_attribute())?,
            list_index: optional(parser.get_list_index())?
                .map(|index| index.map_or(ListIndex::Append, ListIndex::Index)),
        })
    }
}

impl Message for AttributePath {
    const NAME: &'static str = "attribute-path";

    fn schema() -> &'static Schema {
        &ATTRIBUTE_PATH_IB
    }

    fn encode_into(&self, encoder: &mut Encoder) -> imtlv_codec::Result<()> {
        self.write(&mut AttributePathBuilder::open(encoder))
    }

    fn from_parser(parser: Parser<'_>) -> imtlv_codec::Result<Self> {
        Self::read(&AttributePathParser::wrap(parser))
    }
}

#[cfg(test)]
mod tests {
    use imtlv_stream::TlvConfig;

    use super::*;

    #[test]
    fn path_round_trip_with_null_list_index() {
        let path = AttributePath {
            node: Some(0x1122_3344_5566_7788),
            list_index: Some(ListIndex::Append),
            ..AttributePath::new(1, 0x0006, 0x0000)
        };
        let bytes = path.encode(TlvConfig::default()).unwrap();
        assert_eq!(bytes[0], 0x17);
        assert_eq!(AttributePath::decode(&bytes, TlvConfig::default()).unwrap(), path);
    }

    #[test]
    fn wide_endpoint_is_out_of_range() {
        let mut encoder = Encoder::new();
        let mut builder = Builder::open(&mut encoder, &ATTRIBUTE_PATH_IB, Tag::Anonymous);
        builder.put_unsigned(tags::ENDPOINT, 70_000);
        builder.end().unwrap();
        let bytes = encoder.finish().unwrap();

        let parser = Parser::from_message(&ATTRIBUTE_PATH_IB, &bytes, TlvConfig::default()).unwrap();
        let path = AttributePathParser::wrap(parser);
        assert!(path.check_schema_validity().is_ok());
        assert!(matches!(
            path.get_endpoint(),
            Err(imtlv_codec::CodecError::IntegerOutOfRange {
                field: "Endpoint",
                ..
            })
        ));
    }

    #[test]
    fn empty_path_has_no_fields() {
        let path = AttributePath::default();
        let bytes = path.encode(TlvConfig::default()).unwrap();
        assert_eq!(bytes.as_ref(), &[0x17, 0x18]);
        let parser = Parser::from_message(&ATTRIBUTE_PATH_IB, &bytes, TlvConfig::default()).unwrap();
        assert!(AttributePathParser::wrap(parser)
            .get_node()
            .unwrap_err()
            .is_end_of_tlv());
    }
}
