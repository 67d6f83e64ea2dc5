use imtlv_codec::{Builder, CodecError};
use imtlv_schema::{FieldKind, Schema};
use imtlv_stream::{Container, ContainerType, Element, Tag, TlvError, Value};
use serde::{Deserialize, Serialize};

/// Structure with members under any tag.
pub static ANY_STRUCTURE: Schema = Schema::structure("AnyStructure", &[]).open();
/// Array of anonymous elements of any type.
pub static ANY_ARRAY: Schema = Schema::array_of("AnyArray", FieldKind::Any);
/// List of tagged or anonymous members of any type.
pub static ANY_LIST: Schema = Schema::tagged_list("AnyList", &[]).open();

/// One tagged member of a [`DataValue::Structure`] or [`DataValue::List`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataMember {
    pub tag: Tag,
    pub value: DataValue,
}

impl DataMember {
    pub fn new(tag: Tag, value: DataValue) -> Self {
        Self { tag, value }
    }
}

/// Owned, schema-less TLV value carried in the `Data` field of an
/// attribute data IB.
///
/// Members keep their tags and their wire order, and floats keep their
/// width, so a decoded value encodes back to the same bytes. A repeated tag
/// inside one container keeps its first occurrence, like the parser's
/// lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataValue {
    Unsigned(u64),
    Signed(i64),
    Bool(bool),
    F32(f32),
    F64(f64),
    Utf8(String),
    Bytes(Vec<u8>),
    Null,
    Structure(Vec<DataMember>),
    Array(Vec<DataValue>),
    List(Vec<DataMember>),
}

impl DataValue {
    /// Write the value as field `tag` of an open builder.
    pub fn put_field(&self, builder: &mut Builder<'_>, tag: u8) -> imtlv_codec::Result<()> {
        self.write_tagged(builder, Tag::Context(tag))
    }

    /// Append the value as an anonymous element of an open collection.
    pub fn push_element(&self, builder: &mut Builder<'_>) -> imtlv_codec::Result<()> {
        self.write_tagged(builder, Tag::Anonymous)
    }

    /// Write the value under any tag form.
    pub fn write_tagged(&self, builder: &mut Builder<'_>, tag: Tag) -> imtlv_codec::Result<()> {
        let value = match self {
            DataValue::Unsigned(value) => Value::Unsigned(*value),
            DataValue::Signed(value) => Value::Signed(*value),
            DataValue::Bool(value) => Value::Bool(*value),
            DataValue::F32(value) => Value::F32(*value),
            DataValue::F64(value) => Value::F64(*value),
            DataValue::Utf8(value) => Value::Utf8(value.as_str()),
            DataValue::Bytes(value) => Value::Bytes(value.as_slice()),
            DataValue::Null => Value::Null,
            DataValue::Structure(members) | DataValue::List(members) => {
                let mut child = builder.create_tagged(tag, self.container_schema());
                for member in members {
                    member.value.write_tagged(&mut child, member.tag)?;
                }
                return child.end();
            }
            DataValue::Array(items) => {
                let mut child = builder.create_tagged(tag, &ANY_ARRAY);
                for item in items {
                    item.push_element(&mut child)?;
                }
                return child.end();
            }
        };
        builder.put_value(tag, &value);
        match builder.error() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Build an owned value from a received element.
    pub fn from_element(element: &Element<'_>) -> imtlv_codec::Result<Self> {
        Ok(match element.value {
            Value::Unsigned(value) => DataValue::Unsigned(value),
            Value::Signed(value) => DataValue::Signed(value),
            Value::Bool(value) => DataValue::Bool(value),
            Value::F32(value) => DataValue::F32(value),
            Value::F64(value) => DataValue::F64(value),
            Value::Utf8(value) => DataValue::Utf8(value.to_owned()),
            Value::Bytes(value) => DataValue::Bytes(value.to_vec()),
            Value::Null => DataValue::Null,
            Value::Container(container) => Self::from_container(&container)?,
        })
    }

    fn from_container(container: &Container<'_>) -> imtlv_codec::Result<Self> {
        let kind = container.kind();
        let context = match kind {
            ContainerType::Structure => ANY_STRUCTURE.name,
            ContainerType::Array => ANY_ARRAY.name,
            ContainerType::List => ANY_LIST.name,
        };
        let corrupt = |source: TlvError| CodecError::Decoding { context, source };
        let mut reader = container.reader();
        let mut members: Vec<DataMember> = Vec::new();
        let mut items = Vec::new();

        while let Some(element) = reader.next_element().map_err(corrupt)? {
            let tag = element.tag;
            let allowed = match kind {
                ContainerType::Structure => !tag.is_anonymous(),
                ContainerType::Array => tag.is_anonymous(),
                ContainerType::List => true,
            };
            if !allowed {
                return Err(corrupt(TlvError::InvalidTag {
                    tag,
                    container: kind,
                }));
            }

            let value = Self::from_element(&element)?;
            if kind == ContainerType::Array {
                items.push(value);
            } else if tag.is_anonymous() || !members.iter().any(|member| member.tag == tag) {
                members.push(DataMember::new(tag, value));
            }
        }

        Ok(match kind {
            ContainerType::Structure => DataValue::Structure(members),
            ContainerType::Array => DataValue::Array(items),
            ContainerType::List => DataValue::List(members),
        })
    }

    fn container_schema(&self) -> &'static Schema {
        match self {
            DataValue::Array(_) => &ANY_ARRAY,
            DataValue::List(_) => &ANY_LIST,
            _ => &ANY_STRUCTURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use imtlv_codec::{Encoder, Parser};
    use imtlv_schema::Field;
    use imtlv_stream::{TlvConfig, TlvWriter};

    use super::*;

    static HOLDER_FIELDS: [Field; 1] = [Field::mandatory("Data", 0, FieldKind::Any)];
    static HOLDER: Schema = Schema::structure("Holder", &HOLDER_FIELDS);

    fn encode(value: &DataValue) -> bytes::Bytes {
        let mut encoder = Encoder::new();
        let mut holder = Builder::open(&mut encoder, &HOLDER, Tag::Anonymous);
        value.put_field(&mut holder, 0).unwrap();
        holder.end().unwrap();
        encoder.finish().unwrap()
    }

    fn decode(bytes: &[u8]) -> imtlv_codec::Result<DataValue> {
        let parser = Parser::from_message(&HOLDER, bytes, TlvConfig::default())?;
        parser.check_schema_validity()?;
        DataValue::from_element(&parser.get(0)?)
    }

    /// Holder whose `Data` is a structure written member by member.
    fn holder_with(members: impl FnOnce(&mut TlvWriter)) -> bytes::Bytes {
        let mut w = TlvWriter::new();
        w.start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        w.start_container(Tag::Context(0), ContainerType::Structure)
            .unwrap();
        members(&mut w);
        w.end_container(ContainerType::Structure).unwrap();
        w.end_container(ContainerType::Structure).unwrap();
        w.finish().unwrap()
    }

    #[test]
    fn nested_value_round_trips() {
        let value = DataValue::List(vec![
            DataMember::new(
                Tag::Anonymous,
                DataValue::Structure(vec![
                    DataMember::new(Tag::Context(3), DataValue::Utf8("kitchen".into())),
                    DataMember::new(
                        Tag::Context(0),
                        DataValue::Array(vec![DataValue::Signed(-1), DataValue::Null]),
                    ),
                ]),
            ),
            DataMember::new(Tag::Context(1), DataValue::Bytes(vec![1, 2, 3])),
            DataMember::new(Tag::Anonymous, DataValue::Bool(true)),
            DataMember::new(Tag::Anonymous, DataValue::F64(2.5)),
        ]);
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn primitive_value_round_trips() {
        let value = DataValue::Unsigned(70_000);
        assert_eq!(decode(&encode(&value)).unwrap(), value);
        assert_eq!(decode(&encode(&DataValue::Null)).unwrap(), DataValue::Null);
    }

    #[test]
    fn profile_tagged_member_round_trips() {
        let bytes = holder_with(|w| {
            w.put_unsigned(Tag::CommonProfile(5), 1).unwrap();
            w.put_str(
                Tag::FullyQualified {
                    vendor_id: 0xFFF1,
                    profile: 0xDEED,
                    tag: 0x0001_0000,
                },
                "vendor",
            )
            .unwrap();
        });

        let value = decode(&bytes).unwrap();
        assert_eq!(
            value,
            DataValue::Structure(vec![
                DataMember::new(Tag::CommonProfile(5), DataValue::Unsigned(1)),
                DataMember::new(
                    Tag::FullyQualified {
                        vendor_id: 0xFFF1,
                        profile: 0xDEED,
                        tag: 0x0001_0000,
                    },
                    DataValue::Utf8("vendor".into()),
                ),
            ])
        );
        assert_eq!(encode(&value), bytes);
    }

    #[test]
    fn single_precision_keeps_its_width() {
        let bytes = holder_with(|w| w.put_f32(Tag::Context(2), 0.5).unwrap());
        let value = decode(&bytes).unwrap();
        assert_eq!(
            value,
            DataValue::Structure(vec![DataMember::new(Tag::Context(2), DataValue::F32(0.5))])
        );
        assert_eq!(encode(&value), bytes);
        assert!(bytes.windows(6).any(|w| w == [0x2A, 0x02, 0x00, 0x00, 0x00, 0x3F]));
    }

    #[test]
    fn repeated_tag_keeps_first_occurrence() {
        let bytes = holder_with(|w| {
            w.put_unsigned(Tag::Context(0), 1).unwrap();
            w.put_unsigned(Tag::Context(0), 2).unwrap();
            w.put_unsigned(Tag::CommonProfile(9), 3).unwrap();
            w.put_unsigned(Tag::CommonProfile(9), 4).unwrap();
        });
        assert_eq!(
            decode(&bytes).unwrap(),
            DataValue::Structure(vec![
                DataMember::new(Tag::Context(0), DataValue::Unsigned(1)),
                DataMember::new(Tag::CommonProfile(9), DataValue::Unsigned(3)),
            ])
        );
    }

    #[test]
    fn tagged_array_element_is_corrupt() {
        // The writer refuses tagged array elements, so build the bytes by hand:
        // anonymous array holding one context-tagged u8.
        let bytes = [0x16, 0x24, 0x01, 0x07, 0x18];
        let top = imtlv_stream::read_message(&bytes, TlvConfig::default()).unwrap();
        let err = DataValue::from_element(&top).unwrap_err();
        assert_eq!(
            err,
            CodecError::Decoding {
                context: "AnyArray",
                source: TlvError::InvalidTag {
                    tag: Tag::Context(1),
                    container: ContainerType::Array,
                },
            }
        );
        assert!(err.is_corrupt());
        assert!(!err.is_schema_violation());
    }

    #[test]
    fn json_shape() {
        let value = DataValue::Structure(vec![
            DataMember::new(Tag::Context(1), DataValue::Unsigned(5)),
            DataMember::new(Tag::CommonProfile(2), DataValue::F32(0.5)),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"{"structure":[{"tag":{"context":1},"value":{"unsigned":5}},{"tag":{"common_profile":2},"value":{"f32":0.5}}]}"#
        );
        let back: DataValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
