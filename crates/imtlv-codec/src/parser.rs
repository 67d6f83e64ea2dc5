use imtlv_schema::{validate_container, Schema};
use imtlv_stream::{read_message, Container, Element, Tag, TlvConfig, TlvReader, TlvType, Value};

use crate::error::{CodecError, Result};

/// Schema-bound reader over one received container.
///
/// Construction never validates; call [`Parser::check_schema_validity`] once
/// before trusting lookups. Every lookup scans from the start of the container
/// and returns the first element with the requested tag.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    schema: &'static Schema,
    container: Container<'a>,
}

impl<'a> Parser<'a> {
    /// Bind to an element, which must be a container of the schema's kind.
    pub fn new(schema: &'static Schema, element: &Element<'a>) -> Result<Self> {
        match element.as_container() {
            Some(container) if container.kind() == schema.container => {
                Ok(Self { schema, container })
            }
            _ => Err(CodecError::WrongTlvType {
                schema: schema.name,
                field: "container",
                expected: schema.container.tlv_type().as_str(),
                found: element.tlv_type(),
            }),
        }
    }

    /// Read the single top-level element of a received message and bind to it.
    pub fn from_message(
        schema: &'static Schema,
        bytes: &'a [u8],
        config: TlvConfig,
    ) -> Result<Self> {
        let element = read_message(bytes, config).map_err(|source| CodecError::Decoding {
            context: schema.name,
            source,
        })?;
        Self::new(schema, &element)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn container(&self) -> Container<'a> {
        self.container
    }

    /// Run the full schema check over this container and everything below it.
    pub fn check_schema_validity(&self) -> Result<()> {
        validate_container(self.schema, &self.container)?;
        Ok(())
    }

    /// First element with context tag `tag`, if any.
    pub fn find(&self, tag: u8) -> Result<Option<Element<'a>>> {
        let mut elements = self.elements();
        while let Some(element) = elements.next_element()? {
            if element.tag == Tag::Context(tag) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// First element with context tag `tag`; absence is `EndOfTlv`.
    pub fn get(&self, tag: u8) -> Result<Element<'a>> {
        self.find(tag)?.ok_or_else(|| CodecError::EndOfTlv {
            schema: self.schema.name,
            field: self.field_name(tag),
        })
    }

    pub fn get_unsigned(&self, tag: u8) -> Result<u64> {
        let element = self.get(tag)?;
        element
            .as_unsigned()
            .ok_or_else(|| self.wrong_type(tag, TlvType::UnsignedInteger, &element))
    }

    pub fn get_u8(&self, tag: u8) -> Result<u8> {
        let value = self.get_unsigned(tag)?;
        u8::try_from(value).map_err(|_| self.out_of_range(tag))
    }

    pub fn get_u16(&self, tag: u8) -> Result<u16> {
        let value = self.get_unsigned(tag)?;
        u16::try_from(value).map_err(|_| self.out_of_range(tag))
    }

    pub fn get_u32(&self, tag: u8) -> Result<u32> {
        let value = self.get_unsigned(tag)?;
        u32::try_from(value).map_err(|_| self.out_of_range(tag))
    }

    pub fn get_u64(&self, tag: u8) -> Result<u64> {
        self.get_unsigned(tag)
    }

    pub fn get_signed(&self, tag: u8) -> Result<i64> {
        let element = self.get(tag)?;
        element
            .as_signed()
            .ok_or_else(|| self.wrong_type(tag, TlvType::SignedInteger, &element))
    }

    pub fn get_bool(&self, tag: u8) -> Result<bool> {
        let element = self.get(tag)?;
        element
            .as_bool()
            .ok_or_else(|| self.wrong_type(tag, TlvType::Boolean, &element))
    }

    /// Single-precision value; a double is not narrowed.
    pub fn get_f32(&self, tag: u8) -> Result<f32> {
        let element = self.get(tag)?;
        match element.value {
            Value::F32(value) => Ok(value),
            _ => Err(self.wrong_type(tag, TlvType::FloatingPoint, &element)),
        }
    }

    pub fn get_f64(&self, tag: u8) -> Result<f64> {
        let element = self.get(tag)?;
        match element.value {
            Value::F32(value) => Ok(f64::from(value)),
            Value::F64(value) => Ok(value),
            _ => Err(self.wrong_type(tag, TlvType::FloatingPoint, &element)),
        }
    }

    pub fn get_str(&self, tag: u8) -> Result<&'a str> {
        let element = self.get(tag)?;
        element
            .as_str()
            .ok_or_else(|| self.wrong_type(tag, TlvType::Utf8String, &element))
    }

    pub fn get_bytes(&self, tag: u8) -> Result<&'a [u8]> {
        let element = self.get(tag)?;
        element
            .as_bytes()
            .ok_or_else(|| self.wrong_type(tag, TlvType::ByteString, &element))
    }

    /// True if the field is present and carries null.
    pub fn is_null(&self, tag: u8) -> Result<bool> {
        Ok(self.get(tag)?.is_null())
    }

    /// Parser for the nested container at `tag`.
    pub fn get_child(&self, tag: u8, schema: &'static Schema) -> Result<Parser<'a>> {
        let element = self.get(tag)?;
        Parser::new(schema, &element).map_err(|err| match err {
            CodecError::WrongTlvType {
                expected, found, ..
            } => CodecError::WrongTlvType {
                schema: self.schema.name,
                field: self.field_name(tag),
                expected,
                found,
            },
            other => other,
        })
    }

    /// Element cursor over the collection at `tag`.
    pub fn get_list(&self, tag: u8, schema: &'static Schema) -> Result<ListParser<'a>> {
        Ok(self.get_child(tag, schema)?.elements())
    }

    /// Forward-only cursor over this container's elements.
    pub fn elements(&self) -> ListParser<'a> {
        ListParser {
            schema: self.schema,
            reader: self.container.reader(),
        }
    }

    fn field_name(&self, tag: u8) -> &'static str {
        self.schema
            .field_by_tag(tag)
            .map_or("unknown", |(_, field)| field.name)
    }

    fn wrong_type(&self, tag: u8, expected: TlvType, element: &Element<'_>) -> CodecError {
        CodecError::WrongTlvType {
            schema: self.schema.name,
            field: self.field_name(tag),
            expected: expected.as_str(),
            found: element.tlv_type(),
        }
    }

    fn out_of_range(&self, tag: u8) -> CodecError {
        CodecError::IntegerOutOfRange {
            schema: self.schema.name,
            field: self.field_name(tag),
        }
    }
}

/// Forward-only, single-pass cursor over the elements of a collection.
///
/// Elements come back in wire order; there is no rewind.
#[derive(Debug, Clone)]
pub struct ListParser<'a> {
    schema: &'static Schema,
    reader: TlvReader<'a>,
}

impl<'a> ListParser<'a> {
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Next element, or `None` after the last one.
    pub fn next_element(&mut self) -> Result<Option<Element<'a>>> {
        self.reader
            .next_element()
            .map_err(|source| CodecError::Decoding {
                context: self.schema.name,
                source,
            })
    }

    /// Next element bound to the collection's element schema.
    pub fn next_parser(&mut self) -> Result<Option<Parser<'a>>> {
        let Some(element) = self.next_element()? else {
            return Ok(None);
        };
        match self.schema.element_kind().and_then(|kind| kind.nested_schema()) {
            Some(schema) => Parser::new(schema, &element).map(Some),
            None => Err(CodecError::WrongTlvType {
                schema: self.schema.name,
                field: "element",
                expected: "container",
                found: element.tlv_type(),
            }),
        }
    }
}

impl<'a> IntoIterator for ListParser<'a> {
    type Item = Result<Element<'a>>;
    type IntoIter = Elements<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Elements {
            list: self,
            done: false,
        }
    }
}

/// Consuming iterator over a [`ListParser`]. Ends after the first error.
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    list: ListParser<'a>,
    done: bool,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Result<Element<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.list.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use imtlv_schema::{Field, FieldKind, SchemaError};
    use imtlv_stream::{ContainerType, TlvError, TlvWriter};

    use super::*;
    use crate::builder::Builder;
    use crate::encoder::Encoder;

    static READING_FIELDS: [Field; 6] = [
        Field::mandatory("Id", 0, FieldKind::Unsigned),
        Field::optional("Offset", 1, FieldKind::Signed),
        Field::optional("Label", 2, FieldKind::Utf8).nullable(),
        Field::optional("Ratio", 3, FieldKind::Float),
        Field::optional("Raw", 4, FieldKind::Bytes),
        Field::optional("Valid", 5, FieldKind::Bool),
    ];
    static READING: Schema = Schema::structure("Reading", &READING_FIELDS);
    static READINGS: Schema = Schema::array_of("Readings", FieldKind::Nested(&READING));
    static BATCH_FIELDS: [Field; 1] = [Field::mandatory(
        "Readings",
        0,
        FieldKind::Nested(&READINGS),
    )];
    static BATCH: Schema = Schema::structure("Batch", &BATCH_FIELDS).open();

    fn batch(ids: &[u64]) -> Vec<u8> {
        let mut encoder = Encoder::new();
        let mut batch = Builder::open(&mut encoder, &BATCH, Tag::Anonymous);
        {
            let mut readings = batch.create_child(0, &READINGS);
            for id in ids {
                let mut reading = readings.create_element(&READING);
                reading
                    .put_unsigned(0, *id)
                    .put_signed(1, -(*id as i64))
                    .put_str(2, "sensor")
                    .put_f32(3, 0.5)
                    .put_bytes(4, &[0xAB, 0xCD])
                    .put_bool(5, true);
                reading.end().unwrap();
            }
            readings.end().unwrap();
        }
        batch.end().unwrap();
        encoder.finish().unwrap().to_vec()
    }

    fn raw_reading(build: impl FnOnce(&mut TlvWriter)) -> Vec<u8> {
        let mut w = TlvWriter::new();
        w.start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        build(&mut w);
        w.end_container(ContainerType::Structure).unwrap();
        w.finish().unwrap().to_vec()
    }

    #[test]
    fn typed_accessors() {
        let bytes = batch(&[300]);
        let parser = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap();
        parser.check_schema_validity().unwrap();

        let mut readings = parser.get_list(0, &READINGS).unwrap();
        let reading = readings.next_parser().unwrap().unwrap();
        assert_eq!(reading.get_u16(0).unwrap(), 300);
        assert_eq!(reading.get_u64(0).unwrap(), 300);
        assert_eq!(reading.get_signed(1).unwrap(), -300);
        assert_eq!(reading.get_str(2).unwrap(), "sensor");
        assert_eq!(reading.get_f32(3).unwrap(), 0.5);
        assert_eq!(reading.get_f64(3).unwrap(), 0.5);
        assert_eq!(reading.get_bytes(4).unwrap(), &[0xAB, 0xCD]);
        assert!(reading.get_bool(5).unwrap());
        assert!(!reading.is_null(2).unwrap());
        assert!(readings.next_parser().unwrap().is_none());
    }

    #[test]
    fn integer_width_is_checked() {
        let bytes = batch(&[300]);
        let parser = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap();
        let reading = parser
            .get_list(0, &READINGS)
            .unwrap()
            .next_parser()
            .unwrap()
            .unwrap();
        assert_eq!(
            reading.get_u8(0),
            Err(CodecError::IntegerOutOfRange {
                schema: "Reading",
                field: "Id"
            })
        );
    }

    #[test]
    fn missing_field_is_end_of_tlv() {
        let bytes = raw_reading(|w| {
            w.put_signed(Tag::Context(1), 4).unwrap();
        });
        let parser = Parser::from_message(&READING, &bytes, TlvConfig::default()).unwrap();
        let err = parser.get_unsigned(0).unwrap_err();
        assert!(err.is_end_of_tlv());
        assert_eq!(
            parser.check_schema_validity(),
            Err(CodecError::Schema(SchemaError::MissingMandatoryField {
                schema: "Reading",
                field: "Id"
            }))
        );
    }

    #[test]
    fn wrong_type_is_reported_with_field_name() {
        let bytes = raw_reading(|w| {
            w.put_str(Tag::Context(0), "seven").unwrap();
        });
        let parser = Parser::from_message(&READING, &bytes, TlvConfig::default()).unwrap();
        assert_eq!(
            parser.get_unsigned(0),
            Err(CodecError::WrongTlvType {
                schema: "Reading",
                field: "Id",
                expected: "unsigned integer",
                found: TlvType::Utf8String,
            })
        );
    }

    #[test]
    fn duplicate_tag_first_occurrence_wins() {
        let bytes = raw_reading(|w| {
            w.put_unsigned(Tag::Context(0), 1).unwrap();
            w.put_unsigned(Tag::Context(0), 2).unwrap();
        });
        let parser = Parser::from_message(&READING, &bytes, TlvConfig::default()).unwrap();
        assert_eq!(parser.get_unsigned(0).unwrap(), 1);
        assert_eq!(
            parser.check_schema_validity(),
            Err(CodecError::Schema(SchemaError::DuplicateTag {
                schema: "Reading",
                tag: Tag::Context(0)
            }))
        );
    }

    #[test]
    fn validity_check_is_idempotent() {
        let bytes = batch(&[1, 2]);
        let parser = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap();
        assert_eq!(parser.check_schema_validity(), Ok(()));
        assert_eq!(parser.check_schema_validity(), Ok(()));
    }

    #[test]
    fn elements_preserve_order_and_stop() {
        let ids = [5, 1, 4, 2, 3];
        let bytes = batch(&ids);
        let parser = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap();
        let readings = parser.get_list(0, &READINGS).unwrap();

        let mut seen = Vec::new();
        for element in readings.clone() {
            let reading = Parser::new(&READING, &element.unwrap()).unwrap();
            seen.push(reading.get_unsigned(0).unwrap());
        }
        assert_eq!(seen, ids);

        let mut cursor = readings;
        for _ in 0..ids.len() {
            assert!(cursor.next_element().unwrap().is_some());
        }
        assert!(cursor.next_element().unwrap().is_none());
        assert!(cursor.next_element().unwrap().is_none());
    }

    #[test]
    fn wrong_container_kind_is_rejected() {
        let mut w = TlvWriter::new();
        w.start_container(Tag::Anonymous, ContainerType::Array)
            .unwrap();
        w.end_container(ContainerType::Array).unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(
            Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap_err(),
            CodecError::WrongTlvType {
                schema: "Batch",
                field: "container",
                expected: "structure",
                found: TlvType::Array,
            }
        );
    }

    #[test]
    fn nested_kind_mismatch_names_the_field() {
        let bytes = raw_reading(|w| {
            w.put_unsigned(Tag::Context(0), 1).unwrap();
        });
        let parser = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap();
        assert!(matches!(
            parser.get_child(0, &READINGS),
            Err(CodecError::WrongTlvType {
                schema: "Batch",
                field: "Readings",
                found: TlvType::UnsignedInteger,
                ..
            })
        ));
    }

    #[test]
    fn corrupt_message_fails_hard() {
        let mut bytes = batch(&[1]);
        bytes.truncate(bytes.len() - 2);
        let err = Parser::from_message(&BATCH, &bytes, TlvConfig::default()).unwrap_err();
        assert!(err.is_corrupt());
        assert!(matches!(
            err,
            CodecError::Decoding {
                source: TlvError::Underrun { .. },
                ..
            }
        ));
    }
}
