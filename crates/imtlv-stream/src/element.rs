use std::fmt;

use crate::config::TlvConfig;
use crate::reader::TlvReader;
use crate::tag::Tag;

// Element type codes (lower 5 bits of the control byte).
pub(crate) const TYPE_INT_1: u8 = 0x00;
pub(crate) const TYPE_INT_8: u8 = 0x03;
pub(crate) const TYPE_UINT_1: u8 = 0x04;
pub(crate) const TYPE_UINT_8: u8 = 0x07;
pub(crate) const TYPE_BOOL_FALSE: u8 = 0x08;
pub(crate) const TYPE_BOOL_TRUE: u8 = 0x09;
pub(crate) const TYPE_FLOAT_4: u8 = 0x0A;
pub(crate) const TYPE_FLOAT_8: u8 = 0x0B;
pub(crate) const TYPE_UTF8_L1: u8 = 0x0C;
pub(crate) const TYPE_UTF8_L8: u8 = 0x0F;
pub(crate) const TYPE_BYTES_L1: u8 = 0x10;
pub(crate) const TYPE_BYTES_L8: u8 = 0x13;
pub(crate) const TYPE_NULL: u8 = 0x14;
pub(crate) const TYPE_STRUCTURE: u8 = 0x15;
pub(crate) const TYPE_ARRAY: u8 = 0x16;
pub(crate) const TYPE_LIST: u8 = 0x17;
pub(crate) const TYPE_END_OF_CONTAINER: u8 = 0x18;

pub(crate) const TYPE_MASK: u8 = 0x1F;

/// The three structural container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    /// Heterogeneous, tag-addressed fields.
    Structure,
    /// Homogeneous, positional elements with anonymous tags.
    Array,
    /// Order-significant elements.
    List,
}

impl ContainerType {
    pub(crate) fn type_code(self) -> u8 {
        match self {
            ContainerType::Structure => TYPE_STRUCTURE,
            ContainerType::Array => TYPE_ARRAY,
            ContainerType::List => TYPE_LIST,
        }
    }

    pub fn tlv_type(self) -> TlvType {
        match self {
            ContainerType::Structure => TlvType::Structure,
            ContainerType::Array => TlvType::Array,
            ContainerType::List => TlvType::List,
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tlv_type().fmt(f)
    }
}

/// Logical type of an element, independent of its encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlvType {
    SignedInteger,
    UnsignedInteger,
    Boolean,
    FloatingPoint,
    Utf8String,
    ByteString,
    Null,
    Structure,
    Array,
    List,
}

impl TlvType {
    pub fn as_str(self) -> &'static str {
        match self {
            TlvType::SignedInteger => "signed integer",
            TlvType::UnsignedInteger => "unsigned integer",
            TlvType::Boolean => "boolean",
            TlvType::FloatingPoint => "floating point",
            TlvType::Utf8String => "utf-8 string",
            TlvType::ByteString => "byte string",
            TlvType::Null => "null",
            TlvType::Structure => "structure",
            TlvType::Array => "array",
            TlvType::List => "list",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, TlvType::Structure | TlvType::Array | TlvType::List)
    }
}

impl fmt::Display for TlvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed view of a container's contents (without the end marker).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container<'a> {
    kind: ContainerType,
    contents: &'a [u8],
    depth: usize,
    config: TlvConfig,
}

impl<'a> Container<'a> {
    pub(crate) fn new(
        kind: ContainerType,
        contents: &'a [u8],
        depth: usize,
        config: TlvConfig,
    ) -> Self {
        Self {
            kind,
            contents,
            depth,
            config,
        }
    }

    pub fn kind(&self) -> ContainerType {
        self.kind
    }

    /// Encoded bytes of the member elements.
    pub fn contents(&self) -> &'a [u8] {
        self.contents
    }

    /// Nesting depth of this container (top-level container is 1).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// A fresh reader positioned before the first member element.
    pub fn reader(&self) -> TlvReader<'a> {
        TlvReader::nested(self.contents, self.depth, self.config)
    }
}

/// Decoded value of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
    Utf8(&'a str),
    Bytes(&'a [u8]),
    Null,
    Container(Container<'a>),
}

impl Value<'_> {
    pub fn tlv_type(&self) -> TlvType {
        match self {
            Value::Signed(_) => TlvType::SignedInteger,
            Value::Unsigned(_) => TlvType::UnsignedInteger,
            Value::Bool(_) => TlvType::Boolean,
            Value::F32(_) | Value::F64(_) => TlvType::FloatingPoint,
            Value::Utf8(_) => TlvType::Utf8String,
            Value::Bytes(_) => TlvType::ByteString,
            Value::Null => TlvType::Null,
            Value::Container(c) => c.kind().tlv_type(),
        }
    }
}

/// A single tagged element read from a TLV stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element<'a> {
    pub tag: Tag,
    pub value: Value<'a>,
}

impl<'a> Element<'a> {
    pub fn tlv_type(&self) -> TlvType {
        self.value.tlv_type()
    }

    pub fn as_container(&self) -> Option<Container<'a>> {
        match self.value {
            Value::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u64> {
        match self.value {
            Value::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i64> {
        match self.value {
            Value::Signed(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self.value {
            Value::Utf8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.value {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }
}
