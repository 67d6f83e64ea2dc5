use std::fmt;

use imtlv_stream::{ContainerType, TlvType};

/// Whether a field must appear in every well-formed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Optional,
}

/// How a schema treats tags it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extensibility {
    /// Unknown tags are skipped, so newer senders stay readable.
    Open,
    /// Unknown tags are a schema violation.
    Closed,
}

/// Declared type of a field or of the elements of a collection.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Unsigned,
    Signed,
    Bool,
    Float,
    Utf8,
    Bytes,
    Null,
    /// Any element type; nested containers are not validated.
    Any,
    /// A nested container described by its own schema.
    Nested(&'static Schema),
}

impl FieldKind {
    /// True if an element of type `found` satisfies this kind.
    pub fn accepts(self, found: TlvType) -> bool {
        match self {
            FieldKind::Unsigned => found == TlvType::UnsignedInteger,
            FieldKind::Signed => found == TlvType::SignedInteger,
            FieldKind::Bool => found == TlvType::Boolean,
            FieldKind::Float => found == TlvType::FloatingPoint,
            FieldKind::Utf8 => found == TlvType::Utf8String,
            FieldKind::Bytes => found == TlvType::ByteString,
            FieldKind::Null => found == TlvType::Null,
            FieldKind::Any => true,
            FieldKind::Nested(schema) => found == schema.container.tlv_type(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Unsigned => TlvType::UnsignedInteger.as_str(),
            FieldKind::Signed => TlvType::SignedInteger.as_str(),
            FieldKind::Bool => TlvType::Boolean.as_str(),
            FieldKind::Float => TlvType::FloatingPoint.as_str(),
            FieldKind::Utf8 => TlvType::Utf8String.as_str(),
            FieldKind::Bytes => TlvType::ByteString.as_str(),
            FieldKind::Null => TlvType::Null.as_str(),
            FieldKind::Any => "any",
            FieldKind::Nested(schema) => schema.container.tlv_type().as_str(),
        }
    }

    pub fn nested_schema(self) -> Option<&'static Schema> {
        match self {
            FieldKind::Nested(schema) => Some(schema),
            _ => None,
        }
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldKind::Nested(a), FieldKind::Nested(b)) => std::ptr::eq(*a, *b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Nested(schema) => write!(f, "Nested({})", schema.name),
            other => f.write_str(other.describe()),
        }
    }
}

/// One context-tagged field of a structure or tagged list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub tag: u8,
    pub kind: FieldKind,
    pub presence: Presence,
    /// The field may carry null instead of a value of `kind`.
    pub nullable: bool,
}

impl Field {
    pub const fn mandatory(name: &'static str, tag: u8, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            presence: Presence::Mandatory,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, tag: u8, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            presence: Presence::Optional,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub fn is_mandatory(&self) -> bool {
        self.presence == Presence::Mandatory
    }

    pub fn accepts(&self, found: TlvType) -> bool {
        (self.nullable && found == TlvType::Null) || self.kind.accepts(found)
    }
}

/// Member layout of a container.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// Context-tagged fields, in declaration (wire) order.
    Fields(&'static [Field]),
    /// Anonymous elements, all of one kind.
    Elements(FieldKind),
}

/// Static description of one container type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub container: ContainerType,
    pub layout: Layout,
    pub extensibility: Extensibility,
}

impl Schema {
    /// A closed structure of context-tagged fields.
    pub const fn structure(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            container: ContainerType::Structure,
            layout: Layout::Fields(fields),
            extensibility: Extensibility::Closed,
        }
    }

    /// A closed list whose members are context-tagged fields.
    pub const fn tagged_list(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            container: ContainerType::List,
            layout: Layout::Fields(fields),
            extensibility: Extensibility::Closed,
        }
    }

    /// An array of anonymous elements of one kind.
    pub const fn array_of(name: &'static str, element: FieldKind) -> Self {
        Self {
            name,
            container: ContainerType::Array,
            layout: Layout::Elements(element),
            extensibility: Extensibility::Closed,
        }
    }

    /// A list of anonymous elements of one kind.
    pub const fn list_of(name: &'static str, element: FieldKind) -> Self {
        Self {
            name,
            container: ContainerType::List,
            layout: Layout::Elements(element),
            extensibility: Extensibility::Closed,
        }
    }

    /// Mark the schema as tolerant of unknown tags.
    pub const fn open(self) -> Self {
        Self {
            extensibility: Extensibility::Open,
            ..self
        }
    }

    pub fn is_open(&self) -> bool {
        self.extensibility == Extensibility::Open
    }

    /// Declared fields; empty for element collections.
    pub fn fields(&self) -> &'static [Field] {
        match self.layout {
            Layout::Fields(fields) => fields,
            Layout::Elements(_) => &[],
        }
    }

    /// Element kind of a collection schema.
    pub fn element_kind(&self) -> Option<FieldKind> {
        match self.layout {
            Layout::Elements(kind) => Some(kind),
            Layout::Fields(_) => None,
        }
    }

    /// Declaration index and field for a context tag number.
    pub fn field_by_tag(&self, tag: u8) -> Option<(usize, &'static Field)> {
        self.fields()
            .iter()
            .enumerate()
            .find(|(_, field)| field.tag == tag)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&'static Field> {
        self.fields()
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn mandatory_fields(&self) -> impl Iterator<Item = &'static Field> {
        self.fields().iter().filter(|field| field.is_mandatory())
    }
}
