use imtlv_stream::{Tag, TlvError, TlvType};

/// First schema violation found in a container.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// An element is present but has the wrong primitive or container type.
    #[error("{schema}.{field}: wrong TLV type (expected {expected}, found {found})")]
    WrongTlvType {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
        found: TlvType,
    },

    /// A schema field was observed more than once.
    #[error("{schema}: tag {tag} appears more than once")]
    DuplicateTag { schema: &'static str, tag: Tag },

    /// A mandatory field was never observed.
    #[error("{schema}: mandatory field {field} is missing")]
    MissingMandatoryField {
        schema: &'static str,
        field: &'static str,
    },

    /// A tag the schema does not declare, inside a closed schema.
    #[error("{schema}: unknown tag {tag}")]
    UnknownTag { schema: &'static str, tag: Tag },

    /// The container itself is not well-formed TLV.
    #[error("malformed TLV: {0}")]
    Tlv(#[from] TlvError),
}

impl SchemaError {
    /// Name of the schema the violation was found in, if any.
    pub fn schema(&self) -> Option<&'static str> {
        match self {
            SchemaError::WrongTlvType { schema, .. }
            | SchemaError::DuplicateTag { schema, .. }
            | SchemaError::MissingMandatoryField { schema, .. }
            | SchemaError::UnknownTag { schema, .. } => Some(schema),
            SchemaError::Tlv(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
