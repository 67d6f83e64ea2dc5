use imtlv_stream::{Container, Element, Tag};
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::schema::{Field, FieldKind, Layout, Schema};
use crate::tag_set::TagSet;

/// Check a container against its schema in one pass.
///
/// Per element: the tag must be declared (unless the schema is open), must
/// not repeat, and must carry the declared type. Nested containers are
/// checked against their own schema. After the scan every mandatory field
/// must have been seen. Stops at the first violation.
pub fn validate_container(schema: &'static Schema, container: &Container<'_>) -> Result<()> {
    if container.kind() != schema.container {
        return Err(SchemaError::WrongTlvType {
            schema: schema.name,
            field: "container",
            expected: schema.container.tlv_type().as_str(),
            found: container.kind().tlv_type(),
        });
    }

    let result = match schema.layout {
        Layout::Fields(fields) => validate_fields(schema, fields, container),
        Layout::Elements(kind) => validate_elements(schema, kind, container),
    };
    if let Err(err) = &result {
        // Nested violations are logged once, by the schema that raised them.
        if err.schema().is_none_or(|name| name == schema.name) {
            debug!(schema = schema.name, depth = container.depth(), %err, "schema check failed");
        }
    }
    result
}

fn validate_fields(
    schema: &'static Schema,
    fields: &'static [Field],
    container: &Container<'_>,
) -> Result<()> {
    let mut seen = TagSet::new();
    let mut reader = container.reader();

    while let Some(element) = reader.next_element()? {
        let declared = element
            .tag
            .context_number()
            .and_then(|n| fields.iter().find(|field| field.tag == n));

        let field = match declared {
            Some(field) => field,
            None if schema.is_open() => {
                trace!(schema = schema.name, tag = %element.tag, "skipping unknown tag");
                continue;
            }
            None => {
                return Err(SchemaError::UnknownTag {
                    schema: schema.name,
                    tag: element.tag,
                })
            }
        };

        if !seen.insert(field.tag) {
            return Err(SchemaError::DuplicateTag {
                schema: schema.name,
                tag: element.tag,
            });
        }

        if !field.accepts(element.tlv_type()) {
            return Err(SchemaError::WrongTlvType {
                schema: schema.name,
                field: field.name,
                expected: field.kind.describe(),
                found: element.tlv_type(),
            });
        }

        validate_nested(field.kind, &element)?;
    }

    if let Some(missing) = fields
        .iter()
        .find(|field| field.is_mandatory() && !seen.contains(field.tag))
    {
        return Err(SchemaError::MissingMandatoryField {
            schema: schema.name,
            field: missing.name,
        });
    }

    Ok(())
}

fn validate_elements(
    schema: &'static Schema,
    kind: FieldKind,
    container: &Container<'_>,
) -> Result<()> {
    let mut reader = container.reader();

    while let Some(element) = reader.next_element()? {
        if element.tag != Tag::Anonymous {
            return Err(SchemaError::UnknownTag {
                schema: schema.name,
                tag: element.tag,
            });
        }
        if !kind.accepts(element.tlv_type()) {
            return Err(SchemaError::WrongTlvType {
                schema: schema.name,
                field: "element",
                expected: kind.describe(),
                found: element.tlv_type(),
            });
        }
        validate_nested(kind, &element)?;
    }

    Ok(())
}

fn validate_nested(kind: FieldKind, element: &Element<'_>) -> Result<()> {
    match (kind.nested_schema(), element.as_container()) {
        (Some(schema), Some(container)) => validate_container(schema, &container),
        // Null in a nullable nested field, or a primitive.
        _ => Ok(()),
    }
}
