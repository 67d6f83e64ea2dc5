use imtlv_messages::SchemaRegistry;
use imtlv_schema::{FieldKind, Layout, Schema};
use serde::Serialize;

use crate::cmd::SchemasArgs;
use crate::exit::{message_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct SchemaSummary {
    message: &'static str,
    schema: &'static str,
    container: String,
    extensibility: &'static str,
    fields: usize,
}

#[derive(Debug, Serialize)]
struct FieldRow {
    tag: String,
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    presence: &'static str,
    nullable: bool,
}

pub fn run(args: SchemasArgs, format: OutputFormat, registry: &SchemaRegistry) -> CliResult<i32> {
    match &args.name {
        Some(name) => {
            let schema = registry
                .schema(name)
                .map_err(|err| message_error("schemas failed", err))?;
            print_fields(schema, format);
        }
        None => {
            let mut summaries = Vec::new();
            for message in registry.names() {
                let schema = registry
                    .schema(message)
                    .map_err(|err| message_error("schemas failed", err))?;
                summaries.push(summarize(message, schema));
            }
            print_summaries(&summaries, format);
        }
    }
    Ok(SUCCESS)
}

fn summarize(message: &'static str, schema: &'static Schema) -> SchemaSummary {
    SchemaSummary {
        message,
        schema: schema.name,
        container: schema.container.to_string(),
        extensibility: extensibility(schema),
        fields: schema.fields().len(),
    }
}

fn extensibility(schema: &Schema) -> &'static str {
    if schema.is_open() {
        "open"
    } else {
        "closed"
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Nested(schema) => schema.name,
        other => other.describe(),
    }
}

fn field_rows(schema: &'static Schema) -> Vec<FieldRow> {
    match schema.layout {
        Layout::Fields(fields) => fields
            .iter()
            .map(|field| FieldRow {
                tag: format!("0x{:02X}", field.tag),
                name: field.name,
                kind: kind_name(field.kind),
                presence: if field.is_mandatory() {
                    "mandatory"
                } else {
                    "optional"
                },
                nullable: field.nullable,
            })
            .collect(),
        Layout::Elements(kind) => vec![FieldRow {
            tag: "anonymous".to_string(),
            name: "element",
            kind: kind_name(kind),
            presence: "optional",
            nullable: false,
        }],
    }
}

fn print_summaries(summaries: &[SchemaSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(summaries),
        OutputFormat::Table => {
            let mut table = new_table(vec![
                "MESSAGE",
                "SCHEMA",
                "CONTAINER",
                "EXTENSIBILITY",
                "FIELDS",
            ]);
            for summary in summaries {
                table.add_row(vec![
                    summary.message.to_string(),
                    summary.schema.to_string(),
                    summary.container.clone(),
                    summary.extensibility.to_string(),
                    summary.fields.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for summary in summaries {
                println!("{}", summary.message);
            }
        }
    }
}

fn print_fields(schema: &'static Schema, format: OutputFormat) {
    let rows = field_rows(schema);
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema": schema.name,
            "container": schema.container.to_string(),
            "extensibility": extensibility(schema),
            "fields": rows,
        })),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TAG", "NAME", "TYPE", "PRESENCE", "NULLABLE"]);
            for row in &rows {
                table.add_row(vec![
                    row.tag.clone(),
                    row.name.to_string(),
                    row.kind.to_string(),
                    row.presence.to_string(),
                    row.nullable.to_string(),
                ]);
            }
            println!(
                "{} ({}, {})",
                schema.name,
                schema.container,
                extensibility(schema)
            );
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{} ({}, {})",
                schema.name,
                schema.container,
                extensibility(schema)
            );
            for row in &rows {
                println!("  {} {} {} {}", row.tag, row.name, row.kind, row.presence);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use imtlv_messages::{ATTRIBUTE_PATH_IB, WRITE_RESPONSE_MESSAGE};

    use super::*;

    #[test]
    fn nested_fields_show_schema_name() {
        let rows = field_rows(&WRITE_RESPONSE_MESSAGE);
        assert_eq!(rows[0].kind, "AttributeStatusIBs");
        assert_eq!(rows[0].presence, "mandatory");
        assert_eq!(rows[1].tag, "0xFF");
    }

    #[test]
    fn list_index_is_nullable() {
        let rows = field_rows(&ATTRIBUTE_PATH_IB);
        let list_index = rows.iter().find(|row| row.name == "ListIndex").unwrap();
        assert!(list_index.nullable);
        assert_eq!(extensibility(&ATTRIBUTE_PATH_IB), "closed");
        assert_eq!(extensibility(&WRITE_RESPONSE_MESSAGE), "open");
    }
}
