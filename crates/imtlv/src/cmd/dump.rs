use imtlv_stream::{read_message, Element, TlvConfig, TlvError, Value};
use serde::Serialize;

use crate::cmd::DumpArgs;
use crate::exit::{tlv_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct DumpNode {
    depth: usize,
    tag: String,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Serialize)]
struct DumpOutput<'a> {
    size: usize,
    elements: &'a [DumpNode],
}

pub fn run(args: DumpArgs, format: OutputFormat, config: TlvConfig) -> CliResult<i32> {
    let bytes = args.input.read()?;
    let nodes = dump(&bytes, config).map_err(|err| tlv_error("dump failed", err))?;

    match format {
        OutputFormat::Json => print_json(&DumpOutput {
            size: bytes.len(),
            elements: &nodes,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["DEPTH", "TAG", "TYPE", "VALUE"]);
            for node in &nodes {
                table.add_row(vec![
                    node.depth.to_string(),
                    node.tag.clone(),
                    node.kind.to_string(),
                    node.value.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for node in &nodes {
                println!("{}", render_line(node));
            }
        }
    }
    Ok(SUCCESS)
}

/// Flatten the element tree depth-first, parents before children.
fn dump(bytes: &[u8], config: TlvConfig) -> Result<Vec<DumpNode>, TlvError> {
    let top = read_message(bytes, config)?;
    let mut nodes = Vec::new();
    walk(&top, 0, &mut nodes)?;
    Ok(nodes)
}

fn walk(element: &Element<'_>, depth: usize, nodes: &mut Vec<DumpNode>) -> Result<(), TlvError> {
    let value = match element.value {
        Value::Signed(v) => Some(v.to_string()),
        Value::Unsigned(v) => Some(v.to_string()),
        Value::Bool(v) => Some(v.to_string()),
        Value::F32(v) => Some(v.to_string()),
        Value::F64(v) => Some(v.to_string()),
        Value::Utf8(v) => Some(format!("{v:?}")),
        Value::Bytes(v) => Some(hex::encode(v)),
        Value::Null | Value::Container(_) => None,
    };
    nodes.push(DumpNode {
        depth,
        tag: element.tag.to_string(),
        kind: element.tlv_type().as_str(),
        value,
    });

    if let Some(container) = element.as_container() {
        let mut reader = container.reader();
        while let Some(child) = reader.next_element()? {
            walk(&child, depth + 1, nodes)?;
        }
    }
    Ok(())
}

fn render_line(node: &DumpNode) -> String {
    let indent = "  ".repeat(node.depth);
    match &node.value {
        Some(value) => format!("{indent}{} {} = {value}", node.tag, node.kind),
        None => format!("{indent}{} {}", node.tag, node.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_walks_nested_containers() {
        // { 0: [ "on" ], 1: null }
        let bytes = [
            0x15, 0x36, 0x00, 0x0C, 0x02, b'o', b'n', 0x18, 0x34, 0x01, 0x18,
        ];
        let nodes = dump(&bytes, TlvConfig::default()).unwrap();
        let lines: Vec<String> = nodes.iter().map(render_line).collect();
        assert_eq!(
            lines,
            vec![
                "anonymous structure".to_string(),
                "  ctx:0 array".to_string(),
                "    anonymous utf-8 string = \"on\"".to_string(),
                "  ctx:1 null".to_string(),
            ]
        );
    }

    #[test]
    fn dump_rejects_truncated_input() {
        assert!(matches!(
            dump(&[0x15, 0x24, 0x00], TlvConfig::default()),
            Err(TlvError::Underrun { .. })
        ));
    }
}
