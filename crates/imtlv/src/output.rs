use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    message: &'a str,
    size: usize,
    hex: String,
}

pub fn print_encoded(message: &str, bytes: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            message,
            size: bytes.len(),
            hex: hex::encode(bytes),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["MESSAGE", "SIZE", "HEX"]);
            table.add_row(vec![
                message.to_string(),
                bytes.len().to_string(),
                hex::encode(bytes),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(bytes)),
        OutputFormat::Raw => print_raw(bytes),
    }
}

pub fn print_decoded(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(value),
        OutputFormat::Pretty => println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            match value.as_object() {
                Some(fields) => {
                    for (key, field) in fields {
                        table.add_row(vec![key.clone(), field.to_string()]);
                    }
                }
                None => {
                    table.add_row(vec!["-".to_string(), value.to_string()]);
                }
            }
            println!("{table}");
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
