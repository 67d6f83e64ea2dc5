use imtlv_messages::SchemaRegistry;
use serde::Serialize;

use crate::cmd::ValidateArgs;
use crate::exit::{message_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct ValidationOutput<'a> {
    message: &'a str,
    schema: &'static str,
    size: usize,
    valid: bool,
}

/// Exit 0 when the message passes its schema check. Schema violations and
/// corrupt input surface as errors with their own exit codes.
pub fn run(args: ValidateArgs, format: OutputFormat, registry: &SchemaRegistry) -> CliResult<i32> {
    let bytes = args.input.read()?;
    let schema = registry
        .schema(&args.message)
        .map_err(|err| message_error("validate failed", err))?;
    registry
        .validate(&args.message, &bytes)
        .map_err(|err| message_error("validate failed", err))?;

    let output = ValidationOutput {
        message: &args.message,
        schema: schema.name,
        size: bytes.len(),
        valid: true,
    };
    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut table = new_table(vec!["MESSAGE", "SCHEMA", "SIZE", "VALID"]);
            table.add_row(vec![
                output.message.to_string(),
                output.schema.to_string(),
                output.size.to_string(),
                output.valid.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!("{}: valid ({} bytes)", output.schema, output.size)
        }
    }
    Ok(SUCCESS)
}
