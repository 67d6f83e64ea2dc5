use std::fs;

use imtlv_messages::SchemaRegistry;
use serde_json::Value;
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, message_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat, registry: &SchemaRegistry) -> CliResult<i32> {
    let model = resolve_model(&args)?;
    let bytes = registry
        .encode(&args.message, &model)
        .map_err(|err| message_error("encode failed", err))?;
    debug!(message = %args.message, size = bytes.len(), "encoded message");

    print_encoded(&args.message, &bytes, format);
    Ok(SUCCESS)
}

fn resolve_model(args: &EncodeArgs) -> CliResult<Value> {
    let (source, text) = match (&args.json, &args.file) {
        (Some(json), _) => ("--json", json.clone()),
        (None, Some(path)) => (
            "--file",
            fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        ),
        (None, None) => return Err(CliError::new(USAGE, "one of --json or --file is required")),
    };
    serde_json::from_str(&text)
        .map_err(|err| CliError::new(USAGE, format!("{source} is not valid JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_is_usage_error() {
        let args = EncodeArgs {
            message: "status".to_string(),
            json: Some("{not json".to_string()),
            file: None,
        };
        let err = resolve_model(&args).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("--json is not valid JSON"));
    }
}
