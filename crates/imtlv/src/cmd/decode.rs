use imtlv_messages::SchemaRegistry;

use crate::cmd::DecodeArgs;
use crate::exit::{message_error, CliResult, SUCCESS};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat, registry: &SchemaRegistry) -> CliResult<i32> {
    let bytes = args.input.read()?;
    let model = registry
        .decode_with(&args.message, &bytes, !args.no_validate)
        .map_err(|err| message_error("decode failed", err))?;

    print_decoded(&model, format);
    Ok(SUCCESS)
}
