mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use imtlv_stream::{TlvConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENCODED_LEN};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "imtlv",
    version,
    about = "Encode, decode and validate Interaction Model TLV messages"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Maximum container nesting depth.
    #[arg(
        long,
        value_name = "N",
        env = "IMTLV_MAX_DEPTH",
        default_value_t = DEFAULT_MAX_DEPTH,
        global = true
    )]
    max_depth: usize,

    /// Maximum encoded message size in bytes.
    #[arg(
        long,
        value_name = "BYTES",
        env = "IMTLV_MAX_SIZE",
        default_value_t = DEFAULT_MAX_ENCODED_LEN,
        global = true
    )]
    max_size: usize,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn tlv_config(&self) -> TlvConfig {
        TlvConfig {
            max_depth: self.max_depth,
            max_encoded_len: self.max_size,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = cli.tlv_config();
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "imtlv",
            "decode",
            "status-response",
            "--hex",
            "1524008618",
            "--no-validate",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert!(args.no_validate);
                assert_eq!(args.input.hex.as_deref(), Some("1524008618"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_input_args() {
        let err = Cli::try_parse_from([
            "imtlv",
            "validate",
            "status",
            "--hex",
            "1518",
            "--file",
            "/tmp/status.tlv",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn limits_flow_into_tlv_config() {
        let cli = Cli::try_parse_from([
            "imtlv",
            "--max-depth",
            "4",
            "--max-size",
            "64",
            "dump",
            "--hex",
            "1518",
        ])
        .expect("dump args should parse");

        assert_eq!(
            cli.tlv_config(),
            TlvConfig {
                max_depth: 4,
                max_encoded_len: 64
            }
        );
    }
}
