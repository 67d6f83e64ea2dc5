use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use imtlv_messages::{RegistryConfig, SchemaRegistry};
use imtlv_stream::TlvConfig;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod dump;
pub mod encode;
pub mod envinfo;
pub mod schemas;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a JSON message model to TLV.
    Encode(EncodeArgs),
    /// Decode a TLV message to its JSON model.
    Decode(DecodeArgs),
    /// Check a TLV message against its schema.
    Validate(ValidateArgs),
    /// Print the element tree of any TLV buffer.
    Dump(DumpArgs),
    /// List registered message schemas, or the fields of one.
    Schemas(SchemasArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat, config: TlvConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format, &registry(config)),
        Command::Decode(args) => decode::run(args, format, &registry(config)),
        Command::Validate(args) => validate::run(args, format, &registry(config)),
        Command::Dump(args) => dump::run(args, format, config),
        Command::Schemas(args) => schemas::run(args, format, &registry(config)),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format, &registry(config)),
    }
}

pub(crate) fn registry(tlv: TlvConfig) -> SchemaRegistry {
    SchemaRegistry::with_config(RegistryConfig {
        tlv,
        ..RegistryConfig::default()
    })
}

/// Message bytes given inline as hex or read from a binary file.
#[derive(Args, Debug)]
pub struct BytesInput {
    /// Message bytes as hex (whitespace is ignored).
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read raw message bytes from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl BytesInput {
    pub fn read(&self) -> CliResult<Vec<u8>> {
        if let Some(text) = &self.hex {
            let digits: String = text.split_whitespace().collect();
            return hex::decode(&digits)
                .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }
        Err(CliError::new(USAGE, "one of --hex or --file is required"))
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message name (see `imtlv schemas`).
    pub message: String,
    /// JSON model of the message.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the JSON model from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Message name (see `imtlv schemas`).
    pub message: String,
    #[command(flatten)]
    pub input: BytesInput,
    /// Skip the schema-validity check before extracting fields.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Message name (see `imtlv schemas`).
    pub message: String,
    #[command(flatten)]
    pub input: BytesInput,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub input: BytesInput,
}

#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Show the fields of one schema.
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
