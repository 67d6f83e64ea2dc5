use std::collections::BTreeMap;

use serde::Serialize;

use imtlv_messages::SchemaRegistry;
use imtlv_stream::TlvConfig;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: String,
    target: String,
    rust_version: String,
    git_hash: String,
    platform: PlatformInfo,
    features: Vec<String>,
    limits: LimitsInfo,
    messages: Vec<&'static str>,
    environment: BTreeMap<String, Option<String>>,
}

/// Limits in effect after flags and environment overrides.
#[derive(Serialize)]
struct LimitsInfo {
    max_depth: usize,
    max_encoded_len: usize,
}

impl From<TlvConfig> for LimitsInfo {
    fn from(config: TlvConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_encoded_len: config.max_encoded_len,
        }
    }
}

const ENV_VARS: [&str; 3] = ["IMTLV_MAX_DEPTH", "IMTLV_MAX_SIZE", "RUST_LOG"];

pub fn run(
    _args: EnvinfoArgs,
    format: OutputFormat,
    registry: &SchemaRegistry,
) -> CliResult<i32> {
    let env = ENV_VARS
        .iter()
        .map(|name| (name.to_string(), std::env::var(name).ok()))
        .collect();

    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        rust_version: option_env!("RUSTC_VERSION")
            .unwrap_or("unknown")
            .to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        features: active_features(),
        limits: registry.config().tlv.into(),
        messages: registry.names(),
        environment: env,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("IMTLV_BUILD_TARGET") {
        return target.to_string();
    }

    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "aarch64-apple-darwin".to_string(),
        ("x86_64", "macos") => "x86_64-apple-darwin".to_string(),
        ("aarch64", "linux") => "aarch64-unknown-linux-gnu".to_string(),
        ("x86_64", "linux") => "x86_64-unknown-linux-gnu".to_string(),
        ("x86_64", "windows") => "x86_64-pc-windows-msvc".to_string(),
        (arch, os) => format!("{arch}-unknown-{os}"),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("imtlv environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!("  Rust:       {}", output.rust_version);
            println!("  Git hash:   {}", output.git_hash);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("  Features:   {}", output.features.join(", "));
            println!("\n  Limits:");
            println!("    {:<20} {}", "max depth", output.limits.max_depth);
            println!("    {:<20} {} bytes", "max encoded size", output.limits.max_encoded_len);
            println!("\n  Messages:   {}", output.messages.join(", "));
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<20} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.version),
    }
}

fn active_features() -> Vec<String> {
    let mut features = Vec::new();
    if cfg!(feature = "messages") {
        features.push("messages".to_string());
    }
    if cfg!(feature = "cli") {
        features.push("cli".to_string());
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envinfo_json_lists_limits_and_environment() {
        let mut environment = BTreeMap::new();
        environment.insert("IMTLV_MAX_SIZE".to_string(), Some("512".to_string()));
        let registry = crate::cmd::registry(TlvConfig::with_max_encoded_len(512));
        let out = EnvInfoOutput {
            version: "0.2.1".to_string(),
            target: "a-b-c".to_string(),
            rust_version: "1.85.0".to_string(),
            git_hash: "abc".to_string(),
            platform: PlatformInfo {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
            },
            features: vec!["cli".to_string()],
            limits: registry.config().tlv.into(),
            messages: registry.names(),
            environment,
        };

        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(json["environment"]["IMTLV_MAX_SIZE"], "512");
        assert_eq!(json["limits"]["max_encoded_len"], 512);
        assert_eq!(json["limits"]["max_depth"], 16);
        assert_eq!(json["messages"][0], "write-response");
    }

    #[test]
    fn target_looks_like_triple() {
        let target = target_triple();
        assert!(target.split('-').count() >= 3);
    }
}
