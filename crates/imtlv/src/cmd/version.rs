use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("imtlv {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: imtlv");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: messages={}, cli=true",
        cfg!(feature = "messages")
    );
    println!(
        "limits: max_depth={}, max_encoded_len={}",
        imtlv_stream::DEFAULT_MAX_DEPTH,
        imtlv_stream::DEFAULT_MAX_ENCODED_LEN
    );

    Ok(SUCCESS)
}
