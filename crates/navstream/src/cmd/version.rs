use navstream_frame::{DEFAULT_HEADER, SCHEMA_VERSION};
use navstream_pipeline::DEFAULT_QUEUE_CAPACITY;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("navstream {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: navstream");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("NAVSTREAM_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("NAVSTREAM_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("schema_version: {SCHEMA_VERSION}");
    println!("default_header: {DEFAULT_HEADER}");
    #[cfg(unix)]
    println!("default_baud: {}", navstream_transport::DEFAULT_BAUD_RATE);
    println!("default_queue_capacity: {DEFAULT_QUEUE_CAPACITY}");

    Ok(SUCCESS)
}
