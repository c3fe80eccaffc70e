//! ossadm - Object storage administration CLI
//!
//! Manages aliases for S3-compatible services and removes objects,
//! incomplete multipart uploads, and buckets.

mod commands;
mod exit_code;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;
use crate::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Prompts block on stdin, so Ctrl-C is watched from another task
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            std::process::exit(ExitCode::Interrupted.as_i32());
        }
    });

    let code = commands::execute(cli).await;
    std::process::exit(code.as_i32());
}

/// Log to stderr, filtered by `RUST_LOG` or the `--debug` flag
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "ossadm=debug,ossadm_core=debug,ossadm_s3=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}
