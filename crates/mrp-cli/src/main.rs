//! MrP command line client
//!
//! Drives a Mr. Provisioner server from scripts and CI jobs:
//! - net: print an interface's IP, MAC, netmask or network
//! - machine: set provisioning parameters, provision
//! - image / preseed: check for presence, upload if missing
//!
//! Exit codes: 0 success, 1 operation failed, 2 queried thing does not exist.

mod cli;
mod commands;
#[cfg(test)]
mod commands_test;

use clap::Parser;
use cli::Cli;
use commands::Outcome;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `-v` raises the level from warn
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match commands::connect(&cli).await {
        Ok(client) => commands::dispatch(&client, cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(Outcome::Output(text)) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Absent) => {
            println!("False");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
