// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bitmark Signer
//!
//! Entry point for the `bitmark` binary. Parses CLI arguments, initializes
//! logging, loads the signing key and dispatches to one subcommand.
//!
//! Key-free subcommands:
//!
//! - `keygen`      — generate a fresh account key
//! - `address`     — decode an account number
//! - `fingerprint` — fingerprint asset content
//! - `merkle`      — build a Merkle tree over hex leaves
//! - `version`     — print build version information
//!
//! Everything else signs with the key from `--private-key` or
//! `BITMARK_PRIVATE_KEY` and prints the wire body on stdout.

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use bitmark_protocol::config::SdkConfig;

use cli::{BitmarkCli, Commands};

fn main() -> Result<()> {
    let cli = BitmarkCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format.into());

    let mut config = SdkConfig::new(cli.network);
    if let Some(token) = &cli.api_token {
        config = config.with_api_token(token.as_str());
    }
    tracing::debug!(network = %cli.network, "configuration loaded");

    let network = cli.network;
    let key = cli.private_key.as_deref();

    let output = match &cli.command {
        Commands::Keygen => commands::keygen(network)?,
        Commands::Address(args) => commands::address(args)?,
        Commands::Fingerprint(args) => commands::fingerprint(args)?,
        Commands::Merkle(args) => commands::merkle(args)?,
        Commands::Register(args) => {
            commands::register(&config, &commands::load_keypair(key)?, args)?
        }
        Commands::Issue(args) => commands::issue(network, &commands::load_keypair(key)?, args)?,
        Commands::Transfer(args) => {
            commands::transfer(network, &commands::load_keypair(key)?, args)?
        }
        Commands::Share(args) => commands::share(&commands::load_keypair(key)?, args)?,
        Commands::Grant(args) => commands::grant(network, &commands::load_keypair(key)?, args)?,
        Commands::Respond(args) => {
            commands::respond(network, &commands::load_keypair(key)?, args)?
        }
        Commands::Version => version(),
    };

    println!("{output}");
    Ok(())
}

fn version() -> String {
    format!(
        "bitmark   {}\nrustc     {}",
        env!("CARGO_PKG_VERSION"),
        rustc_version()
    )
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
