//! # CLI Interface
//!
//! Defines the command-line argument structure for `bitmark` using `clap`
//! derive. Global flags select the network, the signing key and the log
//! format; each subcommand builds one kind of artefact and prints it to
//! stdout.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use bitmark_protocol::config::Network;

/// Bitmark transaction signer.
///
/// Builds canonical Bitmark records, signs them with an account key and
/// prints the wire bodies the API expects. Nothing is submitted.
#[derive(Parser, Debug)]
#[command(
    name = "bitmark",
    about = "Bitmark transaction signer",
    version,
    propagate_version = true
)]
pub struct BitmarkCli {
    /// Network the accounts belong to: livenet or testnet.
    #[arg(long, short = 'n', global = true, env = "BITMARK_NETWORK", default_value = "testnet")]
    pub network: Network,

    /// Hex-encoded signing key: a 32-byte seed or a 64-byte `seed ‖ public key`.
    ///
    /// **Prefer the environment variable** so the key stays out of shell history.
    #[arg(long, global = true, env = "BITMARK_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// API token carried in the client configuration.
    #[arg(long, global = true, env = "BITMARK_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Log output format. Logs always go to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "bitmark=info,bitmark_protocol=info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh account key.
    Keygen,
    /// Decode an account number.
    Address(AddressArgs),
    /// Fingerprint one or more files for registration.
    Fingerprint(FingerprintArgs),
    /// Build a Merkle tree over hex leaves.
    Merkle(MerkleArgs),
    /// Register an asset.
    Register(RegisterArgs),
    /// Issue bitmarks of a registered asset.
    Issue(IssueArgs),
    /// Transfer a bitmark, or offer it for acceptance.
    Transfer(TransferArgs),
    /// Split a bitmark into shares.
    Share(ShareArgs),
    /// Grant share units to another account.
    Grant(GrantArgs),
    /// Answer a transfer offer or a share grant listed by the API.
    Respond(RespondArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Base58 account number.
    pub account: String,
}

/// Arguments for the `fingerprint` subcommand.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Files to fingerprint. More than one yields a Merkle fingerprint.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MerkleHash {
    #[value(name = "sha3-256")]
    Sha3_256,
    #[value(name = "sha3-512")]
    Sha3_512,
}

/// Arguments for the `merkle` subcommand.
#[derive(Args, Debug)]
pub struct MerkleArgs {
    /// Hex leaves, all the same length.
    #[arg(required = true)]
    pub leaves: Vec<String>,

    /// Combine function.
    #[arg(long, value_enum, default_value_t = MerkleHash::Sha3_256)]
    pub hash: MerkleHash,

    /// Print every node instead of just the root.
    #[arg(long)]
    pub tree: bool,
}

/// Arguments for the `register` subcommand.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Asset name.
    #[arg(long)]
    pub name: String,

    /// Metadata entry as `key=value`. Repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Asset content to fingerprint.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the `issue` subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Hex asset id (64 bytes).
    #[arg(long)]
    pub asset_id: String,

    /// Number of bitmarks to issue.
    #[arg(long, short = 'q', default_value_t = 1)]
    pub quantity: u32,

    /// Receiving account. Defaults to the signer.
    #[arg(long)]
    pub owner: Option<String>,

    /// The asset is not yet confirmed; the first nonce is 0.
    #[arg(long)]
    pub pending: bool,
}

/// Arguments for the `transfer` subcommand.
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Hex id of the transaction that last moved the bitmark.
    #[arg(long)]
    pub link: String,

    /// New owner's account number.
    #[arg(long)]
    pub to: String,

    /// Build an offer the receiver must accept instead of a direct transfer.
    #[arg(long)]
    pub offer: bool,

    /// Extra info attached to an offer, as `key=value`. Repeatable.
    #[arg(long = "info", value_name = "KEY=VALUE", requires = "offer")]
    pub extra_info: Vec<String>,
}

/// Arguments for the `share` subcommand.
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Hex id of the bitmark's latest transaction.
    #[arg(long)]
    pub link: String,

    /// Number of share units to create.
    #[arg(long, short = 'q')]
    pub quantity: u64,
}

/// Arguments for the `grant` subcommand.
#[derive(Args, Debug)]
pub struct GrantArgs {
    /// Hex share id.
    #[arg(long)]
    pub share_id: String,

    /// Units to grant.
    #[arg(long, short = 'q')]
    pub quantity: u64,

    /// Receiving account number.
    #[arg(long)]
    pub to: String,

    /// Block height the grant expires at.
    #[arg(long)]
    pub before_block: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Accept,
    Reject,
    Cancel,
}

/// Arguments for the `respond` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("record").required(true).args(["offer", "grant"])))]
pub struct RespondArgs {
    /// Offer record JSON as returned by the API.
    #[arg(long)]
    pub offer: Option<PathBuf>,

    /// Share grant record JSON as returned by the API.
    #[arg(long)]
    pub grant: Option<PathBuf>,

    /// How to answer.
    #[arg(long, value_enum)]
    pub action: ActionArg,
}
