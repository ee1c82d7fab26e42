//! Subcommand implementations.
//!
//! Each command returns the text it would print so it can be tested without
//! capturing stdout.

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bitmark_protocol::config::{Network, SdkConfig};
use bitmark_protocol::crypto::hash::{sha3_256_pair, sha3_512_pair};
use bitmark_protocol::crypto::keys::KeyPair;
use bitmark_protocol::crypto::merkle::build_tree;
use bitmark_protocol::identity::Address;
use bitmark_protocol::transaction::{
    compute_fingerprint, compute_merkle_fingerprint, AssetStatus, ExtraInfo, GrantResponse,
    Issuance, Link, OfferRecord, Registration, RequestHeaders, Share, ShareGrantRecord,
    ShareGranting, SignableParams, SystemClock, Transfer, TransferOffer, TransferResponse,
};

use crate::cli::{
    ActionArg, AddressArgs, FingerprintArgs, GrantArgs, IssueArgs, MerkleArgs, MerkleHash,
    RegisterArgs, RespondArgs, ShareArgs, TransferArgs,
};

/// Hex length of a bare 32-byte seed.
const SEED_HEX_LENGTH: usize = 64;

/// Loads the signing key from `--private-key` / `BITMARK_PRIVATE_KEY`.
pub fn load_keypair(private_key: Option<&str>) -> Result<KeyPair> {
    let hex_key = private_key
        .map(str::trim)
        .ok_or_else(|| anyhow!("no signing key: pass --private-key or set BITMARK_PRIVATE_KEY"))?;
    let keypair = if hex_key.len() == SEED_HEX_LENGTH {
        KeyPair::from_seed_hex(hex_key)
    } else {
        KeyPair::from_private_key_hex(hex_key)
    };
    keypair.context("invalid signing key")
}

/// Parses repeated `key=value` arguments.
pub fn parse_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got {pair:?}"))
        })
        .collect()
}

fn read_files(files: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    files
        .iter()
        .map(|path| fs::read(path).with_context(|| format!("failed to read {}", path.display())))
        .collect()
}

fn parse_account(account: &str, network: Network) -> Result<Address> {
    Address::from_account_number_on(account, network)
        .with_context(|| format!("invalid account number {account}"))
}

fn to_pretty(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to render output")
}

pub fn keygen(network: Network) -> Result<String> {
    let keypair = KeyPair::generate();
    tracing::info!(%network, "generated account key");
    to_pretty(&json!({
        "account": keypair.address(network).to_string(),
        "public_key": keypair.public_key().to_hex(),
        "private_key": hex::encode(keypair.private_key_bytes()),
    }))
}

pub fn address(args: &AddressArgs) -> Result<String> {
    let address: Address = args
        .account
        .parse()
        .with_context(|| format!("invalid account number {}", args.account))?;
    to_pretty(&json!({
        "account": address.to_string(),
        "network": address.network().as_str(),
        "public_key": address.public_key().to_hex(),
        "key_variant": address.key_variant(),
    }))
}

pub fn fingerprint(args: &FingerprintArgs) -> Result<String> {
    let contents = read_files(&args.files)?;
    match contents.as_slice() {
        [single] => Ok(compute_fingerprint(single)),
        parts => Ok(compute_merkle_fingerprint(parts)?),
    }
}

pub fn merkle(args: &MerkleArgs) -> Result<String> {
    let leaves = args
        .leaves
        .iter()
        .map(|leaf| hex::decode(leaf).with_context(|| format!("leaf {leaf:?} is not hex")))
        .collect::<Result<Vec<_>>>()?;
    let combine: fn(&[u8], &[u8]) -> Vec<u8> = match args.hash {
        MerkleHash::Sha3_256 => sha3_256_pair,
        MerkleHash::Sha3_512 => sha3_512_pair,
    };
    let tree = build_tree(&leaves, combine)?;
    tracing::debug!(leaves = leaves.len(), nodes = tree.len(), "merkle tree built");

    if args.tree {
        Ok(tree.iter().map(hex::encode).collect::<Vec<_>>().join("\n"))
    } else {
        tree.last()
            .map(hex::encode)
            .ok_or_else(|| anyhow!("merkle tree came back empty"))
    }
}

pub fn register(config: &SdkConfig, keypair: &KeyPair, args: &RegisterArgs) -> Result<String> {
    let metadata = parse_pairs(&args.metadata)?;
    let mut registration = Registration::new(config, args.name.as_str(), metadata)?;
    let contents = read_files(&args.files)?;
    match contents.as_slice() {
        [single] => registration.set_fingerprint_from_data(single)?,
        parts => registration.set_fingerprint_from_parts(parts)?,
    };
    registration.sign(keypair)?;
    Ok(registration.to_json()?)
}

pub fn issue(network: Network, keypair: &KeyPair, args: &IssueArgs) -> Result<String> {
    let owner = match &args.owner {
        Some(account) => parse_account(account, network)?,
        None => keypair.address(network),
    };
    let status = if args.pending {
        AssetStatus::Pending
    } else {
        AssetStatus::Confirmed
    };
    let mut issuance = Issuance::new(&args.asset_id, owner, args.quantity)?;
    issuance.generate_nonces(status)?;
    issuance.sign(keypair)?;
    Ok(issuance.to_json()?)
}

pub fn transfer(network: Network, keypair: &KeyPair, args: &TransferArgs) -> Result<String> {
    let link = Link::from_hex(&args.link)?;
    let owner = parse_account(&args.to, network)?;
    if args.offer {
        let extra: ExtraInfo = parse_pairs(&args.extra_info)?;
        let mut offer = TransferOffer::new(link, owner).with_extra_info(extra);
        offer.sign(keypair)?;
        Ok(offer.to_json()?)
    } else {
        let mut transfer = Transfer::new(link, owner);
        transfer.sign(keypair)?;
        Ok(transfer.to_json()?)
    }
}

pub fn share(keypair: &KeyPair, args: &ShareArgs) -> Result<String> {
    let mut share = Share::new(Link::from_hex(&args.link)?, args.quantity)?;
    share.sign(keypair)?;
    Ok(share.to_json()?)
}

pub fn grant(network: Network, keypair: &KeyPair, args: &GrantArgs) -> Result<String> {
    let share_id = Link::from_hex(&args.share_id)?;
    let receiver = parse_account(&args.to, network)?;
    let mut grant = ShareGranting::new(
        share_id,
        args.quantity,
        keypair.address(network),
        receiver,
        args.before_block,
    )?;
    grant.sign(keypair)?;
    Ok(grant.to_json()?)
}

fn read_record<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("malformed {what} record"))
}

fn check_requester(requester: Address, keypair: &KeyPair, network: Network) -> Result<()> {
    if requester != keypair.address(network) {
        bail!("signing key does not belong to the requester {requester}");
    }
    Ok(())
}

fn response_output(body: &str, headers: &RequestHeaders) -> Result<String> {
    let body: serde_json::Value = serde_json::from_str(body)?;
    let headers: serde_json::Map<String, serde_json::Value> = headers
        .to_pairs()
        .into_iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
        .collect();
    to_pretty(&json!({ "body": body, "headers": headers }))
}

/// Answers an offer (`--offer`) or a share grant (`--grant`).
pub fn respond(network: Network, keypair: &KeyPair, args: &RespondArgs) -> Result<String> {
    match (&args.offer, &args.grant) {
        (Some(path), None) => respond_to_offer(network, keypair, path, args.action),
        (None, Some(path)) => respond_to_grant(network, keypair, path, args.action),
        _ => bail!("pass exactly one of --offer or --grant"),
    }
}

fn respond_to_offer(
    network: Network,
    keypair: &KeyPair,
    path: &Path,
    action: ActionArg,
) -> Result<String> {
    let offer: OfferRecord = read_record(path, "offer")?;
    let mut response = match action {
        ActionArg::Accept => TransferResponse::accept(offer)?,
        ActionArg::Reject => TransferResponse::reject(offer)?,
        ActionArg::Cancel => TransferResponse::cancel(offer, keypair.address(network))?,
    };
    check_requester(response.requester(), keypair, network)?;
    if action == ActionArg::Accept {
        response.sign(keypair)?;
    }
    let headers = response.headers(Some(keypair), &SystemClock)?;
    response_output(&response.to_json()?, &headers)
}

fn respond_to_grant(
    network: Network,
    keypair: &KeyPair,
    path: &Path,
    action: ActionArg,
) -> Result<String> {
    let grant: ShareGrantRecord = read_record(path, "grant")?;
    let mut response = match action {
        ActionArg::Accept => GrantResponse::accept(grant)?,
        ActionArg::Reject => GrantResponse::reject(grant)?,
        ActionArg::Cancel => GrantResponse::cancel(grant)?,
    };
    check_requester(response.requester(), keypair, network)?;
    if action == ActionArg::Accept {
        response.sign(keypair)?;
    }
    let headers = response.headers(Some(keypair), &SystemClock)?;
    response_output(&response.to_json()?, &headers)
}
