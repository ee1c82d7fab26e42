//! # Protocol Configuration & Constants
//!
//! Every magic number the canonical encoding depends on lives here. These
//! values are re-derived independently by the chain's nodes, so changing one
//! of them does not change the protocol, it just breaks every signature we
//! produce.
//!
//! Runtime configuration (which network we talk to, which API token we
//! present) is an explicit [`SdkConfig`] value handed to whoever needs it.
//! There is no process-wide configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 seed length in bytes.
pub const SEED_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Private key length as exchanged with the API: `seed ‖ public key`.
pub const PRIVATE_KEY_LENGTH: usize = 64;

/// Detached Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// SHA-256 and SHA3-256 digest length.
pub const HASH_256_LENGTH: usize = 32;

/// SHA3-512 digest length.
pub const HASH_512_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Account Numbers
// ---------------------------------------------------------------------------

/// Trailing checksum bytes on a base58 account number.
pub const CHECKSUM_LENGTH: usize = 4;

/// Key-part bit marking the encoded key as a public key.
pub const KEY_PART_PUBLIC: u64 = 0x01;

/// Key algorithm code for Ed25519, stored in the high nibble of the key variant.
pub const KEY_ALGORITHM_ED25519: u64 = 0x01;

// ---------------------------------------------------------------------------
// Transaction Tags
// ---------------------------------------------------------------------------

/// Leading varint of every canonical record.
pub const TAG_ASSET_REGISTRATION: u64 = 0x02;
pub const TAG_ISSUANCE: u64 = 0x03;
pub const TAG_TRANSFER: u64 = 0x04;
pub const TAG_TRANSFER_COUNTERSIGNED: u64 = 0x05;
pub const TAG_SHARE: u64 = 0x08;
pub const TAG_SHARE_GRANT: u64 = 0x09;

/// Marker byte written in place of an (unsupported) payment block.
pub const NO_PAYMENT: u8 = 0x00;

// ---------------------------------------------------------------------------
// Field Limits
// ---------------------------------------------------------------------------

/// Links and share ids reference a transaction id, which is a SHA3-256 digest.
pub const LINK_LENGTH: usize = HASH_256_LENGTH;

/// Asset ids are SHA3-512 digests.
pub const ASSET_ID_LENGTH: usize = HASH_512_LENGTH;

/// Maximum asset name length, in characters.
pub const ASSET_NAME_MAX_LENGTH: usize = 64;

/// Maximum packed metadata length, in bytes.
pub const METADATA_MAX_LENGTH: usize = 2048;

/// Most bitmarks one issuance may create. Each unit carries its own nonce
/// and signature.
pub const ISSUANCE_MAX_QUANTITY: u32 = 10_000;

/// A u64 needs at most ten 7-bit groups.
pub const VARINT_MAX_BYTES: usize = 10;

/// Fingerprint prefix for a single hashed payload.
pub const FINGERPRINT_SINGLE_PREFIX: &str = "01";

/// Fingerprint prefix for a Merkle root over several payloads.
pub const FINGERPRINT_MERKLE_PREFIX: &str = "02";

/// Leading token of the message signed for offer/grant request headers.
pub const HEADER_MESSAGE_ACTION: &str = "updateOffer";

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The chain an account number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Livenet,
    Testnet,
}

impl Network {
    /// The single network bit stored inside an account's key variant.
    pub fn tag(self) -> u64 {
        match self {
            Network::Livenet => 0x00,
            Network::Testnet => 0x01,
        }
    }

    pub fn from_tag(tag: u64) -> Result<Self, ValidationError> {
        match tag {
            0x00 => Ok(Network::Livenet),
            0x01 => Ok(Network::Testnet),
            other => Err(ValidationError::UnknownNetwork(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Livenet => "livenet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "livenet" | "live" | "mainnet" => Ok(Network::Livenet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ => Err(ValidationError::InvalidField {
                field: "network",
                reason: "expected livenet or testnet",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SdkConfig
// ---------------------------------------------------------------------------

/// Client configuration, passed explicitly to the components that need it.
#[derive(Clone, PartialEq, Eq)]
pub struct SdkConfig {
    pub network: Network,
    pub api_token: Option<String>,
}

impl SdkConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            api_token: None,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new(Network::Livenet)
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is a credential; only report whether one is set.
        f.debug_struct("SdkConfig")
            .field("network", &self.network)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
