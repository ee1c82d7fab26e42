//! Asset registration and content fingerprints.
//!
//! Canonical record (tag `0x02`):
//!
//! ```text
//! varint(0x02) ‖ str(name) ‖ str(fingerprint) ‖ str(packed metadata) ‖ bytes(pack(registrant))
//! ```
//!
//! Metadata is packed as `key \0 value \0 key \0 value ...` in key order.
//! The registrant is not supplied by the caller: it is the account of
//! whichever key signs, on the configured network.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::params::{render, require_signed, SignableParams};
use super::types::TransactionKind;
use crate::codec::Packer;
use crate::config::{
    Network, SdkConfig, ASSET_NAME_MAX_LENGTH, FINGERPRINT_MERKLE_PREFIX,
    FINGERPRINT_SINGLE_PREFIX, METADATA_MAX_LENGTH, TAG_ASSET_REGISTRATION,
};
use crate::crypto::hash::{sha3_512, sha3_512_pair};
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::merkle::merkle_root;
use crate::crypto::signatures::sign;
use crate::error::{Error, StateError, ValidationError};
use crate::identity::Address;

const SEPARATOR: char = '\u{0}';

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

/// `"01" ‖ hex(sha3_512(data))`.
pub fn compute_fingerprint(data: &[u8]) -> String {
    format!("{}{}", FINGERPRINT_SINGLE_PREFIX, hex::encode(sha3_512(data)))
}

/// Fingerprint over several payloads (for example, the files of one asset).
///
/// Each payload is hashed with SHA3-512, the digests are sorted ascending,
/// and the Merkle root over them (SHA3-512 combine) is emitted as
/// `"02" ‖ base64(root)`. The result does not depend on payload order, and
/// the combine is SHA3-512 whatever the number of payloads.
pub fn compute_merkle_fingerprint<D: AsRef<[u8]>>(parts: &[D]) -> Result<String, ValidationError> {
    let mut digests: Vec<[u8; 64]> = parts.iter().map(|p| sha3_512(p.as_ref())).collect();
    digests.sort_unstable();
    let root = merkle_root(&digests, sha3_512_pair)?;
    Ok(format!("{}{}", FINGERPRINT_MERKLE_PREFIX, BASE64.encode(root)))
}

/// Packs metadata as `k \0 v \0 k \0 v`, keys in lexicographic order.
pub fn pack_metadata(metadata: &BTreeMap<String, String>) -> String {
    let mut packed = String::new();
    for (i, (key, value)) in metadata.iter().enumerate() {
        if i > 0 {
            packed.push(SEPARATOR);
        }
        packed.push_str(key);
        packed.push(SEPARATOR);
        packed.push_str(value);
    }
    packed
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// A request to register an asset.
#[derive(Debug, Clone)]
pub struct Registration {
    name: String,
    metadata: BTreeMap<String, String>,
    fingerprint: Option<String>,
    network: Network,
    registrant: Option<Address>,
    signature: Option<Signature>,
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    assets: [AssetEntry<'a>; 1],
}

#[derive(Serialize)]
struct AssetEntry<'a> {
    fingerprint: &'a str,
    name: &'a str,
    metadata: String,
    registrant: &'a Address,
    signature: &'a Signature,
}

impl Registration {
    /// Validates name and metadata. The fingerprint is supplied afterwards.
    pub fn new(
        config: &SdkConfig,
        name: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "asset name" });
        }
        let chars = name.chars().count();
        if chars > ASSET_NAME_MAX_LENGTH {
            return Err(ValidationError::TooLong {
                field: "asset name",
                max: ASSET_NAME_MAX_LENGTH,
                actual: chars,
            });
        }
        for (key, value) in &metadata {
            if key.is_empty() {
                return Err(ValidationError::Empty {
                    field: "metadata key",
                });
            }
            if key.contains(SEPARATOR) || value.contains(SEPARATOR) {
                return Err(ValidationError::InvalidField {
                    field: "metadata",
                    reason: "keys and values must not contain NUL",
                });
            }
        }
        let packed_len = pack_metadata(&metadata).len();
        if packed_len > METADATA_MAX_LENGTH {
            return Err(ValidationError::TooLong {
                field: "metadata",
                max: METADATA_MAX_LENGTH,
                actual: packed_len,
            });
        }

        Ok(Self {
            name,
            metadata,
            fingerprint: None,
            network: config.network,
            registrant: None,
            signature: None,
        })
    }

    /// Sets a fingerprint computed elsewhere.
    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) -> Result<(), Error> {
        if self.signature.is_some() {
            return Err(StateError::Locked("fingerprint").into());
        }
        let fingerprint = fingerprint.into();
        if fingerprint.is_empty() {
            return Err(ValidationError::Empty {
                field: "fingerprint",
            }
            .into());
        }
        self.fingerprint = Some(fingerprint);
        Ok(())
    }

    /// Fingerprints one payload and stores the result.
    pub fn set_fingerprint_from_data(&mut self, data: &[u8]) -> Result<String, Error> {
        let fingerprint = compute_fingerprint(data);
        self.set_fingerprint(fingerprint.clone())?;
        Ok(fingerprint)
    }

    /// Fingerprints several payloads and stores the result.
    pub fn set_fingerprint_from_parts<D: AsRef<[u8]>>(
        &mut self,
        parts: &[D],
    ) -> Result<String, Error> {
        let fingerprint = compute_merkle_fingerprint(parts)?;
        self.set_fingerprint(fingerprint.clone())?;
        Ok(fingerprint)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// The signer's account, known once signed.
    pub fn registrant(&self) -> Option<&Address> {
        self.registrant.as_ref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The canonical record for a given registrant.
    pub fn canonical_bytes(&self, registrant: &Address) -> Result<Vec<u8>, StateError> {
        let fingerprint = self
            .fingerprint
            .as_deref()
            .ok_or(StateError::MissingField("fingerprint"))?;
        Ok(Packer::tagged(TAG_ASSET_REGISTRATION)
            .string(&self.name)
            .string(fingerprint)
            .string(&pack_metadata(&self.metadata))
            .bytes(&registrant.pack())
            .finish())
    }

    fn wire_body(&self) -> Result<RegistrationBody<'_>, StateError> {
        let kind = self.kind();
        let signature = require_signed(self.signature.as_ref(), kind)?;
        let registrant = require_signed(self.registrant.as_ref(), kind)?;
        let fingerprint = self
            .fingerprint
            .as_deref()
            .ok_or(StateError::MissingField("fingerprint"))?;
        Ok(RegistrationBody {
            assets: [AssetEntry {
                fingerprint,
                name: &self.name,
                metadata: pack_metadata(&self.metadata),
                registrant,
                signature,
            }],
        })
    }
}

impl SignableParams for Registration {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Registration
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let registrant = keypair.address(self.network);
        let message = self.canonical_bytes(&registrant)?;
        let signature = sign(keypair, &message);
        debug!(kind = %self.kind(), signer = %registrant, "registration signed");
        self.registrant = Some(registrant);
        self.signature = Some(signature);
        Ok(())
    }

    fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        let (Some(registrant), Some(signature)) = (&self.registrant, &self.signature) else {
            return false;
        };
        match self.canonical_bytes(registrant) {
            Ok(message) => public_key.verify(&message, signature),
            Err(_) => false,
        }
    }

    fn to_json(&self) -> Result<String, Error> {
        render(&self.wire_body()?)
    }
}
