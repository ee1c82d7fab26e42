//! Issuance of bitmarks for a registered asset.
//!
//! One record is signed per unit, each carrying its own nonce:
//!
//! ```text
//! varint(0x03) ‖ bytes(asset id) ‖ bytes(pack(owner)) ‖ varint(nonce)
//! ```
//!
//! Signing is gated on the nonce set: either supply it at construction with
//! [`Issuance::with_nonces`] or draw it with [`Issuance::generate_nonces`].
//! Once signed the nonce set is locked.

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::Serialize;
use tracing::{debug, trace};

use super::nonce::{check_distinct, check_quantity, generate_nonces_with};
use super::params::{render, require_signed, SignableParams};
use super::types::{AssetId, AssetStatus, TransactionKind};
use crate::codec::Packer;
use crate::config::TAG_ISSUANCE;
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::signatures::sign;
use crate::error::{Error, StateError, ValidationError};
use crate::identity::Address;

/// Issue `quantity` bitmarks of one asset to one owner.
#[derive(Debug, Clone)]
pub struct Issuance {
    asset_id: AssetId,
    owner: Address,
    quantity: u32,
    nonces: Option<Vec<u32>>,
    signatures: Option<Vec<Signature>>,
}

/// Wire body. Singular fields for one unit, arrays for a batch.
#[derive(Serialize)]
#[serde(untagged)]
enum IssuanceBody<'a> {
    Single {
        asset_id: &'a AssetId,
        owner: &'a Address,
        nonce: u32,
        signature: &'a Signature,
    },
    Batch {
        asset_id: &'a AssetId,
        owner: &'a Address,
        nonces: &'a [u32],
        signatures: &'a [Signature],
    },
}

impl Issuance {
    /// An issuance whose nonces are still to be generated.
    pub fn new(asset_id: &str, owner: Address, quantity: u32) -> Result<Self, ValidationError> {
        check_quantity(quantity)?;
        Ok(Self {
            asset_id: AssetId::from_hex(asset_id)?,
            owner,
            quantity,
            nonces: None,
            signatures: None,
        })
    }

    /// An issuance with a caller-chosen nonce set, ready to sign.
    pub fn with_nonces(
        asset_id: &str,
        owner: Address,
        quantity: u32,
        nonces: Vec<u32>,
    ) -> Result<Self, ValidationError> {
        let mut issuance = Self::new(asset_id, owner, quantity)?;
        if nonces.len() != quantity as usize {
            return Err(ValidationError::NonceCountMismatch {
                nonces: nonces.len(),
                quantity: quantity as usize,
            });
        }
        check_distinct(&nonces)?;
        issuance.nonces = Some(nonces);
        Ok(issuance)
    }

    /// Draws the nonce set from the OS RNG.
    pub fn generate_nonces(&mut self, status: AssetStatus) -> Result<&[u32], Error> {
        self.generate_nonces_with(status, &mut OsRng)
    }

    /// Draws the nonce set from `rng`. Replaces an unsigned set.
    pub fn generate_nonces_with<R>(
        &mut self,
        status: AssetStatus,
        rng: &mut R,
    ) -> Result<&[u32], Error>
    where
        R: RngCore + CryptoRng,
    {
        if self.signatures.is_some() {
            return Err(StateError::Locked("nonces").into());
        }
        let nonces = generate_nonces_with(self.quantity, status, rng)?;
        Ok(self.nonces.insert(nonces).as_slice())
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn nonces(&self) -> Option<&[u32]> {
        self.nonces.as_deref()
    }

    pub fn signatures(&self) -> Option<&[Signature]> {
        self.signatures.as_deref()
    }

    /// Whether nonces are in place for signing.
    pub fn is_ready(&self) -> bool {
        self.nonces.is_some()
    }

    /// The canonical record for one nonce.
    pub fn canonical_bytes(&self, nonce: u32) -> Vec<u8> {
        Packer::tagged(TAG_ISSUANCE)
            .bytes(self.asset_id.as_bytes())
            .bytes(&self.owner.pack())
            .varint(u64::from(nonce))
            .finish()
    }

    fn wire_body(&self) -> Result<IssuanceBody<'_>, StateError> {
        let signatures = require_signed(self.signatures.as_deref(), self.kind())?;
        let nonces = self.nonces.as_deref().ok_or(StateError::NoncesNotReady)?;
        Ok(match (nonces, signatures) {
            ([nonce], [signature]) => IssuanceBody::Single {
                asset_id: &self.asset_id,
                owner: &self.owner,
                nonce: *nonce,
                signature,
            },
            _ => IssuanceBody::Batch {
                asset_id: &self.asset_id,
                owner: &self.owner,
                nonces,
                signatures,
            },
        })
    }
}

impl SignableParams for Issuance {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Issuance
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let nonces = self.nonces.as_deref().ok_or(StateError::NoncesNotReady)?;
        let signatures = nonces
            .iter()
            .map(|&nonce| {
                let message = self.canonical_bytes(nonce);
                trace!(nonce, len = message.len(), "issue record packed");
                sign(keypair, &message)
            })
            .collect::<Vec<_>>();
        debug!(
            kind = %self.kind(),
            asset = %self.asset_id,
            count = signatures.len(),
            "issuance signed"
        );
        self.signatures = Some(signatures);
        Ok(())
    }

    fn is_signed(&self) -> bool {
        self.signatures.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        let (Some(nonces), Some(signatures)) = (&self.nonces, &self.signatures) else {
            return false;
        };
        nonces.len() == signatures.len()
            && nonces
                .iter()
                .zip(signatures)
                .all(|(&nonce, sig)| public_key.verify(&self.canonical_bytes(nonce), sig))
    }

    fn to_json(&self) -> Result<String, Error> {
        render(&self.wire_body()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Network, ISSUANCE_MAX_QUANTITY};

    fn asset_id() -> String {
        "3c".repeat(64)
    }

    fn owner() -> Address {
        KeyPair::from_seed(&[1u8; 32]).address(Network::Testnet)
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert_eq!(
            Issuance::new(&asset_id(), owner(), 0).unwrap_err(),
            ValidationError::NonPositive { field: "quantity" }
        );
    }

    #[test]
    fn quantity_above_limit_is_rejected() {
        assert!(matches!(
            Issuance::new(&asset_id(), owner(), ISSUANCE_MAX_QUANTITY + 1),
            Err(ValidationError::TooLarge { field: "quantity", .. })
        ));
    }

    #[test]
    fn short_asset_id_is_rejected() {
        assert!(matches!(
            Issuance::new(&"3c".repeat(32), owner(), 1),
            Err(ValidationError::InvalidLength { field: "asset id", .. })
        ));
    }

    #[test]
    fn supplied_nonces_must_match_quantity() {
        assert_eq!(
            Issuance::with_nonces(&asset_id(), owner(), 3, vec![1, 2]).unwrap_err(),
            ValidationError::NonceCountMismatch {
                nonces: 2,
                quantity: 3
            }
        );
        assert_eq!(
            Issuance::with_nonces(&asset_id(), owner(), 2, vec![4, 4]).unwrap_err(),
            ValidationError::DuplicateNonce(4)
        );
    }

    #[test]
    fn signing_needs_nonces() {
        let mut issuance = Issuance::new(&asset_id(), owner(), 2).unwrap();
        assert!(!issuance.is_ready());
        assert_eq!(
            issuance.sign(&KeyPair::generate()),
            Err(Error::State(StateError::NoncesNotReady))
        );
        assert!(!issuance.is_signed());
    }

    #[test]
    fn one_signature_per_nonce() {
        let kp = KeyPair::generate();
        let mut issuance = Issuance::new(&asset_id(), owner(), 3).unwrap();
        issuance.generate_nonces(AssetStatus::Confirmed).unwrap();
        issuance.sign(&kp).unwrap();

        let nonces = issuance.nonces().unwrap().to_vec();
        let signatures = issuance.signatures().unwrap();
        assert_eq!(nonces.len(), 3);
        assert_eq!(signatures.len(), 3);
        for (nonce, sig) in nonces.iter().zip(signatures) {
            assert!(kp.public_key().verify(&issuance.canonical_bytes(*nonce), sig));
        }
        assert!(issuance.verify(&kp.public_key()));
    }

    #[test]
    fn nonces_lock_once_signed() {
        let mut issuance = Issuance::new(&asset_id(), owner(), 1).unwrap();
        issuance.generate_nonces(AssetStatus::Pending).unwrap();
        issuance.sign(&KeyPair::generate()).unwrap();
        assert_eq!(
            issuance.generate_nonces(AssetStatus::Confirmed).unwrap_err(),
            Error::State(StateError::Locked("nonces"))
        );
        assert_eq!(issuance.nonces(), Some(&[0u32][..]));
    }

    #[test]
    fn unsigned_nonces_can_be_redrawn() {
        let mut issuance = Issuance::new(&asset_id(), owner(), 2).unwrap();
        issuance.generate_nonces(AssetStatus::Pending).unwrap();
        let redrawn = issuance.generate_nonces(AssetStatus::Confirmed).unwrap();
        assert_eq!(redrawn.len(), 2);
    }

    #[test]
    fn canonical_layout() {
        let issuance = Issuance::new(&asset_id(), owner(), 1).unwrap();
        let bytes = issuance.canonical_bytes(300);

        let mut expected = vec![0x03, 64];
        expected.extend_from_slice(&[0x3c; 64]);
        expected.push(33);
        expected.extend_from_slice(&owner().pack());
        expected.extend_from_slice(&[0xac, 0x02]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn single_unit_wire_body_is_singular() {
        let kp = KeyPair::generate();
        let mut issuance = Issuance::with_nonces(&asset_id(), owner(), 1, vec![7]).unwrap();
        assert_eq!(
            issuance.to_json(),
            Err(Error::State(StateError::NotSigned("issuance")))
        );
        issuance.sign(&kp).unwrap();

        let json = issuance.to_json().unwrap();
        let expected = format!(
            "{{\"asset_id\":\"{}\",\"owner\":\"{}\",\"nonce\":7,\"signature\":\"{}\"}}",
            asset_id(),
            owner(),
            issuance.signatures().unwrap()[0]
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn batch_wire_body_uses_arrays() {
        let kp = KeyPair::generate();
        let mut issuance = Issuance::with_nonces(&asset_id(), owner(), 2, vec![5, 9]).unwrap();
        issuance.sign(&kp).unwrap();

        let value: serde_json::Value = serde_json::from_str(&issuance.to_json().unwrap()).unwrap();
        assert_eq!(value["nonces"], serde_json::json!([5, 9]));
        assert_eq!(value["signatures"].as_array().unwrap().len(), 2);
        assert!(value.get("nonce").is_none());
        assert!(value.get("signature").is_none());
    }
}
