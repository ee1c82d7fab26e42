//! # Account Numbers
//!
//! A Bitmark account number is the base58 encoding of
//!
//! ```text
//! varint(key_variant) ‖ public_key(32) ‖ sha3_256(varint(key_variant) ‖ public_key)[..4]
//! ```
//!
//! where `key_variant = (algorithm << 4) | (network << 1) | key_part`. For
//! an Ed25519 public key that is `0x11` on livenet and `0x13` on testnet.
//!
//! Inside signed records an address is packed *without* the checksum but
//! *with* the key variant, so the network is part of every signature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{encode_varint, read_varint};
use crate::config::{
    Network, CHECKSUM_LENGTH, KEY_ALGORITHM_ED25519, KEY_PART_PUBLIC, PUBLIC_KEY_LENGTH,
};
use crate::crypto::hash::sha3_256;
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::AddressError;

/// A public-key account on a specific network.
///
/// Equality covers both the key and the network: the same key on livenet
/// and testnet is two different accounts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    public_key: PublicKey,
    network: Network,
}

impl Address {
    pub fn new(public_key: PublicKey, network: Network) -> Self {
        Self {
            public_key,
            network,
        }
    }

    /// Decodes an account number, taking the network from its key variant.
    pub fn from_account_number(account_number: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(account_number)
            .into_vec()
            .map_err(|_| AddressError::Base58)?;
        let (variant, variant_len) = read_varint(&bytes).map_err(|_| AddressError::KeyVariant)?;

        let expected = variant_len + PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH;
        if bytes.len() != expected {
            return Err(AddressError::Length {
                expected,
                actual: bytes.len(),
            });
        }

        let (body, checksum) = bytes.split_at(variant_len + PUBLIC_KEY_LENGTH);
        if sha3_256(body)[..CHECKSUM_LENGTH] != *checksum {
            return Err(AddressError::Checksum);
        }

        if variant & 0x01 != KEY_PART_PUBLIC {
            return Err(AddressError::NotPublicKey);
        }
        let algorithm = variant >> 4;
        if algorithm != KEY_ALGORITHM_ED25519 {
            return Err(AddressError::UnsupportedAlgorithm(algorithm));
        }
        let network = match (variant >> 1) & 0x01 {
            0 => Network::Livenet,
            _ => Network::Testnet,
        };

        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(&body[variant_len..]);
        Ok(Self::new(PublicKey::from_bytes(key), network))
    }

    /// Decodes an account number and requires it to belong to `network`.
    pub fn from_account_number_on(
        account_number: &str,
        network: Network,
    ) -> Result<Self, AddressError> {
        let address = Self::from_account_number(account_number)?;
        if address.network != network {
            return Err(AddressError::NetworkMismatch {
                expected: network,
                actual: address.network,
            });
        }
        Ok(address)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn key_variant(&self) -> u64 {
        (KEY_ALGORITHM_ED25519 << 4) | (self.network.tag() << 1) | KEY_PART_PUBLIC
    }

    /// `varint(key_variant)`.
    pub fn prefix(&self) -> Vec<u8> {
        encode_varint(self.key_variant())
    }

    /// The form that goes into signed records: prefix and key, no checksum.
    pub fn pack(&self) -> Vec<u8> {
        let mut out = self.prefix();
        out.extend_from_slice(self.public_key.as_bytes());
        out
    }

    /// The base58 account number.
    pub fn account_number(&self) -> String {
        let mut bytes = self.pack();
        let checksum = sha3_256(&bytes);
        bytes.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
        bs58::encode(bytes).into_string()
    }

    pub fn verify_signature(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key.verify(message, signature)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_account_number(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_number())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}, {})", self.network, self.account_number())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.account_number())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_account_number(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    const PRIVATE_KEY: &str = "0246a917d422e596168185cea9943459c09751532c52fe4ddc27b06e2893ef22\
                               58760a01edf5ed4f95bfe977d77a27627cd57a25df5dea885972212c2b1c0e2f";
    const TESTNET_ACCOUNT: &str = "ec6yMcJATX6gjNwvqp8rbc4jNEasoUgbfBBGGyV5NvoJ54NXva";
    const LIVENET_ACCOUNT: &str = "aicctiETcAeR6DY7ga8wxQWu919aPnw2P2xmybh64v2Jpioevx";

    fn keypair() -> KeyPair {
        KeyPair::from_private_key_hex(PRIVATE_KEY).unwrap()
    }

    #[test]
    fn account_number_matches_known_vectors() {
        let kp = keypair();
        assert_eq!(kp.address(Network::Testnet).account_number(), TESTNET_ACCOUNT);
        assert_eq!(kp.address(Network::Livenet).account_number(), LIVENET_ACCOUNT);
    }

    #[test]
    fn decode_recovers_key_and_network() {
        let addr: Address = TESTNET_ACCOUNT.parse().unwrap();
        assert_eq!(addr.network(), Network::Testnet);
        assert_eq!(*addr.public_key(), keypair().public_key());
        assert_eq!(addr.to_string(), TESTNET_ACCOUNT);

        let live = Address::from_account_number(LIVENET_ACCOUNT).unwrap();
        assert_eq!(live.network(), Network::Livenet);
        assert_ne!(live, addr);
    }

    #[test]
    fn pack_is_prefix_then_key() {
        let addr = keypair().address(Network::Testnet);
        let packed = addr.pack();
        assert_eq!(packed.len(), 33);
        assert_eq!(packed[0], 0x13);
        assert_eq!(&packed[1..], keypair().public_key().as_bytes());
        assert_eq!(keypair().address(Network::Livenet).prefix(), vec![0x11]);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut bytes = bs58::decode(TESTNET_ACCOUNT).into_vec().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let corrupted = bs58::encode(bytes).into_string();
        assert_eq!(
            Address::from_account_number(&corrupted),
            Err(AddressError::Checksum)
        );
    }

    #[test]
    fn truncated_account_is_rejected() {
        let bytes = bs58::decode(TESTNET_ACCOUNT).into_vec().unwrap();
        let short = bs58::encode(&bytes[..30]).into_string();
        assert_eq!(
            Address::from_account_number(&short),
            Err(AddressError::Length {
                expected: 37,
                actual: 30
            })
        );
    }

    #[test]
    fn non_base58_is_rejected() {
        assert_eq!(
            Address::from_account_number("0OIl"),
            Err(AddressError::Base58)
        );
    }

    #[test]
    fn private_key_variant_is_rejected() {
        // Same layout, key-part bit cleared.
        let mut body = vec![0x12u8];
        body.extend_from_slice(keypair().public_key().as_bytes());
        let checksum = sha3_256(&body);
        body.extend_from_slice(&checksum[..4]);
        let encoded = bs58::encode(body).into_string();
        assert_eq!(
            Address::from_account_number(&encoded),
            Err(AddressError::NotPublicKey)
        );
    }

    #[test]
    fn network_pinned_decode() {
        assert!(Address::from_account_number_on(TESTNET_ACCOUNT, Network::Testnet).is_ok());
        assert_eq!(
            Address::from_account_number_on(TESTNET_ACCOUNT, Network::Livenet),
            Err(AddressError::NetworkMismatch {
                expected: Network::Livenet,
                actual: Network::Testnet
            })
        );
    }

    #[test]
    fn serde_uses_account_number() {
        let addr = keypair().address(Network::Testnet);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", TESTNET_ACCOUNT));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }

    #[test]
    fn verify_signature_through_address() {
        let kp = keypair();
        let sig = kp.sign(b"owner check");
        assert!(kp.address(Network::Testnet).verify_signature(b"owner check", &sig));
    }
}
