//! # Key Management
//!
//! Ed25519 key pairs for Bitmark accounts.
//!
//! The API exchanges private keys in the 64-byte `seed ‖ public key` layout.
//! Loading one re-derives the public key from the seed and rejects the pair
//! if the halves disagree, so a corrupted key can never sign anything.
//!
//! Key bytes are never logged and never appear in `Debug` output.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use std::fmt;

use crate::config::{Network, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH};
use crate::error::SigningError;
use crate::identity::Address;

/// An account key pair.
///
/// Parameter objects borrow a `KeyPair` for the duration of a `sign` call.
/// Accepted responses are the one exception: they keep a copy of the
/// accepting key so the same party can sign the request headers later.
///
/// # Examples
///
/// ```
/// use bitmark_protocol::crypto::keys::KeyPair;
///
/// let kp = KeyPair::generate();
/// let sig = kp.sign(b"transfer");
/// assert!(kp.public_key().verify(b"transfer", &sig));
/// ```
pub struct KeyPair {
    signing_key: SigningKey,
}

/// The public half of an account key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

/// A detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a key pair from a caller-supplied secure RNG.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    /// Derive a key pair from its 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Load a key pair from the 64-byte `seed ‖ public key` layout.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, SigningError> {
        let arr: [u8; PRIVATE_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| SigningError::PrivateKeyLength {
                    expected: PRIVATE_KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        let signing_key =
            SigningKey::from_keypair_bytes(&arr).map_err(|_| SigningError::KeypairMismatch)?;
        Ok(Self { signing_key })
    }

    /// Hex form of [`from_private_key`](Self::from_private_key).
    pub fn from_private_key_hex(hex_str: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(hex_str).map_err(|_| SigningError::InvalidHex)?;
        Self::from_private_key(&bytes)
    }

    /// Load a key pair from a hex seed.
    pub fn from_seed_hex(hex_str: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(hex_str).map_err(|_| SigningError::InvalidHex)?;
        let seed: [u8; SEED_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| SigningError::SeedLength {
                    expected: SEED_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The account this key controls on `network`.
    pub fn address(&self, network: Network) -> Address {
        Address::new(self.public_key(), network)
    }

    /// Exports the 64-byte `seed ‖ public key` private key.
    ///
    /// Handle with care: this is the whole account.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn seed_bytes(&self) -> [u8; SEED_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Sign `message`. Deterministic for a given key and message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for KeyPair {
    /// Compared by public key only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for KeyPair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Wraps raw bytes without checking that they are a curve point.
    ///
    /// Account numbers decode through here; use
    /// [`try_from_slice`](Self::try_from_slice) for untrusted key input.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Validates length and that the bytes are a valid Ed25519 point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, SigningError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| SigningError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| SigningError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(hex_str).map_err(|_| SigningError::InvalidHex)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Returns `true` only for a well-formed signature by this key over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, SigningError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice.try_into().map_err(|_| SigningError::SignatureLength {
                expected: SIGNATURE_LENGTH,
                actual: slice.len(),
            })?;
        Ok(Self { bytes })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(hex_str).map_err(|_| SigningError::InvalidHex)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &str = "0246a917d422e596168185cea9943459c09751532c52fe4ddc27b06e2893ef22\
                               58760a01edf5ed4f95bfe977d77a27627cd57a25df5dea885972212c2b1c0e2f";
    const PUBLIC_KEY: &str = "58760a01edf5ed4f95bfe977d77a27627cd57a25df5dea885972212c2b1c0e2f";

    #[test]
    fn private_key_loads_and_exports_unchanged() {
        let kp = KeyPair::from_private_key_hex(PRIVATE_KEY).unwrap();
        assert_eq!(kp.public_key().to_hex(), PUBLIC_KEY);
        assert_eq!(hex::encode(kp.private_key_bytes()), PRIVATE_KEY);
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let mut bytes = hex::decode(PRIVATE_KEY).unwrap();
        bytes[63] ^= 0x01;
        assert_eq!(
            KeyPair::from_private_key(&bytes).unwrap_err(),
            SigningError::KeypairMismatch
        );
    }

    #[test]
    fn wrong_length_private_key_is_rejected() {
        assert_eq!(
            KeyPair::from_private_key(&[]).unwrap_err(),
            SigningError::PrivateKeyLength {
                expected: 64,
                actual: 0
            }
        );
        assert_eq!(
            KeyPair::from_private_key_hex("not hex").unwrap_err(),
            SigningError::InvalidHex
        );
    }

    #[test]
    fn seed_roundtrip() {
        let kp = KeyPair::generate();
        let restored = KeyPair::from_seed_hex(&hex::encode(kp.seed_bytes())).unwrap();
        assert_eq!(kp, restored);
        assert!(KeyPair::from_seed_hex("abcd").is_err());
    }

    #[test]
    fn sign_verify_roundtrip() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"bitmark");
        assert!(kp.public_key().verify(b"bitmark", &sig));
        assert!(!kp.public_key().verify(b"bitmark!", &sig));
        assert!(!KeyPair::generate().public_key().verify(b"bitmark", &sig));
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = KeyPair::from_private_key_hex(PRIVATE_KEY).unwrap();
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn signature_hex_roundtrip_and_length_check() {
        let sig = KeyPair::generate().sign(b"x");
        assert_eq!(Signature::from_hex(&sig.to_hex()).unwrap(), sig);
        assert_eq!(
            Signature::try_from_slice(&[0u8; 63]).unwrap_err(),
            SigningError::SignatureLength {
                expected: 64,
                actual: 63
            }
        );
    }

    #[test]
    fn public_key_rejects_wrong_length() {
        assert!(PublicKey::try_from_slice(&[0u8; 31]).is_err());
        assert!(PublicKey::from_hex(PUBLIC_KEY).is_ok());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = KeyPair::from_private_key_hex(PRIVATE_KEY).unwrap();
        let dbg = format!("{:?}", kp);
        assert_eq!(dbg, format!("KeyPair(pub={})", PUBLIC_KEY));
        assert!(!dbg.contains("0246a917"));
    }
}
