//! # Hashing Utilities
//!
//! Three digests show up in the protocol:
//!
//! - **SHA3-256** — account number checksums, transaction ids (and therefore
//!   every `link` / share id), the Merkle combine for 32-byte leaves.
//! - **SHA3-512** — asset ids and content fingerprints.
//! - **SHA-256** — accepted as a tagged hash for interoperability with
//!   callers that fingerprint content themselves.
//!
//! [`TaggedHash`] carries a digest together with the algorithm that produced
//! it, so a 32-byte value can never be mistaken for a SHA3-512 one.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Sha3_256, Sha3_512};

use crate::config::{HASH_256_LENGTH, HASH_512_LENGTH};
use crate::error::ValidationError;

/// SHA3-256 of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; HASH_256_LENGTH] {
    let mut out = [0u8; HASH_256_LENGTH];
    out.copy_from_slice(&Sha3_256::digest(data));
    out
}

/// SHA3-512 of `data`.
pub fn sha3_512(data: &[u8]) -> [u8; HASH_512_LENGTH] {
    let mut out = [0u8; HASH_512_LENGTH];
    out.copy_from_slice(&Sha3_512::digest(data));
    out
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; HASH_256_LENGTH] {
    let mut out = [0u8; HASH_256_LENGTH];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// `SHA3-256(left ‖ right)`. Merkle combine for 32-byte trees.
pub fn sha3_256_pair(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut hasher = Sha3_256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().to_vec()
}

/// `SHA3-512(left ‖ right)`. Merkle combine for 64-byte trees.
pub fn sha3_512_pair(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut hasher = Sha3_512::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().to_vec()
}

/// Digest algorithms a [`TaggedHash`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    Sha256,
    Sha3_256,
    Sha3_512,
}

impl HashAlgorithm {
    /// Output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Sha3_256 => HASH_256_LENGTH,
            HashAlgorithm::Sha3_512 => HASH_512_LENGTH,
        }
    }

    pub fn digest(self, data: &[u8]) -> TaggedHash {
        let bytes = match self {
            HashAlgorithm::Sha256 => sha256(data).to_vec(),
            HashAlgorithm::Sha3_256 => sha3_256(data).to_vec(),
            HashAlgorithm::Sha3_512 => sha3_512(data).to_vec(),
        };
        TaggedHash {
            algorithm: self,
            bytes,
        }
    }
}

/// A digest whose length is checked against its algorithm.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TaggedHash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl TaggedHash {
    pub fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        if bytes.len() != algorithm.output_len() {
            return Err(ValidationError::InvalidLength {
                field: "hash",
                expected: algorithm.output_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { algorithm, bytes })
    }

    pub fn from_hex(algorithm: HashAlgorithm, hex_str: &str) -> Result<Self, ValidationError> {
        let bytes = hex::decode(hex_str).map_err(|_| ValidationError::InvalidHex { field: "hash" })?;
        Self::new(algorithm, bytes)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl AsRef<[u8]> for TaggedHash {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for TaggedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TaggedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaggedHash({:?}, {})", self.algorithm, self.to_hex())
    }
}

/// Decodes a lowercase or uppercase hex field and checks its byte length.
pub(crate) fn decode_fixed_hex(
    field: &'static str,
    hex_str: &str,
    expected: usize,
) -> Result<Vec<u8>, ValidationError> {
    let bytes = hex::decode(hex_str).map_err(|_| ValidationError::InvalidHex { field })?;
    if bytes.len() != expected {
        return Err(ValidationError::InvalidLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha3_256_empty_vector() {
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn sha3_512_abc_vector() {
        assert_eq!(
            hex::encode(sha3_512(b"abc")),
            "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e\
             10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eec53f0"
        );
    }

    #[test]
    fn sha256_empty_vector() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn pair_hash_is_hash_of_concatenation() {
        assert_eq!(sha3_256_pair(b"ab", b"cd"), sha3_256(b"abcd").to_vec());
        assert_eq!(sha3_512_pair(b"ab", b"cd"), sha3_512(b"abcd").to_vec());
    }

    #[test]
    fn tagged_hash_rejects_wrong_length() {
        let err = TaggedHash::new(HashAlgorithm::Sha3_512, vec![0u8; 32]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidLength {
                field: "hash",
                expected: 64,
                actual: 32
            }
        );
        assert!(TaggedHash::new(HashAlgorithm::Sha256, vec![0u8; 32]).is_ok());
    }

    #[test]
    fn tagged_hash_rejects_bad_hex() {
        assert!(matches!(
            TaggedHash::from_hex(HashAlgorithm::Sha3_256, "zz"),
            Err(ValidationError::InvalidHex { .. })
        ));
    }

    #[test]
    fn digest_is_tagged_with_its_algorithm() {
        let h = HashAlgorithm::Sha3_512.digest(b"bitmark");
        assert_eq!(h.algorithm(), HashAlgorithm::Sha3_512);
        assert_eq!(h.as_bytes().len(), 64);
        assert_eq!(h.as_bytes(), &sha3_512(b"bitmark")[..]);
    }
}
