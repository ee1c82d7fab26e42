//! # Cryptographic Primitives
//!
//! Everything that touches a key or a digest:
//!
//! - **Ed25519** key pairs and detached signatures over canonical records.
//! - **SHA3-256 / SHA3-512** for checksums, ids, fingerprints and Merkle
//!   combines, plus SHA-256 for tagged hashes.
//! - The **Merkle** node-array builder.
//!
//! These are thin typed wrappers over audited implementations.

pub mod hash;
pub mod keys;
pub mod merkle;
pub mod signatures;

pub use hash::{sha256, sha3_256, sha3_512, HashAlgorithm, TaggedHash};
pub use keys::{KeyPair, PublicKey, Signature};
pub use merkle::{build_tree, merkle_root};
pub use signatures::{sign, verify, verify_raw};
