//! # Error Taxonomy
//!
//! Three failure families, each surfaced synchronously at the call that
//! caused it:
//!
//! - [`ValidationError`] — a value handed to a constructor is unusable.
//!   Nothing is partially built.
//! - [`StateError`] — an operation was called out of lifecycle order
//!   (serialize before sign, sign before nonces exist, ...). The object is
//!   left exactly as it was.
//! - [`SigningError`] — key or signature material is malformed.
//!
//! Errors never carry key bytes. [`Error`] wraps all three for callers that
//! only want to bubble failures up.

use thiserror::Error;

use crate::config::Network;

/// Account number decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("account number is not valid base58")]
    Base58,

    #[error("account number has a malformed key variant")]
    KeyVariant,

    #[error("account number is {actual} bytes, expected {expected}")]
    Length {
        /// Length implied by the key variant.
        expected: usize,
        /// Decoded length.
        actual: usize,
    },

    #[error("account number checksum mismatch")]
    Checksum,

    #[error("account number does not encode a public key")]
    NotPublicKey,

    #[error("unsupported key algorithm {0:#x}")]
    UnsupportedAlgorithm(u64),

    #[error("account number belongs to {actual}, expected {expected}")]
    NetworkMismatch { expected: Network, actual: Network },
}

/// Construction-time input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not valid hex")]
    InvalidHex { field: &'static str },

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field} is too long: {actual} exceeds the maximum of {max}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} is too large: {actual} exceeds the maximum of {max}")]
    TooLarge {
        field: &'static str,
        max: u64,
        actual: u64,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("duplicate nonce {0} in issuance batch")]
    DuplicateNonce(u32),

    #[error("{nonces} nonces supplied for a quantity of {quantity}")]
    NonceCountMismatch { nonces: usize, quantity: usize },

    #[error("merkle tree requires at least one leaf")]
    EmptyLeaves,

    #[error("merkle leaf {index} is {actual} bytes, expected {expected}")]
    LeafLength {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown network tag {0}")]
    UnknownNetwork(u64),

    #[error("malformed varint: {0}")]
    Varint(&'static str),

    #[error("invalid address: {0}")]
    Address(#[from] AddressError),
}

/// Lifecycle ordering violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("{0} must be signed before it can be serialized")]
    NotSigned(&'static str),

    #[error("issuance nonces have not been generated")]
    NoncesNotReady,

    #[error("{0} cannot change once signed")]
    Locked(&'static str),

    #[error("{0} must be set before signing")]
    MissingField(&'static str),

    #[error("only an accept response is signed, not {0}")]
    SignNotAllowed(&'static str),

    #[error("request headers need a signing key")]
    MissingHeaderKey,
}

/// Malformed key or signature material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("private key must be {expected} bytes, got {actual}")]
    PrivateKeyLength { expected: usize, actual: usize },

    #[error("seed must be {expected} bytes, got {actual}")]
    SeedLength { expected: usize, actual: usize },

    #[error("key material is not valid hex")]
    InvalidHex,

    #[error("keypair validation failed: public key does not match secret key")]
    KeypairMismatch,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("signature must be {expected} bytes, got {actual}")]
    SignatureLength { expected: usize, actual: usize },
}

/// Any failure the core can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("failed to render wire body: {0}")]
    Encoding(String),
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Self {
        Error::Validation(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_error_lifts_into_validation() {
        let err: Error = AddressError::Checksum.into();
        assert_eq!(
            err,
            Error::Validation(ValidationError::Address(AddressError::Checksum))
        );
        assert_eq!(err.to_string(), "invalid address: account number checksum mismatch");
    }

    #[test]
    fn messages_name_the_offending_field() {
        let err = ValidationError::InvalidLength {
            field: "link",
            expected: 32,
            actual: 31,
        };
        assert_eq!(err.to_string(), "link must be 32 bytes, got 31");
        assert_eq!(
            StateError::NotSigned("transfer").to_string(),
            "transfer must be signed before it can be serialized"
        );
    }
}
