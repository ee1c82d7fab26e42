//! # Identity Module
//!
//! Accounts are identified by an Ed25519 public key plus the network they
//! live on, rendered to users as a checksummed base58 account number.
//! See [`address`] for the exact layout.

pub mod address;

pub use address::Address;
