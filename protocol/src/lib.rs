// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bitmark Protocol — Transaction Authorization Core
//!
//! This crate turns what a client wants to do on the Bitmark chain (register
//! an asset, issue bitmarks for it, transfer them, split them into shares)
//! into byte-exact canonical records, signs them with the account's Ed25519
//! key, and renders the wire bodies the API expects.
//!
//! Nodes re-derive every canonical record independently and check the
//! signature against it. One byte out of place and the transaction is
//! rejected, so the encoding rules here are pinned against reference
//! vectors, not inferred.
//!
//! ## Architecture
//!
//! - **codec** — Varints, length-prefixed byte strings, the record packer.
//! - **crypto** — Hashing, Ed25519 keys and signatures, the Merkle builder.
//! - **identity** — Account numbers: network, public key, checksum.
//! - **transaction** — One parameter object per intent, plus request headers.
//! - **config** — Protocol constants and the explicit client configuration.
//! - **error** — Validation, lifecycle and signing error families.
//!
//! ## Quick Start
//!
//! ```
//! use bitmark_protocol::prelude::*;
//!
//! let owner = KeyPair::generate();
//! let receiver = KeyPair::generate().address(Network::Testnet);
//! let link = Link::from_hex(&"c1".repeat(32)).unwrap();
//!
//! let mut transfer = Transfer::new(link, receiver);
//! transfer.sign(&owner).unwrap();
//! assert!(transfer.verify(&owner.public_key()));
//! assert!(transfer.to_json().unwrap().starts_with("{\"transfer\":"));
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Construction validates everything. A built object is always signable
//!    once its lifecycle prerequisites are met.
//! 2. No global state. The network comes from an address or an [`SdkConfig`].
//! 3. Keys are borrowed, never stored.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod transaction;

pub use config::{Network, SdkConfig};
pub use error::{AddressError, Error, Result, SigningError, StateError, ValidationError};

/// The types most callers need, in one import.
pub mod prelude {
    pub use crate::config::{Network, SdkConfig};
    pub use crate::crypto::{build_tree, merkle_root, KeyPair, PublicKey, Signature};
    pub use crate::error::{Error, StateError, ValidationError};
    pub use crate::identity::Address;
    pub use crate::transaction::{
        AssetStatus, ExtraInfo, GrantResponse, Issuance, Link, OfferRecord, Registration,
        ResponseAction, Share, ShareGrantRecord, ShareGranting, SignableParams,
        TransactionParams, Transfer, TransferOffer, TransferResponse,
    };
}
