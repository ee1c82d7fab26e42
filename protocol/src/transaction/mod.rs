//! # Transaction Module
//!
//! Parameter objects for every intent a client can submit, and the shared
//! lifecycle they follow.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Kinds, asset status, response actions, links, asset ids
//! nonce.rs        — Nonce policy for multi-unit issuance
//! params.rs       — SignableParams trait and the TransactionParams sum type
//! registration.rs — Asset registration and content fingerprints
//! issuance.rs     — Issuing bitmarks, one signed record per nonce
//! transfer.rs     — Direct transfers and transfer offers
//! share.rs        — Share creation and share grants
//! response.rs     — Accept / reject / cancel for offers and grants
//! headers.rs      — Signed request headers for responses
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Construct** — every constructor validates its inputs and either
//!    returns a complete object or a [`ValidationError`](crate::error::ValidationError).
//! 2. **Prepare** — issuances draw their nonce set; transfers built with
//!    `to(owner)` get their link.
//! 3. **Sign** — [`SignableParams::sign`] packs the canonical record and
//!    stores the signature. Signing again replaces it.
//! 4. **Render** — [`SignableParams::to_json`] produces the wire body.
//!
//! ## Design Decisions
//!
//! - Canonical records are packed field by field in a fixed order; no map
//!   iteration order ever reaches the signed bytes unsorted.
//! - Wire bodies are typed `Serialize` structs so JSON field order is
//!   declaration order.
//! - Key pairs are borrowed for the duration of a `sign` or header call and
//!   never stored.

pub mod headers;
pub mod issuance;
pub mod nonce;
pub mod params;
pub mod registration;
pub mod response;
pub mod share;
pub mod transfer;
pub mod types;

pub use headers::{header_message, Clock, FixedClock, RequestHeaders, SystemClock};
pub use issuance::Issuance;
pub use nonce::{check_distinct, generate_nonces, generate_nonces_with};
pub use params::{SignableParams, TransactionParams};
pub use registration::{compute_fingerprint, compute_merkle_fingerprint, pack_metadata, Registration};
pub use response::{
    GrantRecordBody, GrantResponse, OfferRecord, OfferRecordBody, ShareGrantRecord,
    TransferResponse,
};
pub use share::{Share, ShareGranting};
pub use transfer::{Transfer, TransferOffer};
pub use types::{AssetId, AssetStatus, ExtraInfo, Link, ResponseAction, TransactionKind};
