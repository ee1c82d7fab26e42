//! # Nonce Policy
//!
//! Every issued unit of an asset is signed over its own nonce, so two issues
//! of the same asset to the same owner never produce the same record.
//!
//! - For a **pending** asset the first nonce is `0`. The chain treats that
//!   issue as the one that confirms the asset.
//! - For a **confirmed** asset every nonce is a fresh random draw.
//!
//! Draws come from a cryptographically secure RNG and are masked to 31 bits,
//! matching the non-negative range the API accepts. A batch never contains
//! the same nonce twice.

use std::collections::HashSet;

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tracing::warn;

use super::types::AssetStatus;
use crate::config::ISSUANCE_MAX_QUANTITY;
use crate::error::ValidationError;

/// Largest nonce the API accepts.
pub const NONCE_MASK: u32 = 0x7fff_ffff;

/// Nonce reserved for the issue that confirms a pending asset.
pub const GENESIS_NONCE: u32 = 0;

/// Draws `quantity` distinct nonces from the OS RNG.
pub fn generate_nonces(quantity: u32, status: AssetStatus) -> Result<Vec<u32>, ValidationError> {
    generate_nonces_with(quantity, status, &mut OsRng)
}

/// Rejects quantities outside `1..=ISSUANCE_MAX_QUANTITY`.
pub fn check_quantity(quantity: u32) -> Result<(), ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::NonPositive { field: "quantity" });
    }
    if quantity > ISSUANCE_MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity",
            max: u64::from(ISSUANCE_MAX_QUANTITY),
            actual: u64::from(quantity),
        });
    }
    Ok(())
}

/// Draws `quantity` distinct nonces from `rng`.
pub fn generate_nonces_with<R>(
    quantity: u32,
    status: AssetStatus,
    rng: &mut R,
) -> Result<Vec<u32>, ValidationError>
where
    R: RngCore + CryptoRng,
{
    check_quantity(quantity)?;

    let quantity = quantity as usize;
    let mut nonces = Vec::with_capacity(quantity);
    let mut seen = HashSet::with_capacity(quantity);

    if status == AssetStatus::Pending {
        nonces.push(GENESIS_NONCE);
        seen.insert(GENESIS_NONCE);
    }

    while nonces.len() < quantity {
        let candidate = rng.next_u32() & NONCE_MASK;
        if seen.insert(candidate) {
            nonces.push(candidate);
        } else {
            warn!(candidate, "nonce draw collided, drawing again");
        }
    }

    Ok(nonces)
}

/// Rejects a caller-supplied nonce set containing duplicates.
pub fn check_distinct(nonces: &[u32]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(nonces.len());
    for &nonce in nonces {
        if !seen.insert(nonce) {
            return Err(ValidationError::DuplicateNonce(nonce));
        }
    }
    Ok(())
}
