//! # Digital Signatures
//!
//! Ed25519 signing and verification over canonical records. Every signature
//! the core produces goes through [`sign`], so there is one place to audit.

use tracing::trace;

use super::keys::{KeyPair, PublicKey, Signature};
use crate::error::SigningError;

/// Sign `message` with `keypair`.
///
/// ```
/// use bitmark_protocol::crypto::{sign, verify, KeyPair};
///
/// let keypair = KeyPair::generate();
/// let signature = sign(&keypair, b"record");
/// assert!(verify(&keypair.public_key(), b"record", &signature));
/// ```
pub fn sign(keypair: &KeyPair, message: &[u8]) -> Signature {
    trace!(len = message.len(), "signing canonical message");
    keypair.sign(message)
}

/// `true` if `signature` is a valid signature by `public_key` over `message`.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify from raw byte slices, as received off the wire.
///
/// Malformed key or signature bytes are an error; a well-formed but wrong
/// signature is `Ok(false)`.
pub fn verify_raw(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, SigningError> {
    let public_key = PublicKey::try_from_slice(public_key)?;
    let signature = Signature::try_from_slice(signature)?;
    Ok(verify(&public_key, message, &signature))
}
