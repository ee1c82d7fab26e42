//! Request authentication headers for offer and grant updates.
//!
//! Responding to an offer or grant proves who is asking with three headers:
//!
//! | header      | value                                              |
//! |-------------|----------------------------------------------------|
//! | `requester` | account number of the responding party             |
//! | `timestamp` | milliseconds since the Unix epoch, decimal          |
//! | `signature` | hex Ed25519 signature over the message below        |
//!
//! ```text
//! updateOffer|<offer or grant id>|<requester>|<timestamp>
//! ```

use chrono::Utc;
use tracing::debug;

use crate::config::HEADER_MESSAGE_ACTION;
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::signatures::sign;
use crate::error::StateError;
use crate::identity::Address;

/// Source of header timestamps.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Pre-epoch clocks clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// The message a header signature covers.
pub fn header_message(id: &str, requester: &Address, timestamp: u64) -> String {
    format!("{HEADER_MESSAGE_ACTION}|{id}|{requester}|{timestamp}")
}

/// The `requester` / `timestamp` / `signature` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaders {
    pub requester: Address,
    pub timestamp: u64,
    pub signature: Signature,
}

impl RequestHeaders {
    /// Signs the header message for `id`. Fails without a key.
    pub fn build(
        id: &str,
        requester: Address,
        keypair: Option<&KeyPair>,
        timestamp: u64,
    ) -> Result<Self, StateError> {
        let keypair = keypair.ok_or(StateError::MissingHeaderKey)?;
        let message = header_message(id, &requester, timestamp);
        let signature = sign(keypair, message.as_bytes());
        debug!(%requester, timestamp, "request headers signed");
        Ok(Self {
            requester,
            timestamp,
            signature,
        })
    }

    /// Header name/value pairs, ready to attach to a request.
    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("requester", self.requester.account_number()),
            ("timestamp", self.timestamp.to_string()),
            ("signature", self.signature.to_hex()),
        ]
    }

    /// Checks the signature against `public_key` for the given `id`.
    pub fn verify(&self, id: &str, public_key: &PublicKey) -> bool {
        let message = header_message(id, &self.requester, self.timestamp);
        public_key.verify(message.as_bytes(), &self.signature)
    }
}
