//! Core value types shared by the transaction parameter objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{ASSET_ID_LENGTH, LINK_LENGTH};
use crate::crypto::hash::decode_fixed_hex;
use crate::error::ValidationError;

/// Free-form string pairs. A `BTreeMap` so iteration (and therefore any
/// encoding derived from it) is always in lexicographic key order.
pub type ExtraInfo = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// Which intent a parameter object expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Registration,
    Issuance,
    Transfer,
    TransferOffer,
    TransferResponse,
    Share,
    ShareGranting,
    GrantResponse,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Issuance => "issuance",
            Self::Transfer => "transfer",
            Self::TransferOffer => "transfer offer",
            Self::TransferResponse => "transfer response",
            Self::Share => "share",
            Self::ShareGranting => "share granting",
            Self::GrantResponse => "grant response",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Confirmation state of the asset an issuance targets.
///
/// Drives the nonce policy: the first issue of a still-pending asset must
/// carry nonce `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Pending,
    Confirmed,
}

// ---------------------------------------------------------------------------
// ResponseAction
// ---------------------------------------------------------------------------

/// How a party answers an offer or a share grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    /// Recipient accepts and countersigns.
    Accept,
    /// Recipient declines.
    Reject,
    /// Originator withdraws.
    Cancel,
}

impl ResponseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A 32-byte transaction id referenced by a later record.
///
/// Used for transfer links and share ids. Serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link([u8; LINK_LENGTH]);

impl Link {
    pub fn from_hex(hex_str: &str) -> Result<Self, ValidationError> {
        Self::parse("link", hex_str)
    }

    pub(crate) fn parse(field: &'static str, hex_str: &str) -> Result<Self, ValidationError> {
        let bytes = decode_fixed_hex(field, hex_str, LINK_LENGTH)?;
        let mut arr = [0u8; LINK_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn from_bytes(bytes: [u8; LINK_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; LINK_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.to_hex())
    }
}

impl Serialize for Link {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Link::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// A 64-byte asset id (SHA3-512 of the registration).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AssetId(Vec<u8>);

impl AssetId {
    pub fn from_hex(hex_str: &str) -> Result<Self, ValidationError> {
        decode_fixed_hex("asset id", hex_str, ASSET_ID_LENGTH).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.to_hex())
    }
}

impl Serialize for AssetId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
