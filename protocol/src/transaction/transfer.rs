//! Direct transfers and transfer offers.
//!
//! Both sign the same shape of record, differing only in the tag:
//!
//! ```text
//! varint(tag) ‖ bytes(link) ‖ 0x00 ‖ bytes(pack(new owner))
//! ```
//!
//! The `0x00` stands in for the payment block, which is never attached.
//! A direct transfer (tag `0x04`) moves the bitmark immediately. An offer
//! (tag `0x05`) is held by the API until the new owner countersigns it, see
//! [`TransferResponse`](super::response::TransferResponse).

use serde::Serialize;
use tracing::debug;

use super::params::{render, require_signed, SignableParams};
use super::types::{ExtraInfo, Link, TransactionKind};
use crate::codec::Packer;
use crate::config::{NO_PAYMENT, TAG_TRANSFER, TAG_TRANSFER_COUNTERSIGNED};
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::signatures::sign;
use crate::error::{Error, StateError};
use crate::identity::Address;

/// Packs a transfer-shaped record.
pub(crate) fn pack_transfer(tag: u64, link: &Link, owner: &Address) -> Vec<u8> {
    Packer::tagged(tag)
        .bytes(link.as_bytes())
        .raw(&[NO_PAYMENT])
        .bytes(&owner.pack())
        .finish()
}

/// The signed part shared by transfers and offers.
#[derive(Debug, Clone)]
struct TransferRecord {
    link: Option<Link>,
    owner: Address,
    signature: Option<Signature>,
}

#[derive(Serialize)]
struct RecordBody<'a> {
    link: &'a Link,
    owner: &'a Address,
    signature: &'a Signature,
}

impl TransferRecord {
    fn new(link: Option<Link>, owner: Address) -> Self {
        Self {
            link,
            owner,
            signature: None,
        }
    }

    fn set_link(&mut self, link: Link) -> Result<(), StateError> {
        if self.signature.is_some() {
            return Err(StateError::Locked("link"));
        }
        self.link = Some(link);
        Ok(())
    }

    fn canonical_bytes(&self, tag: u64) -> Result<Vec<u8>, StateError> {
        let link = self.link.as_ref().ok_or(StateError::MissingField("link"))?;
        Ok(pack_transfer(tag, link, &self.owner))
    }

    fn sign(&mut self, tag: u64, kind: TransactionKind, keypair: &KeyPair) -> Result<(), Error> {
        let message = self.canonical_bytes(tag)?;
        let signature = sign(keypair, &message);
        debug!(kind = %kind, owner = %self.owner, "transfer record signed");
        self.signature = Some(signature);
        Ok(())
    }

    fn verify(&self, tag: u64, public_key: &PublicKey) -> bool {
        match (self.canonical_bytes(tag), &self.signature) {
            (Ok(message), Some(signature)) => public_key.verify(&message, signature),
            _ => false,
        }
    }

    fn body(&self, kind: TransactionKind) -> Result<RecordBody<'_>, StateError> {
        let signature = require_signed(self.signature.as_ref(), kind)?;
        let link = self.link.as_ref().ok_or(StateError::MissingField("link"))?;
        Ok(RecordBody {
            link,
            owner: &self.owner,
            signature,
        })
    }
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Moves a bitmark to a new owner in one step.
#[derive(Debug, Clone)]
pub struct Transfer {
    record: TransferRecord,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    transfer: RecordBody<'a>,
}

impl Transfer {
    pub fn new(link: Link, owner: Address) -> Self {
        Self {
            record: TransferRecord::new(Some(link), owner),
        }
    }

    /// A transfer whose link is set later with [`Transfer::set_link`].
    pub fn to(owner: Address) -> Self {
        Self {
            record: TransferRecord::new(None, owner),
        }
    }

    pub fn set_link(&mut self, link: Link) -> Result<(), StateError> {
        self.record.set_link(link)
    }

    pub fn link(&self) -> Option<&Link> {
        self.record.link.as_ref()
    }

    pub fn owner(&self) -> &Address {
        &self.record.owner
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.record.signature.as_ref()
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>, StateError> {
        self.record.canonical_bytes(TAG_TRANSFER)
    }
}

impl SignableParams for Transfer {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Transfer
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let kind = self.kind();
        self.record.sign(TAG_TRANSFER, kind, keypair)
    }

    fn is_signed(&self) -> bool {
        self.record.signature.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        self.record.verify(TAG_TRANSFER, public_key)
    }

    fn to_json(&self) -> Result<String, Error> {
        render(&TransferBody {
            transfer: self.record.body(self.kind())?,
        })
    }
}

// ---------------------------------------------------------------------------
// TransferOffer
// ---------------------------------------------------------------------------

/// Proposes a transfer that the new owner must accept.
///
/// The extra info travels with the offer but is not part of the signed record.
#[derive(Debug, Clone)]
pub struct TransferOffer {
    record: TransferRecord,
    extra_info: ExtraInfo,
}

#[derive(Serialize)]
struct OfferBody<'a> {
    offer: OfferInner<'a>,
}

#[derive(Serialize)]
struct OfferInner<'a> {
    extra_info: &'a ExtraInfo,
    record: RecordBody<'a>,
}

impl TransferOffer {
    pub fn new(link: Link, owner: Address) -> Self {
        Self {
            record: TransferRecord::new(Some(link), owner),
            extra_info: ExtraInfo::new(),
        }
    }

    /// An offer whose link is set later with [`TransferOffer::set_link`].
    pub fn to(owner: Address) -> Self {
        Self {
            record: TransferRecord::new(None, owner),
            extra_info: ExtraInfo::new(),
        }
    }

    pub fn with_extra_info(mut self, extra_info: ExtraInfo) -> Self {
        self.extra_info = extra_info;
        self
    }

    pub fn set_link(&mut self, link: Link) -> Result<(), StateError> {
        self.record.set_link(link)
    }

    pub fn link(&self) -> Option<&Link> {
        self.record.link.as_ref()
    }

    pub fn owner(&self) -> &Address {
        &self.record.owner
    }

    pub fn extra_info(&self) -> &ExtraInfo {
        &self.extra_info
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.record.signature.as_ref()
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>, StateError> {
        self.record.canonical_bytes(TAG_TRANSFER_COUNTERSIGNED)
    }
}

impl SignableParams for TransferOffer {
    fn kind(&self) -> TransactionKind {
        TransactionKind::TransferOffer
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let kind = self.kind();
        self.record.sign(TAG_TRANSFER_COUNTERSIGNED, kind, keypair)
    }

    fn is_signed(&self) -> bool {
        self.record.signature.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        self.record.verify(TAG_TRANSFER_COUNTERSIGNED, public_key)
    }

    fn to_json(&self) -> Result<String, Error> {
        render(&OfferBody {
            offer: OfferInner {
                extra_info: &self.extra_info,
                record: self.record.body(self.kind())?,
            },
        })
    }
}
