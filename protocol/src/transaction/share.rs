//! Fractional shares: creating a share from a bitmark, and granting
//! share units to another account.
//!
//! ```text
//! share: varint(0x08) ‖ bytes(link) ‖ varint(quantity)
//! grant: varint(0x09) ‖ bytes(share id) ‖ varint(quantity)
//!        ‖ bytes(pack(owner)) ‖ bytes(pack(receiver)) ‖ varint(before block)
//!        [ ‖ varint(n) ‖ (str(key) ‖ str(value)) * n ]
//! ```
//!
//! The trailing extra-info block of a grant is only written when the map
//! holds at least one entry, so grants without extra info pack exactly like
//! the record the receiver countersigns.

use serde::Serialize;
use tracing::debug;

use super::params::{render, require_signed, SignableParams};
use super::types::{ExtraInfo, Link, TransactionKind};
use crate::codec::Packer;
use crate::config::{TAG_SHARE, TAG_SHARE_GRANT};
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::signatures::sign;
use crate::error::{Error, StateError, ValidationError};
use crate::identity::Address;

/// Packs the grant record without extra info.
pub(crate) fn pack_grant(
    share_id: &Link,
    quantity: u64,
    owner: &Address,
    receiver: &Address,
    before_block: u64,
) -> Packer {
    Packer::tagged(TAG_SHARE_GRANT)
        .bytes(share_id.as_bytes())
        .varint(quantity)
        .bytes(&owner.pack())
        .bytes(&receiver.pack())
        .varint(before_block)
}

fn check_quantity(quantity: u64) -> Result<(), ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::NonPositive { field: "quantity" });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Share
// ---------------------------------------------------------------------------

/// Splits the bitmark at `link` into `quantity` share units.
#[derive(Debug, Clone)]
pub struct Share {
    link: Link,
    quantity: u64,
    signature: Option<Signature>,
}

#[derive(Serialize)]
struct ShareBody<'a> {
    share: ShareInner<'a>,
}

#[derive(Serialize)]
struct ShareInner<'a> {
    link: &'a Link,
    quantity: u64,
    signature: &'a Signature,
}

impl Share {
    pub fn new(link: Link, quantity: u64) -> Result<Self, ValidationError> {
        check_quantity(quantity)?;
        Ok(Self {
            link,
            quantity,
            signature: None,
        })
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        Packer::tagged(TAG_SHARE)
            .bytes(self.link.as_bytes())
            .varint(self.quantity)
            .finish()
    }
}

impl SignableParams for Share {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Share
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let signature = sign(keypair, &self.canonical_bytes());
        debug!(kind = %self.kind(), link = %self.link, quantity = self.quantity, "share signed");
        self.signature = Some(signature);
        Ok(())
    }

    fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        self.signature
            .as_ref()
            .is_some_and(|sig| public_key.verify(&self.canonical_bytes(), sig))
    }

    fn to_json(&self) -> Result<String, Error> {
        let signature = require_signed(self.signature.as_ref(), self.kind())?;
        render(&ShareBody {
            share: ShareInner {
                link: &self.link,
                quantity: self.quantity,
                signature,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// ShareGranting
// ---------------------------------------------------------------------------

/// Offers `quantity` units of a share to `receiver`, valid until
/// `before_block`.
#[derive(Debug, Clone)]
pub struct ShareGranting {
    share_id: Link,
    quantity: u64,
    owner: Address,
    receiver: Address,
    before_block: u64,
    extra_info: ExtraInfo,
    signature: Option<Signature>,
}

#[derive(Serialize)]
struct GrantBody<'a> {
    record: GrantRecordWire<'a>,
    extra_info: &'a ExtraInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantRecordWire<'a> {
    share_id: &'a Link,
    quantity: u64,
    owner: &'a Address,
    recipient: &'a Address,
    before_block: u64,
    signature: &'a Signature,
}

impl ShareGranting {
    pub fn new(
        share_id: Link,
        quantity: u64,
        owner: Address,
        receiver: Address,
        before_block: u64,
    ) -> Result<Self, ValidationError> {
        check_quantity(quantity)?;
        Ok(Self {
            share_id,
            quantity,
            owner,
            receiver,
            before_block,
            extra_info: ExtraInfo::new(),
            signature: None,
        })
    }

    /// Attaches extra info. Non-empty maps become part of the signed record.
    pub fn with_extra_info(mut self, extra_info: ExtraInfo) -> Self {
        self.extra_info = extra_info;
        self
    }

    pub fn set_before_block(&mut self, before_block: u64) -> Result<(), StateError> {
        if self.signature.is_some() {
            return Err(StateError::Locked("before block"));
        }
        self.before_block = before_block;
        Ok(())
    }

    pub fn share_id(&self) -> &Link {
        &self.share_id
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn before_block(&self) -> u64 {
        self.before_block
    }

    pub fn extra_info(&self) -> &ExtraInfo {
        &self.extra_info
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut packer = pack_grant(
            &self.share_id,
            self.quantity,
            &self.owner,
            &self.receiver,
            self.before_block,
        );
        if !self.extra_info.is_empty() {
            packer = packer.varint(self.extra_info.len() as u64);
            for (key, value) in &self.extra_info {
                packer = packer.string(key).string(value);
            }
        }
        packer.finish()
    }
}

impl SignableParams for ShareGranting {
    fn kind(&self) -> TransactionKind {
        TransactionKind::ShareGranting
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        let signature = sign(keypair, &self.canonical_bytes());
        debug!(
            kind = %self.kind(),
            share = %self.share_id,
            receiver = %self.receiver,
            "share grant signed"
        );
        self.signature = Some(signature);
        Ok(())
    }

    fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        self.signature
            .as_ref()
            .is_some_and(|sig| public_key.verify(&self.canonical_bytes(), sig))
    }

    fn to_json(&self) -> Result<String, Error> {
        let signature = require_signed(self.signature.as_ref(), self.kind())?;
        render(&GrantBody {
            record: GrantRecordWire {
                share_id: &self.share_id,
                quantity: self.quantity,
                owner: &self.owner,
                recipient: &self.receiver,
                before_block: self.before_block,
                signature,
            },
            extra_info: &self.extra_info,
        })
    }
}
