//! Answers to pending offers and share grants.
//!
//! Accepting countersigns the original record: the accepted payload is the
//! offer's (or grant's) packed record followed by its signature as a byte
//! string. Rejecting or cancelling signs nothing in the body. The responding
//! party authenticates the request instead, through
//! [`RequestHeaders`](super::headers::RequestHeaders).
//!
//! An accepted response keeps the key it was countersigned with, so its
//! headers can be built without passing the key again. Unsigned responses
//! always need the key passed in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::headers::{Clock, RequestHeaders};
use super::params::{render, require_signed, SignableParams};
use super::share::pack_grant;
use super::transfer::pack_transfer;
use super::types::{Link, ResponseAction, TransactionKind};
use crate::codec::Packer;
use crate::config::TAG_TRANSFER_COUNTERSIGNED;
use crate::crypto::keys::{KeyPair, PublicKey, Signature};
use crate::crypto::signatures::sign;
use crate::error::{Error, StateError, ValidationError};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Records received from the API
// ---------------------------------------------------------------------------

/// A pending transfer offer as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub record: OfferRecordBody,
    #[serde(default)]
    pub extra_info: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub open: bool,
}

/// The signed part of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecordBody {
    pub link: Link,
    pub owner: Address,
    pub signature: Signature,
}

impl OfferRecord {
    pub fn new(
        id: impl Into<String>,
        link: Link,
        owner: Address,
        signature: Signature,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            id: id.into(),
            from: None,
            to: None,
            record: OfferRecordBody {
                link,
                owner,
                signature,
            },
            extra_info: BTreeMap::new(),
            created_at: None,
            open: true,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks what the typed fields cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::Empty { field: "offer id" });
        }
        Ok(())
    }

    /// The offer owner's countersignable payload.
    pub fn countersign_bytes(&self) -> Vec<u8> {
        let packed = pack_transfer(
            TAG_TRANSFER_COUNTERSIGNED,
            &self.record.link,
            &self.record.owner,
        );
        Packer::new()
            .raw(&packed)
            .bytes(self.record.signature.as_bytes())
            .finish()
    }
}

/// A pending share grant as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareGrantRecord {
    pub id: String,
    pub share_id: Link,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "txId", default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    pub record: GrantRecordBody,
    #[serde(default)]
    pub extra_info: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The signed part of a share grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRecordBody {
    pub share_id: Link,
    pub quantity: u64,
    pub owner: Address,
    #[serde(rename = "recipient")]
    pub receiver: Address,
    pub before_block: u64,
    pub signature: Signature,
}

impl ShareGrantRecord {
    pub fn new(id: impl Into<String>, record: GrantRecordBody) -> Result<Self, ValidationError> {
        let grant = Self {
            id: id.into(),
            share_id: record.share_id,
            from: Some(record.owner),
            to: Some(record.receiver),
            status: None,
            tx_id: None,
            record,
            extra_info: BTreeMap::new(),
            created_at: None,
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Checks what the typed fields cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::Empty { field: "grant id" });
        }
        if self.record.quantity == 0 {
            return Err(ValidationError::NonPositive { field: "quantity" });
        }
        Ok(())
    }

    /// The grant owner's countersignable payload.
    pub fn countersign_bytes(&self) -> Vec<u8> {
        let r = &self.record;
        pack_grant(&r.share_id, r.quantity, &r.owner, &r.receiver, r.before_block)
            .bytes(r.signature.as_bytes())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Shared response state
// ---------------------------------------------------------------------------

fn check_sign_allowed(action: ResponseAction) -> Result<(), StateError> {
    match action {
        ResponseAction::Accept => Ok(()),
        other => Err(StateError::SignNotAllowed(other.as_str())),
    }
}

/// The countersignature, or `None` for responses that never carry one.
fn countersignature<'a>(
    action: ResponseAction,
    signature: Option<&'a Signature>,
    kind: TransactionKind,
) -> Result<Option<&'a Signature>, StateError> {
    match action {
        ResponseAction::Accept => require_signed(signature, kind).map(Some),
        ResponseAction::Reject | ResponseAction::Cancel => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// TransferResponse
// ---------------------------------------------------------------------------

/// Accepts, rejects or cancels a transfer offer.
#[derive(Debug, Clone)]
pub struct TransferResponse {
    offer: OfferRecord,
    action: ResponseAction,
    current_owner: Option<Address>,
    signature: Option<Signature>,
    header_key: Option<KeyPair>,
}

#[derive(Serialize)]
struct TransferResponseBody<'a> {
    action: ResponseAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    countersignature: Option<&'a Signature>,
    id: &'a str,
}

impl TransferResponse {
    /// The receiver accepts. Must be signed before rendering.
    pub fn accept(offer: OfferRecord) -> Result<Self, ValidationError> {
        Self::build(offer, ResponseAction::Accept, None)
    }

    /// The receiver declines.
    pub fn reject(offer: OfferRecord) -> Result<Self, ValidationError> {
        Self::build(offer, ResponseAction::Reject, None)
    }

    /// The current owner withdraws the offer.
    pub fn cancel(offer: OfferRecord, current_owner: Address) -> Result<Self, ValidationError> {
        Self::build(offer, ResponseAction::Cancel, Some(current_owner))
    }

    fn build(
        offer: OfferRecord,
        action: ResponseAction,
        current_owner: Option<Address>,
    ) -> Result<Self, ValidationError> {
        offer.validate()?;
        Ok(Self {
            offer,
            action,
            current_owner,
            signature: None,
            header_key: None,
        })
    }

    pub fn offer(&self) -> &OfferRecord {
        &self.offer
    }

    pub fn action(&self) -> ResponseAction {
        self.action
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Who authenticates this response: the offered owner, or the current
    /// owner when cancelling.
    pub fn requester(&self) -> Address {
        match (self.action, self.current_owner) {
            (ResponseAction::Cancel, Some(owner)) => owner,
            _ => self.offer.record.owner,
        }
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.offer.countersign_bytes()
    }

    /// Request headers stamped with `clock`.
    ///
    /// An explicit `keypair` wins; otherwise the countersigning key is used.
    /// Fails with [`StateError::MissingHeaderKey`] when neither exists.
    pub fn headers(
        &self,
        keypair: Option<&KeyPair>,
        clock: &impl Clock,
    ) -> Result<RequestHeaders, StateError> {
        self.headers_at(keypair, clock.now_millis())
    }

    pub fn headers_at(
        &self,
        keypair: Option<&KeyPair>,
        timestamp: u64,
    ) -> Result<RequestHeaders, StateError> {
        let keypair = keypair.or(self.header_key.as_ref());
        RequestHeaders::build(&self.offer.id, self.requester(), keypair, timestamp)
    }
}

impl SignableParams for TransferResponse {
    fn kind(&self) -> TransactionKind {
        TransactionKind::TransferResponse
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        check_sign_allowed(self.action)?;
        let signature = sign(keypair, &self.canonical_bytes());
        debug!(kind = %self.kind(), offer = %self.offer.id, "offer countersigned");
        self.signature = Some(signature);
        self.header_key = Some(keypair.clone());
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
        let countersignature =
            countersignature(self.action, self.signature.as_ref(), self.kind())?;
        render(&TransferResponseBody {
            action: self.action,
            countersignature,
            id: &self.offer.id,
        })
    }
}

// ---------------------------------------------------------------------------
// GrantResponse
// ---------------------------------------------------------------------------

/// Accepts, rejects or cancels a share grant.
#[derive(Debug, Clone)]
pub struct GrantResponse {
    grant: ShareGrantRecord,
    action: ResponseAction,
    signature: Option<Signature>,
    header_key: Option<KeyPair>,
}

#[derive(Serialize)]
struct GrantResponseBody<'a> {
    id: &'a str,
    action: ResponseAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    countersignature: Option<&'a Signature>,
}

impl GrantResponse {
    pub fn accept(grant: ShareGrantRecord) -> Result<Self, ValidationError> {
        Self::build(grant, ResponseAction::Accept)
    }

    pub fn reject(grant: ShareGrantRecord) -> Result<Self, ValidationError> {
        Self::build(grant, ResponseAction::Reject)
    }

    pub fn cancel(grant: ShareGrantRecord) -> Result<Self, ValidationError> {
        Self::build(grant, ResponseAction::Cancel)
    }

    fn build(grant: ShareGrantRecord, action: ResponseAction) -> Result<Self, ValidationError> {
        grant.validate()?;
        Ok(Self {
            grant,
            action,
            signature: None,
            header_key: None,
        })
    }

    pub fn grant(&self) -> &ShareGrantRecord {
        &self.grant
    }

    pub fn action(&self) -> ResponseAction {
        self.action
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The grant owner when cancelling, the receiver otherwise.
    pub fn requester(&self) -> Address {
        match self.action {
            ResponseAction::Cancel => self.grant.record.owner,
            ResponseAction::Accept | ResponseAction::Reject => self.grant.record.receiver,
        }
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.grant.countersign_bytes()
    }

    pub fn headers(
        &self,
        keypair: Option<&KeyPair>,
        clock: &impl Clock,
    ) -> Result<RequestHeaders, StateError> {
        self.headers_at(keypair, clock.now_millis())
    }

    pub fn headers_at(
        &self,
        keypair: Option<&KeyPair>,
        timestamp: u64,
    ) -> Result<RequestHeaders, StateError> {
        let keypair = keypair.or(self.header_key.as_ref());
        RequestHeaders::build(&self.grant.id, self.requester(), keypair, timestamp)
    }
}

impl SignableParams for GrantResponse {
    fn kind(&self) -> TransactionKind {
        TransactionKind::GrantResponse
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        check_sign_allowed(self.action)?;
        let signature = sign(keypair, &self.canonical_bytes());
        debug!(kind = %self.kind(), grant = %self.grant.id, "grant countersigned");
        self.signature = Some(signature);
        self.header_key = Some(keypair.clone());
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
        let countersignature =
            countersignature(self.action, self.signature.as_ref(), self.kind())?;
        render(&GrantResponseBody {
            id: &self.grant.id,
            action: self.action,
            countersignature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::transaction::headers::FixedClock;
    use crate::transaction::share::ShareGranting;
    use crate::transaction::transfer::TransferOffer;

    fn keypair(seed: u8) -> KeyPair {
        KeyPair::from_seed(&[seed; 32])
    }

    fn signed_offer(owner: &KeyPair, receiver: &KeyPair) -> OfferRecord {
        let link = Link::from_bytes([0x42; 32]);
        let mut offer = TransferOffer::new(link, receiver.address(Network::Testnet));
        offer.sign(owner).unwrap();
        OfferRecord::new(
            "offer-1",
            link,
            receiver.address(Network::Testnet),
            *offer.signature().unwrap(),
        )
        .unwrap()
    }

    fn signed_grant(owner: &KeyPair, receiver: &KeyPair) -> ShareGrantRecord {
        let share_id = Link::from_bytes([0x24; 32]);
        let mut grant = ShareGranting::new(
            share_id,
            5,
            owner.address(Network::Testnet),
            receiver.address(Network::Testnet),
            900,
        )
        .unwrap();
        grant.sign(owner).unwrap();
        ShareGrantRecord::new(
            "grant-1",
            GrantRecordBody {
                share_id,
                quantity: 5,
                owner: owner.address(Network::Testnet),
                receiver: receiver.address(Network::Testnet),
                before_block: 900,
                signature: *grant.signature().unwrap(),
            },
        )
        .unwrap()
    }

    #[test]
    fn offer_record_needs_id() {
        let kp = keypair(1);
        assert_eq!(
            OfferRecord::new(
                "",
                Link::from_bytes([0; 32]),
                kp.address(Network::Testnet),
                kp.sign(b"x"),
            )
            .unwrap_err(),
            ValidationError::Empty { field: "offer id" }
        );
    }

    #[test]
    fn offer_record_parses_api_json() {
        let kp = keypair(1);
        let owner = kp.address(Network::Testnet);
        let sig = kp.sign(b"x");
        let json = format!(
            "{{\"id\":\"abc\",\"from\":\"{owner}\",\"to\":\"{owner}\",\
             \"record\":{{\"link\":\"{}\",\"owner\":\"{owner}\",\"signature\":\"{sig}\"}},\
             \"extra_info\":{{\"n\":1}},\"created_at\":\"2018-09-12T09:00:00Z\",\"open\":true}}",
            "ab".repeat(32)
        );
        let record: OfferRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.record.owner, owner);
        assert_eq!(record.record.signature, sig);
        assert!(record.open);
        assert_eq!(record.extra_info["n"], serde_json::json!(1));
    }

    #[test]
    fn grant_record_parses_api_json() {
        let kp = keypair(1);
        let owner = kp.address(Network::Testnet);
        let sig = kp.sign(b"x");
        let json = format!(
            "{{\"id\":\"g\",\"share_id\":\"{id}\",\"status\":\"pending\",\
             \"record\":{{\"shareId\":\"{id}\",\"quantity\":3,\"owner\":\"{owner}\",\
             \"recipient\":\"{owner}\",\"beforeBlock\":10,\"signature\":\"{sig}\"}}}}",
            id = "cd".repeat(32)
        );
        let record: ShareGrantRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.record.quantity, 3);
        assert_eq!(record.record.receiver, owner);
        assert_eq!(record.status.as_deref(), Some("pending"));
        record.validate().unwrap();
    }

    #[test]
    fn accept_countersigns_offer_record() {
        let (owner, receiver) = (keypair(1), keypair(2));
        let offer = signed_offer(&owner, &receiver);
        let mut response = TransferResponse::accept(offer.clone()).unwrap();
        assert_eq!(
            response.to_json(),
            Err(Error::State(StateError::NotSigned("transfer response")))
        );

        response.sign(&receiver).unwrap();
        assert!(response.verify(&receiver.public_key()));

        let mut expected = vec![0x05, 32];
        expected.extend_from_slice(&[0x42; 32]);
        expected.push(0x00);
        expected.push(33);
        expected.extend_from_slice(&receiver.address(Network::Testnet).pack());
        expected.push(64);
        expected.extend_from_slice(offer.record.signature.as_bytes());
        assert_eq!(response.canonical_bytes(), expected);

        let json = response.to_json().unwrap();
        assert_eq!(
            json,
            format!(
                "{{\"action\":\"accept\",\"countersignature\":\"{}\",\"id\":\"offer-1\"}}",
                response.signature().unwrap()
            )
        );
    }

    #[test]
    fn reject_and_cancel_render_unsigned() {
        let (owner, receiver) = (keypair(1), keypair(2));
        let offer = signed_offer(&owner, &receiver);

        let mut reject = TransferResponse::reject(offer.clone()).unwrap();
        assert_eq!(
            reject.to_json().unwrap(),
            "{\"action\":\"reject\",\"id\":\"offer-1\"}"
        );
        assert_eq!(
            reject.sign(&receiver),
            Err(Error::State(StateError::SignNotAllowed("reject")))
        );
        assert!(!reject.is_signed());

        let cancel = TransferResponse::cancel(offer, owner.address(Network::Testnet)).unwrap();
        assert_eq!(
            cancel.to_json().unwrap(),
            "{\"action\":\"cancel\",\"id\":\"offer-1\"}"
        );
    }

    #[test]
    fn transfer_requester_follows_action() {
        let (owner, receiver) = (keypair(1), keypair(2));
        let offer = signed_offer(&owner, &receiver);
        let current = owner.address(Network::Testnet);

        let accept = TransferResponse::accept(offer.clone()).unwrap();
        let reject = TransferResponse::reject(offer.clone()).unwrap();
        let cancel = TransferResponse::cancel(offer, current).unwrap();
        assert_eq!(accept.requester(), receiver.address(Network::Testnet));
        assert_eq!(reject.requester(), receiver.address(Network::Testnet));
        assert_eq!(cancel.requester(), current);
    }

    #[test]
    fn headers_need_a_key() {
        let (owner, receiver) = (keypair(1), keypair(2));
        let reject = TransferResponse::reject(signed_offer(&owner, &receiver)).unwrap();
        assert_eq!(
            reject.headers(None, &FixedClock(1)),
            Err(StateError::MissingHeaderKey)
        );

        let headers = reject.headers(Some(&receiver), &FixedClock(1_000)).unwrap();
        assert_eq!(headers.timestamp, 1_000);
        assert_eq!(headers.requester, receiver.address(Network::Testnet));
        assert!(headers.verify("offer-1", &receiver.public_key()));
    }

    #[test]
    fn accepted_grant_signs_headers_with_countersigning_key() {
        let (owner, receiver) = (keypair(3), keypair(4));
        let mut response = GrantResponse::accept(signed_grant(&owner, &receiver)).unwrap();
        assert_eq!(
            response.headers_at(None, 5),
            Err(StateError::MissingHeaderKey)
        );

        response.sign(&receiver).unwrap();
        let headers = response.headers(None, &FixedClock(5)).unwrap();
        assert_eq!(headers.requester, receiver.address(Network::Testnet));
        assert!(headers.verify("grant-1", &receiver.public_key()));

        let explicit = response.headers_at(Some(&owner), 5).unwrap();
        assert!(explicit.verify("grant-1", &owner.public_key()));
    }

    #[test]
    fn grant_accept_countersigns_grant_record() {
        let (owner, receiver) = (keypair(3), keypair(4));
        let grant = signed_grant(&owner, &receiver);
        let mut response = GrantResponse::accept(grant.clone()).unwrap();
        response.sign(&receiver).unwrap();
        assert!(response.verify(&receiver.public_key()));

        let r = &grant.record;
        let mut expected =
            pack_grant(&r.share_id, r.quantity, &r.owner, &r.receiver, r.before_block).finish();
        expected.push(64);
        expected.extend_from_slice(r.signature.as_bytes());
        assert_eq!(response.canonical_bytes(), expected);

        assert_eq!(
            response.to_json().unwrap(),
            format!(
                "{{\"id\":\"grant-1\",\"action\":\"accept\",\"countersignature\":\"{}\"}}",
                response.signature().unwrap()
            )
        );
    }

    #[test]
    fn grant_requester_follows_action() {
        let (owner, receiver) = (keypair(3), keypair(4));
        let grant = signed_grant(&owner, &receiver);

        let cancel = GrantResponse::cancel(grant.clone()).unwrap();
        let reject = GrantResponse::reject(grant).unwrap();
        assert_eq!(cancel.requester(), owner.address(Network::Testnet));
        assert_eq!(reject.requester(), receiver.address(Network::Testnet));
        assert_eq!(
            cancel.to_json().unwrap(),
            "{\"id\":\"grant-1\",\"action\":\"cancel\"}"
        );
    }

    #[test]
    fn grant_record_rejects_zero_quantity() {
        let (owner, receiver) = (keypair(3), keypair(4));
        let mut grant = signed_grant(&owner, &receiver);
        grant.record.quantity = 0;
        assert_eq!(
            GrantResponse::accept(grant).unwrap_err(),
            ValidationError::NonPositive { field: "quantity" }
        );
    }
}
