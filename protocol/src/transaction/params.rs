//! The shared lifecycle of every transaction parameter object, and the
//! [`TransactionParams`] sum type over all of them.
//!
//! ```text
//! construct (validated) ──> [generate nonces] ──> sign ──> to_json
//! ```
//!
//! Construction either succeeds with every field valid or fails without
//! producing an object. `sign` may be called again and overwrites the
//! previous signature. `to_json` refuses to render a body whose protocol
//! form needs a signature that is not there yet.

use serde::Serialize;

use super::issuance::Issuance;
use super::registration::Registration;
use super::response::{GrantResponse, TransferResponse};
use super::share::{Share, ShareGranting};
use super::transfer::{Transfer, TransferOffer};
use super::types::TransactionKind;
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{Error, StateError};

/// Behaviour common to every parameter object.
pub trait SignableParams {
    fn kind(&self) -> TransactionKind;

    /// Signs the canonical record with `keypair`, replacing any earlier signature.
    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error>;

    fn is_signed(&self) -> bool;

    /// Checks the stored signature(s) against `public_key`. `false` when unsigned.
    fn verify(&self, public_key: &PublicKey) -> bool;

    /// Renders the wire body as compact JSON.
    fn to_json(&self) -> Result<String, Error>;
}

/// Renders a typed wire body. Field order is the struct's declaration order.
pub(crate) fn render<T: Serialize>(body: &T) -> Result<String, Error> {
    serde_json::to_string(body).map_err(|e| Error::Encoding(e.to_string()))
}

/// Returns the signature or the "sign first" error for `kind`.
pub(crate) fn require_signed<T: ?Sized>(
    signature: Option<&T>,
    kind: TransactionKind,
) -> Result<&T, StateError> {
    signature.ok_or(StateError::NotSigned(kind.as_str()))
}

/// One parameter object of any kind.
#[derive(Debug, Clone)]
pub enum TransactionParams {
    Registration(Registration),
    Issuance(Issuance),
    Transfer(Transfer),
    TransferOffer(TransferOffer),
    TransferResponse(TransferResponse),
    Share(Share),
    ShareGranting(ShareGranting),
    GrantResponse(GrantResponse),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            TransactionParams::Registration($p) => $body,
            TransactionParams::Issuance($p) => $body,
            TransactionParams::Transfer($p) => $body,
            TransactionParams::TransferOffer($p) => $body,
            TransactionParams::TransferResponse($p) => $body,
            TransactionParams::Share($p) => $body,
            TransactionParams::ShareGranting($p) => $body,
            TransactionParams::GrantResponse($p) => $body,
        }
    };
}

impl SignableParams for TransactionParams {
    fn kind(&self) -> TransactionKind {
        dispatch!(self, p => p.kind())
    }

    fn sign(&mut self, keypair: &KeyPair) -> Result<(), Error> {
        dispatch!(self, p => p.sign(keypair))
    }

    fn is_signed(&self) -> bool {
        dispatch!(self, p => p.is_signed())
    }

    fn verify(&self, public_key: &PublicKey) -> bool {
        dispatch!(self, p => p.verify(public_key))
    }

    fn to_json(&self) -> Result<String, Error> {
        dispatch!(self, p => p.to_json())
    }
}

macro_rules! impl_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for TransactionParams {
                fn from(params: $variant) -> Self {
                    TransactionParams::$variant(params)
                }
            }
        )*
    };
}

impl_from!(
    Registration,
    Issuance,
    Transfer,
    TransferOffer,
    TransferResponse,
    Share,
    ShareGranting,
    GrantResponse,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::transaction::types::Link;

    #[test]
    fn sum_type_dispatches_lifecycle() {
        let kp = KeyPair::generate();
        let owner = KeyPair::generate().address(Network::Testnet);
        let link = Link::from_bytes([3u8; 32]);
        let mut params: TransactionParams = Transfer::new(link, owner).into();

        assert_eq!(params.kind(), TransactionKind::Transfer);
        assert!(!params.is_signed());
        assert_eq!(
            params.to_json(),
            Err(Error::State(StateError::NotSigned("transfer")))
        );

        params.sign(&kp).unwrap();
        assert!(params.is_signed());
        assert!(params.verify(&kp.public_key()));
        assert!(params.to_json().unwrap().starts_with("{\"transfer\":"));
    }

    #[test]
    fn require_signed_names_the_kind() {
        let none: Option<&u8> = None;
        assert_eq!(
            require_signed(none, TransactionKind::Share),
            Err(StateError::NotSigned("share"))
        );
    }
}
