// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    cipher,
    constants::MAX_MESSAGE_BYTES,
    group::{CurveGroup, P256},
    kdf::derive_key,
    messages::{ChoiceMsg, CommitmentMsg, Payload, PayloadsMsg},
    OTError,
};

/// Sender of the 1-out-of-2 oblivious transfer.
///
/// Each transition consumes the sender, so a commitment can be sent only
/// once and a sender can't be driven past an error. An `Err` returned from
/// a transition is the aborted state: the sender has been dropped and its
/// messages wiped.
pub struct OTSender<S, G: CurveGroup = P256> {
    messages: [Zeroizing<Vec<u8>>; 2],
    commitment: G::Point,
    state: S,
}

/// Initial state of the sender.
#[derive(Debug)]
pub struct Created;

/// State of the sender after sending the commitment.
#[derive(Debug)]
pub struct Committed;

impl<G: CurveGroup> OTSender<Created, G> {
    /// Create a new sender for messages `m0` and `m1`.
    pub fn new<R: CryptoRng + RngCore>(
        m0: impl Into<Vec<u8>>,
        m1: impl Into<Vec<u8>>,
        rng: &mut R,
    ) -> Result<Self, OTError> {
        let messages = [Zeroizing::new(m0.into()), Zeroizing::new(m1.into())];

        if let Some(m) = messages.iter().find(|m| m.len() > MAX_MESSAGE_BYTES)
        {
            return Err(OTError::MessageTooLarge(m.len()));
        }

        let c = Zeroizing::new(G::random_scalar(rng)?);

        Self::with_messages(messages, &c)
    }

    /// Create a sender from a caller-chosen commitment secret `c`.
    /// Reusing `c` for a second transfer breaks the receiver's privacy.
    /// A zero `c` is rejected with [`OTError::InvalidSecret`].
    pub fn new_with_secret(
        m0: impl Into<Vec<u8>>,
        m1: impl Into<Vec<u8>>,
        c: &G::Scalar,
    ) -> Result<Self, OTError> {
        let messages = [Zeroizing::new(m0.into()), Zeroizing::new(m1.into())];

        if let Some(m) = messages.iter().find(|m| m.len() > MAX_MESSAGE_BYTES)
        {
            return Err(OTError::MessageTooLarge(m.len()));
        }

        Self::with_messages(messages, c)
    }

    // `c` is not kept: only C is needed later and the receiver must never
    // learn log(C).
    fn with_messages(
        messages: [Zeroizing<Vec<u8>>; 2],
        c: &G::Scalar,
    ) -> Result<Self, OTError> {
        let commitment = G::mul(c, &G::generator());

        if G::is_identity(&commitment) {
            return Err(OTError::InvalidSecret);
        }

        Ok(Self {
            messages,
            commitment,
            state: Created,
        })
    }

    /// Generate the 1st message of the protocol.
    pub fn commit(self) -> (OTSender<Committed, G>, CommitmentMsg) {
        let msg = CommitmentMsg {
            commitment: G::encode(&self.commitment),
        };

        let next = OTSender {
            messages: self.messages,
            commitment: self.commitment,
            state: Committed,
        };

        (next, msg)
    }
}

impl<G: CurveGroup> OTSender<Committed, G> {
    /// Process the receiver's public keys and produce the final message.
    ///
    /// Fails closed: if `PK0 + PK1 != C` nothing derived from either
    /// message is produced.
    pub fn receive_choice<R: CryptoRng + RngCore>(
        self,
        msg: &ChoiceMsg,
        rng: &mut R,
    ) -> Result<PayloadsMsg, OTError> {
        let pk0 = G::decode(&msg.public_keys[0])?;
        let pk1 = G::decode(&msg.public_keys[1])?;

        if !bool::from(G::add(&pk0, &pk1).ct_eq(&self.commitment)) {
            return Err(OTError::ProtocolViolation);
        }

        let first = seal::<G, R>(&pk0, &self.messages[0], rng)?;
        let second = seal::<G, R>(&pk1, &self.messages[1], rng)?;

        Ok(PayloadsMsg {
            payloads: [first, second],
        })
    }
}

/// Encrypt `message` for whoever knows `log(pk)`.
fn seal<G: CurveGroup, R: CryptoRng + RngCore>(
    pk: &G::Point,
    message: &[u8],
    rng: &mut R,
) -> Result<Payload, OTError> {
    let r = Zeroizing::new(G::random_scalar(rng)?);

    let ephemeral = G::mul(&r, &G::generator());
    let key = derive_key::<G>(&G::mul(&r, pk));

    Ok(Payload {
        ephemeral: G::encode(&ephemeral),
        ciphertext: cipher::encrypt(&key, message, rng)?,
    })
}

impl<S: std::fmt::Debug, G: CurveGroup> std::fmt::Debug for OTSender<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OTSender")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
