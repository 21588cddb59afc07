// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

use std::{fmt, marker::PhantomData};

use subtle::Choice;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::{
    cipher,
    group::{CurveGroup, P256},
    kdf::derive_key,
    messages::{ChoiceMsg, CommitmentMsg, PayloadsMsg},
    OTError,
};

/// The receiver's secret choice `b`.
///
/// `Debug` does not reveal the bit.
#[derive(Clone, Copy)]
pub struct ChoiceBit(Choice);

impl ChoiceBit {
    pub fn new(bit: bool) -> Self {
        Self(Choice::from(bit as u8))
    }

    /// Index of the message this choice selects.
    pub fn index(&self) -> usize {
        self.0.unwrap_u8() as usize
    }
}

impl From<bool> for ChoiceBit {
    fn from(bit: bool) -> Self {
        Self::new(bit)
    }
}

impl From<ChoiceBit> for Choice {
    fn from(bit: ChoiceBit) -> Self {
        bit.0
    }
}

impl fmt::Debug for ChoiceBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChoiceBit(..)")
    }
}

/// Receiver of the 1-out-of-2 oblivious transfer.
///
/// Each transition consumes the receiver. An `Err` returned from a
/// transition is the aborted state; the secret scalar has been wiped.
pub struct OTReceiver<S, G: CurveGroup = P256> {
    choice: ChoiceBit,
    state: S,
    marker: PhantomData<fn() -> G>,
}

/// Initial state of the receiver. No cryptographic work done yet.
#[derive(Debug)]
pub struct Created;

/// State of the receiver after sending its public keys.
pub struct Chosen<G: CurveGroup> {
    secret: Zeroizing<G::Scalar>,
}

impl<G: CurveGroup> fmt::Debug for Chosen<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Chosen")
    }
}

impl<G: CurveGroup> OTReceiver<Created, G> {
    /// Create a new receiver for choice `b`.
    pub fn new(choice: impl Into<ChoiceBit>) -> Self {
        Self {
            choice: choice.into(),
            state: Created,
            marker: PhantomData,
        }
    }

    /// Blind the choice against the sender's commitment.
    ///
    /// Returns `(PK0, PK1)` with `PK0 + PK1 = C` for either value of `b`,
    /// so the pair alone tells nothing about `b`.
    pub fn receive_commitment<R: CryptoRng + RngCore>(
        self,
        msg: &CommitmentMsg,
        rng: &mut R,
    ) -> Result<(OTReceiver<Chosen<G>, G>, ChoiceMsg), OTError> {
        let c = G::decode(&msg.commitment)?;
        let k = Zeroizing::new(G::random_scalar(rng)?);

        self.blind(&c, k)
    }

    /// Same as [`Self::receive_commitment`] with a caller-chosen secret `k`.
    /// Fails with [`OTError::InvalidSecret`] if `k` is zero or `k * G = C`.
    pub fn receive_commitment_with_secret(
        self,
        msg: &CommitmentMsg,
        k: G::Scalar,
    ) -> Result<(OTReceiver<Chosen<G>, G>, ChoiceMsg), OTError> {
        let k = Zeroizing::new(k);
        let c = G::decode(&msg.commitment)?;

        self.blind(&c, k)
    }

    fn blind(
        self,
        c: &G::Point,
        k: Zeroizing<G::Scalar>,
    ) -> Result<(OTReceiver<Chosen<G>, G>, ChoiceMsg), OTError> {
        let b = Choice::from(self.choice);

        let chosen = G::mul(&k, &G::generator());
        let other = G::add(c, &G::negate(&chosen));

        // Either key being the identity would give a short Choice message.
        if G::is_identity(&chosen) || G::is_identity(&other) {
            return Err(OTError::InvalidSecret);
        }

        let pk0 = G::select(&chosen, &other, b);
        let pk1 = G::select(&other, &chosen, b);

        let msg = ChoiceMsg {
            public_keys: [G::encode(&pk0), G::encode(&pk1)],
        };

        let next = OTReceiver {
            choice: self.choice,
            state: Chosen { secret: k },
            marker: PhantomData,
        };

        Ok((next, msg))
    }
}

impl<G: CurveGroup> OTReceiver<Chosen<G>, G> {
    /// Recover `m_b` from the final message.
    ///
    /// Both ephemeral points are validated so malformed input is rejected
    /// the same way whatever `b` is. Only the key for index `b` is derived.
    pub fn receive_payloads(self, msg: &PayloadsMsg) -> Result<Vec<u8>, OTError> {
        let [p0, p1] = &msg.payloads;

        let e0 = G::decode(&p0.ephemeral)?;
        let e1 = G::decode(&p1.ephemeral)?;

        let e_b = G::select(&e0, &e1, Choice::from(self.choice));
        let key = derive_key::<G>(&G::mul(&self.state.secret, &e_b));

        // Ciphertext lengths are public, indexing by b leaks nothing new.
        let payload = &msg.payloads[self.choice.index()];

        cipher::decrypt(&key, payload.ciphertext.as_bytes())
    }
}

impl<S: fmt::Debug, G: CurveGroup> fmt::Debug for OTReceiver<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OTReceiver")
            .field("choice", &self.choice)
            .field("state", &self.state)
            .finish()
    }
}
