// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! Run one side of the transfer over a [`Relay`].

use std::{marker::PhantomData, time::Duration};

use bm_relay::{BytesMut, Relay, TransportError};
use rand::{CryptoRng, RngCore};
use tokio::time::timeout;
use zeroize::Zeroize;

use crate::{
    constants::MAX_MESSAGE_BYTES,
    frame::{decode_frame, encode_frame, MessageKind},
    group::{CurveGroup, P256},
    messages::{ChoiceMsg, CommitmentMsg, PayloadsMsg},
    receiver::{self, ChoiceBit, OTReceiver},
    sender::{self, OTSender},
    OTError,
};

/// Default time to wait for each frame from the peer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on an incoming frame. Fits a Payloads message carrying
/// two messages of [`MAX_MESSAGE_BYTES`].
pub const DEFAULT_MAX_FRAME_LEN: usize = 2 * MAX_MESSAGE_BYTES + 4096;

/// Parameters of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// How long to wait for each frame from the peer.
    pub timeout: Duration,

    /// Frames with a longer body are rejected before parsing.
    pub max_frame_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl SessionConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

/// A single oblivious transfer driven over a relay.
///
/// The session is consumed by [`send`](Self::send) or
/// [`receive`](Self::receive), together with the relay it owns. Pass
/// `&mut relay` to keep the connection after the session.
pub struct TransferSession<R, G = P256> {
    relay: R,
    config: SessionConfig,
    marker: PhantomData<fn() -> G>,
}

impl<R: Relay> TransferSession<R, P256> {
    pub fn new(relay: R, config: SessionConfig) -> Self {
        Self::with_group(relay, config)
    }
}

impl<R: Relay, G: CurveGroup> TransferSession<R, G> {
    /// Create a session over an explicit group.
    pub fn with_group(relay: R, config: SessionConfig) -> Self {
        Self {
            relay,
            config,
            marker: PhantomData,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Play the sender with messages `m0` and `m1`.
    ///
    /// Returns once the payloads are sent. The sender never learns which
    /// message the receiver was able to open.
    pub async fn send<T: CryptoRng + RngCore + Send>(
        mut self,
        m0: impl Into<Vec<u8>>,
        m1: impl Into<Vec<u8>>,
        rng: &mut T,
    ) -> Result<(), OTError> {
        let sender = OTSender::<sender::Created, G>::new(m0, m1, rng)?;

        let result = self.run_sender(sender, rng).await;

        if let Err(err) = &result {
            tracing::warn!(%err, "OT sender aborted");
        }

        result
    }

    /// Play the receiver and return `m_b`.
    pub async fn receive<T: CryptoRng + RngCore + Send>(
        mut self,
        choice: impl Into<ChoiceBit>,
        rng: &mut T,
    ) -> Result<Vec<u8>, OTError> {
        let receiver = OTReceiver::<receiver::Created, G>::new(choice);

        let result = self.run_receiver(receiver, rng).await;

        if let Err(err) = &result {
            tracing::warn!(%err, "OT receiver aborted");
        }

        result
    }

    /// Same as [`receive`](Self::receive) for text messages. A message
    /// that is not valid UTF-8 is reported as
    /// [`OTError::DecryptionFailed`].
    pub async fn receive_utf8<T: CryptoRng + RngCore + Send>(
        self,
        choice: impl Into<ChoiceBit>,
        rng: &mut T,
    ) -> Result<String, OTError> {
        let message = self.receive(choice, rng).await?;

        String::from_utf8(message).map_err(|err| {
            err.into_bytes().zeroize();
            OTError::DecryptionFailed
        })
    }

    async fn run_sender<T: CryptoRng + RngCore + Send>(
        &mut self,
        sender: OTSender<sender::Created, G>,
        rng: &mut T,
    ) -> Result<(), OTError> {
        let (sender, commitment) = sender.commit();
        self.send_frame(MessageKind::Commitment, &commitment.to_bytes())
            .await?;

        let body = self.recv_frame(MessageKind::Choice).await?;
        let choice = ChoiceMsg::from_bytes::<G>(&body)?;

        let payloads = sender.receive_choice(&choice, rng)?;
        self.send_frame(MessageKind::Payloads, &payloads.to_bytes()?)
            .await?;

        tracing::debug!("OT sender done");

        Ok(())
    }

    async fn run_receiver<T: CryptoRng + RngCore + Send>(
        &mut self,
        receiver: OTReceiver<receiver::Created, G>,
        rng: &mut T,
    ) -> Result<Vec<u8>, OTError> {
        let body = self.recv_frame(MessageKind::Commitment).await?;
        let commitment = CommitmentMsg::from_bytes::<G>(&body)?;

        let (receiver, choice) = receiver.receive_commitment(&commitment, rng)?;
        self.send_frame(MessageKind::Choice, &choice.to_bytes())
            .await?;

        let body = self.recv_frame(MessageKind::Payloads).await?;
        let payloads = PayloadsMsg::from_bytes::<G>(&body)?;

        let message = receiver.receive_payloads(&payloads)?;

        tracing::debug!("OT receiver done");

        Ok(message)
    }

    async fn send_frame(
        &self,
        kind: MessageKind,
        body: &[u8],
    ) -> Result<(), OTError> {
        let frame = encode_frame(kind, body)?;

        tracing::debug!(?kind, len = body.len(), "send frame");

        self.relay
            .send(frame)
            .await
            .map_err(TransportError::Send)?;

        Ok(())
    }

    async fn recv_frame(
        &mut self,
        expected: MessageKind,
    ) -> Result<BytesMut, OTError> {
        let wait = self.config.timeout;

        let frame = timeout(wait, self.relay.next())
            .await
            .map_err(|_| TransportError::Timeout(wait))?
            .ok_or(TransportError::Closed)?;

        let (kind, body) = decode_frame(frame, self.config.max_frame_len)?;

        tracing::debug!(?kind, len = body.len(), "recv frame");

        if kind != expected {
            return Err(OTError::StateViolation);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod test {
    use bm_relay::SimplePair;
    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn config_builders() {
        let config = SessionConfig::default()
            .with_timeout(Duration::from_millis(5))
            .with_max_frame_len(100);

        assert_eq!(config.timeout, Duration::from_millis(5));
        assert_eq!(config.max_frame_len, 100);
        assert_eq!(SessionConfig::default().timeout, DEFAULT_TIMEOUT);

        let (a, _b) = SimplePair::connect();
        let session = TransferSession::new(a, config);
        assert_eq!(session.config(), &config);
    }

    #[tokio::test]
    async fn session_round_trip() {
        let (a, b) = SimplePair::connect();
        let config = SessionConfig::default();

        let sender = tokio::spawn(async move {
            TransferSession::new(a, config)
                .send("left", "right", &mut OsRng)
                .await
        });

        let out = TransferSession::new(b, config)
            .receive(true, &mut OsRng)
            .await
            .unwrap();

        sender.await.unwrap().unwrap();
        assert_eq!(out, b"right");
    }

    #[tokio::test]
    async fn receive_utf8_rejects_invalid_text() {
        let (a, b) = SimplePair::connect();
        let config = SessionConfig::default();

        let sender = tokio::spawn(async move {
            TransferSession::new(a, config)
                .send(vec![0xff, 0xfe], "ok", &mut OsRng)
                .await
        });

        let res = TransferSession::new(b, config)
            .receive_utf8(false, &mut OsRng)
            .await;

        sender.await.unwrap().unwrap();
        assert!(matches!(res, Err(OTError::DecryptionFailed)));
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let (a, b) = SimplePair::connect();

        let sender = tokio::spawn(async move {
            TransferSession::new(a, SessionConfig::default())
                .send(vec![1; 1000], "x", &mut OsRng)
                .await
        });

        let res = TransferSession::new(
            b,
            SessionConfig::default().with_max_frame_len(512),
        )
        .receive(false, &mut OsRng)
        .await;

        assert!(matches!(res, Err(OTError::InvalidEncoding)));

        // the payloads were queued before the receiver looked at them
        sender.await.unwrap().unwrap();
    }
}
