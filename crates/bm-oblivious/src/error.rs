// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

use bm_relay::TransportError;
use thiserror::Error;

/// Errors of an oblivious transfer session.
///
/// Every error is terminal for the session that produced it. A retry
/// needs a brand new sender and receiver with fresh randomness.
#[derive(Error, Debug)]
pub enum OTError {
    /// Point or message bytes received from the peer are malformed,
    /// off-curve or the identity.
    #[error("Invalid encoding")]
    InvalidEncoding,

    /// The receiver's public keys do not sum up to the commitment.
    #[error("Protocol violation: PK0 + PK1 != C")]
    ProtocolViolation,

    /// Decryption of the chosen payload failed.
    #[error("Decryption failed")]
    DecryptionFailed,

    /// A message arrived out of the expected protocol order.
    #[error("Unexpected message for the current protocol state")]
    StateViolation,

    /// A caller-supplied secret scalar is zero or yields the identity.
    #[error("Degenerate secret scalar")]
    InvalidSecret,

    /// Secure random source is unavailable.
    #[error("Secure random source failed")]
    RandomnessFailure,

    /// A sender message does not fit in the wire format.
    #[error("Message of {0} bytes is too large")]
    MessageTooLarge(usize),

    /// Frame transport failed, timed out or was closed by the peer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl OTError {
    /// Returns true if the error should stop the process from producing
    /// any further secret material, not just this session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OTError::RandomnessFailure)
    }
}
