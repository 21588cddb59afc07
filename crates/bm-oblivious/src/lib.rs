// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! 1-out-of-2 base oblivious transfer over P-256.
//!
//! The sender holds two messages, the receiver a choice bit `b`. After
//! three messages the receiver knows `m_b` and nothing about `m_{1-b}`,
//! and the sender knows nothing about `b`.

/// Domain labels and sizes
pub mod constants;

/// Prime order group
pub mod group;

/// Point to key derivation
pub mod kdf;

/// Authenticated payload encryption
pub mod cipher;

/// Protocol messages
pub mod messages;

/// Wire frames
pub mod frame;

/// Sender state machine
pub mod sender;

/// Receiver state machine
pub mod receiver;

/// Relay driven sessions
pub mod session;

mod error;

pub use error::OTError;
pub use group::{CurveGroup, P256};
pub use messages::{ChoiceMsg, CommitmentMsg, Payload, PayloadsMsg};
pub use receiver::{ChoiceBit, OTReceiver};
pub use sender::OTSender;
pub use session::{SessionConfig, TransferSession};
