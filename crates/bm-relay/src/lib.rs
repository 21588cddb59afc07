// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! Transport seam for two party protocol sessions.
//!
//! A [`Relay`] moves opaque frames between exactly two parties, in order.
//! The concrete transport (socket, TLS, websocket) lives outside this
//! workspace; [`SimplePair`] is an in-memory implementation for local runs
//! and tests.

pub mod relay;

pub use bytes::{Bytes, BytesMut};

pub use relay::{
    adversary::Tamper, pair::SimplePair, MessageSendError, Relay,
    TransportError,
};
