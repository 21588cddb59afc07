// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

use std::{future::Future, time::Duration};

pub use bytes::{Bytes, BytesMut};

pub mod adversary;
pub mod pair;

/// The underlying connection refused an outgoing frame.
#[derive(Debug, Copy, Clone, thiserror::Error)]
#[error("message send error")]
pub struct MessageSendError;

/// Failure of the frame transport, as seen by a protocol session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the connection before the expected frame arrived.
    #[error("relay closed by peer")]
    Closed,

    /// Sending a frame failed.
    #[error(transparent)]
    Send(#[from] MessageSendError),

    /// No frame arrived within the session timeout.
    #[error("no message from peer within {0:?}")]
    Timeout(Duration),
}

pub trait Relay: Send + Sync {
    /// Send the message and flush the output queue, if any.
    fn send(
        &self,
        message: Bytes,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send {
        async move {
            self.feed(message).await?;
            self.flush().await
        }
    }

    /// Prepare a message to output. Possibly putting into an output queue.
    fn feed(
        &self,
        message: Bytes,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send;

    /// Flush all pending/bufferred messages
    fn flush(
        &self,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send {
        async { Ok(()) }
    }

    /// Receive a message. Return None is underlying connection is closed.
    fn next(&mut self) -> impl Future<Output = Option<BytesMut>> + Send;
}

impl<R: Relay> Relay for &mut R {
    fn feed(
        &self,
        message: Bytes,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send {
        (**self).feed(message)
    }

    fn flush(
        &self,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send {
        (**self).flush()
    }

    fn send(
        &self,
        message: Bytes,
    ) -> impl Future<Output = Result<(), MessageSendError>> + Send {
        (**self).send(message)
    }

    fn next(&mut self) -> impl Future<Output = Option<BytesMut>> + Send {
        (**self).next()
    }
}
