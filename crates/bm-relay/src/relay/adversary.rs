// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

use std::sync::Mutex;

use super::{Bytes, BytesMut, MessageSendError, Relay};

type Rewrite = Box<dyn FnMut(usize, BytesMut) -> Option<BytesMut> + Send>;

/// Relay wrapper that lets a test play an active network adversary.
///
/// Every incoming frame is passed to the rewrite function together with
/// its position in the stream. Returning `None` drops the frame.
pub struct Tamper<R> {
    relay: R,
    rewrite: Mutex<Rewrite>,
    seen: usize,
    injects: Vec<BytesMut>,
}

impl<R: Relay> Tamper<R> {
    pub fn new<F>(relay: R, rewrite: F) -> Self
    where
        F: FnMut(usize, BytesMut) -> Option<BytesMut> + Send + 'static,
    {
        Self {
            relay,
            rewrite: Mutex::new(Box::new(rewrite)),
            seen: 0,
            injects: vec![],
        }
    }

    /// Deliver `msg` before anything the peer sends.
    pub fn inject_message(mut self, msg: &[u8]) -> Self {
        let mut bytes = BytesMut::with_capacity(msg.len());
        bytes.extend_from_slice(msg);
        self.injects.push(bytes);

        self
    }

    pub fn into_inner(self) -> R {
        self.relay
    }
}

impl<R: Relay> Relay for Tamper<R> {
    async fn feed(&self, message: Bytes) -> Result<(), MessageSendError> {
        self.relay.feed(message).await
    }

    async fn flush(&self) -> Result<(), MessageSendError> {
        self.relay.flush().await
    }

    async fn next(&mut self) -> Option<BytesMut> {
        if !self.injects.is_empty() {
            return Some(self.injects.remove(0));
        }

        loop {
            let msg = self.relay.next().await?;
            let idx = self.seen;
            self.seen += 1;

            let rewritten = {
                let mut rewrite =
                    self.rewrite.lock().unwrap_or_else(|e| e.into_inner());
                (*rewrite)(idx, msg)
            };

            if let Some(msg) = rewritten {
                tracing::debug!(idx, "tamper relay delivering frame");
                return Some(msg);
            }

            tracing::debug!(idx, "tamper relay dropped frame");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::relay::pair::SimplePair;

    #[tokio::test]
    async fn rewrite_and_drop() {
        let (p1, p2) = SimplePair::connect();

        let mut evil = Tamper::new(p2, |idx, mut msg| {
            if idx == 0 {
                return None;
            }
            msg[0] ^= 0xff;
            Some(msg)
        });

        p1.send(Bytes::from_static(&[1])).await.unwrap();
        p1.send(Bytes::from_static(&[2])).await.unwrap();

        let m = evil.next().await.unwrap();
        assert_eq!(&m[..], &[0xfd]);
    }

    #[tokio::test]
    async fn into_inner_stops_rewriting() {
        let (p1, p2) = SimplePair::connect();
        let evil = Tamper::new(p2, |_, _| None);

        p1.send(Bytes::from_static(&[5])).await.unwrap();

        let mut p2 = evil.into_inner();
        assert_eq!(&p2.next().await.unwrap()[..], &[5]);
    }

    #[tokio::test]
    async fn injected_first() {
        let (p1, p2) = SimplePair::connect();
        let mut evil = Tamper::new(p2, |_, msg| Some(msg)).inject_message(&[9, 9]);

        p1.send(Bytes::from_static(&[1])).await.unwrap();

        assert_eq!(&evil.next().await.unwrap()[..], &[9, 9]);
        assert_eq!(&evil.next().await.unwrap()[..], &[1]);
    }
}
