use tokio::sync::{mpsc, Mutex};

use super::{Bytes, BytesMut, MessageSendError, Relay};

const PAIR_QUEUE_DEPTH: usize = 4;

/// Simple two party message relay
pub struct SimplePair {
    out: Mutex<Option<mpsc::Sender<BytesMut>>>,
    inq: mpsc::Receiver<BytesMut>,
}

impl SimplePair {
    /// Create a connected pair of message relays
    pub fn connect() -> (SimplePair, SimplePair) {
        let (out_tx, out_rx) = mpsc::channel(PAIR_QUEUE_DEPTH);
        let (in_tx, in_rx) = mpsc::channel(PAIR_QUEUE_DEPTH);

        let client = SimplePair {
            out: Mutex::new(Some(out_tx)),
            inq: in_rx,
        };

        let server = SimplePair {
            out: Mutex::new(Some(in_tx)),
            inq: out_rx,
        };

        (client, server)
    }

    /// Close the outgoing direction. The peer observes end of stream
    /// once it has drained the frames already queued.
    pub async fn close(&self) {
        self.out.lock().await.take();
    }
}

impl Relay for SimplePair {
    async fn feed(&self, message: Bytes) -> Result<(), MessageSendError> {
        let tx = self.out.lock().await.clone().ok_or(MessageSendError)?;

        tx.send(BytesMut::from(&message[..]))
            .await
            .map_err(|_| MessageSendError)
    }

    async fn next(&mut self) -> Option<BytesMut> {
        self.inq.recv().await
    }
}
