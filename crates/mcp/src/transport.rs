//! In-process duplex transport.
//!
//! Two endpoints are created together. Endpoint A's outgoing channel is the
//! incoming channel of endpoint B and vice versa, so a server and a client
//! can run a full MCP session without a socket, a process, or a pipe.
//! Messages cross as values; nothing is serialized.

use std::future::Future;

use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::service::{RxJsonRpcMessage, ServiceRole, TxJsonRpcMessage};
use rmcp::transport::Transport;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Messages buffered per direction before a writer has to wait for the reader.
pub const DEFAULT_CAPACITY: usize = 32;

/// Client side of an MCP duplex: sends client messages, receives server ones.
pub type ClientTransport = InMemoryTransport<ClientJsonRpcMessage, ServerJsonRpcMessage>;

/// Server side of an MCP duplex.
pub type ServerTransport = InMemoryTransport<ServerJsonRpcMessage, ClientJsonRpcMessage>;

/// Create a connected client/server endpoint pair.
///
/// Both endpoints still have to be [started](InMemoryTransport::start).
pub fn duplex() -> (ClientTransport, ServerTransport) {
    InMemoryTransport::pair()
}

/// One endpoint of an in-memory duplex channel pair.
///
/// Each direction is a bounded single-producer/single-consumer queue: a slow
/// reader blocks the writer instead of dropping messages. Dropping or closing
/// an endpoint ends both directions for its peer.
#[derive(Debug)]
pub struct InMemoryTransport<Out, In> {
    outgoing: Option<mpsc::Sender<Out>>,
    incoming: mpsc::Receiver<In>,
    started: bool,
}

impl<Out, In> InMemoryTransport<Out, In>
where
    Out: Send + 'static,
    In: Send + 'static,
{
    /// Create two connected endpoints.
    pub fn pair() -> (Self, InMemoryTransport<In, Out>) {
        Self::pair_with_capacity(DEFAULT_CAPACITY)
    }

    /// Create two connected endpoints buffering at most `capacity` messages
    /// per direction.
    pub fn pair_with_capacity(capacity: usize) -> (Self, InMemoryTransport<In, Out>) {
        let capacity = capacity.max(1);
        let (a_out, b_in) = mpsc::channel(capacity);
        let (b_out, a_in) = mpsc::channel(capacity);
        (
            InMemoryTransport::wire(a_out, a_in),
            InMemoryTransport::wire(b_out, b_in),
        )
    }

    fn wire(outgoing: mpsc::Sender<Out>, incoming: mpsc::Receiver<In>) -> Self {
        Self {
            outgoing: Some(outgoing),
            incoming,
            started: false,
        }
    }

    /// Activate both directions of this endpoint.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted);
        }
        self.started = true;
        debug!("in-memory transport started");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Queue `message` for the peer, waiting while its buffer is full.
    ///
    /// The returned future does not borrow the endpoint.
    pub fn send(&self, message: Out) -> impl Future<Output = Result<()>> + Send + 'static {
        let outgoing = match (self.started, &self.outgoing) {
            (false, _) => Err(Error::NotStarted),
            (true, None) => Err(Error::Closed),
            (true, Some(sender)) => Ok(sender.clone()),
        };
        async move {
            outgoing?
                .send(message)
                .await
                .map_err(|_| Error::Closed)
        }
    }

    /// Next message from the peer; `None` once the peer is gone.
    pub async fn recv(&mut self) -> Result<Option<In>> {
        if !self.started {
            return Err(Error::NotStarted);
        }
        Ok(self.incoming.recv().await)
    }

    /// Stop sending and stop accepting. Already queued messages can still
    /// be received.
    pub fn close(&mut self) {
        self.outgoing = None;
        self.incoming.close();
    }
}

impl<R> Transport<R> for InMemoryTransport<TxJsonRpcMessage<R>, RxJsonRpcMessage<R>>
where
    R: ServiceRole,
    TxJsonRpcMessage<R>: Send + 'static,
    RxJsonRpcMessage<R>: Send + 'static,
{
    type Error = Error;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<R>,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        InMemoryTransport::send(self, item)
    }

    async fn receive(&mut self) -> Option<RxJsonRpcMessage<R>> {
        match self.recv().await {
            Ok(message) => message,
            Err(e) => {
                warn!("in-memory transport cannot receive: {e}");
                None
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        InMemoryTransport::close(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    type Frames = InMemoryTransport<String, String>;

    fn started_pair(capacity: usize) -> (Frames, Frames) {
        let (mut a, mut b) = Frames::pair_with_capacity(capacity);
        a.start().unwrap();
        b.start().unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn messages_cross_in_both_directions() {
        let (mut a, mut b) = started_pair(DEFAULT_CAPACITY);

        a.send("ping".into()).await.unwrap();
        assert_eq!(b.recv().await.unwrap().as_deref(), Some("ping"));

        b.send("pong".into()).await.unwrap();
        assert_eq!(a.recv().await.unwrap().as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn messages_arrive_in_write_order() {
        let (a, mut b) = started_pair(DEFAULT_CAPACITY);
        for i in 0..10 {
            a.send(i.to_string()).await.unwrap();
        }
        for i in 0..10 {
            assert_eq!(b.recv().await.unwrap(), Some(i.to_string()));
        }
    }

    #[tokio::test]
    async fn full_channel_blocks_writer_until_read() {
        let (a, mut b) = started_pair(1);
        a.send("first".into()).await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), a.send("second".into())).await;
        assert!(blocked.is_err(), "writer should wait for the reader");

        assert_eq!(b.recv().await.unwrap().as_deref(), Some("first"));
        a.send("third".into()).await.unwrap();
        assert_eq!(b.recv().await.unwrap().as_deref(), Some("third"));
    }

    #[tokio::test]
    async fn unstarted_endpoint_rejects_io() {
        let (mut a, _b) = Frames::pair();
        assert!(matches!(a.send("x".into()).await, Err(Error::NotStarted)));
        assert!(matches!(a.recv().await, Err(Error::NotStarted)));
    }

    #[test]
    fn start_twice_fails() {
        let (mut a, _b) = Frames::pair();
        a.start().unwrap();
        assert!(a.is_started());
        assert!(matches!(a.start(), Err(Error::AlreadyStarted)));
    }

    #[tokio::test]
    async fn dropped_peer_closes_channel() {
        let (mut a, b) = started_pair(DEFAULT_CAPACITY);
        drop(b);
        assert_eq!(a.recv().await.unwrap(), None);
        assert!(matches!(a.send("x".into()).await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn closed_endpoint_ends_the_peer_stream() {
        let (mut a, mut b) = started_pair(DEFAULT_CAPACITY);
        a.send("last".into()).await.unwrap();
        a.close();

        assert!(matches!(a.send("late".into()).await, Err(Error::Closed)));
        assert_eq!(b.recv().await.unwrap().as_deref(), Some("last"));
        assert_eq!(b.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn pairs_do_not_cross_talk() {
        let (a1, mut b1) = started_pair(DEFAULT_CAPACITY);
        let (a2, mut b2) = started_pair(DEFAULT_CAPACITY);

        a1.send("one".into()).await.unwrap();
        a2.send("two".into()).await.unwrap();

        assert_eq!(b2.recv().await.unwrap().as_deref(), Some("two"));
        assert_eq!(b1.recv().await.unwrap().as_deref(), Some("one"));
    }
}
