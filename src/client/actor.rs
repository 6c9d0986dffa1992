//! Actor driving request dispatch and response correlation.
//!
//! The actor owns the connection outright. All socket activity happens on
//! its task, so dispatch and decoding never race: while idle it awaits the
//! next queued request, while a request is in flight it awaits inbound
//! bytes only. The bounded command channel is the request queue; dequeue
//! order is submission order.

use bytes::BytesMut;
use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{
    connection::{ClientStream, Connection},
    error::{ClientError, ProtocolError},
    frame::{ResponseDecoder, encode_request},
};

const RECV_BUF_CAPACITY: usize = 8 * 1024;

/// A queued generation request and its deferred result.
pub(crate) struct PendingRequest {
    pub(crate) prompt: String,
    pub(crate) max_tokens: u32,
    pub(crate) reply: oneshot::Sender<Result<String, ClientError>>,
}

impl PendingRequest {
    fn complete(self, result: Result<String, ClientError>) {
        // The caller may have dropped its future; nothing to deliver then.
        let _ = self.reply.send(result);
    }
}

/// Actor state: the connection, the decoder, and at most one request in
/// flight.
pub(crate) struct ConnectionActor<T> {
    connection: Connection<T>,
    decoder: ResponseDecoder,
    commands: mpsc::Receiver<PendingRequest>,
    shutdown: CancellationToken,
    in_flight: Option<PendingRequest>,
}

impl<T: ClientStream> ConnectionActor<T> {
    pub(crate) fn new(
        connection: Connection<T>,
        max_response_length: usize,
        commands: mpsc::Receiver<PendingRequest>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            connection,
            decoder: ResponseDecoder::new(max_response_length),
            commands,
            shutdown,
            in_flight: None,
        }
    }

    /// Drive the connection until shutdown or until every client handle is
    /// dropped.
    ///
    /// Every failure path completes exactly one deferred result, except
    /// connection-fatal paths which complete every outstanding one.
    pub(crate) async fn run(mut self) {
        let mut chunk = BytesMut::with_capacity(RECV_BUF_CAPACITY);
        loop {
            let shutdown = self.shutdown.clone();
            if self.in_flight.is_some() {
                tokio::select! {
                    biased;

                    () = shutdown.cancelled() => {
                        self.shutdown_all().await;
                        return;
                    }
                    res = self.connection.recv(&mut chunk) => {
                        let fatal = self.on_delivery(res, &mut chunk).await;
                        if fatal {
                            return;
                        }
                    }
                }
            } else {
                tokio::select! {
                    biased;

                    () = shutdown.cancelled() => {
                        self.shutdown_all().await;
                        return;
                    }
                    cmd = self.commands.recv() => {
                        match cmd {
                            Some(request) => self.dispatch(request).await,
                            None => {
                                info!("all client handles dropped, closing connection");
                                self.connection.close().await;
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Transmit the next request's frame and mark it in flight.
    ///
    /// A failed write fails only this request's deferred result; the loop
    /// then advances to the next queued request, which drains a dead queue
    /// with per-request errors instead of stalling it.
    async fn dispatch(&mut self, request: PendingRequest) {
        let mut frame = BytesMut::new();
        if let Err(e) = encode_request(&request.prompt, request.max_tokens, &mut frame) {
            request.complete(Err(ClientError::Protocol(e)));
            return;
        }
        debug!(
            "dispatching request: prompt_bytes={}, max_tokens={}",
            request.prompt.len(),
            request.max_tokens
        );
        match self.connection.send(&frame).await {
            Ok(()) => self.in_flight = Some(request),
            Err(e) => {
                warn!("request write failed: {e}");
                request.complete(Err(ClientError::Transport(e)));
            }
        }
    }

    /// Handle one inbound delivery while a request is in flight.
    ///
    /// Returns true when the connection has been torn down and the actor
    /// must exit.
    async fn on_delivery(
        &mut self,
        res: std::io::Result<usize>,
        chunk: &mut BytesMut,
    ) -> bool {
        match res {
            Ok(0) => {
                self.fail_in_flight(ClientError::Disconnected);
                false
            }
            Ok(_) => {
                let fed = self.decoder.feed(chunk);
                chunk.clear();
                match fed {
                    Ok(Some(text)) => {
                        self.complete_in_flight(text);
                        false
                    }
                    Ok(None) => false,
                    Err(e) => {
                        self.fatal(e).await;
                        true
                    }
                }
            }
            Err(e) => {
                self.fail_in_flight(ClientError::Transport(e));
                false
            }
        }
    }

    /// Complete the in-flight request's deferred result with the decoded
    /// response text.
    fn complete_in_flight(&mut self, text: String) {
        if let Some(request) = self.in_flight.take() {
            debug!("response complete: payload_bytes={}", text.len());
            request.complete(Ok(text));
        }
    }

    /// Fail the in-flight request, if any, and discard partial frame state.
    ///
    /// An error with nothing in flight is a no-op; the connection is
    /// already in a terminal state for this exchange.
    fn fail_in_flight(&mut self, error: ClientError) {
        self.decoder.reset();
        if let Some(request) = self.in_flight.take() {
            warn!("in-flight request failed: {error}");
            request.complete(Err(error));
        }
    }

    /// Protocol violations are fatal: the framing scheme has no safe
    /// resynchronization point, so every outstanding request is failed and
    /// the connection closed.
    async fn fatal(&mut self, error: ProtocolError) {
        warn!("protocol violation, closing connection: {error}");
        if let Some(request) = self.in_flight.take() {
            request.complete(Err(ClientError::Protocol(error.clone())));
        }
        self.drain_queue(|| ClientError::Protocol(error.clone())).await;
        self.connection.close().await;
    }

    /// Explicit shutdown: fail the in-flight request and the whole queue
    /// with `Closed`, then tear the socket down.
    async fn shutdown_all(&mut self) {
        info!("client shutdown requested");
        self.fail_in_flight(ClientError::Closed);
        self.drain_queue(|| ClientError::Closed).await;
        self.connection.close().await;
    }

    /// Fail every queued request. Closing the receiver first stops new
    /// submissions racing in behind the drain.
    async fn drain_queue(&mut self, mut make_error: impl FnMut() -> ClientError) {
        self.commands.close();
        while let Some(request) = self.commands.recv().await {
            request.complete(Err(make_error()));
        }
    }
}
