//! Client handle and deferred result type.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::{
    sync::{Mutex, mpsc, mpsc::error::TrySendError, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{DllamaClientBuilder, actor::PendingRequest};
use crate::error::ClientError;

/// Token budget used when the caller does not specify one.
///
/// Matches the server's documented default.
pub const DEFAULT_MAX_TOKENS: u32 = 128;

/// Handle to a running dllama connection.
///
/// The handle is cheap to use from many tasks through a shared reference;
/// all socket work happens on the connection actor's task. Requests are
/// dispatched strictly one at a time in submission order, so two callers'
/// responses complete in the order their submissions were accepted.
///
/// # Examples
///
/// ```no_run
/// use dllama_client::{DEFAULT_MAX_TOKENS, DllamaClient};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), dllama_client::ClientError> {
/// let client = DllamaClient::builder().connect(("127.0.0.1", 9990)).await?;
/// let text = client
///     .generate("The answer to the universe really is", DEFAULT_MAX_TOKENS)
///     .await?;
/// println!("{text}");
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct DllamaClient {
    commands: mpsc::Sender<PendingRequest>,
    shutdown: CancellationToken,
    actor: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for DllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DllamaClient")
            .field("queue_capacity", &self.commands.max_capacity())
            .finish_non_exhaustive()
    }
}

impl DllamaClient {
    /// Start building a new client.
    #[must_use]
    pub fn builder() -> DllamaClientBuilder { DllamaClientBuilder::new() }

    pub(crate) fn started(
        commands: mpsc::Sender<PendingRequest>,
        shutdown: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            commands,
            shutdown,
            actor: Mutex::new(Some(task)),
        }
    }

    /// Enqueue a generation request, returning its deferred result.
    ///
    /// Enqueueing is synchronous and never blocks. The returned future
    /// resolves once the request has been dispatched and its complete
    /// response frame received, or with the error that terminated it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::QueueFull`] when the queue is at its
    /// configured depth and [`ClientError::Closed`] after shutdown.
    pub fn submit(&self, prompt: &str, max_tokens: u32) -> Result<ResponseFuture, ClientError> {
        let (reply, rx) = oneshot::channel();
        let request = PendingRequest {
            prompt: prompt.to_owned(),
            max_tokens,
            reply,
        };
        match self.commands.try_send(request) {
            Ok(()) => Ok(ResponseFuture { rx }),
            Err(TrySendError::Full(_)) => Err(ClientError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(ClientError::Closed),
        }
    }

    /// Submit a request and await its response text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request cannot be enqueued,
    /// transmitted, or its response decoded.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError> {
        self.submit(prompt, max_tokens)?.await
    }

    /// Shut the client down.
    ///
    /// Fails the in-flight request and every queued request with
    /// [`ClientError::Closed`], closes the socket, and waits for the
    /// connection actor to finish. Idempotent: a second call returns
    /// without a second teardown.
    pub async fn close(&self) {
        self.shutdown.cancel();
        if let Some(task) = self.actor.lock().await.take() {
            // The actor never panics; a join error is ignored regardless.
            let _ = task.await;
        }
    }
}

/// Deferred result of a submitted request.
///
/// Resolves with the decoded response text or with the error that
/// terminated the request. Dropping the future does not withdraw the
/// request from the queue; cancellation is not part of the wire protocol.
#[derive(Debug)]
pub struct ResponseFuture {
    rx: oneshot::Receiver<Result<String, ClientError>>,
}

impl Future for ResponseFuture {
    type Output = Result<String, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_| Err(ClientError::Closed)))
    }
}
