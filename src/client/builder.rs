//! Builder for configuring and connecting a dllama client.

use tokio::{net::ToSocketAddrs, sync::mpsc};
use tokio_util::sync::CancellationToken;

use super::{
    DllamaClient,
    actor::ConnectionActor,
};
use crate::{
    connection::{ClientStream, Connection},
    error::ClientError,
};

const DEFAULT_QUEUE_DEPTH: usize = 32;
const MIN_RESPONSE_LENGTH: usize = 64;
const MAX_RESPONSE_LENGTH: usize = 16 * 1024 * 1024;

/// Builder for [`DllamaClient`].
///
/// # Examples
///
/// ```no_run
/// use dllama_client::DllamaClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), dllama_client::ClientError> {
/// let client = DllamaClient::builder()
///     .max_queue_depth(8)
///     .connect(("127.0.0.1", 9990))
///     .await?;
/// # drop(client);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DllamaClientBuilder {
    max_queue_depth: usize,
    max_response_length: usize,
}

impl Default for DllamaClientBuilder {
    fn default() -> Self {
        Self {
            max_queue_depth: DEFAULT_QUEUE_DEPTH,
            max_response_length: MAX_RESPONSE_LENGTH,
        }
    }
}

impl DllamaClientBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the maximum number of requests awaiting dispatch.
    ///
    /// Submissions beyond this depth fail with
    /// [`ClientError::QueueFull`] instead of growing the queue without
    /// bound. One further request may be in flight beyond the queued depth.
    /// Values below one are raised to one.
    #[must_use]
    pub fn max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth.max(1);
        self
    }

    /// Set the maximum accepted response payload length.
    ///
    /// A frame declaring a larger payload is rejected as a protocol error
    /// before any buffer is grown. The value is clamped between 64 bytes
    /// and 16 MiB.
    #[must_use]
    pub fn max_response_length(mut self, bytes: usize) -> Self {
        self.max_response_length = bytes.clamp(MIN_RESPONSE_LENGTH, MAX_RESPONSE_LENGTH);
        self
    }

    /// Connect to the inference server and spawn the connection actor.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the TCP connection cannot be
    /// established.
    pub async fn connect(self, addr: impl ToSocketAddrs) -> Result<DllamaClient, ClientError> {
        let connection = Connection::connect(addr).await?;
        Ok(self.spawn(connection))
    }

    /// Build a client over an already established stream.
    ///
    /// Useful for custom transports and for exercising the runtime against
    /// an in-memory duplex.
    pub fn from_stream<T>(self, stream: T) -> DllamaClient
    where
        T: ClientStream + 'static,
    {
        self.spawn(Connection::new(stream))
    }

    fn spawn<T>(self, connection: Connection<T>) -> DllamaClient
    where
        T: ClientStream + 'static,
    {
        let (commands, queue) = mpsc::channel(self.max_queue_depth);
        let shutdown = CancellationToken::new();
        let actor = ConnectionActor::new(
            connection,
            self.max_response_length,
            queue,
            shutdown.clone(),
        );
        let task = tokio::spawn(actor.run());
        DllamaClient::started(commands, shutdown, task)
    }
}
