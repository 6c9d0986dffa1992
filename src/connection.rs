//! Socket lifecycle for the dllama connection.
//!
//! [`Connection`] owns the stream for the lifetime of the client and
//! exposes the raw send and receive primitives the dispatch layer is built
//! on. It is generic over the stream type so the layers above can be
//! exercised against an in-memory duplex instead of a real socket.

use std::io;

use bytes::BytesMut;
use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpStream, ToSocketAddrs},
};

/// Trait alias for stream types usable as a dllama transport.
pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T> ClientStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// A connected transport carrying length-prefixed frames.
pub struct Connection<T = TcpStream> {
    stream: T,
    closed: bool,
}

impl Connection<TcpStream> {
    /// Establish a TCP connection to the inference server.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the connection cannot be
    /// established.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dllama_client::connection::Connection;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> std::io::Result<()> {
    /// let conn = Connection::connect(("127.0.0.1", 9990)).await?;
    /// # drop(conn);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        debug!("connected: peer={:?}", stream.peer_addr().ok());
        Ok(Self::new(stream))
    }
}

impl<T: ClientStream> Connection<T> {
    /// Wrap an already established stream.
    #[must_use]
    pub fn new(stream: T) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Write one complete frame and flush it.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the write or flush fails.
    pub async fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await
    }

    /// Await one inbound delivery, appending it to `buf`.
    ///
    /// Returns the number of bytes received; zero means the peer closed the
    /// connection. Deliveries have no guaranteed alignment with frame
    /// boundaries.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the read fails.
    pub async fn recv(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        self.stream.read_buf(buf).await
    }

    /// Shut the write half down. Idempotent: a second call does not attempt
    /// a second teardown.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Shutdown errors are ignored; the connection is going away anyway.
        let _ = self.stream.shutdown().await;
        debug!("connection closed");
    }
}
