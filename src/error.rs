//! Error types for the dllama client.
//!
//! The taxonomy distinguishes protocol violations (wire-level framing
//! damage, from which there is no safe resynchronization point) from
//! transport failures (socket-level I/O errors that fail exactly the
//! request in flight) and local conditions (`Closed`, `QueueFull`).

use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Wire-level protocol violations.
///
/// The framing scheme carries no delimiter or checksum, so every variant is
/// fatal to the connection: once framing state is suspect, all outstanding
/// requests are failed with the same error and the socket is closed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Declared response length exceeds the configured maximum.
    ///
    /// Also covers lengths that would be negative under a signed
    /// interpretation of the 32-bit prefix.
    #[error("response length {declared} exceeds maximum {max}")]
    OversizedFrame {
        /// Payload length declared by the frame header.
        declared: usize,
        /// Maximum permitted payload length.
        max: usize,
    },

    /// Accumulated payload bytes exceed the declared frame length.
    #[error("payload overrun: received {received} bytes of a {declared} byte frame")]
    PayloadOverrun {
        /// Bytes accumulated so far.
        received: usize,
        /// Payload length declared by the frame header.
        declared: usize,
    },

    /// First delivery of a new frame was shorter than the 4 byte header.
    ///
    /// The wire contract guarantees the header arrives atomically; a
    /// shorter delivery means framing state has been lost.
    #[error("incomplete frame header: have {have}, need {need}")]
    TruncatedHeader {
        /// Bytes available in the delivery.
        have: usize,
        /// Bytes required for a complete header.
        need: usize,
    },

    /// Prompt is too long to describe with a 32-bit length prefix.
    #[error("prompt length {len} exceeds the 32-bit frame limit")]
    PromptTooLong {
        /// Encoded byte length of the prompt.
        len: usize,
    },

    /// Response payload is not valid UTF-8.
    #[error("response payload is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Errors surfaced to callers of [`crate::DllamaClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket-level failure during connect, write, or receive.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// Malformed frame; the connection has been closed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer closed the connection before a response arrived.
    #[error("connection closed by peer")]
    Disconnected,

    /// The client was shut down before the request could complete.
    #[error("client closed")]
    Closed,

    /// The request queue is at its configured depth.
    #[error("request queue is full")]
    QueueFull,
}

impl ClientError {
    /// Returns true if the error terminated the connection rather than a
    /// single request.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Closed | Self::Disconnected)
    }
}
