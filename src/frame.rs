//! Frame encoding and decoding for the dllama wire protocol.
//!
//! The protocol is a bare length-prefixed byte stream: a request frame is
//! `u32-LE prompt byte length | u32-LE max tokens | UTF-8 prompt`, and a
//! response frame is `u32-LE payload length | UTF-8 payload`. There are no
//! magic bytes, no version field, and no checksum; the connection is reused
//! for many request/response cycles with strictly one request outstanding.

use bytes::{BufMut, BytesMut};

use crate::error::ProtocolError;

/// Size of the response frame header: one little-endian `u32` length.
pub const RESPONSE_HEADER_LEN: usize = 4;

/// Size of the request frame header: prompt length plus max-tokens field.
pub const REQUEST_HEADER_LEN: usize = 8;

/// Encode a request frame into `dst`.
///
/// The length prefix is the prompt's **encoded byte length**, not its
/// character count, so multi-byte text is framed correctly.
///
/// # Errors
///
/// Returns [`ProtocolError::PromptTooLong`] if the prompt's byte length
/// does not fit in the 32-bit prefix.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use dllama_client::frame::encode_request;
///
/// let mut dst = BytesMut::new();
/// encode_request("abc", 5, &mut dst).expect("short prompt encodes");
/// assert_eq!(&dst[..], b"\x03\x00\x00\x00\x05\x00\x00\x00abc");
/// ```
pub fn encode_request(prompt: &str, max_tokens: u32, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    let prompt_len = u32::try_from(prompt.len())
        .map_err(|_| ProtocolError::PromptTooLong { len: prompt.len() })?;
    dst.reserve(REQUEST_HEADER_LEN + prompt.len());
    dst.put_slice(&prompt_len.to_le_bytes());
    dst.put_slice(&max_tokens.to_le_bytes());
    dst.put_slice(prompt.as_bytes());
    Ok(())
}

/// Stateful reassembly of response frames from an arbitrarily chunked
/// inbound byte stream.
///
/// A frame may arrive split across many deliveries; the decoder carries the
/// declared length and the accumulation buffer between calls to
/// [`feed`](Self::feed). The wire contract guarantees the 4 byte header is
/// delivered atomically at the start of a new frame, but makes no other
/// alignment promise, so the decoder never assumes one delivery equals one
/// frame.
#[derive(Debug)]
pub struct ResponseDecoder {
    /// Declared payload length, set once per frame by the header.
    expected: Option<usize>,
    accumulated: BytesMut,
    max_payload: usize,
}

impl ResponseDecoder {
    /// Create a decoder that rejects declared lengths above `max_payload`.
    #[must_use]
    pub fn new(max_payload: usize) -> Self {
        Self {
            expected: None,
            accumulated: BytesMut::new(),
            max_payload,
        }
    }

    /// Returns true when no frame is currently being assembled.
    #[must_use]
    pub fn is_idle(&self) -> bool { self.expected.is_none() }

    /// Discard any partially assembled frame.
    pub fn reset(&mut self) {
        self.expected = None;
        self.accumulated.clear();
    }

    /// Consume one inbound delivery.
    ///
    /// Returns `Ok(Some(text))` when the delivery completes a frame,
    /// `Ok(None)` when more bytes are needed. The decoder resets to idle on
    /// completion and is ready for the next frame's header.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the header is truncated, the declared
    /// length exceeds the configured maximum, accumulated bytes overrun the
    /// declared length, or the payload is not valid UTF-8. All of these are
    /// fatal: the framing has no resynchronization point, so the caller
    /// must tear the connection down.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<String>, ProtocolError> {
        match self.expected {
            None => {
                if chunk.len() < RESPONSE_HEADER_LEN {
                    return Err(ProtocolError::TruncatedHeader {
                        have: chunk.len(),
                        need: RESPONSE_HEADER_LEN,
                    });
                }
                let prefix = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                // Saturate on narrow targets; the maximum check below rejects it.
                let declared = usize::try_from(prefix).unwrap_or(usize::MAX);
                if declared > self.max_payload {
                    return Err(ProtocolError::OversizedFrame {
                        declared,
                        max: self.max_payload,
                    });
                }
                self.expected = Some(declared);
                self.accumulated
                    .extend_from_slice(&chunk[RESPONSE_HEADER_LEN..]);
            }
            Some(_) => self.accumulated.extend_from_slice(chunk),
        }
        self.try_complete()
    }

    fn try_complete(&mut self) -> Result<Option<String>, ProtocolError> {
        let Some(declared) = self.expected else {
            return Ok(None);
        };
        if self.accumulated.len() > declared {
            return Err(ProtocolError::PayloadOverrun {
                received: self.accumulated.len(),
                declared,
            });
        }
        if self.accumulated.len() < declared {
            return Ok(None);
        }
        let payload = self.accumulated.split().to_vec();
        self.reset();
        Ok(Some(String::from_utf8(payload)?))
    }
}
