//! Shared utilities for integration tests.
//!
//! Provides helpers for speaking the server side of the dllama wire
//! protocol over a loopback listener, so tests can script exact byte
//! sequences without a real inference server.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::net::SocketAddr;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// Shared result type for integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Bind a listener on an ephemeral loopback port.
pub async fn loopback_listener() -> TestResult<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

/// Encode a response frame: `u32-LE payload length | payload`.
pub fn response_frame(payload: &str) -> Vec<u8> {
    let len = u32::try_from(payload.len()).expect("test payload fits in u32");
    let mut frame = len.to_le_bytes().to_vec();
    frame.extend_from_slice(payload.as_bytes());
    frame
}

/// Read one request frame from the client, returning the prompt and the
/// max-tokens field.
pub async fn read_request(stream: &mut TcpStream) -> TestResult<(String, u32)> {
    let mut header = [0_u8; 8];
    stream.read_exact(&mut header).await?;
    let prompt_len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let max_tokens = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    let mut prompt = vec![0_u8; prompt_len];
    stream.read_exact(&mut prompt).await?;
    Ok((String::from_utf8(prompt)?, max_tokens))
}

/// Accept one connection and answer `count` requests in order, echoing
/// each prompt back as `echo:<prompt>`.
pub async fn serve_echo(listener: TcpListener, count: usize) -> TestResult {
    let (mut stream, _) = listener.accept().await?;
    for _ in 0..count {
        let (prompt, _max_tokens) = read_request(&mut stream).await?;
        let frame = response_frame(&format!("echo:{prompt}"));
        stream.write_all(&frame).await?;
    }
    Ok(())
}
