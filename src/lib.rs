//! Client for the Distributed Llama inference server's socket protocol.
//!
//! The server speaks a bare length-prefixed request/response protocol over
//! a persistent TCP connection with strictly one request outstanding at a
//! time. This crate provides the pieces of that conversation: the wire
//! codec ([`frame`]), the socket lifecycle ([`connection`]), and a client
//! runtime ([`client`]) that queues concurrent callers, dispatches their
//! requests FIFO, and correlates each reassembled response frame back to
//! the caller awaiting it.
//!
//! # Examples
//!
//! ```no_run
//! use dllama_client::{DEFAULT_MAX_TOKENS, DllamaClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), dllama_client::ClientError> {
//! let client = DllamaClient::builder().connect(("127.0.0.1", 9990)).await?;
//! let answer = client.generate("1 + 3 is ", DEFAULT_MAX_TOKENS).await?;
//! println!("{answer}");
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod frame;

pub use client::{DEFAULT_MAX_TOKENS, DllamaClient, DllamaClientBuilder, ResponseFuture};
pub use connection::Connection;
pub use error::{ClientError, ProtocolError};
pub use frame::ResponseDecoder;
