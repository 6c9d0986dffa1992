//! Client runtime: request queue, dispatcher, and response correlation.
//!
//! The runtime serializes concurrent logical requests over one physical
//! connection. Callers submit prompts through a [`DllamaClient`] handle and
//! receive a deferred result; a connection actor owns the socket, enforces
//! the protocol's single-request-in-flight discipline, and correlates each
//! fully reassembled response frame back to the caller that is waiting on
//! it. Dispatch order is submission order, so responses complete FIFO.

mod actor;
mod builder;
mod runtime;

pub use builder::DllamaClientBuilder;
pub use runtime::{DEFAULT_MAX_TOKENS, DllamaClient, ResponseFuture};
