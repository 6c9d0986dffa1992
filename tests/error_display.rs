//! Display formatting for the error taxonomy.

use dllama_client::{ClientError, ProtocolError};
use rstest::rstest;

#[rstest]
#[case(
    ProtocolError::OversizedFrame { declared: 70_000, max: 65_536 },
    "response length 70000 exceeds maximum 65536"
)]
#[case(
    ProtocolError::PayloadOverrun { received: 12, declared: 9 },
    "payload overrun: received 12 bytes of a 9 byte frame"
)]
#[case(
    ProtocolError::TruncatedHeader { have: 2, need: 4 },
    "incomplete frame header: have 2, need 4"
)]
#[case(
    ProtocolError::PromptTooLong { len: 5_000_000_000 },
    "prompt length 5000000000 exceeds the 32-bit frame limit"
)]
fn protocol_errors_render_context(#[case] error: ProtocolError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[test]
fn client_errors_render_their_cause() {
    let err = ClientError::Protocol(ProtocolError::PayloadOverrun {
        received: 5,
        declared: 4,
    });
    assert_eq!(
        err.to_string(),
        "protocol error: payload overrun: received 5 bytes of a 4 byte frame"
    );
    assert_eq!(ClientError::Closed.to_string(), "client closed");
    assert_eq!(
        ClientError::QueueFull.to_string(),
        "request queue is full"
    );
    assert_eq!(
        ClientError::Disconnected.to_string(),
        "connection closed by peer"
    );
}

#[test]
fn fatal_classification_tracks_connection_scope() {
    assert!(ClientError::Closed.is_fatal());
    assert!(ClientError::Disconnected.is_fatal());
    assert!(
        ClientError::Protocol(ProtocolError::TruncatedHeader { have: 0, need: 4 }).is_fatal()
    );
    assert!(!ClientError::QueueFull.is_fatal());
    assert!(!ClientError::Transport(std::io::Error::other("boom")).is_fatal());
}
