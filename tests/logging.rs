//! Assertions on the client's lifecycle log output.

use dllama_client::DllamaClient;

mod common;
use common::{TestResult, loopback_listener};

#[tokio::test]
async fn shutdown_emits_lifecycle_record() -> TestResult {
    let mut logger = logtest::Logger::start();

    let (listener, addr) = loopback_listener().await?;
    let server = tokio::spawn(async move {
        let _connection = listener.accept().await;
        std::future::pending::<()>().await;
    });

    let client = DllamaClient::builder().connect(addr).await?;
    // close() joins the actor task, so its shutdown record is flushed by
    // the time it returns.
    client.close().await;
    server.abort();

    let mut saw_shutdown = false;
    while let Some(record) = logger.pop() {
        if record.args().contains("client shutdown requested") {
            saw_shutdown = true;
        }
    }
    assert!(saw_shutdown, "expected a shutdown lifecycle record");
    Ok(())
}
