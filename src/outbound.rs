//! Outbound HTTP with a single retry.
//!
//! Every upstream call gets one retry after a short pause when the first attempt
//! fails on transport or with a 5xx status. Client errors are returned at once.
//! Timeouts are configured on the shared `reqwest::Client`.

use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const RETRY_PAUSE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum OutboundFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(StatusCode),
}

impl OutboundFailure {
    fn is_retryable(&self) -> bool {
        match self {
            OutboundFailure::Transport(_) => true,
            OutboundFailure::Status(status) => status.is_server_error(),
        }
    }
}

async fn attempt<F>(build: &F) -> Result<Response, OutboundFailure>
where
    F: Fn() -> RequestBuilder,
{
    let response = build().send().await?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(OutboundFailure::Status(response.status()))
    }
}

/// Sends the request built by `build`, retrying once on retryable failures.
pub async fn send_with_retry<F>(label: &str, build: F) -> Result<Response, OutboundFailure>
where
    F: Fn() -> RequestBuilder,
{
    let failure = match attempt(&build).await {
        Ok(response) => return Ok(response),
        Err(failure) if failure.is_retryable() => failure,
        Err(failure) => return Err(failure),
    };

    warn!(upstream = label, error = %failure, "retrying upstream call once");
    sleep(RETRY_PAUSE).await;
    attempt(&build).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_retries_once_on_server_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/flaky",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (AxumStatus::INTERNAL_SERVER_ERROR, "boom")
                    } else {
                        (AxumStatus::OK, "ok")
                    }
                }
            }),
        );
        let base = spawn_stub(app).await;
        let client = reqwest::Client::new();

        let response = send_with_retry("test", || client.get(format!("{}/flaky", base)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_second_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/down",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AxumStatus::SERVICE_UNAVAILABLE
                }
            }),
        );
        let base = spawn_stub(app).await;
        let client = reqwest::Client::new();

        let failure = send_with_retry("test", || client.get(format!("{}/down", base)))
            .await
            .unwrap_err();
        assert!(matches!(failure, OutboundFailure::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(failure.to_string(), "upstream returned 503 Service Unavailable");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/missing",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AxumStatus::NOT_FOUND
                }
            }),
        );
        let base = spawn_stub(app).await;
        let client = reqwest::Client::new();

        let failure = send_with_retry("test", || client.get(format!("{}/missing", base)))
            .await
            .unwrap_err();
        assert!(matches!(failure, OutboundFailure::Status(s) if s == StatusCode::NOT_FOUND));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_connection_is_retried_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    // First connection is closed without a response.
                    drop(socket);
                    continue;
                }
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                    .await;
            }
        });
        let client = reqwest::Client::new();

        let response = send_with_retry("test", || client.get(format!("http://{}/", addr)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_gives_transport_failure_after_pause() {
        let client = reqwest::Client::new();
        let started = Instant::now();

        let failure = send_with_retry("test", || client.get("http://127.0.0.1:1/"))
            .await
            .unwrap_err();
        assert!(matches!(failure, OutboundFailure::Transport(_)));
        assert!(failure.to_string().starts_with("request failed: "));
        assert!(started.elapsed() >= RETRY_PAUSE);
    }
}
