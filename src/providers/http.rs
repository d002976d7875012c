// src/providers/http.rs
// Shared HTTP plumbing for translation backends: timeouts plus a short
// retry loop for rate limits and transient server errors.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry delays for transient backend failures.
const RETRY_DELAYS: [Duration; 2] = [Duration::from_millis(250), Duration::from_millis(1000)];

enum Attempt {
    Success(Value),
    Transient,
    Fatal,
}

/// HTTP client wrapper used by every translation backend.
#[derive(Clone)]
pub struct TranslateHttpClient {
    client: Client,
}

impl TranslateHttpClient {
    /// Build a client with sane timeouts for translation calls.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("HTTP client builder failed ({}), using defaults", e);
                Client::new()
            });
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute a request, retrying on 429/5xx and connect/timeout errors.
    /// Returns the parsed JSON body on success, None on any final failure.
    /// Backend failures are diagnostics, never errors: the caller signals
    /// failure upward with an empty translation.
    pub async fn execute_json(&self, label: &str, request: RequestBuilder) -> Option<Value> {
        for (attempt, delay) in RETRY_DELAYS.iter().enumerate() {
            let Some(req) = request.try_clone() else {
                // Streaming bodies can't be cloned; single attempt.
                return match self.send_once(label, request).await {
                    Attempt::Success(value) => Some(value),
                    _ => None,
                };
            };

            match self.send_once(label, req).await {
                Attempt::Success(value) => return Some(value),
                Attempt::Fatal => return None,
                Attempt::Transient => {
                    debug!(
                        backend = label,
                        attempt = attempt + 1,
                        "retrying translation request in {:?}",
                        delay
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        match self.send_once(label, request).await {
            Attempt::Success(value) => Some(value),
            _ => None,
        }
    }

    async fn send_once(&self, label: &str, request: RequestBuilder) -> Attempt {
        match request.send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                Ok(value) => Attempt::Success(value),
                Err(e) => {
                    warn!(backend = label, error = %e, "failed to parse backend response");
                    Attempt::Fatal
                }
            },
            Ok(resp) => {
                let status = resp.status();
                if retryable_status(status) {
                    debug!(backend = label, status = %status, "transient backend status");
                    Attempt::Transient
                } else {
                    warn!(backend = label, status = %status, "backend request rejected");
                    Attempt::Fatal
                }
            }
            Err(e) => {
                // Connect failures and timeouts are worth one more try;
                // anything else (bad request construction) is not.
                if e.is_connect() || e.is_timeout() {
                    debug!(backend = label, error = %e, "transient backend error");
                    Attempt::Transient
                } else {
                    warn!(backend = label, error = %e, "backend request failed");
                    Attempt::Fatal
                }
            }
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_status() {
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!retryable_status(StatusCode::FORBIDDEN));
        assert!(!retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_client_construction() {
        let http = TranslateHttpClient::new(Duration::from_secs(30), Duration::from_secs(10));
        // Clone shares the underlying pool
        let _clone = http.clone();
    }
}
