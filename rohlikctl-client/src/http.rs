//! HTTP transport with timeout and retry support.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Retry Policy
// ============================================================================

/// Policy for retrying requests that failed at the transport level.
///
/// Only connection and timeout errors are retried; HTTP status handling
/// belongs to the API layer.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (initial try included).
    pub max_attempts: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Cap on the delay between retries.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy with the given attempt cap.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_secs(1),
            exponential_backoff: true,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Calculates the delay before the given retry attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        } else {
            self.base_delay
        };
        delay.min(self.max_delay)
    }

    /// Determines if a transport error should be retried.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client with per-request timeout and transport-level retry.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rohlikctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: client,
            retry: RetryPolicy::default(),
        })
    }

    /// Sets the retry policy for this client.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Returns the underlying reqwest client for building requests.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Sends the request, retrying transport failures per the policy.
    ///
    /// The builder must carry a cloneable body (JSON bodies are); streaming
    /// bodies cannot be retried.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let cloned = builder.try_clone().ok_or_else(|| {
                ApiError::Network("request body cannot be cloned for retry".to_string())
            })?;

            debug!(attempt, "Sending HTTP request");

            match cloned.send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempt < self.retry.max_attempts && self.retry.should_retry(&e) {
                        let delay = self.retry.delay_for_attempt(attempt);
                        warn!(
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy::new(10).with_base_delay(Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(60));
    }

    #[test]
    fn no_retry_allows_single_attempt() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn send_succeeds_without_retry() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .send(client.inner().get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn send_retries_connection_refused() {
        use std::net::TcpListener;

        // Bind then drop the port so requests fail with ECONNREFUSED.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new().unwrap().with_retry_policy(
            RetryPolicy::new(2).with_base_delay(Duration::from_millis(5)),
        );

        let result = client
            .send(client.inner().get(format!("http://{addr}/")))
            .await;

        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn send_does_not_retry_http_errors() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .send(client.inner().get(server.uri()))
            .await
            .unwrap();

        // Status classification happens in the API layer.
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
