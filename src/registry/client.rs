//! Shared HTTP transport for registry requests
//!
//! Rate-limited and failed-in-transit requests are retried with
//! exponential backoff. Response status codes are mapped onto
//! `RegistryError` so callers only ever see the registry taxonomy.

use crate::error::RegistryError;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("pkglens/", env!("CARGO_PKG_VERSION"));

/// How often and how patiently a request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Fail on the first error
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// reqwest client with registry error mapping and retries
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` and decode the JSON body
    ///
    /// `package` and `registry` only label errors. `accept` overrides the
    /// `Accept` header (npm serves abbreviated packuments on request).
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: Option<&str>,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self.send(url, accept, package, registry).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: registry.to_string(),
                message: format!("failed to parse JSON: {}", e),
            })
    }

    async fn send(
        &self,
        url: &str,
        accept: Option<&str>,
        package: &str,
        registry: &str,
    ) -> Result<Response, RegistryError> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url);
            if let Some(accept) = accept {
                request = request.header(ACCEPT, accept);
            }

            let error = match request.send().await {
                Ok(response) => match response.status() {
                    StatusCode::TOO_MANY_REQUESTS => RegistryError::rate_limit_exceeded(registry),
                    StatusCode::NOT_FOUND => {
                        return Err(RegistryError::package_not_found(package, registry))
                    }
                    status if status.is_success() => return Ok(response),
                    status => {
                        return Err(RegistryError::network_error(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ))
                    }
                },
                Err(e) if e.is_timeout() => RegistryError::timeout(package, registry),
                Err(e) => RegistryError::network_error(package, registry, e.to_string()),
            };

            if attempt >= self.retry.max_retries {
                return Err(error);
            }
            let delay = self.retry.delay(attempt);
            debug!(url, attempt, delay_ms = delay.as_millis() as u64, %error, "retrying request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        assert!(HttpClient::new().is_ok());
        assert!(HttpClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("pkglens/"));
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay(0), Duration::from_millis(100));
        assert_eq!(retry.delay(1), Duration::from_millis(200));
        assert_eq!(retry.delay(2), Duration::from_millis(400));
        assert_eq!(RetryPolicy::none().delay(5), Duration::ZERO);
    }

    #[test]
    fn test_with_retry() {
        let client = HttpClient::new().unwrap().with_retry(RetryPolicy::none());
        assert_eq!(client.retry.max_retries, 0);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 on localhost is the discard service and is normally closed
        let client = HttpClient::new().unwrap().with_retry(RetryPolicy::none());
        let result: Result<serde_json::Value, _> = client
            .get_json("http://127.0.0.1:9/react", None, "react", "npm")
            .await;
        match result {
            Err(RegistryError::NetworkError { package, .. }) => assert_eq!(package, "react"),
            Err(RegistryError::Timeout { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
