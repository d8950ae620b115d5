//! HTTP client wrapper with retry logic.
//!
//! Only idempotent requests are retried. A request with side effects is
//! sent exactly once, whatever happens to it.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::GatewayErrorResponse;
use super::config::{GatewayConfig, RetryConfig};
use super::error::GatewayClientError;

/// Whether a request may be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Retry with backoff on network errors, 408, 429 and 5xx.
    Retry,
    /// Send exactly once.
    Once,
}

/// HTTP client for the brokerage gateway.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl GatewayHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayClientError> {
        if config.api_key.is_empty() {
            return Err(GatewayClientError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayClientError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// GET, retried.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayClientError> {
        self.request(Method::GET, path, None::<&()>, Delivery::Retry)
            .await
    }

    /// POST with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        delivery: Delivery,
    ) -> Result<T, GatewayClientError> {
        self.request(Method::POST, path, Some(body), delivery).await
    }

    /// POST without a response body.
    pub async fn post_empty(
        &self,
        path: &str,
        delivery: Delivery,
    ) -> Result<(), GatewayClientError> {
        let _: serde_json::Value = self
            .request(Method::POST, path, None::<&()>, delivery)
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        delivery: Delivery,
    ) -> Result<T, GatewayClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut backoff = ExponentialBackoff::new(&self.retry_config, delivery);

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.api_key);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(GatewayClientError::Timeout);
                    }
                    if backoff.attempt > 1 {
                        return Err(GatewayClientError::MaxRetriesExceeded {
                            attempts: backoff.attempt,
                        });
                    }
                    return Err(GatewayClientError::Network(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| GatewayClientError::Network(e.to_string()))?;
                if text.is_empty() {
                    return serde_json::from_str("null")
                        .map_err(|e| GatewayClientError::JsonParse(e.to_string()));
                }
                return serde_json::from_str(&text)
                    .map_err(|e| GatewayClientError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();

            let (error_code, error_message) =
                match serde_json::from_str::<GatewayErrorResponse>(&error_body) {
                    Ok(err) => (err.code, err.message),
                    Err(_) => (None, error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = backoff
                        .next_backoff()
                        .map(|d| retry_after.map_or(d, Duration::from_secs));
                    if let Some(delay) = delay {
                        tracing::warn!(delay_ms = delay.as_millis(), "Rate limited, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayClientError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            status = status.as_u16(),
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if matches!(
                        status,
                        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
                    ) {
                        return Err(GatewayClientError::Timeout);
                    }
                    return Err(GatewayClientError::Api {
                        code: error_code.unwrap_or_else(|| status.as_u16().to_string()),
                        message: error_message,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(GatewayClientError::AuthenticationFailed)
                        }
                        StatusCode::NOT_FOUND => Err(GatewayClientError::NotFound {
                            path: path.to_string(),
                        }),
                        StatusCode::CONFLICT => Err(GatewayClientError::Conflict {
                            message: error_message,
                            code: error_code,
                        }),
                        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                            Err(GatewayClientError::Rejected(error_message))
                        }
                        _ => Err(GatewayClientError::Api {
                            code: error_code.unwrap_or_else(|| status.as_u16().to_string()),
                            message: error_message,
                        }),
                    };
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig, delivery: Delivery) -> Self {
        let max_attempts = match delivery {
            Delivery::Retry => config.max_attempts,
            Delivery::Once => 1,
        };
        Self {
            attempt: 0,
            max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_statuses() {
        assert!(matches!(
            categorize_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorCategory::RateLimited
        ));
        assert!(matches!(
            categorize_status(StatusCode::SERVICE_UNAVAILABLE),
            ErrorCategory::Retryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::REQUEST_TIMEOUT),
            ErrorCategory::Retryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::CONFLICT),
            ErrorCategory::NonRetryable
        ));
    }

    #[test]
    fn exponential_backoff_increments_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
            multiplier: 2.0,
        };

        let mut backoff = ExponentialBackoff::new(&config, Delivery::Retry);
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn single_delivery_never_backs_off() {
        let mut backoff = ExponentialBackoff::new(&RetryConfig::default(), Delivery::Once);
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn empty_api_key_is_refused() {
        let err = GatewayHttpClient::new(&GatewayConfig::new("http://localhost", "")).unwrap_err();
        assert!(matches!(err, GatewayClientError::AuthenticationFailed));
    }
}
