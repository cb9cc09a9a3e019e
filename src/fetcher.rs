//! Fetcher (spec §4.2): issues one outbound HTTP GET with a deadline and
//! a small transient-error retry policy, and hands back the decoded JSON
//! body plus the upstream's `Date` header (used downstream as a clock
//! source, same as the `Date` header the Device Read API itself emits).

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FetchError;

const MAX_RETRIES: u32 = 2;
const MAX_RETRY_AFTER_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub body: serde_json::Value,
    pub http_date: Option<String>,
}

pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client can be built");
        Self { client, timeout }
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(resp) => return Ok(resp),
                Err(FetchError::RateLimited { retry_after_secs }) => {
                    match retry_after_secs {
                        Some(secs) if secs <= MAX_RETRY_AFTER_SECS => {
                            debug!(url, secs, "rate limited, honoring Retry-After");
                            tokio::time::sleep(Duration::from_secs(secs)).await;
                            attempt += 1;
                            if attempt > MAX_RETRIES {
                                return Err(FetchError::RateLimited { retry_after_secs });
                            }
                        }
                        _ => {
                            warn!(url, "rate limited with no usable Retry-After, giving up this cycle");
                            return Err(FetchError::RateLimited { retry_after_secs });
                        }
                    }
                }
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!(url, attempt, error = %e, "transient fetch error, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(FetchError::RateLimited { retry_after_secs });
        }

        if status.is_server_error() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if status.is_client_error() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let http_date = response
            .headers()
            .get("date")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::DecodeError(e.to_string()))?;

        Ok(FetchResponse { body, http_date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_5xx_is_retryable() {
        assert!(FetchError::HttpStatus(503).is_retryable());
    }

    #[test]
    fn http_status_4xx_is_not_retryable() {
        assert!(!FetchError::HttpStatus(404).is_retryable());
    }

    #[test]
    fn timeout_is_retryable() {
        assert!(FetchError::Timeout.is_retryable());
    }
}
