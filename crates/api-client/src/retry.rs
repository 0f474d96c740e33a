use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

/// Retry policy for idempotent requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    /// Delay before each retry, in milliseconds.
    pub delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays_ms: vec![250, 500, 1000],
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays_ms: Vec::new(),
        }
    }

    fn delay(&self, attempt: usize) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let ms = self
            .delays_ms
            .get(attempt)
            .or(self.delays_ms.last())
            .copied()
            .unwrap_or(0);
        Some(Duration::from_millis(ms))
    }
}

/// Send a request with backoff.
///
/// Retries on network errors and 5xx responses. Returns immediately on
/// success or 4xx. `build` is called once per attempt since a
/// `reqwest::RequestBuilder` cannot be reused.
pub async fn retry_request<F>(config: &RetryConfig, mut build: F) -> Result<reqwest::Response>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        match build().send().await {
            Ok(resp) if resp.status().is_server_error() => {
                let Some(delay) = config.delay(attempt) else {
                    return Ok(resp);
                };
                warn!(
                    "request attempt {}/{} failed (HTTP {}), retrying in {}ms",
                    attempt + 1,
                    max_attempts,
                    resp.status(),
                    delay.as_millis(),
                );
                tokio::time::sleep(delay).await;
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let Some(delay) = config.delay(attempt) else {
                    return Err(e).context("request failed after retries");
                };
                warn!(
                    "request attempt {}/{} failed ({}), retrying in {}ms",
                    attempt + 1,
                    max_attempts,
                    e,
                    delay.as_millis(),
                );
                tokio::time::sleep(delay).await;
            }
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stop_after_max_retries() {
        let config = RetryConfig {
            max_retries: 4,
            delays_ms: vec![10, 20],
        };
        assert_eq!(config.delay(0), Some(Duration::from_millis(10)));
        assert_eq!(config.delay(1), Some(Duration::from_millis(20)));
        // Past the list, the last delay repeats.
        assert_eq!(config.delay(3), Some(Duration::from_millis(20)));
        assert_eq!(config.delay(4), None);
        assert_eq!(RetryConfig::none().delay(0), None);
    }

    #[tokio::test]
    async fn connection_refused_gives_up() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let config = RetryConfig {
            max_retries: 1,
            delays_ms: vec![1],
        };
        let result = retry_request(&config, || client.get(format!("http://{addr}/api/health"))).await;
        assert!(result.is_err());
    }
}
