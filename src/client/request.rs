use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use super::TranscriptClient;
use crate::error::{ApiError, Result};
use crate::transport::{HttpMethod, HttpRequest, TransportError};
use crate::utils::truncate_chars;

/// Characters of an unparseable error body kept in the error message
const BODY_SNIPPET_CHARS: usize = 200;

/// 202 (job accepted) counts as success alongside everything below 400.
fn is_success(status: u16) -> bool {
    status < 400 || status == 202
}

/// Delay before retry number `retry` (0-based): 1s, 2s, 4s, ...
fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry))
}

/// Turn a raw status and body into parsed JSON or a typed failure.
pub(crate) fn interpret_response(status: u16, body: &[u8]) -> Result<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(json) if is_success(status) => Ok(json),
        Ok(json) => Err(ApiError::from_response(status, &json)),
        Err(_) if status >= 400 => Err(ApiError::Api {
            status: Some(status),
            message: format!(
                "API error {}: {}",
                status,
                truncate_chars(&String::from_utf8_lossy(body), BODY_SNIPPET_CHARS)
            ),
        }),
        Err(e) => Err(ApiError::Api {
            status: Some(status),
            message: format!("Invalid JSON in API response: {}", e),
        }),
    }
}

impl TranscriptClient {
    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| ApiError::Validation(format!("Invalid request URL for {}: {}", path, e)))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.config.api_key),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]
    }

    /// Execute one logical API call.
    ///
    /// Timeouts and 5xx responses are retried up to `max_retries` times with
    /// exponential backoff; every other failure is returned immediately.
    pub(crate) async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.build_url(path, query)?;
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {}", e)))?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt - 1);
                tracing::warn!(
                    %method,
                    path,
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "Retrying request"
                );
                sleep(delay).await;
            }

            match self.attempt(method, &url, body.clone()).await {
                Ok(json) => return Ok(json),
                Err(err) if err.is_retryable() => last_error = Some(err),
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::Api {
            status: None,
            message: "Request failed after retries".to_string(),
        }))
    }

    async fn attempt(&self, method: HttpMethod, url: &Url, body: Option<Vec<u8>>) -> Result<Value> {
        let timeout = self.config.timeout();
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers(),
            body,
            timeout,
        };

        tracing::debug!(%method, url = %url, "Sending API request");

        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                return Err(ApiError::Timeout(format!(
                    "{} {} exceeded {}s",
                    method,
                    url.path(),
                    timeout.as_secs()
                )));
            }
            Ok(Err(TransportError::Failed(message))) => return Err(ApiError::Transport(message)),
            Ok(Ok(response)) => response,
        };

        tracing::debug!(status = response.status, bytes = response.body.len(), "Received API response");

        interpret_response(response.status, &response.body)
    }
}
