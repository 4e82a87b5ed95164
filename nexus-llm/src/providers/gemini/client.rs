//! Gemini HTTP client

use super::types::{ApiError, GenerateContentRequest, GenerateContentResponse};
use nexus_core::{LlmError, ModelConfig, NexusError, NexusResult};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub(crate) const PROVIDER: &str = "gemini";

/// Gemini REST client. One per process; reqwest pools connections.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from model settings.
    ///
    /// Fails with [`LlmError::ProviderNotConfigured`] when no API key is set.
    pub fn new(config: &ModelConfig) -> NexusResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::ProviderNotConfigured)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Transport {
                provider: PROVIDER.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// POST a `generateContent` request for `model`.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> NexusResult<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: format!("failed to parse response: {}", e),
                }
                .into()
            })
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(status_error(status, &body))
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> NexusError {
        let reason = if e.is_timeout() {
            format!("request timed out after {}ms", self.timeout.as_millis())
        } else {
            format!("HTTP request failed: {}", e)
        };
        LlmError::Transport {
            provider: PROVIDER.to_string(),
            reason,
        }
        .into()
    }
}

/// Map a non-success status and body to an error. 429 is a rate limit.
pub(crate) fn status_error(status: StatusCode, body: &str) -> NexusError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api| match api.error.status {
            Some(code) => format!("{}: {}", code, api.error.message),
            None => api.error.message,
        })
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        LlmError::RateLimited {
            provider: PROVIDER.to_string(),
            message,
        }
        .into()
    } else {
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            status: status.as_u16(),
            message,
        }
        .into()
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::ErrorClass;

    fn config() -> ModelConfig {
        ModelConfig {
            api_key: Some("test-key".to_string()),
            base_url: "https://example.test/v1beta/".to_string(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let err = GeminiClient::new(&ModelConfig::default()).expect_err("no key");
        assert_eq!(err, NexusError::Llm(LlmError::ProviderNotConfigured));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(&config()).expect("client");
        assert_eq!(
            client.endpoint("gemini-3-pro-preview"),
            "https://example.test/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiClient::new(&config()).expect("client");
        assert!(!format!("{:?}", client).contains("test-key"));
    }

    #[test]
    fn test_429_is_rate_limited() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, NexusError::Llm(LlmError::RateLimited { .. })));
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED"));
    }

    #[test]
    fn test_other_status_is_service_failure() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        assert_eq!(err.class(), ErrorClass::NetworkOrServiceFailure);
        assert!(matches!(
            err,
            NexusError::Llm(LlmError::RequestFailed { status: 500, .. })
        ));
    }
}
