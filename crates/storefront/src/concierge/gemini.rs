//! Gemini provider for the concierge.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ConciergeConfig;

use super::Concierge;
use super::error::ConciergeError;
use super::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Concierge backed by the Gemini `generateContent` API.
///
/// Cheap to clone: clones share one HTTP connection pool.
#[derive(Clone)]
pub struct GeminiConcierge {
    inner: Arc<GeminiConciergeInner>,
}

struct GeminiConciergeInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for GeminiConcierge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConcierge")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .finish_non_exhaustive()
    }
}

impl GeminiConcierge {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the API key is not a valid header value, or
    /// `Http` if the HTTP client cannot be built.
    pub fn new(config: &ConciergeConfig) -> Result<Self, ConciergeError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| {
            ConciergeError::Unauthorized("API key contains invalid header characters".to_string())
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GeminiConciergeInner {
                client,
                endpoint: format!("{}/models/{}:generateContent", config.api_base, config.model),
                model: config.model.clone(),
            }),
        })
    }

    /// The model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    async fn handle_error_status(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> ConciergeError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return ConciergeError::RateLimited(retry_after);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ConciergeError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => ConciergeError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                },
                Err(_) => ConciergeError::Api {
                    status: status.to_string(),
                    message: body,
                },
            },
            Err(e) => ConciergeError::Http(e),
        }
    }
}

#[async_trait]
impl Concierge for GeminiConcierge {
    #[instrument(skip(self, system_instruction, query), fields(model = %self.inner.model))]
    async fn recommend(
        &self,
        system_instruction: &str,
        query: &str,
    ) -> Result<String, ConciergeError> {
        let request = GenerateContentRequest::single_turn(system_instruction, query);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ConciergeError::Parse(format!("Failed to parse response: {e}")))?;

        let text = parsed.text();
        debug!(chars = text.len(), "concierge reply received");
        Ok(text)
    }
}
