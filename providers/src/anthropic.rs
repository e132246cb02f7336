//! Anthropic Messages API adapter for the [`LanguageModel`] port.
//!
//! Non-streaming: the orchestration pipeline consumes whole completions, so
//! there is nothing to stream. Requests go through the shared hardened
//! client with the retry policy from [`crate::retry`]; JSON completions are
//! fence-stripped and parsed strictly, and an unparsable completion is an
//! error by contract so caller fallbacks trigger.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::json;

use crate::ports::{GenerationOptions, LanguageModel};
use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::{LlmError, http_client, read_capped_error_body};

/// Canonical Anthropic API origin.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Anthropic Messages API client.
///
/// ```rust
/// use hearth_providers::AnthropicClient;
///
/// let client = AnthropicClient::new("api-key").with_model("claude-haiku-4-5");
/// # let _ = client;
/// ```
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryConfig,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive() // Omit the API key
    }
}

impl AnthropicClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: ANTHROPIC_API_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different origin. Used by tests against a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One Messages API round trip, returning the first text block.
    async fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let mut body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "stream": false,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });
        if let Some(system) = &options.system {
            body["system"] = json!(system);
        }

        let url = format!("{}/v1/messages", self.base_url);
        let outcome = send_with_retry(
            || {
                http_client()
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .header("content-type", "application/json")
                    .json(&body)
            },
            &self.retry,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status().as_u16();
                let body = read_capped_error_body(response).await;
                return Err(LlmError::Http { status, body });
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                if source.is_timeout() {
                    return Err(LlmError::Timeout);
                }
                return Err(LlmError::Connection {
                    attempts,
                    reason: source.to_string(),
                });
            }
        };

        let payload: serde_json::Value =
            response.json().await.map_err(|e| LlmError::MalformedJson {
                reason: format!("response body was not JSON: {e}"),
            })?;

        payload["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .and_then(|block| block["text"].as_str())
            .map(str::to_string)
            .ok_or_else(|| LlmError::MalformedJson {
                reason: "response envelope carried no text block".to_string(),
            })
    }
}

impl LanguageModel for AnthropicClient {
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        async move {
            let text = self.complete(prompt, options).await?;
            if text.trim().is_empty() {
                return Err(LlmError::EmptyCompletion);
            }
            Ok(text)
        }
        .boxed()
    }

    fn generate_json<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<serde_json::Value, LlmError>> {
        async move {
            let text = self.complete(prompt, options).await?;
            let stripped = strip_code_fences(&text);
            serde_json::from_str(stripped).map_err(|e| LlmError::MalformedJson {
                reason: e.to_string(),
            })
        }
        .boxed()
    }
}

/// Models often wrap JSON in a markdown fence despite instructions; strip
/// one outer fence (with or without a language tag) before parsing.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop a language tag like `json` on the opening fence line.
    match inner.split_once('\n') {
        Some((first_line, rest)) if !first_line.trim().contains(['{', '[']) => rest.trim(),
        _ => inner.trim(),
    }
}
