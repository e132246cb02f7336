//! LLM and voice-agent ports for Hearth, plus the Anthropic adapter.
//!
//! # Architecture
//!
//! - [`ports`] - the narrow interfaces the orchestration core consumes:
//!   [`LanguageModel`] (`generate_text` / `generate_json`) and
//!   [`VoiceAgent`] (`start_conversation`)
//! - [`AnthropicClient`] - non-streaming Messages API adapter implementing
//!   the [`LanguageModel`] port
//! - [`retry`] - exponential-backoff retry policy, used only inside
//!   adapters
//!
//! # Error Handling
//!
//! Adapters surface the [`LlmError`] taxonomy. By contract,
//! `generate_json` fails on any completion that does not parse as JSON
//! (never repair or guess) because the engine's fallback logic keys off
//! that failure. Retry/backoff happens here and only here; the engine above
//! degrades via documented defaults instead of retrying.

pub mod ports;
pub mod retry;

mod anthropic;

pub use anthropic::{ANTHROPIC_API_URL, AnthropicClient};
pub use ports::{
    GenerationOptions, LanguageModel, LanguageModelExt, StartConversationRequest, VoiceAgent,
    VoiceAgentError, VoiceSession,
};

use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 120;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Failures surfaced by [`LanguageModel`] adapters.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request failed after {attempts} attempt(s): {reason}")]
    Connection { attempts: u32, reason: String },
    #[error("request timed out")]
    Timeout,
    #[error("completion was not usable JSON: {reason}")]
    MalformedJson { reason: String },
    #[error("completion was empty")]
    EmptyCompletion,
}

/// Shared hardened HTTP client for all adapters.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .https_only(false) // Local mock servers in tests are plain HTTP
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("failed to build hardened HTTP client: {e}; using defaults");
                reqwest::Client::new()
            })
    })
}

/// Read an error response body, capped so a hostile or broken server cannot
/// balloon logs.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    let bytes = response.bytes().await.unwrap_or_default();
    if bytes.len() > MAX_ERROR_BODY_BYTES {
        let text = String::from_utf8_lossy(&bytes[..MAX_ERROR_BODY_BYTES]);
        format!("{text}...(truncated)")
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
