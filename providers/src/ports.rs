//! The ports this core consumes.
//!
//! The orchestration engine never talks to a model or voice vendor
//! directly; it holds `Arc<dyn LanguageModel>` / `Arc<dyn VoiceAgent>` and
//! lets the surrounding application decide what stands behind them. Both
//! traits are object-safe: methods return [`BoxFuture`] rather than using
//! native async, so trait objects work everywhere.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use hearth_types::{MemorySummary, SessionId, UserId};

use crate::LlmError;

/// Per-call generation knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Optional system prompt sent alongside the user prompt.
    pub system: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            system: None,
        }
    }
}

impl GenerationOptions {
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text-generation port.
///
/// `generate_json` must fail with [`LlmError::MalformedJson`] when the
/// completion cannot be parsed. Callers rely on that failure to trigger
/// their documented fallbacks, so an adapter that silently repairs or
/// swallows bad JSON breaks the degradation contract.
pub trait LanguageModel: Send + Sync {
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<String, LlmError>>;

    fn generate_json<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<serde_json::Value, LlmError>>;
}

/// Typed deserialization on top of [`LanguageModel::generate_json`].
///
/// This is the schema boundary: past here the payload is a strict Rust
/// struct or it is an error, never loosely-typed JSON.
pub trait LanguageModelExt: LanguageModel {
    fn generate_typed<'a, T>(
        &'a self,
        prompt: &'a str,
        options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<T, LlmError>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        async move {
            let value = self.generate_json(prompt, options).await?;
            serde_json::from_value(value).map_err(|e| LlmError::MalformedJson {
                reason: e.to_string(),
            })
        }
        .boxed()
    }
}

impl<M: LanguageModel + ?Sized> LanguageModelExt for M {}

/// Everything the voice platform needs to open a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct StartConversationRequest {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub user_name: String,
    /// The session goal decided by the architect.
    pub goal: String,
    pub memories: Vec<MemorySummary>,
    /// Captions of photos available to show during the session.
    pub image_context: Vec<String>,
}

/// Handle to a running voice conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSession {
    pub agent_id: String,
    pub conversation_id: String,
    pub ws_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceAgentError {
    #[error("voice agent rejected the session: {reason}")]
    Rejected { reason: String },
    #[error("voice agent unreachable: {reason}")]
    Transport { reason: String },
}

/// Conversational-voice port. The concrete vendor client lives in the
/// surrounding application.
pub trait VoiceAgent: Send + Sync {
    fn start_conversation<'a>(
        &'a self,
        request: &'a StartConversationRequest,
    ) -> BoxFuture<'a, Result<VoiceSession, VoiceAgentError>>;
}
