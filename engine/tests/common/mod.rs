//! Shared port doubles for engine integration tests.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use hearth_providers::{
    GenerationOptions, LanguageModel, LlmError, StartConversationRequest, VoiceAgent,
    VoiceAgentError, VoiceSession,
};

type JsonScript = Box<dyn Fn(&str) -> Result<serde_json::Value, LlmError> + Send + Sync>;
type TextScript = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// [`LanguageModel`] double driven by per-call closures, recording every
/// prompt it sees.
pub struct ScriptedModel {
    on_json: JsonScript,
    on_text: TextScript,
    delay: Option<Duration>,
    pub seen_prompts: Mutex<Vec<String>>,
    pub json_calls: AtomicU32,
    pub text_calls: AtomicU32,
}

impl ScriptedModel {
    pub fn new<J, T>(on_json: J, on_text: T) -> Self
    where
        J: Fn(&str) -> Result<serde_json::Value, LlmError> + Send + Sync + 'static,
        T: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            on_json: Box::new(on_json),
            on_text: Box::new(on_text),
            delay: None,
            seen_prompts: Mutex::new(Vec::new()),
            json_calls: AtomicU32::new(0),
            text_calls: AtomicU32::new(0),
        }
    }

    /// Every call fails with a connection error.
    pub fn failing() -> Self {
        Self::new(
            |_| {
                Err(LlmError::Connection {
                    attempts: 3,
                    reason: "scripted outage".to_string(),
                })
            },
            |_| {
                Err(LlmError::Connection {
                    attempts: 3,
                    reason: "scripted outage".to_string(),
                })
            },
        )
    }

    /// Sleep before answering; used to trip timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn json_call_count(&self) -> u32 {
        self.json_calls.load(Ordering::SeqCst)
    }

    pub fn text_call_count(&self) -> u32 {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen_prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) {
        self.seen_prompts.lock().unwrap().push(prompt.to_string());
    }
}

impl LanguageModel for ScriptedModel {
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        _options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.record(prompt);
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            (self.on_text)(prompt)
        }
        .boxed()
    }

    fn generate_json<'a>(
        &'a self,
        prompt: &'a str,
        _options: &'a GenerationOptions,
    ) -> BoxFuture<'a, Result<serde_json::Value, LlmError>> {
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.record(prompt);
            self.json_calls.fetch_add(1, Ordering::SeqCst);
            (self.on_json)(prompt)
        }
        .boxed()
    }
}

/// Routes extraction prompts to canned payloads by their JSON-shape line.
///
/// Slots named in `broken` answer with prose instead of JSON, exercising
/// the per-slot fallback.
pub fn routed_extraction_model(broken: &'static [&'static str]) -> ScriptedModel {
    ScriptedModel::new(
        move |prompt| {
            let routes: &[(&str, serde_json::Value)] = &[
                (
                    r#"{"narrative_arc""#,
                    serde_json::json!({"narrative_arc": "From the dust bowl to the coast"}),
                ),
                (
                    r#"{"best_quotes""#,
                    serde_json::json!({"best_quotes": [
                        {"text": "We packed the truck at dawn", "reason": "voice"},
                        {"text": "California smelled like oranges", "reason": "sensory"},
                        {"text": "A third quote", "reason": "overflow"}
                    ]}),
                ),
                (
                    r#"{"sensory_details""#,
                    serde_json::json!({"sensory_details": [
                        {"sense": "smell", "detail": "orange blossoms on the wind"}
                    ]}),
                ),
                (
                    r#"{"valence""#,
                    serde_json::json!({"valence": "mixed", "confidence": 0.8}),
                ),
                (
                    r#"{"connections""#,
                    serde_json::json!({"connections": [
                        {"theme": "leaving home", "note": "echoes the move to town"}
                    ]}),
                ),
                (
                    r#"{"key_moments""#,
                    serde_json::json!({"key_moments": [
                        {"description": "The truck breaks down", "importance": 4},
                        {"description": "First sight of the ocean", "importance": 9}
                    ]}),
                ),
                (
                    r#"{"visual_elements""#,
                    serde_json::json!({"visual_elements": [
                        {"subject": "a green pickup truck", "detail": "piled high with furniture"}
                    ]}),
                ),
                (
                    r#"{"narrative_beats""#,
                    serde_json::json!({"narrative_beats": [
                        {"beat": "the journey", "page_start": 1, "page_end": 2},
                        {"beat": "arrival", "page_start": 3, "page_end": 4}
                    ]}),
                ),
                (
                    r#"{"character_details""#,
                    serde_json::json!({"character_details": [
                        {"name": "Papa", "description": "tall, sunburned, always in a straw hat"}
                    ]}),
                ),
            ];

            for (marker, payload) in routes {
                if prompt.contains(marker) {
                    if broken.iter().any(|b| marker.contains(b)) {
                        return Err(LlmError::MalformedJson {
                            reason: "scripted prose response".to_string(),
                        });
                    }
                    return Ok(payload.clone());
                }
            }
            Err(LlmError::MalformedJson {
                reason: format!(
                    "no route for prompt: {}",
                    prompt.chars().take(60).collect::<String>()
                ),
            })
        },
        |_| Ok("A quiet, grounded chapter about the move west.".to_string()),
    )
}

/// [`VoiceAgent`] double recording every start request.
pub struct RecordingVoiceAgent {
    pub requests: Mutex<Vec<StartConversationRequest>>,
}

impl RecordingVoiceAgent {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<StartConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl VoiceAgent for RecordingVoiceAgent {
    fn start_conversation<'a>(
        &'a self,
        request: &'a StartConversationRequest,
    ) -> BoxFuture<'a, Result<VoiceSession, VoiceAgentError>> {
        async move {
            self.requests.lock().unwrap().push(request.clone());
            Ok(VoiceSession {
                agent_id: "agent-1".to_string(),
                conversation_id: "conv-1".to_string(),
                ws_url: "wss://voice.example/conv-1".to_string(),
            })
        }
        .boxed()
    }
}
