//! Agent orchestration core for Hearth.
//!
//! # Architecture
//!
//! Dependency order, leaves first:
//!
//! - [`AtomDecomposer`] - fan-out of independent extraction calls through
//!   the LLM port; every slot populates or defaults, never all-or-nothing
//! - [`Synthesizer`] - single grounded synthesis call per artifact
//!   (chapter text or per-page storybook scenes)
//! - [`SessionDirector`] - chain-of-thought session-goal selection with a
//!   guaranteed-success free-text fallback, plus the voice-agent handoff
//! - [`select_strategy`] / [`build_question_prompt`] - pure per-turn
//!   questioning strategy
//! - [`Orchestrator`] - composition root gating content through the
//!   wellbeing guard on both sides of the pipeline
//!
//! # Failure policy
//!
//! Extraction failures are absorbed (documented defaults), synthesis
//! failures propagate (no safe default for finished narrative), safety
//! findings are values not errors, and goal determination only fails when
//! its fallback does. Nothing in this crate retries an LLM call; retry
//! lives in the port adapter.

mod config;
mod decompose;
mod director;
mod orchestrator;
mod strategy;
mod synthesize;

pub use config::EngineConfig;
pub use decompose::AtomDecomposer;
pub use director::{GoalError, SessionDirector, SessionStartError};
pub use orchestrator::{ChapterOutcome, Orchestrator, SAFETY_PLACEHOLDER, StorybookOutcome};
pub use strategy::{QuestionStrategy, TurnSignals, build_question_prompt, select_strategy};
pub use synthesize::{SynthesisError, Synthesizer};

// The ports and domain types consumers need alongside the engine.
pub use hearth_guard::WellbeingGuard;
pub use hearth_prompts::{PromptRegistry, RegistryError};
pub use hearth_providers::{
    GenerationOptions, LanguageModel, LanguageModelExt, LlmError, StartConversationRequest,
    VoiceAgent, VoiceAgentError, VoiceSession,
};
