//! Per-turn questioning strategy.
//!
//! Strategy selection is pure rule evaluation over the latest turn and the
//! session context (no model call, no IO), and each strategy maps to one
//! registry template that becomes the next question's system prompt.
//! Adding a strategy means one new enum variant plus its match arms.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use hearth_prompts::{PromptRegistry, RegistryError, catalog::ids};
use hearth_types::SessionContext;

use crate::director::memories_digest;

/// A short, low-sensory answer invites sensory deepening.
const SHORT_ANSWER_MAX_WORDS: usize = 12;
/// A session this long with terse answers should wind down.
const LONG_SESSION_MINUTES: u64 = 20;
/// Average recent answer length that counts as terse.
const TERSE_ANSWER_MAX_WORDS: usize = 8;
/// How many recent answers the terseness check looks at.
const RECENT_ANSWER_WINDOW: usize = 3;

/// Words whose presence marks an answer as already sensory-rich.
const SENSORY_WORDS: &[&str] = &[
    "saw", "see", "looked", "heard", "hear", "sounded", "smell", "smelled", "scent", "taste",
    "tasted", "touch", "touched", "felt", "warm", "cold", "bright", "dark", "loud", "quiet",
    "sweet", "soft", "rough",
];

/// The closed set of questioning strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStrategy {
    /// Draw the senses back into a thin answer.
    SensoryDeepening,
    /// Thread the current moment to an earlier captured memory.
    TemporalThreading,
    /// Wind the session down warmly.
    GracefulExit,
}

impl QuestionStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            QuestionStrategy::SensoryDeepening => "sensory_deepening",
            QuestionStrategy::TemporalThreading => "temporal_threading",
            QuestionStrategy::GracefulExit => "graceful_exit",
        }
    }

    /// The registry template backing this strategy.
    #[must_use]
    pub const fn template_id(self) -> &'static str {
        match self {
            QuestionStrategy::SensoryDeepening => ids::QUESTION_SENSORY_DEEPENING,
            QuestionStrategy::TemporalThreading => ids::QUESTION_TEMPORAL_THREADING,
            QuestionStrategy::GracefulExit => ids::QUESTION_GRACEFUL_EXIT,
        }
    }
}

/// What the selector knows about the turn that just ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSignals {
    pub last_answer: String,
    pub minutes_elapsed: u64,
}

impl TurnSignals {
    /// Derive the signals from the recorded session history.
    #[must_use]
    pub fn from_context(ctx: &SessionContext) -> Self {
        Self {
            last_answer: ctx.last_answer().unwrap_or_default().to_string(),
            minutes_elapsed: ctx.elapsed_minutes(),
        }
    }
}

/// Pick the next questioning strategy.
///
/// Rules in precedence order, graceful exit first, because a terse
/// late-session answer is also a short low-sensory answer and must not be
/// captured by the deepening rule:
///
/// 1. long session with terse recent answers → graceful exit
/// 2. short, low-sensory answer → sensory deepening
/// 3. stored memories available → temporal threading
/// 4. default → sensory deepening
#[must_use]
pub fn select_strategy(turn: &TurnSignals, ctx: &SessionContext) -> QuestionStrategy {
    if turn.minutes_elapsed >= LONG_SESSION_MINUTES && recent_answers_terse(ctx) {
        return QuestionStrategy::GracefulExit;
    }

    let words = word_count(&turn.last_answer);
    if words > 0 && words <= SHORT_ANSWER_MAX_WORDS && !has_sensory_words(&turn.last_answer) {
        return QuestionStrategy::SensoryDeepening;
    }

    if !ctx.memories.is_empty() {
        return QuestionStrategy::TemporalThreading;
    }

    QuestionStrategy::SensoryDeepening
}

/// Render the next question's system prompt for a chosen strategy.
pub fn build_question_prompt(
    strategy: QuestionStrategy,
    turn: &TurnSignals,
    ctx: &SessionContext,
    registry: &PromptRegistry,
) -> Result<String, RegistryError> {
    let goal = ctx
        .goal
        .as_ref()
        .map(|plan| plan.goal.to_string())
        .unwrap_or_else(|| "a memory that matters to them".to_string());

    let mut vars = HashMap::from([
        ("user_name".to_string(), ctx.user_name.clone()),
        ("goal".to_string(), goal),
        ("last_answer".to_string(), turn.last_answer.clone()),
    ]);
    if strategy == QuestionStrategy::TemporalThreading {
        vars.insert("memories".to_string(), memories_digest(&ctx.memories));
    }

    registry.render(strategy.template_id(), &vars)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn has_sensory_words(text: &str) -> bool {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_ascii_lowercase()
        })
        .any(|word| SENSORY_WORDS.contains(&word.as_str()))
}

fn recent_answers_terse(ctx: &SessionContext) -> bool {
    let answers = ctx.recent_answers(RECENT_ANSWER_WINDOW);
    if answers.is_empty() {
        return false;
    }
    let total_words: usize = answers.iter().map(|answer| word_count(answer)).sum();
    total_words / answers.len() < TERSE_ANSWER_MAX_WORDS
}
