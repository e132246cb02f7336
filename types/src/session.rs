//! Session context: who is being interviewed, what has been said, and what
//! the session is trying to accomplish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NonEmptyString;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The voice agent conducting the interview.
    Interviewer,
    /// The participant telling their story.
    Storyteller,
}

/// One utterance in the session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A previously captured memory, summarized for session planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub title: String,
    pub summary: String,
}

/// Intermediate reasoning surfaced by the chain-of-thought goal call.
///
/// Kept on the resulting plan so goal selection stays auditable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalReasoning {
    pub context_summary: String,
    pub safety_risks: Vec<String>,
    pub potential_strategies: Vec<String>,
    pub selected_strategy: String,
    pub final_goal: String,
}

/// What the session should pursue, as decided by the goal architect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub goal: NonEmptyString,
    /// Unset when the plan came from the free-text fallback.
    pub strategy: Option<String>,
    /// Unset when the plan came from the free-text fallback.
    pub reasoning: Option<GoalReasoning>,
}

/// Everything the orchestration core knows about an interview session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub user_name: String,
    /// Ordered transcript, oldest first.
    pub history: Vec<ConversationTurn>,
    pub memories: Vec<MemorySummary>,
    pub topics_avoid: Vec<String>,
    pub topics_love: Vec<String>,
    /// None until the goal architect has run.
    pub goal: Option<SessionPlan>,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            user_name: user_name.into(),
            history: Vec::new(),
            memories: Vec::new(),
            topics_avoid: Vec::new(),
            topics_love: Vec::new(),
            goal: None,
        }
    }

    /// The storyteller's most recent answer, if any.
    #[must_use]
    pub fn last_answer(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|turn| turn.speaker == Speaker::Storyteller)
            .map(|turn| turn.content.as_str())
    }

    /// The storyteller's last `n` answers, most recent last.
    #[must_use]
    pub fn recent_answers(&self, n: usize) -> Vec<&str> {
        let mut answers: Vec<&str> = self
            .history
            .iter()
            .rev()
            .filter(|turn| turn.speaker == Speaker::Storyteller)
            .take(n)
            .map(|turn| turn.content.as_str())
            .collect();
        answers.reverse();
        answers
    }

    /// Minutes between the first and last recorded turns.
    #[must_use]
    pub fn elapsed_minutes(&self) -> u64 {
        match (self.history.first(), self.history.last()) {
            (Some(first), Some(last)) => {
                let delta = last.timestamp.signed_duration_since(first.timestamp);
                delta.num_minutes().max(0) as u64
            }
            _ => 0,
        }
    }
}
