//! Session goal architecture.
//!
//! Before a voice session starts, one chain-of-thought call decides what
//! the interviewer should pursue, surfacing its intermediate reasoning so
//! goal selection stays auditable. The call is wrapped in a single timeout
//! and followed, strictly sequentially and never concurrently, by a
//! free-text fallback that must always produce a goal. Only a failed
//! fallback escalates, and that failure is fatal for session start.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use hearth_prompts::{PromptRegistry, RegistryError, catalog::ids};
use hearth_providers::{
    GenerationOptions, LanguageModel, LanguageModelExt, LlmError, StartConversationRequest,
    VoiceAgent, VoiceAgentError, VoiceSession,
};
use hearth_types::{
    GoalReasoning, MemorySummary, NonEmptyString, SessionContext, SessionPlan, Speaker,
};

use crate::config::EngineConfig;

/// Turns of history included in the planning digest.
const HISTORY_DIGEST_TURNS: usize = 12;

/// Goal determination failed on the only path allowed to fail: the
/// fallback itself.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("fallback goal generation failed: {0}")]
    FallbackFailed(#[from] LlmError),
    #[error("fallback produced an empty goal")]
    EmptyGoal,
    #[error(transparent)]
    Prompt(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum SessionStartError {
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Voice(#[from] VoiceAgentError),
}

/// Why the chain-of-thought attempt was abandoned for the fallback.
#[derive(Debug, Error)]
enum CotFailure {
    #[error(transparent)]
    Prompt(#[from] RegistryError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("reasoning call exceeded {0:?}")]
    TimedOut(Duration),
    #[error("reasoning produced an empty final goal")]
    EmptyGoal,
}

/// Decides each session's goal and hands it to the voice agent.
pub struct SessionDirector {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<PromptRegistry>,
    voice: Arc<dyn VoiceAgent>,
    cot_timeout: Duration,
    options: GenerationOptions,
}

impl SessionDirector {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<PromptRegistry>,
        voice: Arc<dyn VoiceAgent>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            llm,
            prompts,
            voice,
            cot_timeout: config.cot_timeout(),
            options: GenerationOptions::default().with_max_tokens(config.planning_max_tokens),
        }
    }

    /// Decide what the next session should pursue.
    ///
    /// The structured attempt and the fallback run one after the other
    /// (at most one external call is in flight), and the result always
    /// carries a non-empty goal unless the fallback itself failed.
    pub async fn determine_session_goal(
        &self,
        ctx: &SessionContext,
    ) -> Result<SessionPlan, GoalError> {
        match self.chain_of_thought_goal(ctx).await {
            Ok(plan) => Ok(plan),
            Err(e) => {
                tracing::warn!(error = %e, "goal reasoning failed; using fallback prompt");
                self.fallback_goal(ctx).await
            }
        }
    }

    /// Determine the goal (reusing an existing plan when the context
    /// already carries one) and open the voice conversation.
    pub async fn start_session(
        &self,
        ctx: &SessionContext,
        image_context: Vec<String>,
    ) -> Result<(SessionPlan, VoiceSession), SessionStartError> {
        let plan = match &ctx.goal {
            Some(plan) => plan.clone(),
            None => self.determine_session_goal(ctx).await?,
        };

        let request = StartConversationRequest {
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id.clone(),
            user_name: ctx.user_name.clone(),
            goal: plan.goal.to_string(),
            memories: ctx.memories.clone(),
            image_context,
        };
        let session = self.voice.start_conversation(&request).await?;
        Ok((plan, session))
    }

    async fn chain_of_thought_goal(&self, ctx: &SessionContext) -> Result<SessionPlan, CotFailure> {
        let vars = HashMap::from([
            ("user_name".to_string(), ctx.user_name.clone()),
            ("topics_love".to_string(), list_or_none(&ctx.topics_love)),
            ("topics_avoid".to_string(), list_or_none(&ctx.topics_avoid)),
            ("memories".to_string(), memories_digest(&ctx.memories)),
            ("history_digest".to_string(), history_digest(ctx)),
        ]);
        let prompt = self.prompts.render(ids::SESSION_GOAL_COT, &vars)?;

        let reasoning: GoalReasoning =
            tokio::time::timeout(self.cot_timeout, self.llm.generate_typed(&prompt, &self.options))
                .await
                .map_err(|_| CotFailure::TimedOut(self.cot_timeout))??;

        let goal = NonEmptyString::new(reasoning.final_goal.trim().to_string())
            .map_err(|_| CotFailure::EmptyGoal)?;
        let strategy = Some(reasoning.selected_strategy.clone())
            .filter(|strategy| !strategy.trim().is_empty());

        Ok(SessionPlan {
            goal,
            strategy,
            reasoning: Some(reasoning),
        })
    }

    async fn fallback_goal(&self, ctx: &SessionContext) -> Result<SessionPlan, GoalError> {
        let vars = HashMap::from([
            ("user_name".to_string(), ctx.user_name.clone()),
            ("memories".to_string(), memories_digest(&ctx.memories)),
        ]);
        let prompt = self.prompts.render(ids::SESSION_GOAL_FALLBACK, &vars)?;
        let completion = self.llm.generate_text(&prompt, &self.options).await?;
        let goal = NonEmptyString::new(completion.trim().to_string())
            .map_err(|_| GoalError::EmptyGoal)?;

        Ok(SessionPlan {
            goal,
            strategy: None,
            reasoning: None,
        })
    }
}

/// Comma list, or an explicit marker so the template never renders blank.
fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn memories_digest(memories: &[MemorySummary]) -> String {
    if memories.is_empty() {
        return "(none yet)".to_string();
    }
    let mut digest = String::new();
    for memory in memories {
        let _ = writeln!(digest, "- {}: {}", memory.title, memory.summary);
    }
    digest
}

pub(crate) fn history_digest(ctx: &SessionContext) -> String {
    if ctx.history.is_empty() {
        return "(first session)".to_string();
    }
    let skip = ctx.history.len().saturating_sub(HISTORY_DIGEST_TURNS);
    let mut digest = String::new();
    for turn in &ctx.history[skip..] {
        let speaker = match turn.speaker {
            Speaker::Interviewer => "Interviewer",
            Speaker::Storyteller => ctx.user_name.as_str(),
        };
        let _ = writeln!(digest, "{speaker}: {}", turn.content);
    }
    digest
}
