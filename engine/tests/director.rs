//! Session-goal architecture: the chain-of-thought path, the free-text
//! fallback, and the voice-agent handoff.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingVoiceAgent, ScriptedModel};
use hearth_engine::{EngineConfig, GoalError, SessionDirector, SessionStartError};
use hearth_prompts::PromptRegistry;
use hearth_types::{
    MemorySummary, NonEmptyString, SessionContext, SessionId, SessionPlan, UserId,
};

fn registry() -> Arc<PromptRegistry> {
    Arc::new(PromptRegistry::with_builtin_prompts())
}

fn context() -> SessionContext {
    let mut ctx = SessionContext::new(UserId::new("user-9"), SessionId::new("session-3"), "Rose");
    ctx.memories.push(MemorySummary {
        title: "The bakery".to_string(),
        summary: "Saturday mornings with her father".to_string(),
    });
    ctx.topics_avoid.push("her late brother".to_string());
    ctx.topics_love.push("gardening".to_string());
    ctx
}

fn cot_payload() -> serde_json::Value {
    serde_json::json!({
        "context_summary": "Rose lights up when talking about food and family.",
        "safety_risks": ["grief around her brother"],
        "potential_strategies": ["explore the bakery years", "ask about the garden"],
        "selected_strategy": "explore the bakery years",
        "final_goal": "Capture the story of the family bakery on Maple Street."
    })
}

fn director(model: Arc<ScriptedModel>, voice: Arc<RecordingVoiceAgent>) -> SessionDirector {
    director_with_config(model, voice, &EngineConfig::default())
}

fn director_with_config(
    model: Arc<ScriptedModel>,
    voice: Arc<RecordingVoiceAgent>,
    config: &EngineConfig,
) -> SessionDirector {
    SessionDirector::new(model, registry(), voice, config)
}

#[tokio::test]
async fn structured_reasoning_produces_an_auditable_plan() {
    let model = Arc::new(ScriptedModel::new(
        |_| Ok(cot_payload()),
        |_| Ok("unused".to_string()),
    ));
    let plan = director(model.clone(), Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await
        .expect("goal determined");

    assert_eq!(
        plan.goal.as_str(),
        "Capture the story of the family bakery on Maple Street."
    );
    assert_eq!(plan.strategy.as_deref(), Some("explore the bakery years"));
    let reasoning = plan.reasoning.expect("reasoning retained");
    assert_eq!(reasoning.safety_risks.len(), 1);
    // One structured call, no fallback.
    assert_eq!(model.json_call_count(), 1);
    assert_eq!(model.text_call_count(), 0);
}

#[tokio::test]
async fn reasoning_prompt_carries_the_avoid_list() {
    let model = Arc::new(ScriptedModel::new(
        |_| Ok(cot_payload()),
        |_| Ok("unused".to_string()),
    ));
    director(model.clone(), Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await
        .expect("goal determined");

    let prompts = model.prompts();
    assert!(prompts[0].contains("her late brother"));
    assert!(prompts[0].contains("never select a goal"));
}

#[tokio::test]
async fn malformed_reasoning_falls_back_to_free_text() {
    let model = Arc::new(ScriptedModel::new(
        |_| {
            Err(hearth_engine::LlmError::MalformedJson {
                reason: "prose instead of json".to_string(),
            })
        },
        |_| Ok("Let's talk about the garden she planted after the war.".to_string()),
    ));
    let plan = director(model.clone(), Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await
        .expect("fallback succeeded");

    assert!(!plan.goal.as_str().is_empty());
    assert_eq!(plan.strategy, None);
    assert_eq!(plan.reasoning, None);
    // The structured attempt ran first, then exactly one fallback call.
    assert_eq!(model.json_call_count(), 1);
    assert_eq!(model.text_call_count(), 1);
}

#[tokio::test]
async fn empty_final_goal_also_falls_back() {
    let model = Arc::new(ScriptedModel::new(
        |_| {
            Ok(serde_json::json!({
                "context_summary": "…", "safety_risks": [], "potential_strategies": [],
                "selected_strategy": "", "final_goal": "   "
            }))
        },
        |_| Ok("Ask about the first house she remembers.".to_string()),
    ));
    let plan = director(model, Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await
        .expect("fallback succeeded");
    assert_eq!(
        plan.goal.as_str(),
        "Ask about the first house she remembers."
    );
}

#[tokio::test]
async fn slow_reasoning_times_out_into_the_fallback() {
    let config = EngineConfig {
        cot_timeout_secs: 1,
        ..EngineConfig::default()
    };
    // Slower than the budget, so the structured attempt is abandoned and
    // the (equally slow, but untimed) fallback supplies the goal.
    let slow_model = Arc::new(
        ScriptedModel::new(
            |_| Ok(cot_payload()),
            |_| Ok("A gentle session about her schooldays.".to_string()),
        )
        .with_delay(Duration::from_millis(1500)),
    );

    let plan = director_with_config(
        slow_model.clone(),
        Arc::new(RecordingVoiceAgent::new()),
        &config,
    )
    .determine_session_goal(&context())
    .await
    .expect("fallback succeeded");

    assert_eq!(plan.goal.as_str(), "A gentle session about her schooldays.");
    assert_eq!(plan.reasoning, None);
}

#[tokio::test]
async fn failed_fallback_is_fatal() {
    let model = Arc::new(ScriptedModel::failing());
    let result = director(model, Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await;
    assert!(matches!(result, Err(GoalError::FallbackFailed(_))));
}

#[tokio::test]
async fn empty_fallback_is_fatal() {
    let model = Arc::new(ScriptedModel::new(
        |_| {
            Err(hearth_engine::LlmError::MalformedJson {
                reason: "prose".to_string(),
            })
        },
        |_| Ok("  ".to_string()),
    ));
    let result = director(model, Arc::new(RecordingVoiceAgent::new()))
        .determine_session_goal(&context())
        .await;
    assert!(matches!(result, Err(GoalError::EmptyGoal)));
}

#[tokio::test]
async fn start_session_hands_the_goal_to_the_voice_agent() {
    let model = Arc::new(ScriptedModel::new(
        |_| Ok(cot_payload()),
        |_| Ok("unused".to_string()),
    ));
    let voice = Arc::new(RecordingVoiceAgent::new());
    let (plan, session) = director(model, voice.clone())
        .start_session(&context(), vec!["photo of the bakery".to_string()])
        .await
        .expect("session started");

    assert_eq!(session.conversation_id, "conv-1");
    let requests = voice.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_id, UserId::new("user-9"));
    assert_eq!(requests[0].session_id, SessionId::new("session-3"));
    assert_eq!(requests[0].user_name, "Rose");
    assert_eq!(requests[0].goal, plan.goal.as_str());
    assert_eq!(requests[0].image_context, vec!["photo of the bakery"]);
    assert_eq!(requests[0].memories.len(), 1);
}

#[tokio::test]
async fn start_session_reuses_an_existing_plan() {
    let model = Arc::new(ScriptedModel::failing());
    let voice = Arc::new(RecordingVoiceAgent::new());
    let mut ctx = context();
    ctx.goal = Some(SessionPlan {
        goal: NonEmptyString::new("Finish the bakery story").expect("non-empty"),
        strategy: None,
        reasoning: None,
    });

    let (plan, _) = director(model.clone(), voice)
        .start_session(&ctx, Vec::new())
        .await
        .expect("session started");

    assert_eq!(plan.goal.as_str(), "Finish the bakery story");
    assert_eq!(model.json_call_count(), 0);
    assert_eq!(model.text_call_count(), 0);
}

#[tokio::test]
async fn voice_rejection_surfaces_as_session_start_error() {
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use hearth_engine::{StartConversationRequest, VoiceAgent, VoiceAgentError, VoiceSession};

    struct RejectingAgent;
    impl VoiceAgent for RejectingAgent {
        fn start_conversation<'a>(
            &'a self,
            _request: &'a StartConversationRequest,
        ) -> BoxFuture<'a, Result<VoiceSession, VoiceAgentError>> {
            async move {
                Err(VoiceAgentError::Rejected {
                    reason: "no capacity".to_string(),
                })
            }
            .boxed()
        }
    }

    let model = Arc::new(ScriptedModel::new(
        |_| Ok(cot_payload()),
        |_| Ok("unused".to_string()),
    ));
    let director = SessionDirector::new(
        model,
        registry(),
        Arc::new(RejectingAgent),
        &EngineConfig::default(),
    );
    let result = director.start_session(&context(), Vec::new()).await;
    assert!(matches!(result, Err(SessionStartError::Voice(_))));
}
