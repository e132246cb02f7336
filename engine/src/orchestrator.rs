//! Composition root: decomposition → synthesis with safety gating on both
//! sides.
//!
//! A High/Critical wellbeing or scam finding does not raise. The content
//! is replaced by a fixed safety placeholder and the reason travels with
//! the outcome, so callers always get a value they can show or store.

use std::sync::Arc;

use hearth_guard::WellbeingGuard;
use hearth_prompts::PromptRegistry;
use hearth_providers::LanguageModel;
use hearth_types::{ChapterAtoms, NonEmptyString, Severity, StoryScene, WellbeingAssessment};

use crate::config::EngineConfig;
use crate::decompose::AtomDecomposer;
use crate::synthesize::{SynthesisError, Synthesizer};

/// Shown in place of blocked content.
pub const SAFETY_PLACEHOLDER: &str = "This memory needs a caring review before it can be shared. \
     A member of the care team has been notified.";

/// Result of a gated chapter composition.
#[derive(Debug)]
pub enum ChapterOutcome {
    Completed {
        text: NonEmptyString,
        atoms: ChapterAtoms,
    },
    /// Content was withheld; `reason` explains which gate fired and why.
    Blocked {
        reason: String,
        assessment: Box<WellbeingAssessment>,
    },
}

impl ChapterOutcome {
    /// The text to hand onward: the chapter, or the safety placeholder.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            ChapterOutcome::Completed { text, .. } => text.as_str(),
            ChapterOutcome::Blocked { .. } => SAFETY_PLACEHOLDER,
        }
    }
}

/// Result of a gated storybook composition.
#[derive(Debug)]
pub enum StorybookOutcome {
    Completed {
        scenes: Vec<StoryScene>,
    },
    Blocked {
        reason: String,
        assessment: Box<WellbeingAssessment>,
    },
}

/// Wires guard, decomposer, and synthesizer together.
pub struct Orchestrator {
    guard: WellbeingGuard,
    decomposer: AtomDecomposer,
    synthesizer: Synthesizer,
    block_threshold: Severity,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<PromptRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            guard: WellbeingGuard::new(),
            decomposer: AtomDecomposer::new(llm.clone(), prompts.clone(), config),
            synthesizer: Synthesizer::new(llm, prompts, config),
            block_threshold: config.block_threshold,
        }
    }

    #[must_use]
    pub fn guard(&self) -> &WellbeingGuard {
        &self.guard
    }

    #[must_use]
    pub fn decomposer(&self) -> &AtomDecomposer {
        &self.decomposer
    }

    #[must_use]
    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Decompose and synthesize a memoir chapter, gating the transcript on
    /// the way in and the narrative on the way out.
    pub async fn compose_chapter(
        &self,
        transcript: &str,
        prior_context: &str,
    ) -> Result<ChapterOutcome, SynthesisError> {
        if let Some((reason, assessment)) = self.input_gate(transcript) {
            tracing::warn!(reason, "chapter transcript blocked");
            return Ok(ChapterOutcome::Blocked {
                reason,
                assessment: Box::new(assessment),
            });
        }

        let atoms = self
            .decomposer
            .decompose_transcript(transcript, prior_context)
            .await;
        let text = self.synthesizer.synthesize_chapter(&atoms, transcript).await?;

        if let Some((reason, assessment)) = self.output_gate(&text) {
            tracing::warn!(reason, "synthesized chapter blocked");
            return Ok(ChapterOutcome::Blocked {
                reason,
                assessment: Box::new(assessment),
            });
        }

        Ok(ChapterOutcome::Completed { text, atoms })
    }

    /// Decompose and synthesize a storybook, gating the story on the way in
    /// and the combined narration on the way out.
    pub async fn compose_storybook(
        &self,
        transcript: &str,
    ) -> Result<StorybookOutcome, SynthesisError> {
        if let Some((reason, assessment)) = self.input_gate(transcript) {
            tracing::warn!(reason, "storybook transcript blocked");
            return Ok(StorybookOutcome::Blocked {
                reason,
                assessment: Box::new(assessment),
            });
        }

        let atoms = self.decomposer.decompose_story(transcript).await;
        let scenes = self.synthesizer.synthesize_scenes(&atoms, transcript).await?;

        let narration: String = scenes
            .iter()
            .map(|scene| scene.story_text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if let Some((reason, assessment)) = self.output_gate(&narration) {
            tracing::warn!(reason, "synthesized storybook blocked");
            return Ok(StorybookOutcome::Blocked {
                reason,
                assessment: Box::new(assessment),
            });
        }

        Ok(StorybookOutcome::Completed { scenes })
    }

    /// Incoming transcripts are checked for wellbeing risk and scam
    /// content.
    fn input_gate(&self, text: &str) -> Option<(String, WellbeingAssessment)> {
        let assessment = self.guard.assess_wellbeing(text, None);
        if assessment.overall_risk >= self.block_threshold {
            let reason = format!(
                "transcript wellbeing risk {}: {}",
                assessment.overall_risk, assessment.risk_justification
            );
            return Some((reason, assessment));
        }

        let scam = self.guard.detect_scam(text);
        if scam.detected && scam.risk_level >= self.block_threshold {
            let scam_type = scam
                .scam_type
                .map(|t| t.as_str())
                .unwrap_or("unknown");
            let reason = format!(
                "transcript matches {scam_type} scam indicators at {} risk",
                scam.risk_level
            );
            return Some((reason, assessment));
        }

        None
    }

    /// Outgoing narrative is re-checked so synthesis cannot launder risky
    /// content past the input gate.
    fn output_gate(&self, text: &str) -> Option<(String, WellbeingAssessment)> {
        let assessment = self.guard.assess_wellbeing(text, None);
        if assessment.overall_risk >= self.block_threshold {
            let reason = format!(
                "narrative wellbeing risk {}: {}",
                assessment.overall_risk, assessment.risk_justification
            );
            return Some((reason, assessment));
        }
        None
    }
}
