//! Grounded narrative synthesis.
//!
//! One call per artifact: a memoir chapter (free text) or a set of
//! storybook scenes (one per page). The prompt embeds the atom set and
//! forbids asserting facts that are not in it; groundedness is a
//! documented prompt-level contract, not something this code can verify
//! mechanically. Unlike decomposition there is no safe default for
//! finished narrative, so failures here propagate.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use hearth_prompts::{PromptRegistry, RegistryError, catalog::ids};
use hearth_providers::{GenerationOptions, LanguageModel, LanguageModelExt, LlmError};
use hearth_types::{ChapterAtoms, NonEmptyString, StoryAtoms, StoryScene};

use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("narrative generation failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Prompt(#[from] RegistryError),
    #[error("model returned an empty narrative")]
    EmptyNarrative,
    #[error("scene payload rejected: {reason}")]
    ScenePayload { reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenesPayload {
    scenes: Vec<StoryScene>,
}

/// Turns atom sets back into narrative.
pub struct Synthesizer {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<PromptRegistry>,
    options: GenerationOptions,
}

impl Synthesizer {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<PromptRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            llm,
            prompts,
            options: GenerationOptions::default().with_max_tokens(config.synthesis_max_tokens),
        }
    }

    /// Write a memoir chapter from the atom set and its source transcript.
    ///
    /// Works even when every slot holds its default: the prompt then leans
    /// on the transcript and produces a short chapter rather than failing.
    pub async fn synthesize_chapter(
        &self,
        atoms: &ChapterAtoms,
        transcript: &str,
    ) -> Result<NonEmptyString, SynthesisError> {
        let vars = HashMap::from([
            ("atoms".to_string(), to_pretty_json(atoms)),
            ("transcript".to_string(), transcript.to_string()),
        ]);
        let prompt = self.prompts.render(ids::SYNTHESIZE_CHAPTER, &vars)?;
        let text = self.llm.generate_text(&prompt, &self.options).await?;
        NonEmptyString::new(text.trim().to_string()).map_err(|_| SynthesisError::EmptyNarrative)
    }

    /// Write one storybook scene per page.
    ///
    /// The page count comes from the narrative beats
    /// ([`StoryAtoms::page_count`]); the payload must cover pages
    /// `1..=page_count` exactly once each or the whole synthesis is
    /// rejected for the caller to retry.
    pub async fn synthesize_scenes(
        &self,
        atoms: &StoryAtoms,
        story: &str,
    ) -> Result<Vec<StoryScene>, SynthesisError> {
        let page_count = atoms.page_count();
        let vars = HashMap::from([
            ("atoms".to_string(), to_pretty_json(atoms)),
            ("story".to_string(), story.to_string()),
            ("page_count".to_string(), page_count.to_string()),
        ]);
        let prompt = self.prompts.render(ids::SYNTHESIZE_SCENES, &vars)?;
        let payload: ScenesPayload = self.llm.generate_typed(&prompt, &self.options).await?;

        validate_scenes(payload.scenes, page_count)
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Scenes must cover every page exactly once, in order, with narration on
/// each page.
fn validate_scenes(
    mut scenes: Vec<StoryScene>,
    page_count: u32,
) -> Result<Vec<StoryScene>, SynthesisError> {
    if scenes.len() as u32 != page_count {
        return Err(SynthesisError::ScenePayload {
            reason: format!("expected {page_count} scenes, got {}", scenes.len()),
        });
    }

    scenes.sort_by_key(|scene| scene.page_number);
    for (index, scene) in scenes.iter().enumerate() {
        let expected = index as u32 + 1;
        if scene.page_number != expected {
            return Err(SynthesisError::ScenePayload {
                reason: format!(
                    "page {expected} missing or duplicated (found page {})",
                    scene.page_number
                ),
            });
        }
        if scene.story_text.trim().is_empty() {
            return Err(SynthesisError::ScenePayload {
                reason: format!("page {expected} has no narration"),
            });
        }
    }

    Ok(scenes)
}
