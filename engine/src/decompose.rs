//! Atom-of-thought decomposition.
//!
//! A transcript fans out into independent extraction calls that run
//! concurrently and settle together; each call validates its JSON payload
//! into a strict typed struct at the boundary. A branch that fails, for
//! any reason, logs a warning and yields that slot's documented default,
//! so decomposition never errors and never returns a partial atom set.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use hearth_prompts::{PromptRegistry, RegistryError, catalog::ids};
use hearth_providers::{GenerationOptions, LanguageModel, LanguageModelExt, LlmError};
use hearth_types::{
    ChapterAtoms, ChapterConnection, CharacterDetail, DEFAULT_NARRATIVE_ARC, EmotionalTone,
    KeyMoment, NarrativeBeat, Quote, SensoryDetail, StoryAtoms, VisualElement,
};

use crate::config::EngineConfig;

/// Extraction keeps the best two quotes.
const MAX_QUOTES: usize = 2;

/// Why one extraction branch fell back to its default. Logged, never
/// surfaced: per-slot failure is recovered locally by design.
#[derive(Debug, Error)]
enum ExtractFailure {
    #[error(transparent)]
    Prompt(#[from] RegistryError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArcPayload {
    narrative_arc: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuotesPayload {
    best_quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SensoryPayload {
    sensory_details: Vec<SensoryDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionsPayload {
    connections: Vec<ChapterConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyMomentsPayload {
    key_moments: Vec<KeyMoment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VisualsPayload {
    visual_elements: Vec<VisualElement>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BeatsPayload {
    narrative_beats: Vec<NarrativeBeat>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CharactersPayload {
    character_details: Vec<CharacterDetail>,
}

/// Fans a transcript out into atom-extraction calls.
pub struct AtomDecomposer {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<PromptRegistry>,
    options: GenerationOptions,
}

impl AtomDecomposer {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<PromptRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            llm,
            prompts,
            // Low temperature: extraction should transcribe, not improvise.
            options: GenerationOptions::default()
                .with_max_tokens(config.extraction_max_tokens)
                .with_temperature(0.2),
        }
    }

    /// Decompose an interview transcript into chapter atoms.
    ///
    /// The five extractions run concurrently and all of them settle; a
    /// rejected or malformed branch becomes its slot default. This method
    /// cannot fail.
    pub async fn decompose_transcript(
        &self,
        transcript: &str,
        prior_context: &str,
    ) -> ChapterAtoms {
        let vars = HashMap::from([
            ("transcript".to_string(), transcript.to_string()),
            ("prior_context".to_string(), prior_context.to_string()),
        ]);

        let (narrative_arc, best_quotes, sensory_details, emotional_tone, connections) = tokio::join!(
            self.extract_narrative_arc(&vars),
            self.extract_best_quotes(&vars),
            self.extract_sensory_details(&vars),
            self.extract_emotional_tone(&vars),
            self.extract_connections(&vars),
        );

        ChapterAtoms {
            narrative_arc,
            best_quotes,
            sensory_details,
            emotional_tone,
            connections,
        }
    }

    /// Decompose a told story into storybook atoms. Same settle-all,
    /// default-per-slot policy as [`Self::decompose_transcript`].
    pub async fn decompose_story(&self, transcript: &str) -> StoryAtoms {
        let vars = HashMap::from([("transcript".to_string(), transcript.to_string())]);

        let (key_moments, visual_elements, narrative_beats, character_details) = tokio::join!(
            self.extract_key_moments(&vars),
            self.extract_visual_elements(&vars),
            self.extract_narrative_beats(&vars),
            self.extract_character_details(&vars),
        );

        StoryAtoms {
            key_moments,
            visual_elements,
            narrative_beats,
            character_details,
        }
    }

    async fn extract_narrative_arc(&self, vars: &HashMap<String, String>) -> String {
        match self.extract::<ArcPayload>(ids::EXTRACT_NARRATIVE_ARC, vars).await {
            Ok(payload) if !payload.narrative_arc.trim().is_empty() => payload.narrative_arc,
            Ok(_) => {
                tracing::warn!(slot = "narrative_arc", "extraction returned empty arc; using default");
                DEFAULT_NARRATIVE_ARC.to_string()
            }
            Err(e) => {
                warn_fallback("narrative_arc", &e);
                DEFAULT_NARRATIVE_ARC.to_string()
            }
        }
    }

    async fn extract_best_quotes(&self, vars: &HashMap<String, String>) -> Vec<Quote> {
        match self.extract::<QuotesPayload>(ids::EXTRACT_BEST_QUOTES, vars).await {
            Ok(payload) => {
                let mut quotes = payload.best_quotes;
                quotes.retain(|quote| !quote.text.trim().is_empty());
                quotes.truncate(MAX_QUOTES);
                quotes
            }
            Err(e) => {
                warn_fallback("best_quotes", &e);
                Vec::new()
            }
        }
    }

    async fn extract_sensory_details(&self, vars: &HashMap<String, String>) -> Vec<SensoryDetail> {
        match self
            .extract::<SensoryPayload>(ids::EXTRACT_SENSORY_DETAILS, vars)
            .await
        {
            Ok(payload) => payload.sensory_details,
            Err(e) => {
                warn_fallback("sensory_details", &e);
                Vec::new()
            }
        }
    }

    async fn extract_emotional_tone(&self, vars: &HashMap<String, String>) -> EmotionalTone {
        match self
            .extract::<EmotionalTone>(ids::EXTRACT_EMOTIONAL_TONE, vars)
            .await
        {
            Ok(mut tone) => {
                tone.confidence = tone.confidence.clamp(0.0, 1.0);
                tone
            }
            Err(e) => {
                warn_fallback("emotional_tone", &e);
                EmotionalTone::default()
            }
        }
    }

    async fn extract_connections(&self, vars: &HashMap<String, String>) -> Vec<ChapterConnection> {
        match self
            .extract::<ConnectionsPayload>(ids::EXTRACT_CONNECTIONS, vars)
            .await
        {
            Ok(payload) => payload.connections,
            Err(e) => {
                warn_fallback("connections", &e);
                Vec::new()
            }
        }
    }

    async fn extract_key_moments(&self, vars: &HashMap<String, String>) -> Vec<KeyMoment> {
        match self
            .extract::<KeyMomentsPayload>(ids::EXTRACT_KEY_MOMENTS, vars)
            .await
        {
            Ok(payload) => {
                let mut moments = payload.key_moments;
                moments.sort_by(|a, b| b.importance.cmp(&a.importance));
                moments
            }
            Err(e) => {
                warn_fallback("key_moments", &e);
                Vec::new()
            }
        }
    }

    async fn extract_visual_elements(&self, vars: &HashMap<String, String>) -> Vec<VisualElement> {
        match self
            .extract::<VisualsPayload>(ids::EXTRACT_VISUAL_ELEMENTS, vars)
            .await
        {
            Ok(payload) => payload.visual_elements,
            Err(e) => {
                warn_fallback("visual_elements", &e);
                Vec::new()
            }
        }
    }

    async fn extract_narrative_beats(&self, vars: &HashMap<String, String>) -> Vec<NarrativeBeat> {
        match self
            .extract::<BeatsPayload>(ids::EXTRACT_NARRATIVE_BEATS, vars)
            .await
        {
            Ok(payload) => {
                let mut beats = payload.narrative_beats;
                beats.retain(|beat| beat.page_start > 0 && beat.page_start <= beat.page_end);
                beats
            }
            Err(e) => {
                warn_fallback("narrative_beats", &e);
                Vec::new()
            }
        }
    }

    async fn extract_character_details(
        &self,
        vars: &HashMap<String, String>,
    ) -> Vec<CharacterDetail> {
        match self
            .extract::<CharactersPayload>(ids::EXTRACT_CHARACTER_DETAILS, vars)
            .await
        {
            Ok(payload) => payload.character_details,
            Err(e) => {
                warn_fallback("character_details", &e);
                Vec::new()
            }
        }
    }

    async fn extract<T: DeserializeOwned + Send>(
        &self,
        prompt_id: &str,
        vars: &HashMap<String, String>,
    ) -> Result<T, ExtractFailure> {
        let prompt = self.prompts.render(prompt_id, vars)?;
        let payload = self.llm.generate_typed(&prompt, &self.options).await?;
        Ok(payload)
    }
}

fn warn_fallback(slot: &str, error: &ExtractFailure) {
    tracing::warn!(slot, error = %error, "atom extraction failed; substituting default");
}
