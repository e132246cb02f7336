//! Atom sets: independently-extracted units of grounding material.
//!
//! A transcript is decomposed into atoms, and synthesis is only allowed to
//! state what the atoms contain. Every slot of an atom set populates
//! independently; a failed extraction falls back to that slot's documented
//! default and never disturbs its siblings.

use serde::{Deserialize, Serialize};

/// Default narrative arc when arc extraction fails.
pub const DEFAULT_NARRATIVE_ARC: &str = "A Memory from the Past";

/// Storybook length when no narrative beats survived extraction.
pub const DEFAULT_STORY_PAGES: u32 = 8;

/// A quote worth preserving verbatim, with why it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub reason: String,
}

/// The five senses a detail can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Sight,
    Sound,
    Smell,
    Taste,
    Touch,
}

impl Sense {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Sense::Sight => "sight",
            Sense::Sound => "sound",
            Sense::Smell => "smell",
            Sense::Taste => "taste",
            Sense::Touch => "touch",
        }
    }
}

/// A concrete sensory detail recalled in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensoryDetail {
    pub sense: Sense,
    pub detail: String,
}

/// Overall emotional direction of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalValence {
    Positive,
    Negative,
    Mixed,
    #[default]
    Neutral,
}

/// Emotional read of the transcript with classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalTone {
    pub valence: EmotionalValence,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

impl Default for EmotionalTone {
    /// Default when tone extraction fails: neutral with zero confidence.
    fn default() -> Self {
        Self {
            valence: EmotionalValence::Neutral,
            confidence: 0.0,
        }
    }
}

impl EmotionalTone {
    /// True when the tone is reliably negative; used to escalate mood
    /// concerns in the wellbeing classifier.
    #[must_use]
    pub fn is_reliably_negative(self) -> bool {
        self.valence == EmotionalValence::Negative && self.confidence > 0.5
    }
}

/// A thematic link from this memory to another chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterConnection {
    pub theme: String,
    pub note: String,
}

/// Atom set backing memoir chapter synthesis.
///
/// Slot defaults (each documented on its extraction): narrative arc falls
/// back to [`DEFAULT_NARRATIVE_ARC`], list slots fall back to empty, and the
/// emotional tone falls back to neutral/zero-confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterAtoms {
    pub narrative_arc: String,
    /// Top quotes, best first; extraction requests two.
    pub best_quotes: Vec<Quote>,
    pub sensory_details: Vec<SensoryDetail>,
    pub emotional_tone: EmotionalTone,
    pub connections: Vec<ChapterConnection>,
}

impl Default for ChapterAtoms {
    fn default() -> Self {
        Self {
            narrative_arc: DEFAULT_NARRATIVE_ARC.to_string(),
            best_quotes: Vec::new(),
            sensory_details: Vec::new(),
            emotional_tone: EmotionalTone::default(),
            connections: Vec::new(),
        }
    }
}

/// A pivotal moment of the story, ranked by importance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMoment {
    pub description: String,
    /// Higher is more important; extraction sorts descending.
    pub importance: u8,
}

/// Something an illustrator should be able to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualElement {
    pub subject: String,
    pub detail: String,
}

/// A story beat mapped onto a page range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeBeat {
    pub beat: String,
    pub page_start: u32,
    pub page_end: u32,
}

/// A character as the storyteller described them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetail {
    pub name: String,
    pub description: String,
}

/// Atom set backing storybook scene synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryAtoms {
    /// Key moments, most important first.
    pub key_moments: Vec<KeyMoment>,
    pub visual_elements: Vec<VisualElement>,
    pub narrative_beats: Vec<NarrativeBeat>,
    pub character_details: Vec<CharacterDetail>,
}

impl StoryAtoms {
    /// Number of pages the storybook should span: the furthest page any
    /// beat reaches, or [`DEFAULT_STORY_PAGES`] when beats are absent.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.narrative_beats
            .iter()
            .map(|beat| beat.page_end)
            .max()
            .filter(|&end| end > 0)
            .unwrap_or(DEFAULT_STORY_PAGES)
    }
}

/// One synthesized storybook page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryScene {
    pub page_number: u32,
    /// The key moment this page depicts.
    pub moment: String,
    /// Narration text read aloud on this page.
    pub story_text: String,
    /// Prompt handed to the illustration model.
    pub image_prompt: String,
}
