//! Core domain types for Hearth.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the platform:
//! the safety classifier, the decomposition/synthesis pipeline, the session
//! director, and the prompt registry all speak these types.

mod atoms;
mod prompt;
mod session;
mod severity;
mod wellbeing;

pub use atoms::{
    ChapterAtoms, ChapterConnection, CharacterDetail, DEFAULT_NARRATIVE_ARC, DEFAULT_STORY_PAGES,
    EmotionalTone, EmotionalValence, KeyMoment, NarrativeBeat, Quote, Sense, SensoryDetail,
    StoryAtoms, StoryScene, VisualElement,
};
pub use prompt::{
    AbTest, AbTestError, AbVariant, ComposedPrompt, PromptCategory, PromptDefinition,
    PromptVersion, VersionParseError,
};
pub use session::{
    ConversationTurn, GoalReasoning, MemorySummary, SessionContext, SessionId, SessionPlan,
    Speaker, UserId,
};
pub use severity::Severity;
pub use wellbeing::{
    Concern, ConcernCategory, ResponseType, ScamAssessment, ScamType, WellbeingAssessment,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string guaranteed to be non-empty (after trimming).
///
/// Used wherever emptiness is a contract violation: session goals and
/// synthesized narrative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("content must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
