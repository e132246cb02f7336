//! Prompt template definitions, versions, composition, and A/B tests.
//!
//! These are the stored records of the prompt registry. Templates use
//! `{{var}}` placeholders; rendering and composition live in
//! `hearth-prompts`, the types live here so the engine can carry rendered
//! prompt metadata without a registry dependency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-component semantic version for prompt templates.
///
/// Total order follows (major, minor, patch) field order via the derived
/// `Ord`, so "highest version" is a plain `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct PromptVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid prompt version '{raw}'; expected MAJOR.MINOR.PATCH")]
pub struct VersionParseError {
    raw: String,
}

impl PromptVersion {
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, VersionParseError> {
        let err = || VersionParseError {
            raw: raw.to_string(),
        };
        let mut parts = raw.trim().split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|part| part.parse::<u16>().ok())
                .ok_or_else(err)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(version)
    }
}

impl std::fmt::Display for PromptVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for PromptVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PromptVersion> for String {
    fn from(value: PromptVersion) -> Self {
        value.to_string()
    }
}

/// What a template is for. Closed set; listing and composition filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    /// Atom extraction from transcripts.
    Extraction,
    /// Narrative and scene synthesis.
    Synthesis,
    /// Session goal planning.
    SessionPlanning,
    /// Per-turn interviewer questions.
    Question,
    /// Safety responses and placeholders.
    Safety,
}

impl PromptCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PromptCategory::Extraction => "extraction",
            PromptCategory::Synthesis => "synthesis",
            PromptCategory::SessionPlanning => "session_planning",
            PromptCategory::Question => "question",
            PromptCategory::Safety => "safety",
        }
    }
}

/// A stored, versioned prompt template.
///
/// Records are immutable once published to a registry; revisions get a new
/// version rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    pub version: PromptVersion,
    pub category: PromptCategory,
    /// Template body with `{{var}}` placeholders.
    pub template: String,
    /// Variables the template expects to be supplied at render time.
    pub variables: Vec<String>,
    /// Rough token cost of the rendered template.
    pub token_estimate: u32,
    /// A/B test this template participates in, if any.
    pub ab_test_group: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl PromptDefinition {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        version: PromptVersion,
        category: PromptCategory,
        template: impl Into<String>,
    ) -> Self {
        let template = template.into();
        // A word is ~1.3 tokens; close enough for composition budgeting.
        let token_estimate = (template.split_whitespace().count() as f64 * 1.3).ceil() as u32;
        Self {
            id: id.into(),
            version,
            category,
            template,
            variables: Vec::new(),
            token_estimate,
            ab_test_group: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_token_estimate(mut self, estimate: u32) -> Self {
        self.token_estimate = estimate;
        self
    }

    #[must_use]
    pub fn with_ab_test_group(mut self, group: impl Into<String>) -> Self {
        self.ab_test_group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Several templates concatenated into one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPrompt {
    pub text: String,
    pub source_ids: Vec<String>,
    /// Exact sum of the component token estimates.
    pub token_estimate: u32,
    /// Union of component variables, first occurrence order, deduplicated.
    pub required_variables: Vec<String>,
}

/// One arm of an A/B test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbVariant {
    pub id: String,
    /// Allocation weight in (0, 1].
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbTestError {
    #[error("A/B test '{test_id}' has no variants")]
    EmptyVariants { test_id: String },
    #[error("A/B test '{test_id}' variant '{variant_id}' has weight {weight}; must be in (0, 1]")]
    InvalidWeight {
        test_id: String,
        variant_id: String,
        weight: f64,
    },
    #[error("A/B test '{test_id}' weights sum to {sum}; must sum to 1")]
    WeightSum { test_id: String, sum: f64 },
}

/// An A/B test over prompt variants with validated allocation weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTest {
    pub test_id: String,
    pub variants: Vec<AbVariant>,
    pub active: bool,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl AbTest {
    /// Build a test, validating that weights are positive and sum to 1.
    pub fn new(
        test_id: impl Into<String>,
        variants: Vec<AbVariant>,
    ) -> Result<Self, AbTestError> {
        let test_id = test_id.into();
        if variants.is_empty() {
            return Err(AbTestError::EmptyVariants { test_id });
        }
        for variant in &variants {
            if !(variant.weight > 0.0 && variant.weight <= 1.0) {
                return Err(AbTestError::InvalidWeight {
                    test_id,
                    variant_id: variant.id.clone(),
                    weight: variant.weight,
                });
            }
        }
        let sum: f64 = variants.iter().map(|v| v.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AbTestError::WeightSum { test_id, sum });
        }
        Ok(Self {
            test_id,
            variants,
            active: true,
        })
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
