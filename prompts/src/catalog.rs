//! Built-in platform templates.
//!
//! The production prompt set ships compiled into the binary as markdown
//! assets; [`PromptRegistry::with_builtin_prompts`] registers all of them at
//! version 1.0.0. Deployments layer newer versions on top via `register`.

use hearth_types::{PromptCategory, PromptDefinition, PromptVersion};

use crate::registry::PromptRegistry;

/// Stable ids of the built-in templates.
pub mod ids {
    pub const EXTRACT_NARRATIVE_ARC: &str = "extract.narrative_arc";
    pub const EXTRACT_BEST_QUOTES: &str = "extract.best_quotes";
    pub const EXTRACT_SENSORY_DETAILS: &str = "extract.sensory_details";
    pub const EXTRACT_EMOTIONAL_TONE: &str = "extract.emotional_tone";
    pub const EXTRACT_CONNECTIONS: &str = "extract.connections";

    pub const EXTRACT_KEY_MOMENTS: &str = "extract.key_moments";
    pub const EXTRACT_VISUAL_ELEMENTS: &str = "extract.visual_elements";
    pub const EXTRACT_NARRATIVE_BEATS: &str = "extract.narrative_beats";
    pub const EXTRACT_CHARACTER_DETAILS: &str = "extract.character_details";

    pub const SYNTHESIZE_CHAPTER: &str = "synthesize.chapter";
    pub const SYNTHESIZE_SCENES: &str = "synthesize.scenes";

    pub const SESSION_GOAL_COT: &str = "session.goal_cot";
    pub const SESSION_GOAL_FALLBACK: &str = "session.goal_fallback";

    pub const QUESTION_SENSORY_DEEPENING: &str = "question.sensory_deepening";
    pub const QUESTION_TEMPORAL_THREADING: &str = "question.temporal_threading";
    pub const QUESTION_GRACEFUL_EXIT: &str = "question.graceful_exit";
}

struct BuiltinPrompt {
    id: &'static str,
    category: PromptCategory,
    template: &'static str,
    variables: &'static [&'static str],
}

const BUILTINS: &[BuiltinPrompt] = &[
    BuiltinPrompt {
        id: ids::EXTRACT_NARRATIVE_ARC,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_narrative_arc.md"),
        variables: &["transcript", "prior_context"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_BEST_QUOTES,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_best_quotes.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_SENSORY_DETAILS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_sensory_details.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_EMOTIONAL_TONE,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_emotional_tone.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_CONNECTIONS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_connections.md"),
        variables: &["transcript", "prior_context"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_KEY_MOMENTS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_key_moments.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_VISUAL_ELEMENTS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_visual_elements.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_NARRATIVE_BEATS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_narrative_beats.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::EXTRACT_CHARACTER_DETAILS,
        category: PromptCategory::Extraction,
        template: include_str!("../assets/extract_character_details.md"),
        variables: &["transcript"],
    },
    BuiltinPrompt {
        id: ids::SYNTHESIZE_CHAPTER,
        category: PromptCategory::Synthesis,
        template: include_str!("../assets/synthesize_chapter.md"),
        variables: &["atoms", "transcript"],
    },
    BuiltinPrompt {
        id: ids::SYNTHESIZE_SCENES,
        category: PromptCategory::Synthesis,
        template: include_str!("../assets/synthesize_scenes.md"),
        variables: &["atoms", "story", "page_count"],
    },
    BuiltinPrompt {
        id: ids::SESSION_GOAL_COT,
        category: PromptCategory::SessionPlanning,
        template: include_str!("../assets/session_goal_cot.md"),
        variables: &[
            "user_name",
            "topics_love",
            "topics_avoid",
            "memories",
            "history_digest",
        ],
    },
    BuiltinPrompt {
        id: ids::SESSION_GOAL_FALLBACK,
        category: PromptCategory::SessionPlanning,
        template: include_str!("../assets/session_goal_fallback.md"),
        variables: &["user_name", "memories"],
    },
    BuiltinPrompt {
        id: ids::QUESTION_SENSORY_DEEPENING,
        category: PromptCategory::Question,
        template: include_str!("../assets/question_sensory_deepening.md"),
        variables: &["user_name", "goal", "last_answer"],
    },
    BuiltinPrompt {
        id: ids::QUESTION_TEMPORAL_THREADING,
        category: PromptCategory::Question,
        template: include_str!("../assets/question_temporal_threading.md"),
        variables: &["user_name", "goal", "last_answer", "memories"],
    },
    BuiltinPrompt {
        id: ids::QUESTION_GRACEFUL_EXIT,
        category: PromptCategory::Question,
        template: include_str!("../assets/question_graceful_exit.md"),
        variables: &["user_name", "goal"],
    },
];

const BUILTIN_VERSION: PromptVersion = PromptVersion::new(1, 0, 0);

impl PromptRegistry {
    /// A registry preloaded with the platform's production templates.
    #[must_use]
    pub fn with_builtin_prompts() -> Self {
        let mut registry = Self::new();
        for builtin in BUILTINS {
            registry.register(
                PromptDefinition::new(
                    builtin.id,
                    BUILTIN_VERSION,
                    builtin.category,
                    builtin.template,
                )
                .with_variables(builtin.variables.iter().copied()),
            );
        }
        registry
    }
}
