//! Engine configuration.
//!
//! All knobs have production defaults; deployments override them from the
//! host application's config file via serde.

use std::time::Duration;

use serde::Deserialize;

use hearth_types::Severity;

/// Tuning knobs for the orchestration engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Budget for the chain-of-thought goal call; the free-text fallback
    /// runs after this expires so session start meets its latency target.
    pub cot_timeout_secs: u64,
    /// Output budget per atom-extraction call.
    pub extraction_max_tokens: u32,
    /// Output budget for chapter and scene synthesis.
    pub synthesis_max_tokens: u32,
    /// Output budget for per-turn question prompts and goal planning.
    pub planning_max_tokens: u32,
    /// Findings at or above this severity block content behind the safety
    /// placeholder.
    pub block_threshold: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cot_timeout_secs: 20,
            extraction_max_tokens: 512,
            synthesis_max_tokens: 2048,
            planning_max_tokens: 1024,
            block_threshold: Severity::High,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn cot_timeout(&self) -> Duration {
        Duration::from_secs(self.cot_timeout_secs)
    }
}
