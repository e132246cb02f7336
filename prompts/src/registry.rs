//! The prompt registry: versioned storage, rendering, composition, and A/B
//! assignment.
//!
//! A registry is constructed explicitly at process start (usually via
//! [`PromptRegistry::with_builtin_prompts`]) and passed by reference to
//! every consumer; there is no global instance. Reads take `&self`; writes
//! (`register`/`unregister`, deploy-time operations) take `&mut self`, so
//! the borrow checker enforces that published records are immutable while
//! anyone is reading.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hearth_types::{
    AbTest, ComposedPrompt, PromptCategory, PromptDefinition, PromptVersion,
};

use crate::template::render_template;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("prompt '{id}' not found{}", version.map(|v| format!(" at version {v}")).unwrap_or_default())]
    NotFound {
        id: String,
        version: Option<PromptVersion>,
    },
}

/// Serializable snapshot of a registry for persistence round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub prompts: Vec<PromptDefinition>,
    pub ab_tests: Vec<AbTest>,
}

/// Versioned prompt template store.
#[derive(Debug, Default)]
pub struct PromptRegistry {
    /// Versions kept sorted ascending; the latest is always `last()`.
    prompts: BTreeMap<String, Vec<PromptDefinition>>,
    ab_tests: BTreeMap<String, AbTest>,
}

impl PromptRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any existing record with the same id
    /// and version.
    pub fn register(&mut self, def: PromptDefinition) {
        let versions = self.prompts.entry(def.id.clone()).or_default();
        match versions.binary_search_by(|existing| existing.version.cmp(&def.version)) {
            Ok(index) => versions[index] = def,
            Err(index) => versions.insert(index, def),
        }
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.prompts.contains_key(id)
    }

    /// Look up a definition. Omitted version means the highest registered
    /// version. Unknown ids and versions return `None`; see
    /// [`Self::get_required`] for the throwing sibling.
    #[must_use]
    pub fn get(&self, id: &str, version: Option<PromptVersion>) -> Option<&PromptDefinition> {
        let versions = self.prompts.get(id)?;
        match version {
            Some(wanted) => versions.iter().find(|def| def.version == wanted),
            None => versions.last(),
        }
    }

    pub fn get_required(
        &self,
        id: &str,
        version: Option<PromptVersion>,
    ) -> Result<&PromptDefinition, RegistryError> {
        self.get(id, version).ok_or_else(|| RegistryError::NotFound {
            id: id.to_string(),
            version,
        })
    }

    /// Render the latest version of `id` with `vars`. Unmatched placeholders
    /// remain literal; the only failure is an unknown id.
    pub fn render(
        &self,
        id: &str,
        vars: &HashMap<String, String>,
    ) -> Result<String, RegistryError> {
        let def = self.get_required(id, None)?;
        Ok(render_template(&def.template, vars))
    }

    /// Concatenate the latest versions of `ids` (rendered with `vars`) into
    /// one prompt. The token estimate is the exact sum of the component
    /// estimates; required variables are the deduplicated union.
    pub fn compose(
        &self,
        ids: &[&str],
        vars: &HashMap<String, String>,
    ) -> Result<ComposedPrompt, RegistryError> {
        let mut sections = Vec::with_capacity(ids.len());
        let mut source_ids = Vec::with_capacity(ids.len());
        let mut token_estimate: u32 = 0;
        let mut required_variables: Vec<String> = Vec::new();

        for &id in ids {
            let def = self.get_required(id, None)?;
            sections.push(render_template(&def.template, vars));
            source_ids.push(def.id.clone());
            token_estimate += def.token_estimate;
            for variable in &def.variables {
                if !required_variables.contains(variable) {
                    required_variables.push(variable.clone());
                }
            }
        }

        Ok(ComposedPrompt {
            text: sections.join("\n\n"),
            source_ids,
            token_estimate,
            required_variables,
        })
    }

    /// Latest version of every id in `category`.
    #[must_use]
    pub fn list_by_category(&self, category: PromptCategory) -> Vec<&PromptDefinition> {
        self.prompts
            .values()
            .filter_map(|versions| versions.last())
            .filter(|def| def.category == category)
            .collect()
    }

    /// Latest version of every registered id.
    #[must_use]
    pub fn list_latest(&self) -> Vec<&PromptDefinition> {
        self.prompts
            .values()
            .filter_map(|versions| versions.last())
            .collect()
    }

    /// Remove a definition. Omitted version removes every version of the
    /// id. Returns whether anything was removed; unknown ids are `false`,
    /// never an error.
    pub fn unregister(&mut self, id: &str, version: Option<PromptVersion>) -> bool {
        match version {
            None => self.prompts.remove(id).is_some(),
            Some(wanted) => {
                let Some(versions) = self.prompts.get_mut(id) else {
                    return false;
                };
                let before = versions.len();
                versions.retain(|def| def.version != wanted);
                let removed = versions.len() < before;
                if versions.is_empty() {
                    self.prompts.remove(id);
                }
                removed
            }
        }
    }

    /// Register an A/B test, replacing any test with the same id.
    pub fn register_ab_test(&mut self, test: AbTest) {
        self.ab_tests.insert(test.test_id.clone(), test);
    }

    /// Deterministic variant assignment for `user_id`. `None` for unknown
    /// or inactive tests.
    #[must_use]
    pub fn ab_variant(&self, test_id: &str, user_id: &str) -> Option<&str> {
        let test = self.ab_tests.get(test_id)?;
        crate::ab::assign(test, user_id)
    }

    #[must_use]
    pub fn ab_test(&self, test_id: &str) -> Option<&AbTest> {
        self.ab_tests.get(test_id)
    }

    /// Snapshot every stored record for persistence.
    #[must_use]
    pub fn export(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            prompts: self
                .prompts
                .values()
                .flat_map(|versions| versions.iter().cloned())
                .collect(),
            ab_tests: self.ab_tests.values().cloned().collect(),
        }
    }

    /// Rebuild a registry from a snapshot. Lossless inverse of
    /// [`Self::export`].
    #[must_use]
    pub fn import(snapshot: RegistrySnapshot) -> Self {
        let mut registry = Self::new();
        for def in snapshot.prompts {
            registry.register(def);
        }
        for test in snapshot.ab_tests {
            registry.register_ab_test(test);
        }
        tracing::debug!(
            prompt_ids = registry.prompts.len(),
            ab_tests = registry.ab_tests.len(),
            "prompt registry imported"
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::{PromptRegistry, RegistryError};
    use hearth_types::{PromptCategory, PromptDefinition, PromptVersion};
    use std::collections::HashMap;

    fn def(id: &str, version: (u16, u16, u16), template: &str) -> PromptDefinition {
        PromptDefinition::new(
            id,
            PromptVersion::new(version.0, version.1, version.2),
            PromptCategory::Question,
            template,
        )
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn get_without_version_returns_highest() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "one"));
        registry.register(def("q", (2, 1, 0), "two"));
        registry.register(def("q", (1, 5, 0), "middle"));

        let latest = registry.get("q", None).expect("registered");
        assert_eq!(latest.version, PromptVersion::new(2, 1, 0));
        assert_eq!(latest.template, "two");
    }

    #[test]
    fn get_with_version_is_exact() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "one"));
        registry.register(def("q", (2, 0, 0), "two"));

        let pinned = registry
            .get("q", Some(PromptVersion::new(1, 0, 0)))
            .expect("registered");
        assert_eq!(pinned.template, "one");
        assert!(
            registry
                .get("q", Some(PromptVersion::new(3, 0, 0)))
                .is_none()
        );
    }

    #[test]
    fn reregistering_a_version_replaces_it() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "first draft"));
        registry.register(def("q", (1, 0, 0), "second draft"));

        assert_eq!(registry.get("q", None).expect("registered").template, "second draft");
        assert_eq!(registry.list_latest().len(), 1);
    }

    #[test]
    fn render_leaves_unmatched_placeholders_literal() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "Hello {{name}}, about {{topic}}?"));

        let rendered = registry.render("q", &HashMap::new()).expect("known id");
        assert_eq!(rendered, "Hello {{name}}, about {{topic}}?");
    }

    #[test]
    fn render_unknown_id_is_not_found() {
        let registry = PromptRegistry::new();
        let err = registry.render("missing", &HashMap::new()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn compose_sums_token_estimates_exactly() {
        let mut registry = PromptRegistry::new();
        registry.register(
            def("a", (1, 0, 0), "About {{topic}}.")
                .with_token_estimate(17)
                .with_variables(["topic"]),
        );
        registry.register(
            def("b", (1, 0, 0), "For {{name}} and {{topic}}.")
                .with_token_estimate(25)
                .with_variables(["name", "topic"]),
        );

        let composed = registry
            .compose(&["a", "b"], &vars(&[("topic", "the farm")]))
            .expect("both registered");
        assert_eq!(composed.token_estimate, 42);
        assert_eq!(composed.source_ids, vec!["a", "b"]);
        assert_eq!(composed.required_variables, vec!["topic", "name"]);
        assert!(composed.text.contains("About the farm."));
        assert!(composed.text.contains("{{name}}"));
    }

    #[test]
    fn unregister_without_version_removes_all() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "one"));
        registry.register(def("q", (2, 0, 0), "two"));

        assert!(registry.unregister("q", None));
        assert!(!registry.has("q"));
    }

    #[test]
    fn unregister_with_version_keeps_the_rest() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "one"));
        registry.register(def("q", (2, 0, 0), "two"));

        assert!(registry.unregister("q", Some(PromptVersion::new(1, 0, 0))));
        assert!(registry.has("q"));
        assert_eq!(
            registry.get("q", None).expect("one left").version,
            PromptVersion::new(2, 0, 0)
        );
    }

    #[test]
    fn unregister_unknown_id_returns_false() {
        let mut registry = PromptRegistry::new();
        assert!(!registry.unregister("missing", None));
    }

    #[test]
    fn list_by_category_returns_latest_only() {
        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "one"));
        registry.register(def("q", (2, 0, 0), "two"));
        registry.register(PromptDefinition::new(
            "s",
            PromptVersion::new(1, 0, 0),
            PromptCategory::Safety,
            "stay calm",
        ));

        let questions = registry.list_by_category(PromptCategory::Question);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].version, PromptVersion::new(2, 0, 0));
    }

    #[test]
    fn export_import_round_trip_preserves_behavior() {
        use hearth_types::{AbTest, AbVariant};

        let mut registry = PromptRegistry::new();
        registry.register(def("q", (1, 0, 0), "Hello {{name}}"));
        registry.register(def("q", (1, 1, 0), "Hi {{name}}"));
        registry.register_ab_test(
            AbTest::new(
                "tone",
                vec![
                    AbVariant {
                        id: "warm".to_string(),
                        weight: 0.5,
                    },
                    AbVariant {
                        id: "neutral".to_string(),
                        weight: 0.5,
                    },
                ],
            )
            .expect("valid test"),
        );

        let snapshot = registry.export();
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let restored = PromptRegistry::import(serde_json::from_str(&json).expect("deserialize"));

        assert_eq!(
            restored.get("q", None).expect("latest").version,
            PromptVersion::new(1, 1, 0)
        );
        assert_eq!(
            restored.render("q", &vars(&[("name", "Rose")])).expect("render"),
            "Hi Rose"
        );
        assert_eq!(
            restored.ab_variant("tone", "user-3"),
            registry.ab_variant("tone", "user-3")
        );
    }
}
