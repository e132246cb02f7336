//! Registry snapshots must survive a write-to-disk round trip, since the
//! surrounding application persists them between deploys.

use std::collections::HashMap;
use std::fs;

use hearth_prompts::{PromptRegistry, RegistrySnapshot};
use hearth_types::{AbTest, AbVariant, PromptCategory, PromptDefinition, PromptVersion};

#[test]
fn snapshot_survives_disk_round_trip() {
    let mut registry = PromptRegistry::with_builtin_prompts();
    registry.register(
        PromptDefinition::new(
            "question.custom_opener",
            PromptVersion::new(1, 2, 0),
            PromptCategory::Question,
            "Good morning {{user_name}}, shall we pick up where we left off?",
        )
        .with_variables(["user_name"]),
    );
    registry.register_ab_test(
        AbTest::new(
            "opener-tone",
            vec![
                AbVariant {
                    id: "familiar".to_string(),
                    weight: 0.3,
                },
                AbVariant {
                    id: "formal".to_string(),
                    weight: 0.7,
                },
            ],
        )
        .expect("valid test"),
    );

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("prompts.json");
    let json = serde_json::to_string_pretty(&registry.export()).expect("serialize");
    fs::write(&path, &json).expect("write snapshot");

    let loaded: RegistrySnapshot =
        serde_json::from_str(&fs::read_to_string(&path).expect("read snapshot"))
            .expect("deserialize");
    let restored = PromptRegistry::import(loaded);

    let vars: HashMap<String, String> =
        [("user_name".to_string(), "Rose".to_string())].into();
    assert_eq!(
        restored
            .render("question.custom_opener", &vars)
            .expect("custom prompt restored"),
        "Good morning Rose, shall we pick up where we left off?"
    );
    assert_eq!(
        restored.ab_variant("opener-tone", "user-11"),
        registry.ab_variant("opener-tone", "user-11")
    );
    assert_eq!(restored.list_latest().len(), registry.list_latest().len());
}
