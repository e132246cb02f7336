//! Deterministic A/B variant assignment.
//!
//! Bucketing is a stable keyed hash of `(test_id, user_id)`, never
//! call-time randomness, so one user always lands in the same variant and
//! the variant split across many distinct users follows the allocation
//! weights.

use sha2::{Digest, Sha256};

use hearth_types::AbTest;

/// Map `(test_id, user_id)` into [0, 1).
#[must_use]
pub(crate) fn bucket(test_id: &str, user_id: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(test_id.as_bytes());
    hasher.update(b":");
    hasher.update(user_id.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix);

    // 2^64 is exactly representable; the result is strictly below 1.
    value as f64 / ((u64::MAX as f64) + 1.0)
}

/// The variant id `user_id` falls into, by cumulative allocation weight.
#[must_use]
pub(crate) fn assign<'a>(test: &'a AbTest, user_id: &str) -> Option<&'a str> {
    if !test.active || test.variants.is_empty() {
        return None;
    }

    let point = bucket(&test.test_id, user_id);
    let mut cumulative = 0.0;
    for variant in &test.variants {
        cumulative += variant.weight;
        if point < cumulative {
            return Some(&variant.id);
        }
    }
    // Weights sum to 1 within tolerance; absorb rounding into the last arm.
    test.variants.last().map(|variant| variant.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::{assign, bucket};
    use hearth_types::{AbTest, AbVariant};

    fn fifty_fifty() -> AbTest {
        AbTest::new(
            "tone-test",
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
        .expect("valid test")
    }

    #[test]
    fn bucket_is_stable_and_bounded() {
        let first = bucket("tone-test", "user-42");
        let second = bucket("tone-test", "user-42");
        assert!((first - second).abs() < f64::EPSILON);
        assert!((0.0..1.0).contains(&first));
    }

    #[test]
    fn bucket_is_keyed_by_test_id() {
        // Different tests should not hand every user the same coin flip.
        let moved = (0..100)
            .filter(|i| {
                let user = format!("user-{i}");
                (bucket("test-a", &user) < 0.5) != (bucket("test-b", &user) < 0.5)
            })
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn same_user_always_gets_same_variant() {
        let test = fifty_fifty();
        let first = assign(&test, "user-7").expect("assigned");
        for _ in 0..10 {
            assert_eq!(assign(&test, "user-7"), Some(first));
        }
    }

    #[test]
    fn both_variants_observed_across_distinct_users() {
        let test = fifty_fifty();
        let mut warm = 0;
        let mut neutral = 0;
        for i in 0..100 {
            match assign(&test, &format!("user-{i}")) {
                Some("warm") => warm += 1,
                Some("neutral") => neutral += 1,
                other => panic!("unexpected assignment {other:?}"),
            }
        }
        assert!(warm > 0, "warm variant never observed");
        assert!(neutral > 0, "neutral variant never observed");
    }

    #[test]
    fn inactive_test_assigns_nothing() {
        let test = fifty_fifty().with_active(false);
        assert_eq!(assign(&test, "user-7"), None);
    }
}
