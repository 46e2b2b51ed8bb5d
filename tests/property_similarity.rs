use proptest::prelude::*;
use serde_json::{json, Value};
use taskprobe::services::string_similarity;
use taskprobe::{aggregate_similarity, edit_distance, similarity, SimilarityMatrix};

const EPS: f64 = 1e-9;

proptest! {
    /// Property: every string is identical to itself
    #[test]
    fn prop_similarity_reflexive(s in ".{0,40}") {
        let value = Value::String(s);
        prop_assert!((similarity(&value, &value) - 1.0).abs() < EPS);
    }

    /// Property: argument order does not matter
    #[test]
    fn prop_similarity_symmetric(a in ".{0,30}", b in ".{0,30}") {
        let left = similarity(&json!(a), &json!(b));
        let right = similarity(&json!(b), &json!(a));
        prop_assert!((left - right).abs() < EPS);
    }

    /// Property: a numeric string never matches the number it spells
    #[test]
    fn prop_string_never_equals_number(n in any::<i64>()) {
        let text = json!(n.to_string());
        let number = json!(n);
        let score = similarity(&text, &number);
        prop_assert!(score < 1.0, "score {score}");
        prop_assert!((score - similarity(&number, &text)).abs() < EPS);
    }

    /// Property: mixed-type pairs stay symmetric and bounded
    #[test]
    fn prop_mixed_types_symmetric(s in ".{0,20}", n in any::<u32>(), flag in any::<bool>()) {
        let pairs = [
            (json!(s), json!(n)),
            (json!(s), json!({"output": s})),
            (json!(s), json!(flag)),
            (json!(s), json!([n])),
        ];
        for (a, b) in &pairs {
            let left = similarity(a, b);
            prop_assert!((0.0..=1.0).contains(&left));
            prop_assert!((left - similarity(b, a)).abs() < EPS);
        }
    }

    /// Property: scores stay within [0, 1]
    #[test]
    fn prop_similarity_bounded(a in ".{0,30}", b in ".{0,30}") {
        let score = string_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score), "score {score} out of range");
    }

    /// Property: distance is bounded by the longer string and at least the length gap
    #[test]
    fn prop_edit_distance_bounds(a in "[a-z]{0,25}", b in "[a-z]{0,25}") {
        let distance = edit_distance(&a, &b);
        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        prop_assert!(distance <= len_a.max(len_b));
        prop_assert!(distance >= len_a.abs_diff(len_b));
        prop_assert_eq!(distance == 0, a == b);
    }

    /// Property: triangle inequality holds for edit distance
    #[test]
    fn prop_edit_distance_triangle(
        a in "[ab]{0,12}",
        b in "[ab]{0,12}",
        c in "[ab]{0,12}"
    ) {
        prop_assert!(edit_distance(&a, &c) <= edit_distance(&a, &b) + edit_distance(&b, &c));
    }

    /// Property: identical results always average to 1.0 once there is a pair
    #[test]
    fn prop_identical_results_average_one(s in "[a-z ]{1,20}", n in 2usize..6) {
        let results: Vec<Value> = (0..n).map(|_| json!(s)).collect();
        let matrix = SimilarityMatrix::from_results(&results);
        prop_assert_eq!(matrix.size(), n);
        prop_assert!((matrix.average() - 1.0).abs() < EPS);
    }

    /// Property: the diagonal never contributes to the aggregate
    #[test]
    fn prop_aggregate_ignores_diagonal(diagonal in 0.0f64..1.0, off in 0.0f64..1.0) {
        let rows = vec![vec![diagonal, off], vec![off, diagonal]];
        prop_assert!((aggregate_similarity(&rows) - off).abs() < EPS);
    }
}

#[test]
fn test_classic_pairs() {
    assert_eq!(edit_distance("kitten", "sitting"), 3);
    assert!((similarity(&json!(""), &json!("")) - 1.0).abs() < EPS);
    assert!(similarity(&json!(""), &json!("x")).abs() < EPS);
    assert!((similarity(&Value::Null, &Value::Null) - 1.0).abs() < EPS);
    assert!(aggregate_similarity(&[vec![1.0]]).abs() < EPS);
    assert!((similarity(&json!("42"), &json!(42)) - 0.5).abs() < EPS);
}
