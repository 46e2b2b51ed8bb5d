//! Edit-distance similarity between task results.
//!
//! Two string results are compared directly. Any other pair is compared by
//! the canonical serialization of both sides (object keys sorted), so `"42"`
//! and `42` differ. Scores are in `[0, 1]` where `1.0` means identical.

use serde::Serialize;
use serde_json::Value;

/// Levenshtein distance between two strings, counted in Unicode scalar values.
pub fn edit_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in table[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let substitution = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + substitution);
        }
    }

    table[n][m]
}

/// Similarity of two texts in `[0, 1]`
///
/// Two empty texts are identical; an empty text has nothing in common with
/// a non-empty one.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    match (len_a, len_b) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        _ => {
            let distance = edit_distance(a, b);
            1.0 - distance as f64 / len_a.max(len_b) as f64
        }
    }
}

/// Similarity of two task results in `[0, 1]`
///
/// `null` and `""` both count as empty.
pub fn similarity(a: &Value, b: &Value) -> f64 {
    match (a, b) {
        (Value::String(a), Value::String(b)) => string_similarity(a, b),
        _ => string_similarity(&serialized(a), &serialized(b)),
    }
}

fn serialized(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if s.is_empty() => String::new(),
        // serde_json maps are BTreeMaps, so keys serialize sorted
        other => other.to_string(),
    }
}

/// Mean of all entries strictly above the diagonal
///
/// Rows may be ragged; missing cells are skipped. Returns `0.0` when there
/// is no pair to average.
pub fn aggregate_similarity(rows: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;

    for (i, row) in rows.iter().enumerate() {
        for value in row.iter().skip(i + 1) {
            total += value;
            pairs += 1;
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

/// Pairwise similarity of a set of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Score every pair of results, including each result against itself
    pub fn from_results(results: &[Value]) -> Self {
        let rows = results
            .iter()
            .map(|left| results.iter().map(|right| similarity(left, right)).collect())
            .collect();
        Self { rows }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Mean pairwise similarity, see [`aggregate_similarity`]
    pub fn average(&self) -> f64 {
        aggregate_similarity(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_edit_distance_classic() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_edit_distance_counts_chars_not_bytes() {
        assert_eq!(edit_distance("héllo", "hello"), 1);
        assert_eq!(edit_distance("日本", "日本語"), 1);
    }

    #[test]
    fn test_string_similarity_empty_rules() {
        assert!((string_similarity("", "") - 1.0).abs() < EPS);
        assert!(string_similarity("", "x").abs() < EPS);
        assert!(string_similarity("x", "").abs() < EPS);
    }

    #[test]
    fn test_string_similarity_partial() {
        // 3 edits over max length 7
        let score = string_similarity("kitten", "sitting");
        assert!((score - (1.0 - 3.0 / 7.0)).abs() < EPS);
    }

    #[test]
    fn test_similarity_null_is_empty() {
        assert!((similarity(&Value::Null, &Value::Null) - 1.0).abs() < EPS);
        assert!((similarity(&Value::Null, &json!("")) - 1.0).abs() < EPS);
        assert!(similarity(&Value::Null, &json!("x")).abs() < EPS);
    }

    #[test]
    fn test_similarity_objects_ignore_key_order() {
        let a: Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        assert!((similarity(&a, &b) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_similarity_string_vs_number() {
        // "\"42\"" against "42": two deletions over length 4
        assert!((similarity(&json!("42"), &json!(42)) - 0.5).abs() < EPS);
        assert!((similarity(&json!(42), &json!("42")) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_similarity_string_vs_object_serializes_both() {
        let text = json!(r#"{"a":1}"#);
        let object = json!({"a": 1});
        assert!(similarity(&text, &object) < 1.0);
        assert!((similarity(&object, &json!({"a": 1})) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_matrix_mixed_types() {
        let matrix = SimilarityMatrix::from_results(&[json!("42"), json!(42)]);
        assert_eq!(matrix.get(0, 0), Some(1.0));
        assert_eq!(matrix.get(0, 1), Some(0.5));
        assert_eq!(matrix.get(1, 0), Some(0.5));
    }

    #[test]
    fn test_aggregate_single_row() {
        assert!(aggregate_similarity(&[vec![1.0]]).abs() < EPS);
        assert!(aggregate_similarity(&[]).abs() < EPS);
    }

    #[test]
    fn test_aggregate_upper_triangle_only() {
        let rows = vec![
            vec![1.0, 0.5, 0.25],
            vec![0.0, 1.0, 0.75],
            vec![0.0, 0.0, 1.0],
        ];
        assert!((aggregate_similarity(&rows) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_aggregate_ragged_rows() {
        let rows = vec![vec![1.0, 0.4], vec![1.0]];
        assert!((aggregate_similarity(&rows) - 0.4).abs() < EPS);
    }

    #[test]
    fn test_matrix_from_results() {
        let results = vec![json!("abc"), json!("abc"), json!("abd")];
        let matrix = SimilarityMatrix::from_results(&results);

        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.get(0, 1), Some(1.0));
        assert_eq!(matrix.get(1, 1), Some(1.0));
        assert_eq!(matrix.get(3, 0), None);

        let expected = (1.0 + 2.0 / 3.0 + 2.0 / 3.0) / 3.0;
        assert!((matrix.average() - expected).abs() < EPS);
    }
}
