//! Execution result types.
//!
//! Counts are keyed by [`Outcome`]; bit `i` of an outcome is the caller's
//! `i`-th measured qubit after the measurement permutation was applied.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// Measurement counts from circuit execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<Outcome, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (outcome, count) pairs.
    /// Duplicate outcomes are accumulated, consistent with `insert()`.
    pub fn from_pairs(iter: impl IntoIterator<Item = (Outcome, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Add `count` occurrences of `outcome`.
    ///
    /// Inserting an outcome with count zero still records the outcome.
    pub fn insert(&mut self, outcome: Outcome, count: u64) {
        *self.counts.entry(outcome).or_default() += count;
    }

    /// Get the count for an outcome.
    pub fn get(&self, outcome: &Outcome) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Iterate over (outcome, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, &u64)> {
        self.counts.iter()
    }

    /// Total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Most frequent outcome; ties resolve to the lexicographically smallest.
    pub fn most_frequent(&self) -> Option<(&Outcome, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Get probabilities for each outcome.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<Outcome, f64> {
        let total = self.total_shots() as f64;
        if total == 0.0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }

    /// Counts sorted by count descending, then by outcome.
    pub fn sorted(&self) -> Vec<(&Outcome, &u64)> {
        let mut items: Vec<_> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        items
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(Outcome, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (Outcome, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Result of circuit execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots requested.
    pub shots: u32,
    /// Post-processing descriptor carried over from the job handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<String>,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            postprocess: None,
        }
    }

    /// Attach a post-processing descriptor.
    pub fn with_postprocess(mut self, postprocess: Option<String>) -> Self {
        self.postprocess = postprocess;
        self
    }

    /// Get probabilities for each outcome.
    pub fn probabilities(&self) -> FxHashMap<Outcome, f64> {
        self.counts.probabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(s: &str) -> Outcome {
        s.parse().unwrap()
    }

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert(o("00"), 3);
        counts.insert(o("11"), 5);
        counts.insert(o("00"), 2);
        assert_eq!(counts.get(&o("00")), 5);
        assert_eq!(counts.total_shots(), 10);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_most_frequent_and_sorted() {
        let counts = Counts::from_pairs([(o("01"), 4), (o("10"), 4), (o("11"), 2)]);
        let (top, n) = counts.most_frequent().unwrap();
        assert_eq!(top, &o("01"));
        assert_eq!(*n, 4);
        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(sorted, vec!["01", "10", "11"]);
    }

    #[test]
    fn test_probabilities() {
        let counts = Counts::from_pairs([(o("0"), 1), (o("1"), 3)]);
        let p = counts.probabilities();
        assert!((p[&o("1")] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_execution_result_json_keys_are_bitstrings() {
        let result = ExecutionResult::new(Counts::from_pairs([(o("10"), 7)]), 7)
            .with_postprocess(Some("pp".into()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["counts"]["counts"]["10"], 7);
        assert_eq!(json["postprocess"], "pp");
        let back: ExecutionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
