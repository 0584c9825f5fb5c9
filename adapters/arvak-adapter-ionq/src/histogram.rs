//! Histogram decoding.
//!
//! IonQ reports results as a probability per basis-state index. Turning
//! that back into integer counts is done in three steps:
//!
//! 1. [`parse_histogram`]: decimal-string keys become `u64` indices.
//! 2. [`reconstruct`]: each probability is scaled by the shot count and
//!    rounded half-to-even; the rounding residual goes onto the largest
//!    count so the total equals the shot count exactly.
//! 3. [`decode_counts`]: each index is expanded little-endian to the
//!    reported width and projected onto the measured qubits.

use std::collections::BTreeMap;

use arvak_hal::{Counts, Endianness, HalError, HalResult, Outcome};

use crate::error::{IonqError, IonqResult};

/// Basis-state index to probability, in ascending index order.
pub type Histogram = BTreeMap<u64, f64>;

/// Parse the wire histogram.
///
/// Keys that spell the same index (`"3"` and `"03"`) are rejected rather
/// than merged.
pub fn parse_histogram(raw: &BTreeMap<String, f64>) -> IonqResult<Histogram> {
    let mut histogram = Histogram::new();
    for (key, &prob) in raw {
        let index = key.trim().parse::<u64>().map_err(|_| {
            IonqError::MalformedResponse(format!("histogram key {key:?} is not an index"))
        })?;
        if !prob.is_finite() || prob < 0.0 {
            return Err(IonqError::MalformedResponse(format!(
                "histogram entry {key} has probability {prob}"
            )));
        }
        if histogram.insert(index, prob).is_some() {
            return Err(IonqError::MalformedResponse(format!(
                "histogram index {index} appears more than once"
            )));
        }
    }
    Ok(histogram)
}

/// Rebuild integer counts that sum to exactly `total_shots`.
///
/// Entries are visited in ascending index order. The correction target is
/// the first entry holding the strictly largest rounded count, so with all
/// counts at zero it is the first entry. Zero counts are kept.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn reconstruct(histogram: &Histogram, total_shots: u64) -> HalResult<Vec<(u64, u64)>> {
    if histogram.is_empty() {
        if total_shots == 0 {
            return Ok(Vec::new());
        }
        return Err(HalError::Decode(format!(
            "empty histogram cannot account for {total_shots} shots"
        )));
    }

    let shots = total_shots as f64;
    let mut counts: Vec<(u64, u64)> = Vec::with_capacity(histogram.len());
    let mut largest = 0;
    for (&index, &prob) in histogram {
        let count = (prob * shots).round_ties_even() as u64;
        counts.push((index, count));
        if count > counts[largest].1 {
            largest = counts.len() - 1;
        }
    }

    let sum: i128 = counts.iter().map(|&(_, c)| i128::from(c)).sum();
    let corrected = i128::from(counts[largest].1) + (i128::from(total_shots) - sum);
    counts[largest].1 = u64::try_from(corrected).map_err(|_| {
        HalError::Decode(format!(
            "histogram overshoots {total_shots} shots by {}",
            sum - i128::from(total_shots)
        ))
    })?;

    Ok(counts)
}

/// Expand reconstructed indices into measured outcomes.
///
/// `width` is the qubit count the service reported. When every qubit is
/// measured the layout must be a full permutation; otherwise it selects a
/// subset. Indices that map to the same outcome accumulate.
pub fn decode_counts(
    reconstructed: &[(u64, u64)],
    width: usize,
    measurements: &[usize],
) -> HalResult<Counts> {
    let mut counts = Counts::new();
    for &(index, count) in reconstructed {
        if width < 64 && index >> width != 0 {
            return Err(HalError::Protocol(format!(
                "histogram index {index} does not fit in {width} qubits"
            )));
        }
        let full = Outcome::from_index(index, width, Endianness::LittleEndian);
        let outcome = if measurements.len() == width {
            full.permute(measurements)?
        } else {
            full.select(measurements)?
        };
        counts.insert(outcome, count);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hist(entries: &[(u64, f64)]) -> Histogram {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_parse_histogram() {
        let raw: BTreeMap<String, f64> = [("0".to_string(), 0.25), ("3".to_string(), 0.75)]
            .into_iter()
            .collect();
        let h = parse_histogram(&raw).unwrap();
        assert_eq!(h.keys().copied().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_parse_rejects_bad_key() {
        let raw: BTreeMap<String, f64> = [("0b11".to_string(), 1.0)].into_iter().collect();
        assert!(matches!(
            parse_histogram(&raw),
            Err(IonqError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_repeated_index() {
        let raw: BTreeMap<String, f64> = [("3".to_string(), 0.5), ("03".to_string(), 0.5)]
            .into_iter()
            .collect();
        assert!(matches!(
            parse_histogram(&raw),
            Err(IonqError::MalformedResponse(msg)) if msg.contains("index 3")
        ));
    }

    #[test]
    fn test_parse_rejects_negative_probability() {
        let raw: BTreeMap<String, f64> = [("1".to_string(), -0.1)].into_iter().collect();
        assert!(parse_histogram(&raw).is_err());
    }

    #[test]
    fn test_exact_split() {
        let counts = reconstruct(&hist(&[(0, 0.5), (3, 0.5)]), 10).unwrap();
        assert_eq!(counts, vec![(0, 5), (3, 5)]);
    }

    #[test]
    fn test_residual_goes_to_largest() {
        // 0.2 * 7 = 1.4 -> 1, 0.8 * 7 = 5.6 -> 6: already 7.
        let counts = reconstruct(&hist(&[(0, 0.2), (1, 0.8)]), 7).unwrap();
        assert_eq!(counts, vec![(0, 1), (1, 6)]);

        // Three thirds of 10 round to 3 each; the missing shot goes to the
        // first of the tied largest entries.
        let third = 1.0 / 3.0;
        let counts = reconstruct(&hist(&[(1, third), (2, third), (4, third)]), 10).unwrap();
        assert_eq!(counts, vec![(1, 4), (2, 3), (4, 3)]);
    }

    #[test]
    fn test_half_rounds_to_even() {
        // 0.25 * 10 = 2.5 -> 2 (even), 0.75 * 10 = 7.5 -> 8 (even).
        let counts = reconstruct(&hist(&[(0, 0.25), (1, 0.75)]), 10).unwrap();
        assert_eq!(counts, vec![(0, 2), (1, 8)]);
    }

    #[test]
    fn test_all_zero_rounding_corrects_first_entry() {
        let counts = reconstruct(&hist(&[(5, 0.001), (9, 0.001)]), 3).unwrap();
        assert_eq!(counts, vec![(5, 3), (9, 0)]);
    }

    #[test]
    fn test_overshoot_is_corrected_downward() {
        let counts = reconstruct(&hist(&[(0, 0.6), (1, 0.6)]), 10).unwrap();
        assert_eq!(counts, vec![(0, 4), (1, 6)]);
    }

    #[test]
    fn test_negative_correction_is_decode_error() {
        let err = reconstruct(&hist(&[(0, 1.0), (1, 1.0), (2, 1.0)]), 10).unwrap_err();
        assert!(matches!(err, HalError::Decode(msg) if msg.contains("overshoots")));
    }

    #[test]
    fn test_empty_histogram() {
        assert!(reconstruct(&Histogram::new(), 0).unwrap().is_empty());
        assert!(matches!(
            reconstruct(&Histogram::new(), 5),
            Err(HalError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_little_endian() {
        // Index 1 with width 2 is qubit 0 set.
        let counts = decode_counts(&[(0, 5), (1, 5)], 2, &[0, 1]).unwrap();
        assert_eq!(counts.get(&"00".parse().unwrap()), 5);
        assert_eq!(counts.get(&"10".parse().unwrap()), 5);
    }

    #[test]
    fn test_decode_permuted() {
        let counts = decode_counts(&[(1, 4)], 2, &[1, 0]).unwrap();
        assert_eq!(counts.get(&"01".parse().unwrap()), 4);
    }

    #[test]
    fn test_decode_subset_accumulates() {
        // Only qubit 1 measured: indices 0 (00) and 1 (10) both read 0.
        let counts = decode_counts(&[(0, 3), (1, 2), (2, 5)], 2, &[1]).unwrap();
        assert_eq!(counts.get(&"0".parse().unwrap()), 5);
        assert_eq!(counts.get(&"1".parse().unwrap()), 5);
        assert_eq!(counts.total_shots(), 10);
    }

    #[test]
    fn test_decode_bad_layout() {
        assert!(matches!(
            decode_counts(&[(0, 1)], 2, &[0, 0]),
            Err(HalError::InvalidPermutation(_))
        ));
        assert!(matches!(
            decode_counts(&[(0, 1)], 2, &[3]),
            Err(HalError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_decode_rejects_index_wider_than_circuit() {
        // 5 is 101: three bits on a two-qubit circuit.
        assert!(matches!(
            decode_counts(&[(1, 5), (5, 5)], 2, &[0, 1]),
            Err(HalError::Protocol(msg)) if msg.contains("index 5")
        ));
        assert!(decode_counts(&[(3, 1)], 2, &[0, 1]).is_ok());
    }

    #[test]
    fn test_bell_scenario() {
        let h = hist(&[(0, 0.5), (3, 0.5)]);
        let reconstructed = reconstruct(&h, 10).unwrap();
        let counts = decode_counts(&reconstructed, 2, &[0, 1]).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(&"00".parse().unwrap()), 5);
        assert_eq!(counts.get(&"11".parse().unwrap()), 5);
    }

    fn normalized_histogram() -> impl Strategy<Value = Histogram> {
        prop::collection::btree_map(0u64..64, 1u32..1000, 1..16).prop_map(|weights| {
            let total: f64 = weights.values().map(|&w| f64::from(w)).sum();
            weights
                .into_iter()
                .map(|(k, w)| (k, f64::from(w) / total))
                .collect()
        })
    }

    // With at most 15 entries and 256+ shots the largest count always
    // absorbs a rounding overshoot.
    proptest! {
        #[test]
        fn prop_counts_sum_to_shots(h in normalized_histogram(), shots in 256u64..100_000) {
            let counts = reconstruct(&h, shots).unwrap();
            let sum: u64 = counts.iter().map(|&(_, c)| c).sum();
            prop_assert_eq!(sum, shots);
            prop_assert_eq!(counts.len(), h.len());
        }

        #[test]
        fn prop_reconstruct_is_deterministic(h in normalized_histogram(), shots in 256u64..10_000) {
            prop_assert_eq!(reconstruct(&h, shots).unwrap(), reconstruct(&h, shots).unwrap());
        }

        #[test]
        fn prop_counts_stay_close_to_probabilities(h in normalized_histogram(), shots in 256u64..10_000) {
            let counts = reconstruct(&h, shots).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let n = h.len() as f64;
            for ((_, prob), (_, count)) in h.iter().zip(counts.iter()) {
                #[allow(clippy::cast_precision_loss)]
                let expected = prob * shots as f64;
                prop_assert!((*count as f64 - expected).abs() <= n);
            }
        }
    }
}
