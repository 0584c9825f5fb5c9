//! Measurement outcomes and the basis-index codec.
//!
//! Services report results keyed by an integer basis-state index. An
//! [`Outcome`] is the same measurement as an ordered bit sequence, where bit
//! `i` belongs to the caller's `i`-th measured qubit.
//!
//! Outcomes print as `0`/`1` strings with bit 0 first: `Outcome::from_bits(
//! [true, false])` prints as `"10"`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HalError, HalResult};

/// Bit order used when expanding a basis-state index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Bit `i` of the outcome is bit `i` of the index (qubit 0 = LSB).
    #[default]
    LittleEndian,
    /// Bit 0 of the outcome is the most significant bit of the index.
    BigEndian,
}

/// An ordered sequence of measured bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Outcome(Vec<bool>);

impl Outcome {
    /// Create an outcome from bits.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self(bits.into_iter().collect())
    }

    /// The all-zero outcome of the given width.
    pub fn zeros(width: usize) -> Self {
        Self(vec![false; width])
    }

    /// Expand `index` into a fixed-width bit sequence.
    ///
    /// Bits beyond position 63 of the index are always zero.
    pub fn from_index(index: u64, width: usize, endianness: Endianness) -> Self {
        let bit = |pos: usize| -> bool {
            u32::try_from(pos)
                .ok()
                .and_then(|p| index.checked_shr(p))
                .is_some_and(|v| v & 1 == 1)
        };
        let bits = (0..width).map(|i| match endianness {
            Endianness::LittleEndian => bit(i),
            Endianness::BigEndian => bit(width - 1 - i),
        });
        Self(bits.collect())
    }

    /// Fold the bits back into an index. Inverse of [`Outcome::from_index`]
    /// for widths up to 64.
    pub fn to_index(&self, endianness: Endianness) -> u64 {
        let width = self.0.len();
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .fold(0u64, |acc, (i, _)| {
                let pos = match endianness {
                    Endianness::LittleEndian => i,
                    Endianness::BigEndian => width - 1 - i,
                };
                u32::try_from(pos)
                    .ok()
                    .and_then(|p| 1u64.checked_shl(p))
                    .map_or(acc, |mask| acc | mask)
            })
    }

    /// Reorder bits: output bit `i` is input bit `permutation[i]`.
    ///
    /// The permutation must have exactly one entry per bit, each in range
    /// and none repeated.
    pub fn permute(&self, permutation: &[usize]) -> HalResult<Self> {
        if permutation.len() != self.0.len() {
            return Err(HalError::InvalidPermutation(format!(
                "permutation has {} entries but outcome has {} bits",
                permutation.len(),
                self.0.len()
            )));
        }
        self.select(permutation)
    }

    /// Pick bits by index: output bit `i` is input bit `indices[i]`.
    ///
    /// Unlike [`Outcome::permute`], `indices` may be shorter than the
    /// outcome (a subset of qubits was measured).
    pub fn select(&self, indices: &[usize]) -> HalResult<Self> {
        let mut seen = HashSet::with_capacity(indices.len());
        let mut bits = Vec::with_capacity(indices.len());
        for &idx in indices {
            let Some(&b) = self.0.get(idx) else {
                return Err(HalError::InvalidPermutation(format!(
                    "index {idx} out of range for {} bits",
                    self.0.len()
                )));
            };
            if !seen.insert(idx) {
                return Err(HalError::InvalidPermutation(format!(
                    "index {idx} appears more than once"
                )));
            }
            bits.push(b);
        }
        Ok(Self(bits))
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the outcome has no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bits, in order.
    pub fn bits(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Outcome {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(HalError::Decode(format!(
                    "invalid bit '{other}' in outcome '{s}'"
                ))),
            })
            .collect::<HalResult<Vec<_>>>()
            .map(Self)
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_index_little_endian() {
        // 6 = 0b110 → bit0=0, bit1=1, bit2=1
        let o = Outcome::from_index(6, 3, Endianness::LittleEndian);
        assert_eq!(o.bits(), &[false, true, true]);
        assert_eq!(o.to_string(), "011");
    }

    #[test]
    fn test_from_index_big_endian() {
        let o = Outcome::from_index(6, 3, Endianness::BigEndian);
        assert_eq!(o.to_string(), "110");
    }

    #[test]
    fn test_from_index_pads_to_width() {
        let o = Outcome::from_index(1, 5, Endianness::LittleEndian);
        assert_eq!(o.to_string(), "10000");
        assert_eq!(Outcome::from_index(0, 0, Endianness::LittleEndian).len(), 0);
    }

    #[test]
    fn test_from_index_beyond_64_bits_is_zero() {
        let o = Outcome::from_index(u64::MAX, 70, Endianness::LittleEndian);
        assert!(o.bits()[..64].iter().all(|&b| b));
        assert!(o.bits()[64..].iter().all(|&b| !b));
    }

    #[test]
    fn test_to_index_inverts_from_index() {
        for endianness in [Endianness::LittleEndian, Endianness::BigEndian] {
            for idx in 0..32 {
                let o = Outcome::from_index(idx, 5, endianness);
                assert_eq!(o.to_index(endianness), idx);
            }
        }
    }

    #[test]
    fn test_identity_permutation_is_noop() {
        let o = Outcome::from_index(0b1011, 4, Endianness::LittleEndian);
        assert_eq!(o.permute(&[0, 1, 2, 3]).unwrap(), o);
    }

    #[test]
    fn test_permute_reorders() {
        let o: Outcome = "100".parse().unwrap();
        assert_eq!(o.permute(&[2, 1, 0]).unwrap().to_string(), "001");
        assert_eq!(o.permute(&[1, 0, 2]).unwrap().to_string(), "010");
    }

    #[test]
    fn test_permute_rejects_length_mismatch() {
        let o = Outcome::zeros(3);
        assert!(matches!(
            o.permute(&[0, 1]),
            Err(HalError::InvalidPermutation(_))
        ));
        assert!(matches!(
            o.permute(&[0, 1, 2, 0]),
            Err(HalError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_permute_rejects_out_of_range() {
        let o = Outcome::zeros(3);
        assert!(matches!(
            o.permute(&[0, 1, 3]),
            Err(HalError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_permute_rejects_duplicates() {
        let o = Outcome::zeros(3);
        assert!(matches!(
            o.permute(&[0, 0, 1]),
            Err(HalError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_select_subset() {
        let o: Outcome = "0110".parse().unwrap();
        assert_eq!(o.select(&[2, 0]).unwrap().to_string(), "10");
        assert!(o.select(&[]).unwrap().is_empty());
        assert!(o.select(&[4]).is_err());
        assert!(o.select(&[1, 1]).is_err());
    }

    #[test]
    fn test_parse_rejects_non_bits() {
        assert!("01x".parse::<Outcome>().is_err());
        assert_eq!("".parse::<Outcome>().unwrap(), Outcome::default());
    }

    #[test]
    fn test_serde_as_string() {
        let o: Outcome = "101".parse().unwrap();
        assert_eq!(serde_json::to_string(&o).unwrap(), "\"101\"");
        let back: Outcome = serde_json::from_str("\"101\"").unwrap();
        assert_eq!(back, o);
    }

    fn outcome_and_permutation() -> impl Strategy<Value = (Outcome, Vec<usize>)> {
        (1usize..12).prop_flat_map(|n| {
            (
                prop::collection::vec(any::<bool>(), n).prop_map(Outcome::from_bits),
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_inverse_permutation_restores((o, perm) in outcome_and_permutation()) {
            let mut inverse = vec![0; perm.len()];
            for (i, &p) in perm.iter().enumerate() {
                inverse[p] = i;
            }
            let back = o.permute(&perm).unwrap().permute(&inverse).unwrap();
            prop_assert_eq!(back, o);
        }

        #[test]
        fn prop_big_endian_is_reversed_little_endian(index in any::<u64>(), width in 0usize..64) {
            let little = Outcome::from_index(index, width, Endianness::LittleEndian);
            let big = Outcome::from_index(index, width, Endianness::BigEndian);
            let reversed: Vec<bool> = little.bits().iter().rev().copied().collect();
            prop_assert_eq!(big.bits(), reversed.as_slice());
        }
    }
}
