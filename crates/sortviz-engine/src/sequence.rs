//! Bar heights under sort.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A permutation of `1..=n` representing bar heights.
///
/// Swaps are the only mutation the engine performs, so every state a
/// `Sequence` passes through is still a permutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<u32>);

impl Sequence {
    /// The sorted sequence `1..=n`.
    pub fn ascending(n: usize) -> Self {
        Self((1..=n as u32).collect())
    }

    /// The reversed sequence `n..=1`.
    pub fn descending(n: usize) -> Self {
        Self((1..=n as u32).rev().collect())
    }

    /// A uniformly shuffled permutation of `1..=n` (Fisher–Yates).
    pub fn shuffled<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut seq = Self::ascending(n);
        for i in (1..n).rev() {
            let j = rng.gen_range(0..=i);
            seq.0.swap(i, j);
        }
        seq
    }

    /// Wrap existing values without checking them.
    pub fn from_values(values: Vec<u32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.0.clone()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }

    /// Check ascending order.
    pub fn is_sorted(&self) -> bool {
        is_sorted(&self.0)
    }

    /// Check that the values are exactly `1..=len` in some order.
    pub fn is_permutation(&self) -> bool {
        is_permutation(&self.0)
    }
}

impl From<Vec<u32>> for Sequence {
    fn from(values: Vec<u32>) -> Self {
        Self(values)
    }
}

/// Check if a slice is sorted in ascending order.
#[inline]
pub fn is_sorted(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Check that `values` holds each of `1..=values.len()` exactly once.
pub fn is_permutation(values: &[u32]) -> bool {
    let n = values.len();
    let mut seen = vec![false; n];
    for &v in values {
        let idx = v as usize;
        if idx == 0 || idx > n || seen[idx - 1] {
            return false;
        }
        seen[idx - 1] = true;
    }
    true
}
