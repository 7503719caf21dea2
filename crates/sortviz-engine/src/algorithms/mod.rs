//! Instrumented sorting algorithms.
//!
//! Every variant sorts a slice in place while reporting each comparison and
//! exchange through a [`StepEmitter`]. Exchanges are always swaps, so the
//! slice holds a permutation at every step, including after cancellation.
//!
//! Cancellation is checked before every comparison. A cancelled run returns
//! [`Outcome::Cancelled`] without emitting [`Step::Done`].

mod bogo;
mod bubble;
mod insertion;
mod quick;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emitter::{Cancelled, StepEmitter};
use crate::error::Result;
use crate::pacing::Pace;
use crate::step::Step;

pub use bogo::{bogo_sort, MAX_SHUFFLES};
pub use bubble::bubble_sort;
pub use insertion::insertion_sort;
pub use quick::{partition, quick_sort, Partition};

/// How a run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The slice is sorted and `Done` was emitted
    Completed,
    /// Cancellation was observed; the slice is a partially sorted permutation
    Cancelled,
}

/// Selectable sorting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Bubble,
    Quick,
    Insertion,
    Bogo,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Bubble,
        Algorithm::Quick,
        Algorithm::Insertion,
        Algorithm::Bogo,
    ];

    /// Identifier used in config stores and URLs.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Quick => "quick",
            Algorithm::Insertion => "insertion",
            Algorithm::Bogo => "bogo",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Quick => "Quick Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Bogo => "Bogo Sort",
        }
    }

    /// Sort `values` in place, reporting through `emitter`.
    ///
    /// Only bogo sort can fail, with [`Error::RunTooLong`](crate::Error::RunTooLong).
    pub async fn run<E, R>(self, values: &mut [u32], emitter: &mut E, rng: &mut R) -> Result<Outcome>
    where
        E: StepEmitter,
        R: Rng,
    {
        match self {
            Algorithm::Bubble => Ok(bubble_sort(values, emitter).await),
            Algorithm::Quick => Ok(quick_sort(values, emitter).await),
            Algorithm::Insertion => Ok(insertion_sort(values, emitter).await),
            Algorithm::Bogo => bogo_sort(values, emitter, rng).await,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An algorithm name that doesn't match any variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Emit `Done` for a body that ran to the end, or report the cancellation.
async fn finish<E: StepEmitter>(body: std::result::Result<(), Cancelled>, emitter: &mut E) -> Outcome {
    let done = match body {
        Ok(()) => emitter.emit(Step::Done, Pace::Immediate).await,
        Err(cancelled) => Err(cancelled),
    };
    match done {
        Ok(()) => Outcome::Completed,
        Err(Cancelled) => Outcome::Cancelled,
    }
}
