//! Visualization steps emitted by instrumented algorithms.

use serde::{Deserialize, Serialize};

use crate::sequence::Sequence;

/// One visualization-worthy event in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Elements are being compared
    ///
    /// `value` is the element whose height drives the comparison tone.
    Compare { indices: Vec<usize>, value: u32 },

    /// Two elements were exchanged; `sequence` is the state afterwards
    Swap { indices: [usize; 2], sequence: Sequence },

    /// Celebration sweep reached `index`
    Highlight { index: usize },

    /// The algorithm finished without being cancelled
    Done,

    /// Celebration finished; every bar is marked sorted
    Sorted { len: usize },
}

impl Step {
    /// Comparison of two positions.
    pub fn compare(i: usize, j: usize, value: u32) -> Self {
        Step::Compare { indices: vec![i, j], value }
    }

    /// Single-position mark (the insertion key).
    pub fn mark(i: usize, value: u32) -> Self {
        Step::Compare { indices: vec![i], value }
    }

    /// Exchange with the resulting snapshot.
    pub fn swap(i: usize, j: usize, values: &[u32]) -> Self {
        Step::Swap {
            indices: [i, j],
            sequence: Sequence::from_values(values.to_vec()),
        }
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, Step::Compare { .. })
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Step::Swap { .. })
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Compare { .. } => "compare",
            Step::Swap { .. } => "swap",
            Step::Highlight { .. } => "highlight",
            Step::Done => "done",
            Step::Sorted { .. } => "sorted",
        }
    }
}

/// What a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub sequence: Sequence,
    /// Indices drawn as "comparing"
    pub comparing: Vec<usize>,
    /// Indices drawn as "sorted"
    pub sorted: Vec<usize>,
}

impl Frame {
    /// A frame showing `sequence` with no highlights.
    pub fn new(sequence: Sequence) -> Self {
        Self {
            sequence,
            comparing: Vec::new(),
            sorted: Vec::new(),
        }
    }

    /// Fold one step into the frame.
    pub fn apply(&mut self, step: &Step) {
        match step {
            Step::Compare { indices, .. } => {
                self.comparing.clone_from(indices);
            }
            Step::Swap { sequence, .. } => {
                self.sequence.clone_from(sequence);
            }
            Step::Highlight { index } => {
                self.comparing.clear();
                self.sorted = vec![*index];
            }
            Step::Done => {
                self.comparing.clear();
            }
            Step::Sorted { len } => {
                self.comparing.clear();
                self.sorted = (0..*len).collect();
            }
        }
    }

    /// Drop all highlight state, keeping the bars.
    pub fn clear_highlights(&mut self) {
        self.comparing.clear();
        self.sorted.clear();
    }

    /// Rebuild the frame from an initial sequence and the steps before `up_to_step`.
    pub fn from_steps(initial: &Sequence, steps: &[Step], up_to_step: usize) -> Self {
        let mut frame = Frame::new(initial.clone());
        for step in steps.iter().take(up_to_step) {
            frame.apply(step);
        }
        frame
    }
}
