//! Scrubbable playback of a recorded run.
//!
//! A [`Timeline`] keeps the frame at its cursor up to date: moving forward
//! applies steps one by one, moving backward rebuilds from the initial bars.

use serde::{Deserialize, Serialize};

use crate::algorithms::Algorithm;
use crate::sequence::Sequence;
use crate::step::{Frame, Step};

/// Where a timeline's playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineState {
    /// Rewound, not playing
    Stopped,
    /// Advancing on every [`Timeline::tick`]
    Playing,
    /// Held mid-way
    Paused,
    /// Cursor past the last step
    Finished,
}

/// A recorded run: the starting bars plus every step emitted.
#[derive(Debug, Clone)]
pub struct Timeline {
    algorithm: Algorithm,
    initial: Sequence,
    steps: Vec<Step>,
    cursor: usize,
    state: TimelineState,
    frame: Frame,
}

impl Timeline {
    pub fn new(algorithm: Algorithm, initial: Sequence, steps: Vec<Step>) -> Self {
        Self {
            algorithm,
            frame: Frame::new(initial.clone()),
            initial,
            steps,
            cursor: 0,
            state: TimelineState::Stopped,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn initial(&self) -> &Sequence {
        &self.initial
    }

    /// Number of steps applied to the current frame.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Bars and highlights after the first `cursor` steps.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Progress in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.cursor as f64 / self.steps.len() as f64
        }
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Move the cursor to `step`, clamped to the recording.
    ///
    /// Playback keeps going if it was playing; otherwise the timeline is
    /// paused there, or finished at the end.
    pub fn seek(&mut self, step: usize) {
        let target = step.min(self.steps.len());
        if target >= self.cursor {
            for step in &self.steps[self.cursor..target] {
                self.frame.apply(step);
            }
        } else {
            self.frame = Frame::from_steps(&self.initial, &self.steps, target);
        }
        self.cursor = target;

        self.state = if self.at_end() {
            TimelineState::Finished
        } else if self.state == TimelineState::Playing {
            TimelineState::Playing
        } else {
            TimelineState::Paused
        };
    }

    /// Start playing, from the top if already finished.
    pub fn play(&mut self) {
        if self.at_end() {
            self.rewind();
        }
        self.state = if self.steps.is_empty() {
            TimelineState::Finished
        } else {
            TimelineState::Playing
        };
    }

    pub fn pause(&mut self) {
        if self.state == TimelineState::Playing {
            self.state = TimelineState::Paused;
        }
    }

    /// Stop playing and rewind.
    pub fn stop(&mut self) {
        self.rewind();
        self.state = TimelineState::Stopped;
    }

    fn rewind(&mut self) {
        self.cursor = 0;
        self.frame = Frame::new(self.initial.clone());
    }

    /// Apply the next step and return it.
    pub fn step_forward(&mut self) -> Option<&Step> {
        let step = self.steps.get(self.cursor)?;
        self.frame.apply(step);
        self.cursor += 1;
        if self.at_end() {
            self.state = TimelineState::Finished;
        }
        Some(step)
    }

    /// Take back the last applied step and pause.
    pub fn step_backward(&mut self) {
        if self.cursor > 0 {
            self.frame = Frame::from_steps(&self.initial, &self.steps, self.cursor - 1);
            self.cursor -= 1;
            self.state = TimelineState::Paused;
        }
    }

    /// Advance one step if playing.
    pub fn tick(&mut self) -> Option<&Step> {
        if self.state == TimelineState::Playing {
            self.step_forward()
        } else {
            None
        }
    }
}

/// Timeline status for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineStatus {
    pub algorithm: Algorithm,
    pub cursor: usize,
    pub total_steps: usize,
    pub state: TimelineState,
    pub progress: f64,
}

impl From<&Timeline> for TimelineStatus {
    fn from(timeline: &Timeline) -> Self {
        Self {
            algorithm: timeline.algorithm,
            cursor: timeline.cursor,
            total_steps: timeline.total_steps(),
            state: timeline.state,
            progress: timeline.progress(),
        }
    }
}
