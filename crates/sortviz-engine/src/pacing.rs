//! Step delay policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Floor on the per-step delay so every step stays perceptible.
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(20);

/// Bogo shuffle steps run this many times faster than regular steps.
pub const SHUFFLE_DIVISOR: u32 = 50;

/// Fixed celebration sweep pacing, independent of speed.
pub const CELEBRATION_DELAY: Duration = Duration::from_millis(30);

/// How long to wait after a step is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    /// Regular comparison pacing
    Step,
    /// Bogo shuffle pacing
    Shuffle,
    /// Celebration sweep pacing
    Celebration,
    /// No delay (swaps, completion markers)
    Immediate,
}

/// Delays derived from a speed setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    step: Duration,
}

impl Timing {
    /// `max(20ms, 1000ms / speed)`. A speed of zero is treated as 1.
    pub fn from_speed(speed: u32) -> Self {
        let speed = speed.max(1);
        let step = Duration::from_nanos(1_000_000_000 / u64::from(speed)).max(MIN_STEP_DELAY);
        Self { step }
    }

    /// Regular step delay.
    pub fn step_delay(&self) -> Duration {
        self.step
    }

    /// Delay to apply for the given pace.
    pub fn delay(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Step => self.step,
            Pace::Shuffle => self.step / SHUFFLE_DIVISOR,
            Pace::Celebration => CELEBRATION_DELAY,
            Pace::Immediate => Duration::ZERO,
        }
    }
}
