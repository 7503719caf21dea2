//! Tone cues for comparisons and the celebration sweep.
//!
//! The engine only decides *which* tone to play; an [`AudioSink`] decides how.
//! [`Tone::samples`] is a reference synthesizer (decaying sine) for sinks
//! that render PCM themselves.
//!
//! [`AudioSink`]: crate::sink::AudioSink

use std::f32::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Length of every tone.
pub const TONE_DURATION: Duration = Duration::from_millis(100);

/// Starting gain of the envelope.
pub const START_GAIN: f32 = 0.1;

/// Gain reached at the end of the tone.
pub const END_GAIN: f32 = 0.01;

/// A short sine tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f32,
    /// Duration of the tone
    pub duration: Duration,
}

impl Tone {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            duration: TONE_DURATION,
        }
    }

    /// Tone for comparing an element of height `value` in a sequence of `size`:
    /// 200 Hz to 1000 Hz.
    pub fn for_compare(value: u32, size: usize) -> Self {
        Self::new(200.0 + ratio(value as usize, size) * 800.0)
    }

    /// Tone for celebration position `index` of `len`: 400 Hz rising to 1000 Hz.
    pub fn for_celebration(index: usize, len: usize) -> Self {
        Self::new(400.0 + ratio(index, len) * 600.0)
    }

    /// Gain envelope at `t` seconds: exponential ramp from [`START_GAIN`] to [`END_GAIN`].
    pub fn gain_at(&self, t: f32) -> f32 {
        let total = self.duration.as_secs_f32();
        if total <= 0.0 {
            return 0.0;
        }
        let progress = (t / total).clamp(0.0, 1.0);
        START_GAIN * (END_GAIN / START_GAIN).powf(progress)
    }

    /// Render mono PCM samples at `sample_rate`.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration.as_secs_f64() * sample_rate as f64).round() as usize;
        let rate = sample_rate as f32;
        (0..count)
            .map(|n| {
                let t = n as f32 / rate;
                self.gain_at(t) * (TAU * self.frequency * t).sin()
            })
            .collect()
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}
