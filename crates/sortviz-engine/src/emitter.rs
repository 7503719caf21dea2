//! The contract algorithms report through, and its two drivers.
//!
//! - [`Pacer`] delivers steps live: it updates the frame, forwards it to the
//!   render and audio sinks, then sleeps for the step's pace.
//! - [`Recorder`] keeps steps in memory without delay, for timelines and tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;

use crate::audio::Tone;
use crate::cancel::CancelToken;
use crate::pacing::{Pace, Timing};
use crate::sink::{AudioSink, RenderSink};
use crate::step::{Frame, Step};

/// A run observed a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run cancelled")]
pub struct Cancelled;

/// Where an algorithm sends its steps.
///
/// Once cancellation is observed an emitter accepts no further steps.
#[allow(async_fn_in_trait)]
pub trait StepEmitter {
    /// Whether a stop was requested.
    fn is_cancelled(&self) -> bool;

    /// Deliver `step`, then wait out `pace`.
    async fn emit(&mut self, step: Step, pace: Pace) -> Result<(), Cancelled>;

    /// Cancellation checkpoint for loop heads.
    fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: usize,
    pub compares: usize,
    pub swaps: usize,
}

impl RunStats {
    fn record(&mut self, step: &Step) {
        self.steps += 1;
        match step {
            Step::Compare { .. } => self.compares += 1,
            Step::Swap { .. } => self.swaps += 1,
            _ => {}
        }
    }
}

/// Live emitter driving the render and audio sinks.
pub struct Pacer<'a> {
    cancel: CancelToken,
    timing: Timing,
    frame: Frame,
    render: &'a mut dyn RenderSink,
    audio: &'a mut dyn AudioSink,
    stats: RunStats,
}

impl<'a> Pacer<'a> {
    /// Create a pacer starting from `frame`.
    pub fn new(
        cancel: CancelToken,
        timing: Timing,
        frame: Frame,
        render: &'a mut dyn RenderSink,
        audio: &'a mut dyn AudioSink,
    ) -> Self {
        Self {
            cancel,
            timing,
            frame,
            render,
            audio,
            stats: RunStats::default(),
        }
    }

    /// The frame as of the last delivered step.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Give back the final frame and counters.
    pub fn finish(self) -> (Frame, RunStats) {
        (self.frame, self.stats)
    }

    fn tone_for(&self, step: &Step) -> Option<Tone> {
        let len = self.frame.sequence.len();
        match step {
            Step::Compare { value, .. } => Some(Tone::for_compare(*value, len)),
            Step::Highlight { index } => Some(Tone::for_celebration(*index, len)),
            _ => None,
        }
    }
}

impl StepEmitter for Pacer<'_> {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn emit(&mut self, step: Step, pace: Pace) -> Result<(), Cancelled> {
        self.checkpoint()?;

        self.frame.apply(&step);
        self.stats.record(&step);
        tracing::trace!(kind = step.kind(), steps = self.stats.steps, "step");

        self.render.render(&step, &self.frame);
        if let Some(tone) = self.tone_for(&step) {
            self.audio.play(tone);
        }

        let delay = self.timing.delay(pace);
        if !delay.is_zero() {
            sleep(delay).await;
        }
        Ok(())
    }
}

/// Steps a [`Recorder`] takes between yields to the scheduler.
const YIELD_INTERVAL: usize = 256;

/// Emitter that records steps instantly.
///
/// Recording never sleeps, so it yields every few hundred steps to keep
/// other tasks on the same thread moving.
#[derive(Debug, Default)]
pub struct Recorder {
    cancel: CancelToken,
    steps: Vec<Step>,
    cancel_after: Option<usize>,
    limit: Option<usize>,
    overflowed: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record under an externally controlled token.
    pub fn with_token(cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Request cancellation by itself once `limit` steps are recorded.
    pub fn cancel_after(mut self, limit: usize) -> Self {
        self.cancel_after = Some(limit);
        self
    }

    /// Refuse steps past `limit`, cancelling the run instead.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the run was cut off by the step limit.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Number of recorded comparisons.
    pub fn compare_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_compare()).count()
    }

    /// Number of recorded swaps.
    pub fn swap_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_swap()).count()
    }
}

impl StepEmitter for Recorder {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn emit(&mut self, step: Step, _pace: Pace) -> Result<(), Cancelled> {
        self.checkpoint()?;
        if self.limit.is_some_and(|limit| self.steps.len() >= limit) {
            self.overflowed = true;
            self.cancel.cancel();
            return Err(Cancelled);
        }

        self.steps.push(step);
        if self.cancel_after.is_some_and(|limit| self.steps.len() >= limit) {
            self.cancel.cancel();
        }
        if self.steps.len() % YIELD_INTERVAL == 0 {
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;
    use crate::sink::NullSink;
    use std::time::Duration;
    use tokio::time::Instant;

    #[test]
    fn recorder_refuses_after_cancel() {
        let mut recorder = Recorder::new();
        tokio_test::block_on(async {
            recorder.emit(Step::Done, Pace::Step).await.unwrap();
            recorder.token().cancel();
            assert_eq!(recorder.emit(Step::Done, Pace::Step).await, Err(Cancelled));
        });
        assert_eq!(recorder.steps().len(), 1);
    }

    #[test]
    fn recorder_cancels_itself_at_limit() {
        let mut recorder = Recorder::new().cancel_after(2);
        tokio_test::block_on(async {
            recorder.emit(Step::compare(0, 1, 1), Pace::Step).await.unwrap();
            assert!(!recorder.is_cancelled());
            recorder.emit(Step::compare(0, 1, 1), Pace::Step).await.unwrap();
        });
        assert!(recorder.is_cancelled());
        assert_eq!(recorder.checkpoint(), Err(Cancelled));
    }

    #[test]
    fn recorder_stops_at_step_limit() {
        let mut recorder = Recorder::new().with_limit(3);
        let refused = tokio_test::block_on(async {
            for _ in 0..3 {
                recorder.emit(Step::Done, Pace::Step).await.unwrap();
            }
            recorder.emit(Step::Done, Pace::Step).await
        });
        assert_eq!(refused, Err(Cancelled));
        assert!(recorder.overflowed());
        assert!(recorder.is_cancelled());
        assert_eq!(recorder.steps().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_sleeps_by_pace_and_sounds_compares() {
        let mut frames = Vec::new();
        let mut tones = Vec::new();
        let mut render = |_: &Step, frame: &Frame| frames.push(frame.clone());
        let mut audio = |tone: Tone| tones.push(tone);

        let frame = Frame::new(Sequence::from_values(vec![2, 1]));
        let mut pacer = Pacer::new(
            CancelToken::new(),
            Timing::from_speed(10),
            frame,
            &mut render,
            &mut audio,
        );

        let start = Instant::now();
        pacer.emit(Step::compare(0, 1, 2), Pace::Step).await.unwrap();
        pacer.emit(Step::swap(0, 1, &[1, 2]), Pace::Immediate).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(100));

        let (last, stats) = pacer.finish();
        assert_eq!(last.sequence.as_slice(), &[1, 2]);
        assert_eq!(stats, RunStats { steps: 2, compares: 1, swaps: 1 });
        assert_eq!(frames.len(), 2);
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].frequency, 1000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_stops_delivering_once_cancelled() {
        let mut render = NullSink;
        let mut audio = NullSink;
        let token = CancelToken::new();
        let mut pacer = Pacer::new(
            token.clone(),
            Timing::from_speed(50),
            Frame::default(),
            &mut render,
            &mut audio,
        );

        token.cancel();
        assert_eq!(pacer.emit(Step::Done, Pace::Step).await, Err(Cancelled));
        assert_eq!(pacer.stats().steps, 0);
    }
}
