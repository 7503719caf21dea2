//! Side-effect sinks the engine drives.
//!
//! Rendering and audio backends live outside the engine. Closures work as
//! sinks for quick wiring:
//!
//! ```ignore
//! let render = |step: &Step, frame: &Frame| println!("{} {:?}", step.kind(), frame.comparing);
//! let audio = |tone: Tone| play_somewhere(tone.frequency);
//! ```

use std::io::Write;

use crate::audio::Tone;
use crate::step::{Frame, Step};

/// Receives one frame per emitted step.
pub trait RenderSink {
    /// Draw the frame produced by `step`.
    fn render(&mut self, step: &Step, frame: &Frame);

    /// Redraw after a change outside a run (reset, resize, stop).
    fn refresh(&mut self, _frame: &Frame) {}

    /// Show a blocking notification to the user.
    fn alert(&mut self, _message: &str) {}
}

/// Plays tone cues.
pub trait AudioSink {
    fn play(&mut self, tone: Tone);
}

impl<F> RenderSink for F
where
    F: FnMut(&Step, &Frame),
{
    fn render(&mut self, step: &Step, frame: &Frame) {
        self(step, frame)
    }
}

impl<F> AudioSink for F
where
    F: FnMut(Tone),
{
    fn play(&mut self, tone: Tone) {
        self(tone)
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _step: &Step, _frame: &Frame) {}
}

impl AudioSink for NullSink {
    fn play(&mut self, _tone: Tone) {}
}

/// Audio sink that only logs tones at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneLog;

impl AudioSink for ToneLog {
    fn play(&mut self, tone: Tone) {
        tracing::trace!(frequency = tone.frequency, "tone");
    }
}

/// Audio sink writing each tone as raw mono `f32` little-endian PCM.
///
/// Tones are written back to back, so the output plays as one stream
/// (`aplay -f FLOAT_LE -r <rate> -c 1`).
pub struct PcmSink<W: Write> {
    out: W,
    sample_rate: u32,
}

impl<W: Write> PcmSink<W> {
    pub fn new(out: W, sample_rate: u32) -> Self {
        Self { out, sample_rate }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for PcmSink<W> {
    fn play(&mut self, tone: Tone) {
        let bytes: Vec<u8> = tone
            .samples(self.sample_rate)
            .into_iter()
            .flat_map(f32::to_le_bytes)
            .collect();
        if let Err(err) = self.out.write_all(&bytes) {
            tracing::warn!(error = %err, "failed to write tone samples");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;

    #[test]
    fn closures_are_sinks() {
        let mut kinds = Vec::new();
        {
            let mut render = |step: &Step, _frame: &Frame| kinds.push(step.kind());
            let frame = Frame::new(Sequence::ascending(3));
            render.render(&Step::Done, &frame);
            render.refresh(&frame);
        }
        assert_eq!(kinds, vec!["done"]);

        let mut heard = Vec::new();
        let mut audio = |tone: Tone| heard.push(tone.frequency);
        audio.play(Tone::new(440.0));
        assert_eq!(heard, vec![440.0]);
    }

    #[test]
    fn pcm_sink_appends_rendered_tones() {
        let mut sink = PcmSink::new(Vec::new(), 8_000);
        sink.play(Tone::new(440.0));
        sink.play(Tone::new(880.0));

        let bytes = sink.into_inner();
        assert_eq!(bytes.len(), 2 * 800 * 4);
        let first = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(first, 0.0);
    }
}
