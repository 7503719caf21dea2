//! Sortviz Engine
//!
//! Instrumented sorting algorithms with paced, cancellable step playback.
//!
//! # Architecture
//!
//! - **Algorithms**: bubble, quick, insertion and bogo sort, reporting every
//!   comparison and exchange as a [`Step`]
//! - **Emitters**: [`Pacer`] delivers steps live to render/audio sinks with a
//!   per-step delay; [`Recorder`] captures them instantly
//! - **Controller**: [`PlaybackController`] runs one algorithm at a time,
//!   celebrates a finished sort, and can be stopped through a [`ControllerHandle`]
//! - **Timeline**: scrub through a recorded run
//!
//! # Usage
//!
//! ```ignore
//! let mut controller = PlaybackController::new(Box::new(JsonFileStore::open("sortviz.json")?))
//!     .with_render_sink(|step: &Step, frame: &Frame| draw(frame))
//!     .with_audio_sink(|tone: Tone| beep(tone));
//!
//! let report = controller.start(controller.config()).await?;
//! ```

mod algorithms;
mod audio;
mod cancel;
mod celebration;
mod config;
mod controller;
mod emitter;
mod error;
mod pacing;
mod sequence;
mod sink;
mod step;
mod store;
mod timeline;

pub use algorithms::{
    bogo_sort, bubble_sort, insertion_sort, partition, quick_sort, Algorithm, Outcome, Partition,
    UnknownAlgorithm, MAX_SHUFFLES,
};
pub use audio::{Tone, TONE_DURATION};
pub use cancel::CancelToken;
pub use celebration::celebrate;
pub use config::{Config, MAX_SIZE, MAX_SPEED, MIN_SIZE, MIN_SPEED};
pub use controller::{
    ControllerHandle, PlaybackController, RunOutcome, RunReport, MAX_RECORDED_STEPS,
};
pub use emitter::{Cancelled, Pacer, Recorder, RunStats, StepEmitter};
pub use error::{Error, Result};
pub use pacing::{Pace, Timing, CELEBRATION_DELAY, MIN_STEP_DELAY, SHUFFLE_DIVISOR};
pub use sequence::{is_permutation, is_sorted, Sequence};
pub use sink::{AudioSink, NullSink, PcmSink, RenderSink, ToneLog};
pub use step::{Frame, Step};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
pub use timeline::{Timeline, TimelineState, TimelineStatus};
