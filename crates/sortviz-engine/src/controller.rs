//! Playback controller: one paced run at a time, stoppable from anywhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::algorithms::{Algorithm, Outcome};
use crate::cancel::CancelToken;
use crate::celebration::celebrate;
use crate::config::Config;
use crate::emitter::{Pacer, Recorder, RunStats};
use crate::error::{Error, Result};
use crate::sequence::Sequence;
use crate::sink::{AudioSink, NullSink, RenderSink};
use crate::step::Frame;
use crate::store::{ConfigStore, MemoryStore};
use crate::timeline::Timeline;

/// Run flags shared between a controller and its handles.
#[derive(Debug, Default)]
struct RunState {
    running: AtomicBool,
    cancel: CancelToken,
}

impl RunState {
    fn begin(&self) {
        self.cancel.reset();
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.cancel.cancel();
        self.running.store(false, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Marks the run finished when dropped, so an abandoned `start` future
/// does not leave the controller stuck running.
struct RunGuard(Arc<RunState>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Most steps [`PlaybackController::record`] keeps in memory.
pub const MAX_RECORDED_STEPS: usize = 50_000;

/// Cloneable remote control for a [`PlaybackController`].
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    state: Arc<RunState>,
}

impl ControllerHandle {
    /// Request the current run to stop. Idempotent.
    pub fn stop(&self) {
        self.state.stop();
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.state.cancel.is_cancelled()
    }
}

/// How a call to [`PlaybackController::start`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Sorted and celebrated
    Completed,
    /// Stopped before finishing
    Cancelled,
    /// Another run was already in progress
    Rejected,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub algorithm: Algorithm,
    pub size: usize,
    pub stats: RunStats,
    pub elapsed: Duration,
}

/// Drives algorithm runs against the render and audio sinks.
pub struct PlaybackController {
    config: Config,
    sequence: Sequence,
    /// Whether `sequence` is a fresh shuffle no run has consumed yet.
    fresh: bool,
    frame: Frame,
    state: Arc<RunState>,
    rng: StdRng,
    render: Box<dyn RenderSink>,
    audio: Box<dyn AudioSink>,
    store: Box<dyn ConfigStore>,
}

impl PlaybackController {
    /// Create a controller whose config is loaded from `store`.
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        let config = Config::load(store.as_ref());
        let mut rng = StdRng::from_entropy();
        let sequence = Sequence::shuffled(config.size, &mut rng);
        debug!(?config, "controller created");

        Self {
            config,
            frame: Frame::new(sequence.clone()),
            sequence,
            fresh: true,
            state: Arc::new(RunState::default()),
            rng,
            render: Box::new(NullSink),
            audio: Box::new(NullSink),
            store,
        }
    }

    /// Controller over an in-memory store with default settings.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Use a fixed random source (shuffles, bogo picks) and reshuffle.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.regenerate();
        self
    }

    pub fn with_render_sink(mut self, render: impl RenderSink + 'static) -> Self {
        self.render = Box::new(render);
        self
    }

    pub fn with_audio_sink(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    /// A handle that can stop runs from other tasks.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            state: self.state.clone(),
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Run `config` to completion or cancellation.
    ///
    /// A no-op returning [`RunOutcome::Rejected`] if a run is in progress.
    /// Bogo sort exhausting its budget force-stops the controller, alerts the
    /// render sink and returns [`Error::RunTooLong`](crate::Error::RunTooLong).
    pub async fn start(&mut self, config: Config) -> Result<RunReport> {
        let config = config.clamped();
        if self.is_running() {
            debug!("start ignored: already running");
            return Ok(self.report(RunOutcome::Rejected, RunStats::default(), Duration::ZERO));
        }

        self.apply(config);
        self.state.begin();
        let _running = RunGuard(Arc::clone(&self.state));
        self.frame.clear_highlights();
        if !self.fresh {
            self.regenerate();
        }
        self.fresh = false;

        let algorithm = self.config.algorithm;
        info!(%algorithm, size = self.config.size, speed = self.config.speed, "run started");
        let started = Instant::now();

        let mut values = self.sequence.to_vec();
        let mut pacer = Pacer::new(
            self.state.cancel.clone(),
            self.config.timing(),
            Frame::new(self.sequence.clone()),
            self.render.as_mut(),
            self.audio.as_mut(),
        );

        let result = match algorithm.run(&mut values, &mut pacer, &mut self.rng).await {
            Ok(Outcome::Completed) => Ok(celebrate(values.len(), &mut pacer).await),
            other => other,
        };
        let (frame, stats) = pacer.finish();
        self.sequence = Sequence::from_values(values);
        self.frame = frame;
        let elapsed = started.elapsed();

        match result {
            Ok(Outcome::Completed) => {
                info!(%algorithm, steps = stats.steps, ?elapsed, "run completed");
                Ok(self.report(RunOutcome::Completed, stats, elapsed))
            }
            Ok(Outcome::Cancelled) => {
                self.stop();
                info!(%algorithm, steps = stats.steps, "run cancelled");
                Ok(self.report(RunOutcome::Cancelled, stats, elapsed))
            }
            Err(err) => {
                warn!(%algorithm, error = %err, "run aborted");
                self.stop();
                self.render.alert(&err.user_message());
                Err(err)
            }
        }
    }

    /// Stop the current run and clear highlights. Idempotent.
    pub fn stop(&mut self) {
        self.state.stop();
        self.frame.clear_highlights();
        self.render.refresh(&self.frame);
    }

    /// Reshuffle the bars at the current size. Rejected while running.
    pub fn reset(&mut self) -> bool {
        if self.is_running() {
            debug!("reset ignored: running");
            return false;
        }
        self.regenerate();
        true
    }

    /// Change the size (clamped) and reshuffle. Rejected while running.
    pub fn set_size(&mut self, size: usize) -> bool {
        self.configure(self.config.with_size(size))
    }

    /// Change the speed (clamped). Rejected while running.
    pub fn set_speed(&mut self, speed: u32) -> bool {
        self.configure(self.config.with_speed(speed))
    }

    /// Change the algorithm. Rejected while running.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> bool {
        self.configure(self.config.with_algorithm(algorithm))
    }

    /// Replace the whole config. Rejected while running.
    pub fn configure(&mut self, config: Config) -> bool {
        if self.is_running() {
            debug!("config change ignored: running");
            return false;
        }
        self.apply(config);
        true
    }

    /// Run `config` through a [`Recorder`] and return the scrubbable result.
    ///
    /// Starts from the live bars if no run has consumed them and the size
    /// matches, otherwise from a new shuffle. Neither the bars, the stored
    /// config nor the sinks are touched. Fails with
    /// [`Error::RecordingTooLong`] past [`MAX_RECORDED_STEPS`].
    pub async fn record(&mut self, config: Config) -> Result<Timeline> {
        let config = config.clamped();
        let initial = if self.fresh && config.size == self.config.size {
            self.sequence.clone()
        } else {
            Sequence::shuffled(config.size, &mut self.rng)
        };
        let algorithm = config.algorithm;

        let mut values = initial.to_vec();
        let mut recorder = Recorder::new().with_limit(MAX_RECORDED_STEPS);
        if algorithm.run(&mut values, &mut recorder, &mut self.rng).await? == Outcome::Completed {
            celebrate(values.len(), &mut recorder).await;
        }
        if recorder.overflowed() {
            warn!(%algorithm, size = config.size, "recording cut off");
            return Err(Error::RecordingTooLong {
                limit: MAX_RECORDED_STEPS,
            });
        }
        debug!(%algorithm, steps = recorder.steps().len(), "run recorded");
        Ok(Timeline::new(algorithm, initial, recorder.into_steps()))
    }

    fn apply(&mut self, config: Config) {
        let config = config.clamped();
        if config == self.config {
            return;
        }
        let resized = config.size != self.config.size;
        self.config = config;
        if let Err(err) = self.config.save(self.store.as_mut()) {
            warn!(error = %err, "failed to persist config");
        }
        if resized {
            self.regenerate();
        }
        debug!(?config, "config applied");
    }

    fn regenerate(&mut self) {
        self.sequence = Sequence::shuffled(self.config.size, &mut self.rng);
        self.fresh = true;
        self.frame = Frame::new(self.sequence.clone());
        self.render.refresh(&self.frame);
    }

    fn report(&self, outcome: RunOutcome, stats: RunStats, elapsed: Duration) -> RunReport {
        RunReport {
            outcome,
            algorithm: self.config.algorithm,
            size: self.config.size,
            stats,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl ConfigStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.borrow_mut().set(key, value)
        }
    }

    #[derive(Clone, Default)]
    struct Screen {
        steps: Rc<RefCell<Vec<Step>>>,
        refreshes: Rc<RefCell<usize>>,
        alerts: Rc<RefCell<Vec<String>>>,
    }

    impl RenderSink for Screen {
        fn render(&mut self, step: &Step, _frame: &Frame) {
            self.steps.borrow_mut().push(step.clone());
        }

        fn refresh(&mut self, _frame: &Frame) {
            *self.refreshes.borrow_mut() += 1;
        }

        fn alert(&mut self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_sorts_and_celebrates() {
        let screen = Screen::default();
        let mut controller = PlaybackController::in_memory()
            .with_seed(1)
            .with_render_sink(screen.clone());

        let config = Config::default().with_size(10).with_speed(50);
        let report = controller.start(config).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(controller.sequence(), &Sequence::ascending(10));
        assert_eq!(controller.frame().sorted, (0..10).collect::<Vec<_>>());
        assert!(!controller.is_running());
        assert_eq!(report.stats.compares, 45);

        let steps = screen.steps.borrow();
        assert_eq!(steps.last(), Some(&Step::Sorted { len: 10 }));
        assert_eq!(steps.iter().filter(|s| **s == Step::Done).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_stops_a_run_in_flight() {
        let screen = Screen::default();
        let mut controller = PlaybackController::in_memory()
            .with_seed(2)
            .with_render_sink(screen.clone());
        let handle = controller.handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            handle.stop();
        });

        let config = Config::default().with_size(30).with_speed(10);
        let report = controller.start(config).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert!(controller.sequence().is_permutation());
        assert!(controller.frame().comparing.is_empty());
        assert!(!screen.steps.borrow().contains(&Step::Done));
        // Each comparison waits 100ms, so the stop lands during the third.
        assert_eq!(report.stats.compares, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut controller = PlaybackController::in_memory();
        controller.stop();
        controller.stop();
        assert!(!controller.is_running());
        assert!(controller.handle().is_cancel_requested());

        // A new run clears the stale request.
        let report = controller.start(Config::default().with_size(5).with_speed(50)).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
    }

    #[test]
    fn config_changes_persist_and_clamp() {
        let store = SharedStore::default();
        let mut controller = PlaybackController::new(Box::new(store.clone()));

        assert!(controller.set_size(500));
        assert!(controller.set_speed(0));
        assert!(controller.set_algorithm(Algorithm::Quick));

        assert_eq!(controller.sequence().len(), 150);
        assert_eq!(store.get("array_size").as_deref(), Some("150"));
        assert_eq!(store.get("speed").as_deref(), Some("1"));
        assert_eq!(store.get("algorithm").as_deref(), Some("quick"));

        let reloaded = PlaybackController::new(Box::new(store));
        assert_eq!(reloaded.config(), controller.config());
    }

    #[test]
    fn reset_reshuffles_and_redraws() {
        let screen = Screen::default();
        let mut controller = PlaybackController::in_memory()
            .with_seed(3)
            .with_render_sink(screen.clone());
        let before = controller.sequence().clone();

        assert!(controller.reset());
        assert_ne!(controller.sequence(), &before);
        assert!(controller.sequence().is_permutation());
        assert_eq!(*screen.refreshes.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_start_does_not_stay_running() {
        let mut controller = PlaybackController::in_memory().with_seed(6);
        let config = Config::default().with_size(30).with_speed(10);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(150), controller.start(config)).await;
        assert!(timed_out.is_err());
        assert!(!controller.is_running());
        assert!(controller.reset());

        let report = controller.start(config.with_size(5).with_speed(50)).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
    }

    #[test]
    fn record_leaves_config_and_bars_alone() {
        let store = SharedStore::default();
        let mut controller = PlaybackController::new(Box::new(store.clone())).with_seed(8);
        let before = controller.sequence().clone();

        let config = Config::default().with_size(12).with_algorithm(Algorithm::Quick);
        let timeline = tokio_test::block_on(controller.record(config)).unwrap();

        assert_eq!(timeline.initial().len(), 12);
        assert_eq!(controller.sequence(), &before);
        assert_eq!(controller.config(), Config::default());
        assert!(store.get("array_size").is_none());
    }

    #[test]
    fn record_refuses_unbounded_runs() {
        let mut controller = PlaybackController::in_memory().with_seed(9);
        let config = Config::default().with_size(150).with_algorithm(Algorithm::Bogo);

        let err = tokio_test::block_on(controller.record(config)).unwrap_err();
        assert!(matches!(err, Error::RecordingTooLong { limit: MAX_RECORDED_STEPS }));
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_starts_from_fresh_bars() {
        let mut controller = PlaybackController::in_memory().with_seed(4);
        let config = Config::default().with_size(20).with_speed(50);

        controller.start(config).await.unwrap();
        assert!(controller.sequence().is_sorted());

        let report = controller.start(config).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(report.stats.swaps > 0);
    }
}
