//! End-to-end runs of the engine through its public API.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sortviz_engine::{
    insertion_sort, Algorithm, CancelToken, Config, Error, Frame, NullSink, Outcome, Pacer,
    PlaybackController, Recorder, RenderSink, RunOutcome, Sequence, Step, Timing, Tone,
};
use tokio::time::Instant;

fn record(algorithm: Algorithm, values: &mut [u32], seed: u64, recorder: &mut Recorder) -> Outcome {
    let mut rng = StdRng::seed_from_u64(seed);
    tokio_test::block_on(algorithm.run(values, recorder, &mut rng)).unwrap()
}

#[test]
fn bubble_on_descending_ten() {
    let mut values = Sequence::descending(10).into_vec();
    let mut recorder = Recorder::new();
    let outcome = record(Algorithm::Bubble, &mut values, 0, &mut recorder);

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(recorder.compare_count(), 45);
    assert_eq!(values, (1..=10).collect::<Vec<u32>>());
}

#[tokio::test(start_paused = true)]
async fn insertion_on_sorted_eight_takes_seven_delays() {
    let timing = Timing::from_speed(10);
    let mut render = NullSink;
    let mut audio = NullSink;
    let mut pacer = Pacer::new(
        CancelToken::new(),
        timing,
        Frame::new(Sequence::ascending(8)),
        &mut render,
        &mut audio,
    );

    let mut values = Sequence::ascending(8).into_vec();
    let start = Instant::now();
    let outcome = insertion_sort(&mut values, &mut pacer).await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(start.elapsed(), timing.step_delay() * 7);
    let stats = pacer.stats();
    assert_eq!(stats.compares, 7);
    assert_eq!(stats.swaps, 0);
}

#[tokio::test(start_paused = true)]
async fn compare_tones_follow_bar_height() {
    let tones = Rc::new(RefCell::new(Vec::new()));
    let heard = tones.clone();
    let mut controller = PlaybackController::in_memory()
        .with_seed(8)
        .with_audio_sink(move |tone: Tone| heard.borrow_mut().push(tone));

    let config = Config::default().with_size(5).with_speed(50);
    controller.start(config).await.unwrap();

    let tones = tones.borrow();
    // 10 comparisons, then 5 celebration tones rising from 400 Hz.
    assert_eq!(tones.len(), 15);
    assert!(tones[..10].iter().all(|t| (360.0..=1000.0).contains(&t.frequency)));
    assert_eq!(tones[10].frequency, 400.0);
    assert!(tones[10..].windows(2).all(|w| w[0].frequency < w[1].frequency));
    assert!(tones.iter().all(|t| t.duration == Duration::from_millis(100)));
}

#[derive(Clone, Default)]
struct Alerts(Rc<RefCell<Vec<String>>>);

impl RenderSink for Alerts {
    fn render(&mut self, _step: &Step, _frame: &Frame) {}

    fn alert(&mut self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

#[tokio::test(start_paused = true)]
async fn bogo_budget_exhaustion_alerts_and_stops() {
    let alerts = Alerts::default();
    let mut controller = PlaybackController::in_memory()
        .with_seed(12)
        .with_render_sink(alerts.clone());

    let config = Config::default()
        .with_size(12)
        .with_speed(50)
        .with_algorithm(Algorithm::Bogo);
    let err = controller.start(config).await.unwrap_err();

    assert!(matches!(err, Error::RunTooLong { attempts: 10_000 }));
    assert!(!controller.is_running());
    assert!(controller.handle().is_cancel_requested());
    assert!(controller.sequence().is_permutation());
    assert_eq!(alerts.0.borrow().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_celebration_skips_terminal_step() {
    let steps = Rc::new(RefCell::new(Vec::new()));
    let seen = steps.clone();
    let mut controller = PlaybackController::in_memory()
        .with_seed(6)
        .with_render_sink(move |step: &Step, _: &Frame| seen.borrow_mut().push(step.clone()));
    let handle = controller.handle();

    // Ten 20ms comparisons end at 200ms; the sweep then highlights every
    // 30ms, so 245ms falls while the second bar is lit.
    let config = Config::default().with_size(5).with_speed(50);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(245)).await;
        handle.stop();
    });

    let report = controller.start(config).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::Cancelled);

    let steps = steps.borrow();
    assert!(steps.contains(&Step::Done));
    let highlights = steps.iter().filter(|s| matches!(s, Step::Highlight { .. })).count();
    assert_eq!(highlights, 2);
    assert!(!steps.iter().any(|s| matches!(s, Step::Sorted { .. })));
    assert!(controller.sequence().is_sorted());
    assert!(controller.frame().sorted.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn completed_runs_end_ascending(size in 5usize..=150, seed in any::<u64>(), pick in 0usize..3) {
        let algorithm = [Algorithm::Bubble, Algorithm::Quick, Algorithm::Insertion][pick];
        let mut values = Sequence::shuffled(size, &mut StdRng::seed_from_u64(seed)).into_vec();
        let mut recorder = Recorder::new();

        let outcome = record(algorithm, &mut values, seed, &mut recorder);
        prop_assert_eq!(outcome, Outcome::Completed);
        prop_assert_eq!(values, Sequence::ascending(size).into_vec());
    }

    #[test]
    fn cancellation_keeps_a_permutation(
        size in 5usize..=150,
        seed in any::<u64>(),
        pick in 0usize..4,
        limit in 1usize..400,
    ) {
        let algorithm = Algorithm::ALL[pick];
        let mut values = Sequence::shuffled(size, &mut StdRng::seed_from_u64(seed)).into_vec();
        let mut recorder = Recorder::new().cancel_after(limit);

        let outcome = record(algorithm, &mut values, seed, &mut recorder);
        prop_assert!(sortviz_engine::is_permutation(&values));
        match outcome {
            Outcome::Cancelled => {
                prop_assert_eq!(recorder.steps().len(), limit);
                prop_assert!(!recorder.steps().contains(&Step::Done));
            }
            Outcome::Completed => {
                prop_assert!(sortviz_engine::is_sorted(&values));
                prop_assert!(recorder.steps().len() <= limit);
            }
        }
    }
}
