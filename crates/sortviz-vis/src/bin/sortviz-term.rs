//! Sortviz terminal runner
//!
//! Sort once, drawing the bars as text. Ctrl-C stops the run.
//! Set `SORTVIZ_PCM` to a path to also write the tones there as raw
//! 8 kHz `f32` PCM.

use sortviz_engine::{Algorithm, JsonFileStore, PcmSink, PlaybackController, RunOutcome, ToneLog};
use sortviz_vis::TermSink;
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PCM_SAMPLE_RATE: u32 = 8_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sortviz=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = env::var("SORTVIZ_CONFIG").unwrap_or_else(|_| "sortviz.json".to_string());
    let store = JsonFileStore::open(&config_path)?;

    let controller = PlaybackController::new(Box::new(store))
        .with_render_sink(TermSink::stdout(std::io::stdout().is_terminal()));
    let mut controller = match env::var("SORTVIZ_PCM") {
        Ok(path) => {
            let out = BufWriter::new(File::create(&path)?);
            tracing::info!(path = %path, "writing tones");
            controller.with_audio_sink(PcmSink::new(out, PCM_SAMPLE_RATE))
        }
        Err(_) => controller.with_audio_sink(ToneLog),
    };
    if let Some(seed) = env::var("SORTVIZ_SEED").ok().and_then(|s| s.parse().ok()) {
        controller = controller.with_seed(seed);
    }

    // Arguments override the stored settings
    let args: Vec<String> = env::args().collect();
    let mut config = controller.config();
    if let Some(arg) = args.get(1) {
        config = config.with_algorithm(arg.parse::<Algorithm>()?);
    }
    if let Some(size) = args.get(2).and_then(|s| s.parse().ok()) {
        config = config.with_size(size);
    }
    if let Some(speed) = args.get(3).and_then(|s| s.parse().ok()) {
        config = config.with_speed(speed);
    }

    let handle = controller.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.stop();
        }
    });

    eprintln!(
        "{} sort, {} bars, speed {}",
        config.algorithm.label(),
        config.size,
        config.speed
    );

    let report = controller.start(config).await?;
    match report.outcome {
        RunOutcome::Completed => println!(
            "sorted in {:.2?}: {} compares, {} swaps",
            report.elapsed, report.stats.compares, report.stats.swaps
        ),
        RunOutcome::Cancelled => println!("\nstopped after {} steps", report.stats.steps),
        RunOutcome::Rejected => {}
    }

    Ok(())
}
