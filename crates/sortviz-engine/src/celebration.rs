//! Post-sort highlight sweep.

use crate::algorithms::Outcome;
use crate::emitter::{Cancelled, StepEmitter};
use crate::pacing::Pace;
use crate::step::Step;

/// Sweep `0..len` one highlighted bar at a time, then mark every bar sorted.
///
/// Runs at the fixed celebration pacing. A cancelled sweep emits no
/// terminal `Sorted` step.
pub async fn celebrate<E: StepEmitter>(len: usize, emitter: &mut E) -> Outcome {
    match sweep(len, emitter).await {
        Ok(()) => Outcome::Completed,
        Err(Cancelled) => Outcome::Cancelled,
    }
}

async fn sweep<E: StepEmitter>(len: usize, emitter: &mut E) -> Result<(), Cancelled> {
    for index in 0..len {
        emitter.checkpoint()?;
        emitter.emit(Step::Highlight { index }, Pace::Celebration).await?;
    }
    emitter.emit(Step::Sorted { len }, Pace::Immediate).await
}
