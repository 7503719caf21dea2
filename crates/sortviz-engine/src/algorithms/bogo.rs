use rand::Rng;

use crate::emitter::{Cancelled, StepEmitter};
use crate::error::{Error, Result};
use crate::pacing::Pace;
use crate::sequence::is_sorted;
use crate::step::Step;

use super::{finish, Outcome};

/// Shuffle attempts allowed before bogo sort gives up.
pub const MAX_SHUFFLES: u32 = 10_000;

enum Halt {
    Cancelled,
    TooLong(u32),
}

impl From<Cancelled> for Halt {
    fn from(_: Cancelled) -> Self {
        Halt::Cancelled
    }
}

/// Shuffle until sorted.
///
/// Each Fisher–Yates exchange is shown as a compare at shuffle pacing plus a
/// swap. Fails with [`Error::RunTooLong`] after [`MAX_SHUFFLES`] shuffles
/// that left the slice unsorted.
pub async fn bogo_sort<E, R>(values: &mut [u32], emitter: &mut E, rng: &mut R) -> Result<Outcome>
where
    E: StepEmitter,
    R: Rng,
{
    match shuffle_until_sorted(values, emitter, rng).await {
        Ok(()) => Ok(finish(Ok(()), emitter).await),
        Err(Halt::Cancelled) => Ok(Outcome::Cancelled),
        Err(Halt::TooLong(attempts)) => Err(Error::RunTooLong { attempts }),
    }
}

async fn shuffle_until_sorted<E, R>(
    values: &mut [u32],
    emitter: &mut E,
    rng: &mut R,
) -> std::result::Result<(), Halt>
where
    E: StepEmitter,
    R: Rng,
{
    let mut attempts = 0u32;
    while !is_sorted(values) {
        emitter.checkpoint()?;

        shuffle(values, emitter, rng).await?;
        attempts += 1;

        if attempts >= MAX_SHUFFLES && !is_sorted(values) {
            return Err(Halt::TooLong(attempts));
        }
    }
    tracing::debug!(attempts, "bogo sort got lucky");
    Ok(())
}

async fn shuffle<E, R>(values: &mut [u32], emitter: &mut E, rng: &mut R) -> std::result::Result<(), Cancelled>
where
    E: StepEmitter,
    R: Rng,
{
    for i in (1..values.len()).rev() {
        emitter.checkpoint()?;

        let j = rng.gen_range(0..=i);
        emitter.emit(Step::compare(i, j, values[i]), Pace::Shuffle).await?;

        values.swap(i, j);
        emitter.emit(Step::swap(i, j, values), Pace::Immediate).await?;
    }
    Ok(())
}
