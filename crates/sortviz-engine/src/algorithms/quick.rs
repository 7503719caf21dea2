use crate::emitter::StepEmitter;
use crate::pacing::Pace;
use crate::step::Step;

use super::{finish, Outcome};

/// Result of partitioning one sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// The pivot settled at this index
    Pivot(usize),
    /// Cancellation was observed mid-partition
    Cancelled,
}

/// Lomuto partition of `values[low..=high]` around `values[high]`.
///
/// Every scanned element is compared against the pivot position; every
/// exchange, including the final pivot placement, is emitted as a swap.
pub async fn partition<E: StepEmitter>(
    values: &mut [u32],
    low: usize,
    high: usize,
    emitter: &mut E,
) -> Partition {
    let pivot = values[high];
    // First slot not yet known to hold an element smaller than the pivot.
    let mut store = low;

    for j in low..high {
        if emitter.is_cancelled() {
            return Partition::Cancelled;
        }
        if emitter.emit(Step::compare(j, high, values[j]), Pace::Step).await.is_err() {
            return Partition::Cancelled;
        }

        if values[j] < pivot {
            values.swap(store, j);
            if emitter.emit(Step::swap(store, j, values), Pace::Immediate).await.is_err() {
                return Partition::Cancelled;
            }
            store += 1;
        }
    }

    values.swap(store, high);
    if emitter.emit(Step::swap(store, high, values), Pace::Immediate).await.is_err() {
        return Partition::Cancelled;
    }
    Partition::Pivot(store)
}

/// Quick sort over Lomuto partitions.
///
/// Sub-ranges are visited depth-first, left before right, through an
/// explicit work stack.
pub async fn quick_sort<E: StepEmitter>(values: &mut [u32], emitter: &mut E) -> Outcome {
    let mut pending: Vec<(usize, usize)> = Vec::new();
    if values.len() > 1 {
        pending.push((0, values.len() - 1));
    }

    while let Some((low, high)) = pending.pop() {
        if emitter.is_cancelled() {
            return Outcome::Cancelled;
        }
        if low >= high {
            continue;
        }

        match partition(values, low, high, emitter).await {
            Partition::Cancelled => return Outcome::Cancelled,
            Partition::Pivot(pivot) => {
                if pivot + 1 < high {
                    pending.push((pivot + 1, high));
                }
                if pivot > low + 1 {
                    pending.push((low, pivot - 1));
                }
            }
        }
    }

    finish(Ok(()), emitter).await
}
