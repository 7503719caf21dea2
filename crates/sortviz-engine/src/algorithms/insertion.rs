use crate::emitter::{Cancelled, StepEmitter};
use crate::pacing::Pace;
use crate::step::Step;

use super::{finish, Outcome};

/// Insertion sort. Each key is marked with a single-index compare, then
/// walked left one adjacent swap at a time while its neighbour is larger.
pub async fn insertion_sort<E: StepEmitter>(values: &mut [u32], emitter: &mut E) -> Outcome {
    let body = insert_all(values, emitter).await;
    finish(body, emitter).await
}

async fn insert_all<E: StepEmitter>(values: &mut [u32], emitter: &mut E) -> Result<(), Cancelled> {
    for i in 1..values.len() {
        emitter.checkpoint()?;

        let key = values[i];
        emitter.emit(Step::mark(i, key), Pace::Step).await?;

        let mut j = i;
        while j > 0 && values[j - 1] > key {
            emitter.checkpoint()?;
            emitter.emit(Step::compare(j - 1, j, values[j - 1]), Pace::Step).await?;

            values.swap(j - 1, j);
            emitter.emit(Step::swap(j - 1, j, values), Pace::Immediate).await?;
            j -= 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Recorder;
    use crate::sequence::Sequence;

    #[test]
    fn sorted_input_marks_each_key_once() {
        let mut values = Sequence::ascending(8).into_vec();
        let mut recorder = Recorder::new();
        let outcome = tokio_test::block_on(insertion_sort(&mut values, &mut recorder));

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(recorder.compare_count(), 7);
        assert_eq!(recorder.swap_count(), 0);
        for (i, step) in recorder.steps()[..7].iter().enumerate() {
            assert_eq!(step, &Step::mark(i + 1, (i + 2) as u32));
        }
    }

    #[test]
    fn key_walks_left() {
        let mut values = vec![2, 3, 1];
        let mut recorder = Recorder::new();
        tokio_test::block_on(insertion_sort(&mut values, &mut recorder));

        assert_eq!(values, vec![1, 2, 3]);
        let swaps: Vec<_> = recorder.steps().iter().filter(|s| s.is_swap()).cloned().collect();
        assert_eq!(
            swaps,
            vec![Step::swap(1, 2, &[2, 1, 3]), Step::swap(0, 1, &[1, 2, 3])]
        );
    }

    #[test]
    fn cancel_mid_shift_keeps_permutation() {
        let mut values = Sequence::descending(6).into_vec();
        let mut recorder = Recorder::new().cancel_after(4);
        let outcome = tokio_test::block_on(insertion_sort(&mut values, &mut recorder));

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(crate::sequence::is_permutation(&values));
    }
}
