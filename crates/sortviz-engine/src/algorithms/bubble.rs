use crate::emitter::{Cancelled, StepEmitter};
use crate::pacing::Pace;
use crate::step::Step;

use super::{finish, Outcome};

/// Adjacent-exchange sort: `n(n-1)/2` comparisons regardless of input.
pub async fn bubble_sort<E: StepEmitter>(values: &mut [u32], emitter: &mut E) -> Outcome {
    let body = passes(values, emitter).await;
    finish(body, emitter).await
}

async fn passes<E: StepEmitter>(values: &mut [u32], emitter: &mut E) -> Result<(), Cancelled> {
    let n = values.len();
    for i in 0..n {
        for j in 0..n - i - 1 {
            emitter.checkpoint()?;
            emitter.emit(Step::compare(j, j + 1, values[j]), Pace::Step).await?;

            if values[j] > values[j + 1] {
                values.swap(j, j + 1);
                emitter.emit(Step::swap(j, j + 1, values), Pace::Immediate).await?;
            }
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
    fn descending_ten_takes_45_compares_and_swaps() {
        let mut values = Sequence::descending(10).into_vec();
        let mut recorder = Recorder::new();
        let outcome = tokio_test::block_on(bubble_sort(&mut values, &mut recorder));

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(values, Sequence::ascending(10).into_vec());
        assert_eq!(recorder.compare_count(), 45);
        assert_eq!(recorder.swap_count(), 45);
    }

    #[test]
    fn first_compare_is_leading_pair() {
        let mut values = vec![3, 1, 2];
        let mut recorder = Recorder::new();
        tokio_test::block_on(bubble_sort(&mut values, &mut recorder));

        assert_eq!(recorder.steps()[0], Step::compare(0, 1, 3));
        assert_eq!(recorder.steps()[1], Step::swap(0, 1, &[1, 3, 2]));
    }

    #[test]
    fn empty_and_single_complete() {
        for mut values in [vec![], vec![1]] {
            let mut recorder = Recorder::new();
            let outcome = tokio_test::block_on(bubble_sort(&mut values, &mut recorder));
            assert_eq!(outcome, Outcome::Completed);
            assert_eq!(recorder.steps(), &[Step::Done]);
        }
    }
}
