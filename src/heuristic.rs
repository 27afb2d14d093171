//! Spectrum heuristics over passage times and record times, and their shared
//! finite-difference helpers. \
//! The heuristics are UNSOUND: a positive result is a suspicion, not a proof. The harness
//! routes their machine ids to a separate `heuristically_decided` sink and they never take
//! part in certifying the undecided set.

pub mod heuristic_count_records;
pub mod heuristic_exponential;
pub mod heuristic_polynomial;
pub mod sampler;

use crate::config::StepTypeSmall;

/// Every `step`-th element of the list starting at `start`, widened for difference arithmetic.
pub fn sample_list(list: &[StepTypeSmall], start: usize, step: usize) -> Vec<i64> {
    list.iter()
        .skip(start)
        .step_by(step)
        .map(|&v| v as i64)
        .collect()
}

/// Iterated pairwise difference of the given order. Each iteration shortens the sequence by
/// one element; a short input yields an empty result.
pub fn discrete_difference(seq: &[i64], order: usize) -> Vec<i64> {
    let mut diff: Vec<i64> = seq.to_vec();
    for _ in 0..order {
        if diff.len() <= 1 {
            diff.clear();
            break;
        }
        diff = diff.windows(2).map(|w| w[1] - w[0]).collect();
    }

    diff
}

pub fn all_zero(seq: &[i64]) -> bool {
    seq.iter().all(|&v| v == 0)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn sample_list_takes_every_nth() {
        let list: Vec<StepTypeSmall> = vec![0, 1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(vec![0, 3, 6], sample_list(&list, 0, 3));
        assert_eq!(vec![1, 4, 7], sample_list(&list, 1, 3));
    }

    #[test]
    fn discrete_difference_of_quadratic_is_constant() {
        // n^2: first difference 2n+1, second difference 2, third difference 0
        let squares: Vec<i64> = (0..10).map(|n: i64| n * n).collect();
        assert_eq!(vec![2; 8], discrete_difference(&squares, 2));
        assert!(all_zero(&discrete_difference(&squares, 3)));
    }

    #[test]
    fn discrete_difference_of_short_sequence_is_empty() {
        assert!(discrete_difference(&[1, 2], 3).is_empty());
        assert!(discrete_difference(&[], 1).is_empty());
    }
}
