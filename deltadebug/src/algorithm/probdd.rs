// PY_SOURCE: src/delta_debugging/algorithms/probdd.py:ProbDD

use std::fmt;

use tracing::debug;

use super::{Algorithm, Input, Tester};
use crate::{Configuration, Outcome, Result};

const INITIAL_PROBABILITY: f64 = 0.1;
const THRESHOLD: f64 = 0.8;

/// Probabilistic delta debugging.
///
/// Each element carries an estimate of how likely it is to be needed. Every
/// step deletes the run of least likely elements with the best expected
/// gain, then raises the estimates of what it deleted if the remainder
/// stopped failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProbDd;

impl fmt::Display for ProbDd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProbDD")
    }
}

fn converged(probabilities: &[(usize, f64)]) -> bool {
    probabilities.iter().all(|&(_, p)| p == 0.0 || p == 1.0)
        || probabilities.iter().all(|&(_, p)| p >= THRESHOLD)
}

// `probabilities` must be sorted ascending.
fn sample(probabilities: &[(usize, f64)]) -> Configuration {
    let mut best = 0.0;
    let mut skipped = 0;
    let mut end = 0;
    while end < probabilities.len() {
        let p = probabilities[end].1;
        if p == 0.0 {
            end += 1;
            skipped += 1;
            continue;
        }
        if p >= 1.0 {
            break;
        }
        let survive: f64 = probabilities[skipped..=end]
            .iter()
            .map(|&(_, p)| 1.0 - p)
            .product();
        let gain = survive * (end - skipped + 1) as f64;
        if gain < best {
            break;
        }
        best = gain;
        end += 1;
    }
    probabilities[skipped..end].iter().map(|&(i, _)| i).collect()
}

fn ratio(deleted: &Configuration, probabilities: &[(usize, f64)]) -> f64 {
    let survive: f64 = probabilities
        .iter()
        .filter(|&&(i, p)| deleted.contains(i) && p > 0.0 && p < 1.0)
        .map(|&(_, p)| 1.0 - p)
        .product();
    1.0 / (1.0 - survive)
}

impl Algorithm for ProbDd {
    fn run(&self, input: Input<'_>, tester: &mut Tester<'_>) -> Result<Configuration> {
        debug!("starting ProbDD");
        let mut passed = input.full();
        let mut probabilities: Vec<(usize, f64)> =
            passed.iter().map(|i| (i, INITIAL_PROBABILITY)).collect();

        while !converged(&probabilities) {
            probabilities.sort_by(|a, b| a.1.total_cmp(&b.1));
            let deleted = sample(&probabilities);
            if deleted.is_empty() {
                break;
            }
            let candidate = passed.difference(&deleted);
            let outcome = tester.test(&candidate)?;
            debug!(%deleted, %candidate, %outcome, "sampled deletion");

            if outcome == Outcome::Fail {
                for (i, p) in probabilities.iter_mut() {
                    if !candidate.contains(*i) {
                        *p = 0.0;
                    }
                }
                passed = candidate;
                continue;
            }

            let scale = ratio(&deleted, &probabilities);
            let pin = deleted.len() == 1;
            for (i, p) in probabilities.iter_mut() {
                if !deleted.contains(*i) || *p == 0.0 || *p == 1.0 {
                    continue;
                }
                *p = if pin { 1.0 } else { (*p * scale).min(1.0) };
            }
        }

        debug!(config = %passed, "ProbDD finished");
        Ok(passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::reduce_with;

    #[test]
    fn finds_guard_and_failure_sets() {
        let (result, _) = reduce_with(&ProbDd, 20, |c| {
            if [3, 5, 7].iter().any(|&i| !c.contains(i)) {
                Outcome::Unresolved
            } else if [13, 15, 17].iter().all(|&i| c.contains(i)) {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        });
        assert_eq!(result.indices(), &[3, 5, 7, 13, 15, 17]);
    }

    #[test]
    fn first_sample_takes_the_best_prefix() {
        let probabilities: Vec<(usize, f64)> = (0..4).map(|i| (i, 0.5)).collect();
        // 1 * 0.5 == 2 * 0.25, and 3 * 0.125 is worse.
        assert_eq!(sample(&probabilities).indices(), &[0, 1]);
    }

    #[test]
    fn sample_skips_zeroes_and_stops_at_certainty() {
        let probabilities = vec![(4, 0.0), (2, 0.1), (0, 1.0), (1, 1.0)];
        assert_eq!(sample(&probabilities).indices(), &[2]);
    }

    #[test]
    fn empty_input_is_already_converged() {
        let (result, calls) = reduce_with(&ProbDd, 0, |_| Outcome::Fail);
        assert!(result.is_empty());
        assert_eq!(calls, 0);
    }
}
