// PY_SOURCE: src/delta_debugging/algorithms/ddmin.py:DDMin

use std::fmt;

use tracing::debug;

use super::{remove_fragments, Algorithm, Input, Tester};
use crate::{Configuration, Result};

/// Classic ddmin restricted to complement tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct DdMin;

impl fmt::Display for DdMin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ddmin")
    }
}

impl Algorithm for DdMin {
    fn run(&self, input: Input<'_>, tester: &mut Tester<'_>) -> Result<Configuration> {
        debug!("starting ddmin");
        let mut config = input.full();
        let mut length = config.len() / 2;
        let post = Configuration::empty();

        while length > 0 && !config.is_empty() {
            let (kept, _) = remove_fragments(tester, &config, &post, length)?;
            if kept == config {
                length /= 2;
            }
            config = kept;
        }

        debug!(%config, "ddmin finished");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::reduce_with;
    use crate::Outcome;

    #[test]
    fn keeps_unresolved_guard_and_failure_pair() {
        let (result, _) = reduce_with(&DdMin, 10, |c| {
            if !c.contains(5) {
                Outcome::Unresolved
            } else if c.contains(3) && c.contains(7) {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        });
        assert_eq!(result.indices(), &[3, 5, 7]);
    }

    #[test]
    fn empty_input_never_calls_the_oracle() {
        let (result, calls) = reduce_with(&DdMin, 0, |_| Outcome::Fail);
        assert!(result.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn always_failing_oracle_reduces_to_one_element() {
        let (result, _) = reduce_with(&DdMin, 9, |c| {
            if c.is_empty() {
                Outcome::Pass
            } else {
                Outcome::Fail
            }
        });
        assert_eq!(result.len(), 1);
        assert_eq!(DdMin.to_string(), "ddmin");
    }
}
