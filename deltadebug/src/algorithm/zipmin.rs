// PY_SOURCE: src/delta_debugging/algorithms/zipmin.py:ZipMin

use std::fmt;

use tracing::debug;

use super::{remove_fragments, Algorithm, Input, Tester};
use crate::{Configuration, Outcome, Result};

/// ddmin interleaved with tail trimming.
///
/// After a fragment round, the number of fragments that had to stay is the
/// deficit. The next round spends it on single-element removals from the end
/// of the working configuration. Tail elements that turn out to be needed
/// move to a frozen suffix that is always included but never retested.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipMin;

impl fmt::Display for ZipMin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Zipmin")
    }
}

impl ZipMin {
    fn remove_last(
        tester: &mut Tester<'_>,
        config: &Configuration,
        post: &Configuration,
    ) -> Result<(Configuration, Configuration)> {
        let shorter = config.truncate_back(1);
        let candidate = shorter.union(post);
        let outcome = tester.test(&candidate)?;
        debug!(%candidate, %outcome, "tail removal");
        if outcome == Outcome::Fail {
            return Ok((shorter, post.clone()));
        }
        let last = config.slice(config.len() - 1..config.len());
        Ok((shorter, last.union(post)))
    }
}

impl Algorithm for ZipMin {
    fn run(&self, input: Input<'_>, tester: &mut Tester<'_>) -> Result<Configuration> {
        debug!("starting ZipMin");
        let mut config = input.full();
        let mut post = Configuration::empty();
        let mut length = config.len() / 2;
        let mut deficit = 0;
        let mut round = 0usize;

        while length > 0 && !config.is_empty() {
            if round % 2 == 1 {
                for _ in 0..deficit {
                    if config.is_empty() {
                        break;
                    }
                    (config, post) = Self::remove_last(tester, &config, &post)?;
                }
                deficit = 0;
            } else {
                let (kept, kept_fragments) = remove_fragments(tester, &config, &post, length)?;
                if kept == config {
                    length /= 2;
                }
                config = kept;
                deficit = kept_fragments;
            }
            round += 1;
        }

        let config = config.union(&post);
        debug!(%config, "ZipMin finished");
        Ok(config)
    }
}
