// PY_SOURCE: src/delta_debugging/cache.py:Cache
//! Memoisation of oracle outcomes keyed by configuration.

mod hash;
mod tree;

pub use hash::HashCache;
pub use tree::TreeCache;

use std::fmt;

use crate::{Configuration, Outcome};

pub trait Cache: fmt::Display + Send {
    fn get(&self, config: &Configuration) -> Option<Outcome>;

    fn insert(&mut self, config: &Configuration, outcome: Outcome);

    fn remove(&mut self, config: &Configuration) -> Option<Outcome>;

    /// Number of stored outcomes.
    fn len(&self) -> usize;

    fn clear(&mut self);

    /// Every stored entry, in no particular order.
    fn configurations(&self) -> Vec<(Configuration, Outcome)>;

    fn contains(&self, config: &Configuration) -> bool {
        self.get(config).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dump(&self) -> String {
        let mut entries = self.configurations();
        entries.sort();
        let mut out = format!("{self} contents:");
        for (config, outcome) in entries {
            out.push_str(&format!("\n{config}: {outcome}"));
        }
        out
    }
}
