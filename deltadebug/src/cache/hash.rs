// PY_SOURCE: src/delta_debugging/caches/hash.py:HashCache

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::Cache;
use crate::{Configuration, Outcome};

#[derive(Debug, Default, Clone)]
pub struct HashCache {
    entries: HashMap<Configuration, Outcome>,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for HashCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hash Cache")
    }
}

impl Cache for HashCache {
    fn get(&self, config: &Configuration) -> Option<Outcome> {
        debug!(%config, "cache lookup");
        self.entries.get(config).copied()
    }

    fn insert(&mut self, config: &Configuration, outcome: Outcome) {
        debug!(%config, %outcome, "cache insert");
        self.entries.insert(config.clone(), outcome);
    }

    fn remove(&mut self, config: &Configuration) -> Option<Outcome> {
        self.entries.remove(config)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        debug!("clearing cache");
        self.entries.clear();
    }

    fn configurations(&self) -> Vec<(Configuration, Outcome)> {
        self.entries.iter().map(|(c, o)| (c.clone(), *o)).collect()
    }
}
