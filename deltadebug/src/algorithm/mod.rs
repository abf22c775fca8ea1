// PY_SOURCE: src/delta_debugging/algorithm.py:Algorithm
// PY_SOURCE: src/delta_debugging/input.py:Input
//! Reduction strategies.
//!
//! An [`Algorithm`] only sees index space: it proposes configurations to a
//! [`Tester`] and keeps whatever still fails.

mod ddmin;
mod hdd;
mod probdd;
mod zipmin;

pub use ddmin::DdMin;
pub use hdd::Hdd;
pub use probdd::ProbDd;
pub use zipmin::ZipMin;

use std::fmt;

use tracing::{debug, error};

use crate::{Cache, Configuration, Outcome, Result};

/// What an algorithm reduces: a length, plus the raw bytes when the input is
/// a byte string (structure-aware algorithms need them).
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    len: usize,
    bytes: Option<&'a [u8]>,
}

impl<'a> Input<'a> {
    pub fn opaque(len: usize) -> Self {
        Self { len, bytes: None }
    }

    pub fn bytes(bytes: &'a [u8]) -> Self {
        Self {
            len: bytes.len(),
            bytes: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        self.bytes
    }

    pub fn full(&self) -> Configuration {
        Configuration::full(self.len)
    }
}

type TestFn<'a> = dyn FnMut(&Configuration) -> Result<Outcome> + 'a;

/// Couples the oracle with an optional cache. Algorithms call [`Tester::test`]
/// for every candidate they want judged.
pub struct Tester<'a> {
    test_fn: &'a mut TestFn<'a>,
    cache: Option<&'a mut dyn Cache>,
}

impl<'a> Tester<'a> {
    pub fn new(test_fn: &'a mut TestFn<'a>, cache: Option<&'a mut dyn Cache>) -> Self {
        Self { test_fn, cache }
    }

    pub fn test(&mut self, config: &Configuration) -> Result<Outcome> {
        if let Some(outcome) = self.cache.as_deref().and_then(|cache| cache.get(config)) {
            debug!(%config, %outcome, "cached");
            return Ok(outcome);
        }
        let outcome = (self.test_fn)(config).map_err(|err| {
            error!(%config, %err, "oracle evaluation failed");
            err
        })?;
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.insert(config, outcome);
        }
        Ok(outcome)
    }
}

pub trait Algorithm: fmt::Display + Send + Sync {
    /// Reduces `input`, returning a configuration the tester judged failing
    /// (or the full input when nothing smaller fails).
    fn run(&self, input: Input<'_>, tester: &mut Tester<'_>) -> Result<Configuration>;
}

/// Tries to drop each `length`-sized fragment of `config` in turn, keeping
/// `post` fixed. A fragment stays out when the remainder still fails.
/// Returns the surviving configuration and how many fragments had to stay.
pub(crate) fn remove_fragments(
    tester: &mut Tester<'_>,
    config: &Configuration,
    post: &Configuration,
    length: usize,
) -> Result<(Configuration, usize)> {
    let mut kept = Configuration::empty();
    let mut kept_fragments = 0;
    let mut start = 0;
    while start < config.len() {
        let end = start + length;
        let removed = config.slice(start..end);
        let remaining = config.slice(end..config.len());
        let candidate = Configuration::concat([&kept, &remaining, post]);
        let outcome = tester.test(&candidate)?;
        debug!(%candidate, %outcome, "fragment removal");
        if outcome != Outcome::Fail {
            kept = kept.union(&removed);
            kept_fragments += 1;
        }
        start = end;
    }
    Ok((kept, kept_fragments))
}
