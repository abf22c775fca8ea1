// PY_SOURCE: src/delta_debugging/debugger.py:Debugger

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{Algorithm, Cache, Configuration, Input, Oracle, Outcome, Result, Tester};

/// Element type of a reducible input. Byte inputs expose their bytes so
/// structure-aware algorithms can parse them. Other types need no more than
/// an empty `impl Element for MyType {}`.
pub trait Element: Clone {
    fn as_bytes(input: &[Self]) -> Option<&[u8]> {
        let _ = input;
        None
    }
}

impl Element for u8 {
    fn as_bytes(input: &[u8]) -> Option<&[u8]> {
        Some(input)
    }
}

macro_rules! opaque_elements {
    ($($ty:ty),* $(,)?) => {
        $(impl Element for $ty {})*
    };
}

opaque_elements!(
    i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
    std::path::PathBuf, std::ffi::OsString,
);

impl<T: ?Sized> Element for &T {}
impl<T: ?Sized> Element for std::rc::Rc<T> {}
impl<T: ?Sized> Element for std::sync::Arc<T> {}
impl<T: Clone> Element for Box<T> {}
impl<T: Clone> Element for Vec<T> {}
impl<T: Clone> Element for Option<T> {}
impl<T: Clone, const N: usize> Element for [T; N] {}
impl<A: Clone, B: Clone> Element for (A, B) {}
impl<A: Clone, B: Clone, C: Clone> Element for (A, B, C) {}

/// One algorithm, one oracle, and an optional cache, plus the bookkeeping
/// of the last run.
pub struct Debugger<T> {
    algorithm: Box<dyn Algorithm>,
    oracle: Box<dyn Oracle<T>>,
    cache: Option<Box<dyn Cache>>,
    show_progress: bool,
    counters: BTreeMap<Outcome, usize>,
    elapsed: Duration,
    input_len: usize,
    result: Option<Configuration>,
}

impl<T: Element> Debugger<T> {
    pub fn new(algorithm: Box<dyn Algorithm>, oracle: Box<dyn Oracle<T>>) -> Self {
        Self {
            algorithm,
            oracle,
            cache: None,
            show_progress: false,
            counters: BTreeMap::new(),
            elapsed: Duration::ZERO,
            input_len: 0,
            result: None,
        }
    }

    pub fn with_cache(mut self, cache: Option<Box<dyn Cache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    pub fn cache(&self) -> Option<&dyn Cache> {
        self.cache.as_deref()
    }

    /// Oracle calls of the last run, per outcome. Cache hits are not counted.
    pub fn counters(&self) -> &BTreeMap<Outcome, usize> {
        &self.counters
    }

    pub fn count(&self) -> usize {
        self.counters.values().sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn result(&self) -> Option<&Configuration> {
        self.result.as_ref()
    }

    /// Whether the unreduced input reproduces the failure.
    pub fn validate(&mut self, input: &[T]) -> Result<bool> {
        let outcome = self.oracle.test(&Configuration::full(input.len()), input)?;
        debug!(algorithm = %self.algorithm, %outcome, "validated input");
        Ok(outcome == Outcome::Fail)
    }

    pub fn debug(&mut self, input: &[T]) -> Result<Configuration> {
        self.counters.clear();
        self.input_len = input.len();
        self.result = None;

        let view = match T::as_bytes(input) {
            Some(bytes) => Input::bytes(bytes),
            None => Input::opaque(input.len()),
        };
        let progress = self.show_progress.then(|| spinner(self.algorithm.as_ref()));
        let started = Instant::now();

        let oracle = &mut self.oracle;
        let counters = &mut self.counters;
        let mut test_fn = |config: &Configuration| -> Result<Outcome> {
            let outcome = oracle.test(config, input)?;
            *counters.entry(outcome).or_default() += 1;
            if let Some(bar) = &progress {
                bar.inc(1);
                bar.set_message(tally(counters));
            }
            Ok(outcome)
        };
        let cache: Option<&mut dyn Cache> = match &mut self.cache {
            Some(cache) => Some(cache.as_mut()),
            None => None,
        };
        let result = {
            let mut tester = Tester::new(&mut test_fn, cache);
            self.algorithm.run(view, &mut tester)
        };

        self.elapsed = started.elapsed();
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        let config = result?;
        info!(
            algorithm = %self.algorithm,
            input = self.input_len,
            output = config.len(),
            tests = self.count(),
            seconds = self.elapsed.as_secs_f64(),
            "reduction finished"
        );
        self.result = Some(config.clone());
        Ok(config)
    }

    pub fn reduction_ratio(&self) -> f64 {
        let output = self.result.as_ref().map_or(self.input_len, Configuration::len);
        if self.input_len == 0 {
            1.0
        } else {
            (self.input_len - output) as f64 / self.input_len as f64
        }
    }

    pub fn summary(&self) -> String {
        let output = self.result.as_ref().map_or(self.input_len, Configuration::len);
        format!(
            "Delta debugging using {}\nReduced input length from {} to {}\nReduced ratio: {:.2}%\nTotal time: {:.2} seconds",
            self.algorithm,
            self.input_len,
            output,
            self.reduction_ratio() * 100.0,
            self.elapsed.as_secs_f64()
        )
    }
}

impl<T: Element> fmt::Display for Debugger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn spinner(algorithm: &dyn Algorithm) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {prefix} [{elapsed_precise}] {pos} tests {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_prefix(format!("Delta debugging using {algorithm}"));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn tally(counters: &BTreeMap<Outcome, usize>) -> String {
    counters
        .iter()
        .map(|(outcome, n)| format!("{outcome}={n}"))
        .collect::<Vec<_>>()
        .join(" ")
}
