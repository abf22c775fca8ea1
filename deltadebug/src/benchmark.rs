// PY_SOURCE: src/delta_debugging/benchmark.py

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{AlgorithmSpec, CacheSpec, Debugger, Element, Oracle, Result, ResultSet, RunResult};

/// One input and the debuggers to run over it.
pub struct TestCase<T> {
    label: String,
    input: Vec<T>,
    debuggers: Vec<Debugger<T>>,
}

impl<T: Element> TestCase<T> {
    pub fn new(label: impl Into<String>, input: Vec<T>) -> Self {
        Self {
            label: label.into(),
            input,
            debuggers: Vec::new(),
        }
    }

    pub fn with_debugger(mut self, debugger: Debugger<T>) -> Self {
        self.debuggers.push(debugger);
        self
    }

    /// One debugger for every algorithm and cache combination. `oracle` is
    /// called once per debugger.
    pub fn product<F>(
        label: impl Into<String>,
        input: Vec<T>,
        algorithms: &[AlgorithmSpec],
        caches: &[CacheSpec],
        mut oracle: F,
    ) -> Result<Self>
    where
        F: FnMut() -> Result<Box<dyn Oracle<T>>>,
    {
        let mut case = Self::new(label, input);
        for algorithm in algorithms {
            for cache in caches {
                let debugger = Debugger::new(algorithm.build(), oracle()?).with_cache(cache.build());
                case.debuggers.push(debugger);
            }
        }
        Ok(case)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &[T] {
        &self.input
    }

    pub fn debuggers(&self) -> &[Debugger<T>] {
        &self.debuggers
    }

    pub fn validate(&mut self) -> Result<Vec<bool>> {
        let input = &self.input;
        self.debuggers.iter_mut().map(|d| d.validate(input)).collect()
    }

    fn run_one(&mut self, index: usize) -> Result<RunResult> {
        let debugger = &mut self.debuggers[index];
        debug!(case = %self.label, algorithm = %debugger.algorithm(), "running debugger");
        let config = debugger.debug(&self.input)?;
        Ok(RunResult {
            file: self.label.clone(),
            algorithm: debugger.algorithm().to_string(),
            cache: debugger
                .cache()
                .map_or_else(|| "None".to_string(), |c| c.to_string()),
            input_size: self.input.len(),
            output_size: config.len(),
            count: debugger.count(),
            time: debugger.elapsed().as_secs_f64(),
        })
    }

    pub fn run(&mut self) -> Result<Vec<RunResult>> {
        (0..self.debuggers.len()).map(|i| self.run_one(i)).collect()
    }
}

/// Runs every debugger of every test case, optionally persisting results
/// after each run.
pub struct Benchmark<T> {
    cases: Vec<TestCase<T>>,
    file: Option<PathBuf>,
    results: ResultSet,
    show_progress: bool,
}

impl<T: Element> Benchmark<T> {
    pub fn new(cases: Vec<TestCase<T>>) -> Self {
        Self {
            cases,
            file: None,
            results: ResultSet::new(),
            show_progress: false,
        }
    }

    pub fn with_results_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn cases(&self) -> &[TestCase<T>] {
        &self.cases
    }

    pub fn results_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn total(&self) -> usize {
        self.cases.iter().map(|c| c.debuggers.len()).sum()
    }

    fn progress(&self, message: &'static str, unit: &'static str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let bar = ProgressBar::new(self.total() as u64);
        let template = format!("{{msg}} [{{bar:40}}] {{pos}}/{{len}} {unit} ({{eta}})");
        let style =
            ProgressStyle::with_template(&template).unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(message);
        Some(bar)
    }

    /// One entry per debugger, in case order: whether its oracle sees the
    /// failure on the unreduced input.
    pub fn validate(&mut self) -> Result<Vec<bool>> {
        let bar = self.progress("Validating", "test cases");
        let mut verdicts = Vec::with_capacity(self.total());
        for case in &mut self.cases {
            let input = &case.input;
            for debugger in &mut case.debuggers {
                let ok = debugger.validate(input)?;
                if !ok {
                    info!(case = %case.label, algorithm = %debugger.algorithm(), "input does not reproduce");
                }
                verdicts.push(ok);
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        Ok(verdicts)
    }

    pub fn run(&mut self) -> Result<&ResultSet> {
        let bar = self.progress("Benchmarking", "runs");
        for c in 0..self.cases.len() {
            for d in 0..self.cases[c].debuggers.len() {
                let result = self.cases[c].run_one(d)?;
                self.results.push(result);
                for line in self.results.table(true).lines() {
                    info!("{line}");
                }
                if let Some(file) = &self.file {
                    self.results.store(file)?;
                }
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        Ok(&self.results)
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn table(&self) -> String {
        self.results.table(true)
    }
}
