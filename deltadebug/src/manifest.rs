// PY_SOURCE: examples/valgrind.py
// PY_SOURCE: examples/bug.py
//! Bug manifests: which file reproduces which failure, and how to check it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    AlgorithmSpec, CacheSpec, CommandSpec, Error, FileOracle, Oracle, OutputMatch, Result,
    TestCase,
};

/// First run cuts removed bytes out, second one zero-fills them.
pub const DEFAULT_REPLACEMENTS: [Option<u8>; 2] = [None, Some(0x00)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    /// Input to reduce; relative paths resolve against the manifest.
    pub file: PathBuf,
    /// Program and leading arguments; the candidate path is appended.
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

impl Bug {
    pub fn check(&self) -> OutputMatch {
        OutputMatch {
            stderr: self.stderr.clone(),
            stdout: self.stdout.clone(),
        }
    }

    pub fn command_spec(&self) -> Result<CommandSpec> {
        let timeout = self.timeout.map(Duration::try_from_secs_f64).transpose().map_err(|err| {
            Error::Manifest(format!("{}: bad timeout: {err}", self.file.display()))
        })?;
        Ok(CommandSpec::from_argv(&self.command)?.timeout(timeout))
    }

    pub fn oracle(&self, replace: Option<u8>) -> Result<FileOracle<OutputMatch>> {
        Ok(FileOracle::new(self.command_spec()?, self.check())?
            .executable(true)
            .replace(replace))
    }

    fn validate(&self) -> Result<()> {
        if self.command.is_empty() {
            return Err(Error::Manifest(format!(
                "{}: empty command",
                self.file.display()
            )));
        }
        if self.check().is_empty() {
            return Err(Error::Manifest(format!(
                "{}: needs a stderr or stdout pattern",
                self.file.display()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BugManifest {
    pub bugs: Vec<Bug>,
}

impl BugManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base)
    }

    /// Parses manifest JSON, resolving relative bug files against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let mut bugs: Vec<Bug> = serde_json::from_str(text)?;
        for bug in &mut bugs {
            if bug.file.is_relative() {
                bug.file = base.join(&bug.file);
            }
            bug.validate()?;
        }
        debug!(count = bugs.len(), "loaded manifest");
        Ok(Self { bugs })
    }

    pub fn active(&self) -> impl Iterator<Item = &Bug> {
        self.bugs.iter().filter(|bug| !bug.skip)
    }

    /// One test case per active bug and replacement mode.
    pub fn test_cases(
        &self,
        algorithms: &[AlgorithmSpec],
        caches: &[CacheSpec],
        replacements: &[Option<u8>],
    ) -> Result<Vec<TestCase<u8>>> {
        let mut cases = Vec::new();
        for bug in self.active() {
            let input = fs::read(&bug.file)?;
            for &replace in replacements {
                let label = match replace {
                    None => bug.file.display().to_string(),
                    Some(byte) => format!("{} [fill {byte:#04x}]", bug.file.display()),
                };
                info!(%label, bytes = input.len(), "adding test case");
                let case = TestCase::product(label, input.clone(), algorithms, caches, || {
                    Ok(Box::new(bug.oracle(replace)?) as Box<dyn Oracle<u8>>)
                })?;
                cases.push(case);
            }
        }
        Ok(cases)
    }
}
