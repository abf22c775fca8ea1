//! Deciding whether a candidate still reproduces the failure.

mod command;
mod file;

pub use command::{CommandOracle, CommandSpec, Execution};
pub use file::{render_candidate, FileOracle, TEMP_DIR_ENV};

use std::process::Output;

use serde::{Deserialize, Serialize};

use crate::{Configuration, Outcome, Result};

pub trait Oracle<T> {
    /// Judges the elements of `input` selected by `config`.
    fn test(&mut self, config: &Configuration, input: &[T]) -> Result<Outcome>;
}

impl<T, F> Oracle<T> for F
where
    T: Clone,
    F: FnMut(&[T]) -> Outcome,
{
    fn test(&mut self, config: &Configuration, input: &[T]) -> Result<Outcome> {
        Ok(self(&config.select(input)))
    }
}

/// Maps a finished process to an outcome.
pub trait Check {
    fn check(&mut self, output: &Output) -> Outcome;
}

impl<F> Check for F
where
    F: FnMut(&Output) -> Outcome,
{
    fn check(&mut self, output: &Output) -> Outcome {
        self(output)
    }
}

/// Fails when either pattern occurs in the corresponding stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
}

impl OutputMatch {
    pub fn is_empty(&self) -> bool {
        self.stderr.is_none() && self.stdout.is_none()
    }
}

impl Check for OutputMatch {
    fn check(&mut self, output: &Output) -> Outcome {
        let found = |pattern: &Option<String>, stream: &[u8]| {
            pattern
                .as_deref()
                .is_some_and(|p| String::from_utf8_lossy(stream).contains(p))
        };
        if found(&self.stderr, &output.stderr) || found(&self.stdout, &output.stdout) {
            Outcome::Fail
        } else {
            Outcome::Pass
        }
    }
}
