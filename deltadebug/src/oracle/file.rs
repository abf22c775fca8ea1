// PY_SOURCE: src/delta_debugging/debuggers/file.py:FileDebugger

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use super::{Check, CommandSpec, Execution, Oracle};
use crate::{Configuration, Outcome, Result};

/// Overrides the directory scratch candidates are written to.
pub const TEMP_DIR_ENV: &str = "DELTADEBUG_TEMP";

/// Bytes of `input` kept by `config`; with `replace`, removed bytes become
/// the fill byte instead of disappearing.
pub fn render_candidate(config: &Configuration, input: &[u8], replace: Option<u8>) -> Vec<u8> {
    match replace {
        None => config.select(input),
        Some(fill) => input
            .iter()
            .enumerate()
            .map(|(i, &b)| if config.contains(i) { b } else { fill })
            .collect(),
    }
}

/// Writes each candidate to a file and appends its path to the command.
///
/// With a replacement byte, removed positions are overwritten instead of cut
/// out, so offsets inside the file stay put.
pub struct FileOracle<K> {
    command: CommandSpec,
    check: K,
    path: PathBuf,
    executable: bool,
    replace: Option<u8>,
    timeout_outcome: Outcome,
    _scratch: Option<TempDir>,
}

impl<K: Check> FileOracle<K> {
    /// Candidates go to a fresh scratch directory, removed on drop.
    pub fn new(command: CommandSpec, check: K) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("deltadebug-");
        let scratch = match std::env::var_os(TEMP_DIR_ENV) {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let path = scratch.path().join("candidate");
        let mut oracle = Self::at(command, check, path);
        oracle._scratch = Some(scratch);
        Ok(oracle)
    }

    /// Candidates go to `path`, which is deleted after every run.
    pub fn at(command: CommandSpec, check: K, path: PathBuf) -> Self {
        Self {
            command,
            check,
            path,
            executable: false,
            replace: None,
            timeout_outcome: Outcome::Unresolved,
            _scratch: None,
        }
    }

    pub fn executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }

    pub fn replace(mut self, replace: Option<u8>) -> Self {
        self.replace = replace;
        self
    }

    pub fn on_timeout(mut self, outcome: Outcome) -> Self {
        self.timeout_outcome = outcome;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, config: &Configuration, input: &[u8]) -> Vec<u8> {
        render_candidate(config, input, self.replace)
    }

    fn write(&self, config: &Configuration, input: &[u8]) -> Result<()> {
        fs::write(&self.path, self.render(config, input))?;
        #[cfg(unix)]
        if self.executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }
}

impl<K: Check> Oracle<u8> for FileOracle<K> {
    fn test(&mut self, config: &Configuration, input: &[u8]) -> Result<Outcome> {
        self.write(config, input)?;
        let execution = self.command.run([self.path.as_os_str()]);
        if let Err(err) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), %err, "candidate already gone");
        }
        let outcome = match execution? {
            Execution::Finished(output) => self.check.check(&output),
            Execution::TimedOut => self.timeout_outcome,
        };
        debug!(%config, %outcome, "file oracle");
        Ok(outcome)
    }
}
