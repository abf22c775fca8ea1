// PY_SOURCE: src/delta_debugging/debuggers/command.py:CommandDebugger

use std::ffi::OsStr;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Check, Oracle};
use crate::{Configuration, Error, Outcome, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// A program invocation. Arguments are passed as-is; nothing goes through a
/// shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
    pub current_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum Execution {
    Finished(Output),
    TimedOut,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            current_dir: None,
        }
    }

    /// First element is the program, the rest its leading arguments.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Parse("empty command line".to_string()))?;
        let mut spec = Self::new(program.as_ref());
        spec.args = args.iter().map(|a| a.as_ref().to_string()).collect();
        Ok(spec)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Runs the program with `extra` appended to its arguments, capturing
    /// both output streams. With a timeout the child runs in its own process
    /// group, and past the deadline the whole group is killed.
    pub fn run<I, S>(&self, extra: I) -> Result<Execution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        let spawn_error = |source: io::Error| Error::Spawn {
            program: self.program.clone(),
            source,
        };
        debug!(command = %self, "running");

        let Some(timeout) = self.timeout else {
            let output = command.output().map_err(spawn_error)?;
            return Ok(Execution::Finished(output));
        };

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(spawn_error)?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) if Instant::now() >= deadline => {
                    terminate(&mut child);
                    break None;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    terminate(&mut child);
                    return Err(err.into());
                }
            }
        };

        // Descendants that outlive the child keep the pipes open.
        let until = deadline.max(Instant::now()) + DRAIN_GRACE;
        let mut out = receive(&stdout, until);
        let mut err = receive(&stderr, until);
        if out.is_none() || err.is_none() {
            debug!(command = %self, "killing leftover descendants");
            kill_group(&child);
            let until = Instant::now() + DRAIN_GRACE;
            out = out.or_else(|| receive(&stdout, until));
            err = err.or_else(|| receive(&stderr, until));
        }

        Ok(match status {
            Some(status) => Execution::Finished(Output {
                status,
                stdout: out.unwrap_or_default(),
                stderr: err.unwrap_or_default(),
            }),
            None => {
                debug!(command = %self, ?timeout, "timed out");
                Execution::TimedOut
            }
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// `None` while the stream is still open at `until`.
fn receive(stream: &Option<Receiver<Vec<u8>>>, until: Instant) -> Option<Vec<u8>> {
    match stream {
        None => Some(Vec::new()),
        Some(rx) => rx
            .recv_timeout(until.saturating_duration_since(Instant::now()))
            .ok(),
    }
}

/// Kills the child's whole process group, then the child itself, and reaps it.
fn terminate(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    // The child leads its own group, so its pid is the group id.
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal and reads no memory.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Passes the selected elements as extra command-line arguments.
pub struct CommandOracle<K> {
    command: CommandSpec,
    check: K,
    timeout_outcome: Outcome,
}

impl<K: Check> CommandOracle<K> {
    pub fn new(command: CommandSpec, check: K) -> Self {
        Self {
            command,
            check,
            timeout_outcome: Outcome::Unresolved,
        }
    }

    pub fn on_timeout(mut self, outcome: Outcome) -> Self {
        self.timeout_outcome = outcome;
        self
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }
}

impl<T: fmt::Display, K: Check> Oracle<T> for CommandOracle<K> {
    fn test(&mut self, config: &Configuration, input: &[T]) -> Result<Outcome> {
        let extra: Vec<String> = config
            .iter()
            .filter_map(|i| input.get(i))
            .map(ToString::to_string)
            .collect();
        let outcome = match self.command.run(&extra)? {
            Execution::Finished(output) => self.check.check(&output),
            Execution::TimedOut => self.timeout_outcome,
        };
        debug!(%config, %outcome, "command oracle");
        Ok(outcome)
    }
}
