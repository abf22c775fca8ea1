//! Delta debugging: shrink a failure-inducing input while an oracle keeps
//! reporting the failure.
//!
//! The pieces compose as in [`Debugger`]: an [`Algorithm`] proposes
//! [`Configuration`]s (index subsets of the input), an [`Oracle`] classifies
//! each one as an [`Outcome`], and an optional [`Cache`] remembers the
//! answers. [`Benchmark`] runs many debuggers over many inputs and records
//! [`RunResult`]s.

use thiserror::Error;

pub mod algorithm;
pub mod benchmark;
pub mod cache;
pub mod configuration;
pub mod debugger;
pub mod manifest;
pub mod oracle;
pub mod outcome;
pub mod parser;
pub mod results;
pub mod spec;

pub use algorithm::{Algorithm, DdMin, Hdd, Input, ProbDd, Tester, ZipMin};
pub use benchmark::{Benchmark, TestCase};
pub use cache::{Cache, HashCache, TreeCache};
pub use configuration::Configuration;
pub use debugger::{Debugger, Element};
pub use manifest::{Bug, BugManifest, DEFAULT_REPLACEMENTS};
pub use oracle::{
    render_candidate, Check, CommandOracle, CommandSpec, Execution, FileOracle, Oracle, OutputMatch,
    TEMP_DIR_ENV,
};
pub use outcome::Outcome;
pub use parser::{ElfParser, Node, Parser, TreeSitterParser};
pub use results::{ResultSet, RunResult};
pub use spec::{AlgorithmSpec, CacheSpec};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("elf error: {0}")]
    Elf(#[from] object::read::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error("parse error: {0}")]
    Parse(String),
}
