// PY_SOURCE: examples/bug.py:main
// PY_SOURCE: examples/valgrind.py:check

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use deltadebug::{
    render_candidate, AlgorithmSpec, Benchmark, BugManifest, CacheSpec, CommandSpec,
    Configuration, Debugger, FileOracle, Oracle, OutputMatch, ResultSet, DEFAULT_REPLACEMENTS,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "deltadebug",
    about = "Shrink failure-inducing inputs by delta debugging"
)]
struct Cli {
    /// -v for debug logs, -vv for trace. RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reduce one file that makes COMMAND fail.
    Reduce(ReduceArgs),
    /// Check that every active bug in a manifest reproduces.
    Validate {
        #[arg(long, value_name = "PATH")]
        manifest: PathBuf,
    },
    /// Run the manifest bugs through each algorithm and cache.
    Bench(BenchArgs),
    /// Print a stored results file as a table.
    Show {
        results: PathBuf,
        /// Keep label columns even when every row agrees.
        #[arg(long, default_value_t = false)]
        all_columns: bool,
    },
}

#[derive(Args, Debug)]
struct ReduceArgs {
    /// File to reduce; it is never modified.
    input: PathBuf,
    /// Where the reduced file is written.
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,
    /// Substring of stderr that marks the failure.
    #[arg(long, value_name = "PATTERN")]
    stderr: Option<String>,
    /// Substring of stdout that marks the failure.
    #[arg(long, value_name = "PATTERN")]
    stdout: Option<String>,
    #[arg(long, default_value = "ddmin")]
    algorithm: AlgorithmSpec,
    #[arg(long, value_enum, default_value_t = CacheSpec::Tree)]
    cache: CacheSpec,
    /// Per-run limit in seconds; runs that hit it are unresolved.
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,
    /// Mark candidates executable.
    #[arg(long, default_value_t = false)]
    executable: bool,
    /// Overwrite removed bytes with BYTE instead of cutting them out.
    #[arg(long, value_name = "BYTE", value_parser = parse_byte)]
    replace: Option<u8>,
    #[arg(long, default_value_t = false)]
    progress: bool,
    /// Command to run; the candidate path is appended.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[derive(Args, Debug)]
struct BenchArgs {
    #[arg(long, value_name = "PATH")]
    manifest: PathBuf,
    /// Results are stored here after every run.
    #[arg(long, value_name = "PATH")]
    results: Option<PathBuf>,
    /// Repeatable; defaults to the flat algorithms and their HDD variants.
    #[arg(long = "algorithm", value_name = "ALGORITHM")]
    algorithms: Vec<AlgorithmSpec>,
    /// Repeatable; defaults to none.
    #[arg(long = "cache", value_enum)]
    caches: Vec<CacheSpec>,
    /// Only cut bytes out; skip the zero-fill runs.
    #[arg(long, default_value_t = false)]
    no_fill: bool,
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid byte '{s}': {err}"))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Reduce(args) => reduce(args),
        Command::Validate { manifest } => validate(&manifest),
        Command::Bench(args) => bench(args),
        Command::Show {
            results,
            all_columns,
        } => show(&results, all_columns),
    }
}

fn reduce(args: ReduceArgs) -> Result<()> {
    let input =
        fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let check = OutputMatch {
        stderr: args.stderr,
        stdout: args.stdout,
    };
    if check.is_empty() {
        bail!("pass --stderr and/or --stdout to describe the failure");
    }
    let timeout = args
        .timeout
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("invalid --timeout")?;
    let command = CommandSpec::from_argv(&args.command)?.timeout(timeout);
    info!(%command, input = %args.input.display(), bytes = input.len(), "reducing");

    let oracle = FileOracle::new(command, check)?
        .executable(args.executable)
        .replace(args.replace);
    let mut debugger: Debugger<u8> = Debugger::new(args.algorithm.build(), Box::new(oracle))
        .with_cache(args.cache.build())
        .show_progress(args.progress);
    if !debugger.validate(&input)? {
        bail!("{} does not reproduce the failure", args.input.display());
    }
    let config = debugger.debug(&input)?;

    let reduced = render_candidate(&config, &input, args.replace);
    fs::write(&args.output, &reduced)
        .with_context(|| format!("writing {}", args.output.display()))?;
    if args.executable {
        make_executable(&args.output)?;
    }
    println!("{}", debugger.summary());
    println!("Wrote {} bytes to {}", reduced.len(), args.output.display());
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let manifest =
        BugManifest::load(path).with_context(|| format!("loading {}", path.display()))?;
    let mut missing = 0;
    for bug in manifest.active() {
        let input =
            fs::read(&bug.file).with_context(|| format!("reading {}", bug.file.display()))?;
        let mut oracle = bug.oracle(None)?;
        let outcome = oracle.test(&Configuration::full(input.len()), &input)?;
        if outcome.is_fail() {
            println!("reproduces          {}", bug.file.display());
        } else {
            warn!(file = %bug.file.display(), %outcome, "bug does not reproduce");
            println!("does not reproduce  {}", bug.file.display());
            missing += 1;
        }
    }
    if missing > 0 {
        bail!("{missing} bug(s) did not reproduce");
    }
    Ok(())
}

fn bench(args: BenchArgs) -> Result<()> {
    let manifest = BugManifest::load(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    let algorithms = if args.algorithms.is_empty() {
        AlgorithmSpec::standard()
    } else {
        args.algorithms
    };
    let caches = if args.caches.is_empty() {
        vec![CacheSpec::None]
    } else {
        args.caches
    };
    let replacements: &[Option<u8>] = if args.no_fill {
        &[None]
    } else {
        &DEFAULT_REPLACEMENTS
    };

    let cases = manifest.test_cases(&algorithms, &caches, replacements)?;
    let mut benchmark = Benchmark::new(cases).show_progress(args.progress);
    if let Some(path) = args.results {
        benchmark = benchmark.with_results_file(path);
    }
    info!(runs = benchmark.total(), "starting benchmark");
    benchmark.run()?;
    println!("{}", benchmark.table());
    Ok(())
}

fn show(path: &Path, all_columns: bool) -> Result<()> {
    let results = ResultSet::load(path).with_context(|| format!("loading {}", path.display()))?;
    if results.is_empty() {
        println!("no results in {}", path.display());
    } else {
        println!("{}", results.table(!all_columns));
    }
    Ok(())
}
