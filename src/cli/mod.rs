//! Command-line parsing for the `stab` frequency-stability tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimator code. Engine options are shared between `analyze` and `batch`
//! and may also be set through `STAB_*` environment variables (or a `.env`
//! file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{DataType, ErrorModelKind, EstimatorKind, NoiseType};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stab", version, about = "Frequency-stability analysis of clock phase/frequency data")]
pub struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one series file and print stability tables.
    Analyze(AnalyzeArgs),
    /// Analyze many series files in parallel, writing one JSON document each.
    Batch(BatchArgs),
    /// Print a saved result document as plain tables.
    Show(ShowArgs),
}

/// How averaging factors are chosen when no explicit list is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TauStrategy {
    All,
    Octave,
    Decade,
    Log,
}

/// Options shared by every command that runs estimators.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// 1-based column to read (default: last of two columns, else the only one).
    #[arg(long)]
    pub column: Option<usize>,

    /// Whether the input holds phase (seconds) or fractional frequency.
    #[arg(long, value_enum, default_value_t = DataType::Phase)]
    pub data_type: DataType,

    /// Sampling rate in Hz (tau0 = 1 / rate).
    #[arg(long, env = "STAB_RATE", default_value_t = 1.0)]
    pub rate: f64,

    /// Tau ladder strategy.
    #[arg(long, value_enum, default_value_t = TauStrategy::Octave)]
    pub taus: TauStrategy,

    /// Explicit averaging factors m (comma separated); overrides `--taus`.
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "tau_seconds")]
    pub tau_list: Option<Vec<usize>>,

    /// Explicit averaging times in seconds (comma separated); overrides `--taus`.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub tau_seconds: Option<Vec<f64>>,

    /// Number of points for `--taus log`.
    #[arg(long, default_value_t = 30)]
    pub log_points: usize,

    /// Fraction of N that caps the octave/decade/log ladders.
    #[arg(long, env = "STAB_TAU_FRACTION", default_value_t = 0.25)]
    pub fraction: f64,

    /// Estimators to run (comma separated).
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = EstimatorKind::ALL)]
    pub estimators: Vec<EstimatorKind>,

    /// Error-bar model.
    #[arg(long, value_enum, env = "STAB_ERROR_MODEL", default_value_t = ErrorModelKind::Edf)]
    pub error_model: ErrorModelKind,

    /// Noise type assumed by the edf error model.
    #[arg(long, value_enum, env = "STAB_NOISE", default_value_t = NoiseType::Wfm)]
    pub noise: NoiseType,

    /// Evaluate taus sequentially instead of on the thread pool.
    #[arg(long)]
    pub serial: bool,
}

/// Options for `stab analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Input series (text, optionally gzip-compressed).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Dataset name stored in the JSON document (default: file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// Write the result document to this JSON file.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Export every (estimator, tau) point to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Options for `stab batch`.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Input series files.
    #[arg(value_name = "FILES", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Directory receiving one `<stem>.json` per input.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Stop scheduling new units after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<f64>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Options for `stab show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Result document written by `stab analyze --json` or `stab batch`.
    #[arg(value_name = "JSON")]
    pub json: PathBuf,
}
