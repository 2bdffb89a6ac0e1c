//! CLI argument definitions for the trial matcher.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ctm",
    version,
    about = "Clinical trial matcher - rule-labeled eligibility with a trained model",
    long_about = "Match patients to clinical trials.\n\n\
                  Generates synthetic patients, labels patient-trial pairs with the\n\
                  eligibility rules, trains a text classifier, and explains decisions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate synthetic patients and rule-labeled pairs.
    Generate(GenerateArgs),

    /// Re-label every patient-trial pair in a data directory.
    Label(LabelArgs),

    /// Balance, vectorize, and train; write the model artifact.
    Train(TrainArgs),

    /// Decide eligibility of one patient for one or more trials.
    Decide(DecideArgs),

    /// Show the metadata of a model artifact.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Directory of trial records (default: built-in trial catalog).
    #[arg(long = "trials", value_name = "DIR")]
    pub trials: Option<PathBuf>,

    /// Data directory to write patients/, trials/, and pairs/ into.
    #[arg(long = "out", value_name = "DIR")]
    pub out: PathBuf,

    /// Number of patients to generate.
    #[arg(long = "patients", default_value_t = 100)]
    pub patients: usize,

    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Share of patients planned to satisfy their assigned trial.
    #[arg(long = "eligible-fraction", default_value_t = 0.5)]
    pub eligible_fraction: f64,
}

#[derive(Parser)]
pub struct LabelArgs {
    /// Data directory containing patients/ and trials/.
    #[arg(long = "data", value_name = "DIR")]
    pub data: PathBuf,
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Data directory containing patients/, trials/, and pairs/.
    #[arg(long = "data", value_name = "DIR")]
    pub data: PathBuf,

    /// Where to write the model artifact.
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,

    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Target share of eligible samples after balancing.
    #[arg(long = "ratio", default_value_t = 0.5)]
    pub ratio: f64,

    /// Allowed distance from the target ratio.
    #[arg(long = "tolerance", default_value_t = 0.02)]
    pub tolerance: f64,

    /// Vocabulary size cap.
    #[arg(long = "max-features", default_value_t = 5000)]
    pub max_features: usize,

    /// Share of samples held out for model selection.
    #[arg(long = "test-fraction", default_value_t = 0.2)]
    pub test_fraction: f64,
}

#[derive(Parser)]
pub struct DecideArgs {
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,

    /// Patient record file.
    #[arg(long = "patient", value_name = "FILE")]
    pub patient: PathBuf,

    /// Trial record file; repeat to rank several trials.
    #[arg(long = "trial", value_name = "FILE", required = true)]
    pub trials: Vec<PathBuf>,

    /// Print decisions as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
