//! CLI argument definitions for the basic cleaning step.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use clean_model::{DEFAULT_JOB_TYPE, RunConfig};

#[derive(Parser)]
#[command(
    name = "basic-cleaning",
    version,
    about = "Basic cleaning step - drop price outliers and normalize review dates",
    long_about = "Resolve a listing dataset artifact, drop rows whose price is outside \
                  [--min_price, --max_price], convert last_review to a date, and publish \
                  the result as a new artifact.\n\n\
                  Arguments may be read from a file with @PATH (one argument per line).",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub step: StepArgs,

    /// Root directory of the local artifact store.
    #[arg(
        long = "artifact-store",
        value_name = "DIR",
        default_value = "artifacts",
        global = true
    )]
    pub artifact_store: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
    /// Publish a local file as a new artifact version.
    Import(ImportArgs),
}

/// Arguments of the cleaning step itself. All six are required.
#[derive(Args)]
pub struct StepArgs {
    /// Input artifact reference (name, name:latest, or name:vN).
    #[arg(long = "input_artifact", value_name = "REF", required = true)]
    pub input_artifact: Option<String>,

    /// Name for the output artifact.
    #[arg(long = "output_artifact", value_name = "NAME", required = true)]
    pub output_artifact: Option<String>,

    /// Type of the output artifact.
    #[arg(long = "output_type", value_name = "TYPE", required = true)]
    pub output_type: Option<String>,

    /// Description for the output artifact.
    #[arg(long = "output_description", value_name = "TEXT", required = true)]
    pub output_description: Option<String>,

    /// Minimum price to keep (inclusive).
    #[arg(
        long = "min_price",
        value_name = "PRICE",
        required = true,
        allow_negative_numbers = true
    )]
    pub min_price: Option<f64>,

    /// Maximum price to keep (inclusive).
    #[arg(
        long = "max_price",
        value_name = "PRICE",
        required = true,
        allow_negative_numbers = true
    )]
    pub max_price: Option<f64>,

    /// Keep the cleaned file in this directory instead of a temporary one.
    #[arg(long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Job type recorded with the run.
    #[arg(long = "job-type", value_name = "NAME", default_value = DEFAULT_JOB_TYPE)]
    pub job_type: String,
}

impl StepArgs {
    /// Snapshot the step arguments as a run configuration.
    pub fn run_config(&self) -> Result<RunConfig> {
        fn required<T: Clone>(value: Option<&T>, flag: &str) -> Result<T> {
            value
                .cloned()
                .ok_or_else(|| anyhow!("the argument '--{flag}' is required"))
        }
        Ok(RunConfig {
            input_artifact: required(self.input_artifact.as_ref(), "input_artifact")?,
            output_artifact: required(self.output_artifact.as_ref(), "output_artifact")?,
            output_type: required(self.output_type.as_ref(), "output_type")?,
            output_description: required(self.output_description.as_ref(), "output_description")?,
            min_price: required(self.min_price.as_ref(), "min_price")?,
            max_price: required(self.max_price.as_ref(), "max_price")?,
        })
    }
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to publish.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Artifact name (defaults to the file name).
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Artifact type.
    #[arg(long = "type", value_name = "TYPE", default_value = "raw_data")]
    pub artifact_type: String,

    /// Artifact description.
    #[arg(long = "description", value_name = "TEXT", default_value = "")]
    pub description: String,
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

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: &[&str] = &[
        "basic-cleaning",
        "--input_artifact",
        "sample.csv:latest",
        "--output_artifact",
        "clean_sample.csv",
        "--output_type",
        "clean_sample",
        "--output_description",
        "Data with outliers removed",
        "--min_price",
        "10",
        "--max_price",
        "350",
    ];

    #[test]
    fn parses_step_arguments() {
        let cli = Cli::try_parse_from(STEP).unwrap();
        assert!(cli.command.is_none());
        let config = cli.step.run_config().unwrap();
        assert_eq!(config.input_artifact, "sample.csv:latest");
        assert_eq!(config.output_type, "clean_sample");
        assert_eq!(config.min_price, 10.0);
        assert_eq!(config.max_price, 350.0);
        assert_eq!(cli.step.job_type, DEFAULT_JOB_TYPE);
        assert_eq!(cli.artifact_store, PathBuf::from("artifacts"));
    }

    #[test]
    fn every_step_argument_is_required() {
        let missing_max = &STEP[..STEP.len() - 2];
        let err = Cli::try_parse_from(missing_max).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn accepts_negative_bounds() {
        let mut args = STEP.to_vec();
        let min_index = args.iter().position(|arg| *arg == "10").unwrap();
        args[min_index] = "-5";
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.step.run_config().unwrap().min_price, -5.0);
    }

    #[test]
    fn import_does_not_need_step_arguments() {
        let cli = Cli::try_parse_from([
            "basic-cleaning",
            "import",
            "data/sample.csv",
            "--type",
            "raw_data",
        ])
        .unwrap();
        let Some(Command::Import(args)) = cli.command else {
            panic!("expected import subcommand");
        };
        assert_eq!(args.file, PathBuf::from("data/sample.csv"));
        assert_eq!(args.artifact_type, "raw_data");
        assert!(args.name.is_none());
    }
}
