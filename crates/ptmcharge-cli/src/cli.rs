use crate::output::DisplayWindow;
use clap::{Args, Parser, Subcommand};
use ptmcharge::core::models::synthetic::CopiesPattern;
use ptmcharge::engine::methods::Method;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ptmcharge - total-charge probability distributions for proteins with independent modification sites.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the total-charge distribution of a dataset.
    Compute(ComputeArgs),
    /// Run two methods on the same dataset and report how far their outputs differ.
    Compare(CompareArgs),
    /// Time every applicable method and validate each against a ground-truth reference.
    Validate(ValidateArgs),
    /// Write a random, valid dataset for stress testing.
    Generate(GenerateArgs),
}

/// Options shared by every command that runs the engine.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Path to the site dataset in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an engine configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.exact-max-copies=80
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `compute` subcommand.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Method to run; `auto` lets the adaptive selector decide from the dataset size.
    #[arg(short, long, default_value = "auto", value_name = "METHOD")]
    pub method: MethodChoice,

    /// Charge range shown in the summary; mass outside it is reported as tails.
    #[arg(long, default_value = "-5:5", value_name = "LOW:HIGH", allow_hyphen_values = true)]
    pub window: DisplayWindow,

    /// Write the full distribution as `charge,probability` CSV rows.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// First method.
    #[arg(short = 'a', long, value_name = "METHOD")]
    pub method_a: Method,

    /// Second method.
    #[arg(short = 'b', long, value_name = "METHOD")]
    pub method_b: Method,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Restrict the candidates to these methods (comma separated). Defaults to all.
    #[arg(short, long, value_delimiter = ',', value_name = "METHODS")]
    pub methods: Vec<Method>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path for the generated dataset file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of sites to generate.
    #[arg(short = 'n', long, required = true, value_name = "INT")]
    pub sites: usize,

    /// Lowest charge state of every site.
    #[arg(long, default_value_t = -2, allow_hyphen_values = true, value_name = "INT")]
    pub min_charge: i64,

    /// Highest charge state of every site.
    #[arg(long, default_value_t = 2, allow_hyphen_values = true, value_name = "INT")]
    pub max_charge: i64,

    /// Copy counts: all-1, all-2, all-3, varied (1,2,3,...) or random (1 to 5).
    #[arg(long, default_value = "all-1", value_name = "PATTERN")]
    pub copies: CopiesPattern,

    /// Seed for the random generator.
    #[arg(long, default_value_t = 42, value_name = "INT")]
    pub seed: u64,
}

/// Either a fixed method or the adaptive selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodChoice {
    Auto,
    Fixed(Method),
}

impl FromStr for MethodChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(MethodChoice::Auto);
        }
        s.parse::<Method>()
            .map(MethodChoice::Fixed)
            .map_err(|e| e.to_string())
    }
}

impl fmt::Display for MethodChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodChoice::Auto => f.write_str("auto"),
            MethodChoice::Fixed(method) => write!(f, "{}", method),
        }
    }
}
