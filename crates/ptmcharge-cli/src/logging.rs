use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer, Registry,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    registry::LookupSpan,
};

/// Console level for `-v` counts; `--quiet` silences the console entirely.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Plain-text layer for `--log-file`, with thread ids so parallel engine runs can be told apart.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level_filter(verbosity, quiet));

    let file = log_file
        .map(File::create)
        .transpose()
        .map_err(CliError::Io)?
        .map(file_layer::<Registry>);

    tracing_subscriber::registry()
        .with(file)
        .with(console)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install global logger: {}", e)))
}
