use crate::cli::ValidateArgs;
use crate::config::PartialEngineConfig;
use crate::dataset::load_dataset;
use crate::error::Result;
use crate::output::render_benchmark;
use crate::utils::progress::CliProgressHandler;
use ptmcharge::engine::cancel::CancellationToken;
use ptmcharge::engine::methods::Method;
use ptmcharge::engine::progress::ProgressReporter;
use ptmcharge::workflows;
use ptmcharge::workflows::benchmark::BenchmarkOutcome;
use tracing::{info, warn};

pub async fn run(args: ValidateArgs, cancel: CancellationToken) -> Result<()> {
    let config =
        PartialEngineConfig::load(args.engine.config.as_deref(), &args.engine.set_values)?;
    let dataset = load_dataset(&args.engine.input)?;

    let methods = if args.methods.is_empty() {
        Method::ALL.to_vec()
    } else {
        args.methods
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(candidates = methods.len(), "Invoking the benchmark workflow...");
    let report = tokio::task::block_in_place(|| {
        workflows::benchmark::run(&dataset, &methods, &config, &reporter, &cancel)
    })?;

    for entry in &report.entries {
        if let BenchmarkOutcome::Failed { error } = &entry.outcome {
            warn!(method = %entry.method, %error, "Method failed during validation.");
        }
    }

    println!("{}", render_benchmark(&report));
    Ok(())
}
