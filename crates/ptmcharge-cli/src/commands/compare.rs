use crate::cli::CompareArgs;
use crate::config::PartialEngineConfig;
use crate::dataset::load_dataset;
use crate::error::Result;
use crate::output::render_comparison;
use crate::utils::progress::CliProgressHandler;
use ptmcharge::engine::cancel::CancellationToken;
use ptmcharge::engine::progress::ProgressReporter;
use ptmcharge::workflows;
use tracing::info;

pub async fn run(args: CompareArgs, cancel: CancellationToken) -> Result<()> {
    let config =
        PartialEngineConfig::load(args.engine.config.as_deref(), &args.engine.set_values)?;
    let dataset = load_dataset(&args.engine.input)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(a = %args.method_a, b = %args.method_b, "Invoking the compare workflow...");
    let report = tokio::task::block_in_place(|| {
        workflows::compare::run(
            &dataset,
            args.method_a,
            args.method_b,
            &config,
            &reporter,
            &cancel,
        )
    })?;

    println!("{}", render_comparison(&report, &config.agreement));
    Ok(())
}
