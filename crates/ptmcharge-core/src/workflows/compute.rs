use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::EngineConfig;
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use crate::engine::methods::Method;
use crate::engine::progress::ProgressReporter;
use crate::engine::selector::{Selection, select};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ComputeResult {
    pub distribution: Distribution,
    pub selection: Selection,
    pub elapsed: Duration,
}

/// Computes the total-charge distribution with the default configuration.
pub fn compute(dataset: &Dataset) -> Result<ComputeResult, EngineError> {
    run(
        dataset,
        &EngineConfig::default(),
        &ProgressReporter::new(),
        &CancellationToken::new(),
    )
}

/// Computes the total-charge distribution with the engine chosen by the adaptive selector.
#[instrument(skip_all, name = "compute_workflow")]
pub fn run(
    dataset: &Dataset,
    config: &EngineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ComputeResult, EngineError> {
    let selection = select(dataset, config);
    info!(
        method = %selection.method,
        total_copies = selection.total_copies,
        reason = %selection.reason,
        enumeration_available = selection.enumeration_available,
        "Selected engine."
    );
    execute(dataset, selection, config, reporter, cancel)
}

/// Computes the total-charge distribution with a caller-chosen engine.
#[instrument(skip_all, name = "compute_workflow", fields(method = %method))]
pub fn run_with_method(
    dataset: &Dataset,
    method: Method,
    config: &EngineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ComputeResult, EngineError> {
    execute(
        dataset,
        Selection::explicit(method, dataset, config),
        config,
        reporter,
        cancel,
    )
}

fn execute(
    dataset: &Dataset,
    selection: Selection,
    config: &EngineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ComputeResult, EngineError> {
    let ctx = ComputeContext::new(config, reporter, cancel);
    let (distribution, elapsed) = timed_run(selection.method, dataset, &ctx)?;
    info!(
        method = %selection.method,
        support = %distribution.support(),
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "Computation complete."
    );
    Ok(ComputeResult {
        distribution,
        selection,
        elapsed,
    })
}

pub(crate) fn timed_run(
    method: Method,
    dataset: &Dataset,
    ctx: &ComputeContext,
) -> Result<(Distribution, Duration), EngineError> {
    let start = Instant::now();
    let distribution = method.run(dataset, ctx)?;
    Ok((distribution, start.elapsed()))
}
