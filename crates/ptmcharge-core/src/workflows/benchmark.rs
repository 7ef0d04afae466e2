use super::compare::ComparisonReport;
use super::compute::timed_run;
use crate::core::models::dataset::Dataset;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{Agreement, EngineConfig};
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use crate::engine::methods::Method;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selector::select;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub enum BenchmarkOutcome {
    /// This entry is the reference every other entry is compared against.
    Benchmark,
    Compared {
        report: ComparisonReport,
        agreement: Agreement,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct BenchmarkEntry {
    pub method: Method,
    /// Absent when the engine failed.
    pub elapsed: Option<Duration>,
    pub outcome: BenchmarkOutcome,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub benchmark: Method,
    pub total_copies: u64,
    pub entries: Vec<BenchmarkEntry>,
}

impl BenchmarkReport {
    pub fn entry(&self, method: Method) -> Option<&BenchmarkEntry> {
        self.entries.iter().find(|entry| entry.method == method)
    }
}

/// Runs the reference engine and each of `methods` on the same dataset, one at a time so
/// that timings are comparable, and compares every result against the reference.
///
/// The reference is enumeration when the dataset is small enough, otherwise exact
/// convolution. Enumeration is skipped when it is not available. A failing engine is
/// recorded in its entry; only cancellation and a failing reference abort the run.
#[instrument(skip_all, name = "benchmark_workflow")]
pub fn run(
    dataset: &Dataset,
    methods: &[Method],
    config: &EngineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<BenchmarkReport, EngineError> {
    let selection = select(dataset, config);
    let benchmark = selection.benchmark_method();
    let ctx = ComputeContext::new(config, reporter, cancel);

    let mut candidates: Vec<Method> = methods
        .iter()
        .copied()
        .filter(|&m| m != benchmark)
        .filter(|&m| m != Method::Enumeration || selection.enumeration_available)
        .collect();
    candidates.sort();
    candidates.dedup();

    info!(
        %benchmark,
        total_copies = selection.total_copies,
        candidates = candidates.len(),
        "Starting benchmark."
    );

    let (reference, reference_elapsed) =
        reporter.phase("Benchmark reference", || timed_run(benchmark, dataset, &ctx))?;

    let mut entries = vec![BenchmarkEntry {
        method: benchmark,
        elapsed: Some(reference_elapsed),
        outcome: BenchmarkOutcome::Benchmark,
    }];

    reporter.phase("Benchmark candidates", || {
        reporter.report(Progress::TaskStart {
            total_steps: candidates.len() as u64,
        });
        for &method in &candidates {
            ctx.checkpoint()?;
            let entry = match timed_run(method, dataset, &ctx) {
                Ok((distribution, elapsed)) => {
                    let report = ComparisonReport::from_distributions(
                        (benchmark, &reference, reference_elapsed),
                        (method, &distribution, elapsed),
                    );
                    let agreement = report.agreement(&config.agreement);
                    info!(
                        %method,
                        max_abs_diff = report.max_abs_diff(),
                        %agreement,
                        "Candidate compared."
                    );
                    BenchmarkEntry {
                        method,
                        elapsed: Some(elapsed),
                        outcome: BenchmarkOutcome::Compared { report, agreement },
                    }
                }
                Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
                Err(error) => {
                    warn!(%method, %error, "Candidate engine failed.");
                    BenchmarkEntry {
                        method,
                        elapsed: None,
                        outcome: BenchmarkOutcome::Failed {
                            error: error.to_string(),
                        },
                    }
                }
            };
            entries.push(entry);
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        Ok::<_, EngineError>(())
    })?;

    Ok(BenchmarkReport {
        benchmark,
        total_copies: selection.total_copies,
        entries,
    })
}
