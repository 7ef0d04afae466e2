use super::compute::timed_run;
use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use crate::core::models::support::Support;
use crate::engine::align::align;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{Agreement, AgreementBands, EngineConfig};
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use crate::engine::methods::Method;
use crate::engine::progress::ProgressReporter;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument};

/// How two engines' outputs for the same dataset differ once aligned.
///
/// Only produced by the comparator; disagreement is reported, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    method_a: Method,
    method_b: Method,
    support: Support,
    max_abs_diff: f64,
    max_abs_diff_charge: i64,
    rmse: f64,
    elapsed_a: Duration,
    elapsed_b: Duration,
}

impl ComparisonReport {
    pub(crate) fn from_distributions(
        (method_a, a, elapsed_a): (Method, &Distribution, Duration),
        (method_b, b, elapsed_b): (Method, &Distribution, Duration),
    ) -> Self {
        let aligned = align(a, b);
        let (max_abs_diff_charge, max_abs_diff) = aligned.peak_difference();
        Self {
            method_a,
            method_b,
            support: aligned.support(),
            max_abs_diff,
            max_abs_diff_charge,
            rmse: aligned.rmse(),
            elapsed_a,
            elapsed_b,
        }
    }

    pub fn method_a(&self) -> Method {
        self.method_a
    }

    pub fn method_b(&self) -> Method {
        self.method_b
    }

    /// The union of both supports over which the outputs were compared.
    pub fn support(&self) -> Support {
        self.support
    }

    pub fn max_abs_diff(&self) -> f64 {
        self.max_abs_diff
    }

    pub fn max_abs_diff_charge(&self) -> i64 {
        self.max_abs_diff_charge
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn elapsed_a(&self) -> Duration {
        self.elapsed_a
    }

    pub fn elapsed_b(&self) -> Duration {
        self.elapsed_b
    }

    pub fn agreement(&self, bands: &AgreementBands) -> Agreement {
        bands.classify(self.max_abs_diff)
    }
}

/// Compares two engines on `dataset` with the default configuration.
pub fn compare(dataset: &Dataset, a: Method, b: Method) -> Result<ComparisonReport, EngineError> {
    run(
        dataset,
        a,
        b,
        &EngineConfig::default(),
        &ProgressReporter::new(),
        &CancellationToken::new(),
    )
}

/// Runs both engines (concurrently with the `parallel` feature), aligns and compares them.
#[instrument(skip_all, name = "compare_workflow", fields(a = %a, b = %b))]
pub fn run(
    dataset: &Dataset,
    a: Method,
    b: Method,
    config: &EngineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ComparisonReport, EngineError> {
    let ctx = ComputeContext::new(config, reporter, cancel);

    #[cfg(not(feature = "parallel"))]
    let (result_a, result_b) = (
        timed_run(a, dataset, &ctx),
        timed_run(b, dataset, &ctx),
    );

    #[cfg(feature = "parallel")]
    let (result_a, result_b) = rayon::join(
        || timed_run(a, dataset, &ctx),
        || timed_run(b, dataset, &ctx),
    );

    let (dist_a, elapsed_a) = result_a?;
    let (dist_b, elapsed_b) = result_b?;
    let report =
        ComparisonReport::from_distributions((a, &dist_a, elapsed_a), (b, &dist_b, elapsed_b));

    info!(
        support = %report.support(),
        max_abs_diff = report.max_abs_diff(),
        max_abs_diff_charge = report.max_abs_diff_charge(),
        rmse = report.rmse(),
        "Comparison complete."
    );
    Ok(report)
}
