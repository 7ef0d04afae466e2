use super::Method;
use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use crate::engine::numerics;
use crate::engine::progress::Progress;
use itertools::Itertools;
use tracing::{info, instrument};

/// Combinations walked between cancellation checks and progress increments.
const CHECK_INTERVAL: u64 = 1 << 16;

/// Ground-truth distribution by walking every combination of site states.
///
/// A site with `copies = k` is treated as `k` independent identical sites. Zero-probability
/// states are skipped since they contribute nothing. The combination count is checked against
/// `enumeration_max_combinations` before anything is allocated.
#[instrument(skip_all, name = "enumeration_engine")]
pub fn run(dataset: &Dataset, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    let combinations = dataset.combination_count();
    let cap = ctx.config.enumeration_max_combinations;
    if combinations > u128::from(cap) {
        return Err(EngineError::EnumerationTooLarge { combinations, cap });
    }

    let support = dataset.theoretical_support();
    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        combinations = combinations as u64,
        %support,
        "Starting enumeration."
    );
    ctx.checkpoint()?;

    if dataset.is_empty() {
        return Ok(Distribution::point_mass(0));
    }

    let expanded: Vec<Vec<(i64, f64)>> = dataset
        .iter()
        .flat_map(|site| {
            let states: Vec<(i64, f64)> = site.states().filter(|&(_, p)| p > 0.0).collect();
            std::iter::repeat_n(states, site.copies() as usize)
        })
        .collect();

    let buckets = ctx.reporter.phase("Enumeration", || {
        ctx.reporter.report(Progress::TaskStart {
            total_steps: (combinations as u64).div_ceil(CHECK_INTERVAL),
        });

        let mut buckets = vec![0.0; support.len()];
        let mut walked: u64 = 0;
        for combination in expanded
            .iter()
            .map(|states| states.iter().copied())
            .multi_cartesian_product()
        {
            if walked % CHECK_INTERVAL == 0 {
                ctx.checkpoint()?;
                if walked > 0 {
                    ctx.reporter.report(Progress::TaskIncrement);
                }
            }
            walked += 1;

            let (charge, probability) = combination
                .iter()
                .fold((0i64, 1.0), |(c, p), &(q, r)| (c + q, p * r));
            let index = support.index_of(charge).ok_or_else(|| {
                EngineError::Internal(format!(
                    "enumerated charge {} lies outside the theoretical support {}",
                    charge, support
                ))
            })?;
            buckets[index] += probability;
        }

        ctx.reporter.report(Progress::TaskFinish);
        info!(walked, "Enumeration walked all non-zero combinations.");
        Ok::<_, EngineError>(buckets)
    })?;

    numerics::finalize(
        Method::Enumeration,
        Distribution::from_parts(support, buckets),
        ctx.config.numerics.max_drift,
    )
}
