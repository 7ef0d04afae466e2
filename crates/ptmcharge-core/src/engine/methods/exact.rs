use super::Method;
use crate::core::math::convolution::{convolution_power, convolve};
use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use crate::core::models::site::SiteModel;
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use crate::engine::numerics;
use crate::engine::progress::Progress;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Exact total-charge distribution by direct convolution.
///
/// Each site is raised to its `copies`-th convolution power by binary exponentiation, then
/// the per-site powers are folded together in dataset order.
#[instrument(skip_all, name = "exact_engine")]
pub fn run(dataset: &Dataset, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    let support = dataset.theoretical_support();
    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        %support,
        "Starting exact convolution."
    );
    ctx.checkpoint()?;

    if dataset.is_empty() {
        return Ok(Distribution::point_mass(0));
    }

    let total = ctx.reporter.phase("Exact convolution", || {
        ctx.reporter.report(Progress::TaskStart {
            total_steps: dataset.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = dataset.sites().iter();

        #[cfg(feature = "parallel")]
        let iterator = dataset.sites().par_iter();

        let powers: Vec<Result<Distribution, EngineError>> = iterator
            .map(|site| {
                let power = site_power(site, ctx);
                ctx.reporter.report(Progress::TaskIncrement);
                power
            })
            .collect();

        let mut total = Distribution::point_mass(0);
        for power in powers {
            ctx.checkpoint()?;
            total = convolve(&total, &power?);
        }

        ctx.reporter.report(Progress::TaskFinish);
        Ok::<_, EngineError>(total)
    })?;

    if total.support() != support {
        return Err(EngineError::Internal(format!(
            "exact result spans {} but the theoretical support is {}",
            total.support(),
            support
        )));
    }

    let result = numerics::finalize(Method::Exact, total, ctx.config.numerics.max_drift)?;
    debug!(mean = result.mean(), variance = result.variance(), "Exact convolution finished.");
    Ok(result)
}

fn site_power(site: &SiteModel, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    convolution_power(&Distribution::from_site(site), site.copies(), |a, b| {
        ctx.checkpoint()?;
        Ok(convolve(a, b))
    })
}
