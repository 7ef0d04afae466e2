use super::Method;
use crate::core::math::convolution::convolution_power;
use crate::core::math::fft::{FftConvolver, FftError};
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

/// Total-charge distribution with transform-domain convolution for long operands.
///
/// Produces the same support as the exact engine. Per-site powers are combined with a
/// balanced pairwise reduction so both operands of each FFT stay similar in length.
#[instrument(skip_all, name = "fft_engine")]
pub fn run(dataset: &Dataset, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    let support = dataset.theoretical_support();
    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        min_operand_len = ctx.config.fft.min_operand_len,
        %support,
        "Starting FFT convolution."
    );
    ctx.checkpoint()?;

    if dataset.is_empty() {
        return Ok(Distribution::point_mass(0));
    }

    let total = ctx.reporter.phase("FFT convolution", || {
        ctx.reporter.report(Progress::TaskStart {
            total_steps: dataset.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = dataset.sites().iter();

        #[cfg(feature = "parallel")]
        let iterator = dataset.sites().par_iter();

        let powers = iterator
            .map(|site| {
                let power = site_power(site, ctx);
                ctx.reporter.report(Progress::TaskIncrement);
                power
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let total = reduce_pairwise(powers, ctx)?;
        ctx.reporter.report(Progress::TaskFinish);
        Ok::<_, EngineError>(total)
    })?;

    if total.support() != support {
        return Err(EngineError::Internal(format!(
            "FFT result spans {} but the theoretical support is {}",
            total.support(),
            support
        )));
    }

    numerics::finalize(Method::Fft, total, ctx.config.numerics.max_drift)
}

fn site_power(site: &SiteModel, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    let mut convolver = convolver_for(ctx);
    let power = convolution_power(&Distribution::from_site(site), site.copies(), |a, b| {
        ctx.checkpoint()?;
        convolver.convolve(a, b).map_err(instability)
    })?;
    if convolver.clipped_mass() > 0.0 {
        debug!(
            site = site.id(),
            clipped_mass = convolver.clipped_mass(),
            "Clipped negative FFT round-off."
        );
    }
    Ok(power)
}

fn reduce_pairwise(
    mut layer: Vec<Distribution>,
    ctx: &ComputeContext,
) -> Result<Distribution, EngineError> {
    let mut convolver = convolver_for(ctx);

    while layer.len() > 1 {
        ctx.checkpoint()?;
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut operands = layer.into_iter();
        while let Some(left) = operands.next() {
            match operands.next() {
                Some(right) => next.push(convolver.convolve(&left, &right).map_err(instability)?),
                None => next.push(left),
            }
        }
        layer = next;
    }

    debug!(
        transforms = convolver.transforms(),
        clipped_mass = convolver.clipped_mass(),
        "Pairwise reduction finished."
    );
    layer
        .pop()
        .ok_or_else(|| EngineError::Internal("pairwise reduction of zero sites".to_string()))
}

fn convolver_for(ctx: &ComputeContext) -> FftConvolver {
    FftConvolver::new(ctx.config.fft.min_operand_len, ctx.config.fft.noise_floor)
}

fn instability(error: FftError) -> EngineError {
    EngineError::NumericInstability {
        method: Method::Fft,
        detail: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::fft::clip_round_off;
    use crate::core::models::synthetic::{CopiesPattern, SyntheticDatasetBuilder};
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::{EngineConfig, EngineConfigBuilder};
    use crate::engine::methods::exact;
    use crate::engine::progress::ProgressReporter;

    fn run_with(dataset: &Dataset, method: Method, config: &EngineConfig) -> Distribution {
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        method
            .run(dataset, &ComputeContext::new(config, &reporter, &cancel))
            .unwrap()
    }

    #[test]
    fn fft_matches_exact_when_transforms_are_forced() {
        let dataset = SyntheticDatasetBuilder::new(15)
            .copies(CopiesPattern::Varied)
            .seed(3)
            .build()
            .unwrap();
        let config = EngineConfigBuilder::new()
            .fft_min_operand_len(1)
            .build()
            .unwrap();

        let fast = run_with(&dataset, Method::Fft, &config);
        let slow = run_with(&dataset, Method::Exact, &config);

        assert_eq!(fast.support(), slow.support());
        for (x, y) in fast.values().iter().zip(slow.values()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn single_site_fft_result_is_the_site_itself() {
        let dataset = Dataset::new(vec![
            SiteModel::new("S", 1, -2, vec![0.1, 0.2, 0.3, 0.4]).unwrap(),
        ]).unwrap();
        let result = run_with(&dataset, Method::Fft, &EngineConfig::default());
        assert_eq!(result.offset(), -2);
        for (actual, expected) in result.values().iter().zip([0.1, 0.2, 0.3, 0.4]) {
            assert!((actual - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn negative_beyond_noise_floor_surfaces_as_fft_instability() {
        let support = crate::core::models::support::Support::new(3, 5).unwrap();
        let error = clip_round_off([0.4, -1e-9, 0.6], support, 1e-12).unwrap_err();
        match instability(error) {
            EngineError::NumericInstability { method, detail } => {
                assert_eq!(method, Method::Fft);
                assert!(detail.contains("charge 4"), "{}", detail);
                assert!(detail.contains("noise floor"), "{}", detail);
            }
            other => panic!("Expected NumericInstability, got {:?}", other),
        }
    }

    #[test]
    fn pairwise_reduction_handles_odd_site_counts() {
        let dataset = SyntheticDatasetBuilder::new(7).seed(11).build().unwrap();
        let config = EngineConfig::default();
        let fast = run_with(&dataset, Method::Fft, &config);
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        let slow = exact::run(&dataset, &ComputeContext::new(&config, &reporter, &cancel)).unwrap();
        assert_eq!(fast.support(), slow.support());
        for (x, y) in fast.values().iter().zip(slow.values()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
