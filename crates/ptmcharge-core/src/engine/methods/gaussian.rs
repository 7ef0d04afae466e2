use super::Method;
use crate::core::math::normal::interval_mass;
use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use crate::core::models::support::Support;
use crate::engine::context::ComputeContext;
use crate::engine::error::EngineError;
use tracing::{info, instrument};

/// Central-limit approximation of the total-charge distribution.
///
/// Per-site means and variances are scaled by `copies` and summed. Each integer charge `x`
/// in `[floor(μ - kσ), ceil(μ + kσ)]` (clipped to the theoretical support) receives the
/// normal mass of `(x - ½, x + ½]`, and the window is renormalized to sum to 1.
#[instrument(skip_all, name = "gaussian_engine")]
pub fn run(dataset: &Dataset, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
    ctx.checkpoint()?;

    let (mu, variance) = dataset.iter().fold((0.0, 0.0), |(m, v), site| {
        let copies = f64::from(site.copies());
        (m + copies * site.mean(), v + copies * site.variance())
    });
    let sigma = variance.sqrt();
    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        mu,
        sigma,
        "Starting Gaussian approximation."
    );

    if !mu.is_finite() || !sigma.is_finite() {
        return Err(EngineError::NumericInstability {
            method: Method::Gaussian,
            detail: format!("moments are not finite (mu = {}, sigma = {})", mu, sigma),
        });
    }
    if sigma == 0.0 {
        return Ok(Distribution::point_mass(mu.round() as i64));
    }

    let k = ctx.config.gaussian.tail_sigmas;
    let theoretical = dataset.theoretical_support();
    let window = Support::new((mu - k * sigma).floor() as i64, (mu + k * sigma).ceil() as i64)?
        .intersection(&theoretical)
        .ok_or_else(|| {
            EngineError::Internal(format!(
                "Gaussian window around {} does not meet the theoretical support {}",
                mu, theoretical
            ))
        })?;

    let values: Vec<f64> = window
        .charges()
        .map(|x| interval_mass(x as f64 - 0.5, x as f64 + 0.5, mu, sigma))
        .collect();
    let total: f64 = values.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return Err(EngineError::NumericInstability {
            method: Method::Gaussian,
            detail: format!("window {} carries no probability mass", window),
        });
    }

    info!(%window, truncated_mass = 1.0 - total, "Gaussian window evaluated.");
    Ok(Distribution::from_parts(window, values).rescaled(1.0 / total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::site::SiteModel;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::EngineConfig;
    use crate::engine::progress::ProgressReporter;

    fn run_default(dataset: &Dataset) -> Distribution {
        let config = EngineConfig::default();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        run(dataset, &ComputeContext::new(&config, &reporter, &cancel)).unwrap()
    }

    #[test]
    fn deterministic_sites_yield_point_mass_at_rounded_mean() {
        let dataset = Dataset::new(vec![
            SiteModel::new("A", 3, 1, vec![1.0]).unwrap(),
            SiteModel::new("B", 1, -2, vec![0.0, 1.0]).unwrap(),
        ]).unwrap();
        assert_eq!(run_default(&dataset), Distribution::point_mass(2));
    }

    #[test]
    fn output_is_normalized_and_centered_on_the_mean() {
        let dataset = Dataset::new(vec![SiteModel::new("K", 40, -1, vec![0.3, 0.4, 0.3]).unwrap()]).unwrap();
        let result = run_default(&dataset);
        assert!((result.total_mass() - 1.0).abs() < 1e-12);
        assert!(result.mean().abs() < 1e-9);
        assert_eq!(result.mode().0, 0);
    }

    #[test]
    fn window_is_clipped_to_the_theoretical_support() {
        let dataset = Dataset::new(vec![SiteModel::new("K", 2, 0, vec![0.5, 0.5]).unwrap()]).unwrap();
        let result = run_default(&dataset);
        assert_eq!(result.support(), Support::new(0, 2).unwrap());
    }

    #[test]
    fn window_spans_the_configured_number_of_sigmas() {
        let dataset = Dataset::new(vec![SiteModel::new("K", 100, -1, vec![0.25, 0.5, 0.25]).unwrap()]).unwrap();
        // sigma = sqrt(100 * 0.5) ~ 7.07, so the window is [-43, 43].
        let result = run_default(&dataset);
        assert_eq!(result.support(), Support::new(-43, 43).unwrap());
    }
}
