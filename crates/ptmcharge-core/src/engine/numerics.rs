use super::error::EngineError;
use super::methods::Method;
use crate::core::models::distribution::Distribution;
use tracing::{debug, warn};

/// Drift below this is plain rounding and is renormalized without a warning.
const ROUNDING_DRIFT: f64 = 1e-12;

/// Checks the total mass of an engine result and renormalizes it to exactly 1.
///
/// Drift above `max_drift` (or a non-finite total) is a [`EngineError::NumericInstability`].
pub(crate) fn finalize(
    method: Method,
    distribution: Distribution,
    max_drift: f64,
) -> Result<Distribution, EngineError> {
    let total = distribution.total_mass();
    if !total.is_finite() || total <= 0.0 {
        return Err(EngineError::NumericInstability {
            method,
            detail: format!("total mass is {}", total),
        });
    }

    let drift = (total - 1.0).abs();
    if drift > max_drift {
        return Err(EngineError::NumericInstability {
            method,
            detail: format!(
                "total mass drifted by {:.3e}, above the limit of {:.3e}",
                drift, max_drift
            ),
        });
    }
    if drift == 0.0 {
        return Ok(distribution);
    }
    if drift > ROUNDING_DRIFT {
        warn!(%method, drift, "Renormalizing result with non-trivial mass drift.");
    } else {
        debug!(%method, drift, "Renormalizing result.");
    }
    Ok(distribution.rescaled(1.0 / total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::support::Support;

    fn dist(values: Vec<f64>) -> Distribution {
        let hi = values.len() as i64 - 1;
        Distribution::from_parts(Support::new(0, hi).unwrap(), values)
    }

    #[test]
    fn small_drift_is_renormalized_away() {
        let result = finalize(Method::Exact, dist(vec![0.25, 0.75 + 1e-11]), 1e-9).unwrap();
        assert!((result.total_mass() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn drift_above_limit_is_numeric_instability() {
        let result = finalize(Method::Fft, dist(vec![0.25, 0.74]), 1e-9);
        assert!(matches!(
            result,
            Err(EngineError::NumericInstability {
                method: Method::Fft,
                ..
            })
        ));
    }

    #[test]
    fn zero_mass_is_numeric_instability() {
        let result = finalize(Method::Gaussian, dist(vec![0.0, 0.0]), 1.0);
        assert!(result.is_err());
    }
}
