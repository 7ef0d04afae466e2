use super::convolution::convolve;
use crate::core::models::distribution::Distribution;
use crate::core::models::support::Support;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FftError {
    #[error(
        "inverse transform produced {value:e} at charge {charge}, below the noise floor of -{floor:e}"
    )]
    NegativeBeyondNoiseFloor { charge: i64, value: f64, floor: f64 },
}

/// Convolution in the transform domain with a direct-sum fallback for short operands.
///
/// Operands are zero-padded to the next power of two at or above `len(a) + len(b) - 1`,
/// so the circular product never wraps around. Plans are cached in the planner for the
/// lifetime of the convolver, which is expected to live for one engine run.
pub struct FftConvolver {
    planner: FftPlanner<f64>,
    min_operand_len: usize,
    noise_floor: f64,
    clipped_mass: f64,
    transforms: usize,
}

impl FftConvolver {
    pub fn new(min_operand_len: usize, noise_floor: f64) -> Self {
        Self {
            planner: FftPlanner::new(),
            min_operand_len,
            noise_floor,
            clipped_mass: 0.0,
            transforms: 0,
        }
    }

    /// Total magnitude of negative round-off clipped to zero so far.
    pub fn clipped_mass(&self) -> f64 {
        self.clipped_mass
    }

    /// Number of convolutions that went through the transform path.
    pub fn transforms(&self) -> usize {
        self.transforms
    }

    pub fn convolve(&mut self, a: &Distribution, b: &Distribution) -> Result<Distribution, FftError> {
        if a.len().min(b.len()) < self.min_operand_len {
            return Ok(convolve(a, b));
        }
        self.transform_convolve(a, b)
    }

    fn transform_convolve(
        &mut self,
        a: &Distribution,
        b: &Distribution,
    ) -> Result<Distribution, FftError> {
        let support = a.support().minkowski_sum(&b.support());
        let out_len = support.len();
        let n = out_len.next_power_of_two();
        trace!(len_a = a.len(), len_b = b.len(), n, "FFT convolution");

        let forward = self.planner.plan_fft_forward(n);
        let inverse = self.planner.plan_fft_inverse(n);

        let mut fa = zero_padded(a.values(), n);
        let mut fb = zero_padded(b.values(), n);
        forward.process(&mut fa);
        forward.process(&mut fb);
        for (u, v) in fa.iter_mut().zip(&fb) {
            *u *= *v;
        }
        inverse.process(&mut fa);

        let scale = 1.0 / n as f64;
        let raw = fa.iter().take(out_len).map(|c| c.re * scale);
        let (values, clipped) = clip_round_off(raw, support, self.noise_floor)?;

        self.clipped_mass += clipped;
        self.transforms += 1;
        Ok(Distribution::from_parts(support, values))
    }
}

/// Clips negative inverse-transform round-off to zero.
///
/// Returns the clipped values and the total magnitude removed. A negative value whose
/// magnitude exceeds `noise_floor` is not round-off and fails the whole convolution.
pub(crate) fn clip_round_off(
    raw: impl IntoIterator<Item = f64>,
    support: Support,
    noise_floor: f64,
) -> Result<(Vec<f64>, f64), FftError> {
    let mut clipped = 0.0;
    let mut values = Vec::with_capacity(support.len());
    for (index, value) in raw.into_iter().enumerate() {
        if value >= 0.0 {
            values.push(value);
            continue;
        }
        if -value > noise_floor {
            return Err(FftError::NegativeBeyondNoiseFloor {
                charge: support.charge_at(index),
                value,
                floor: noise_floor,
            });
        }
        clipped -= value;
        values.push(0.0);
    }
    Ok((values, clipped))
}

fn zero_padded(values: &[f64], n: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); n];
    for (slot, &v) in buffer.iter_mut().zip(values) {
        slot.re = v;
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(lo: i64, values: Vec<f64>) -> Distribution {
        let hi = lo + values.len() as i64 - 1;
        Distribution::from_dense(Support::new(lo, hi).unwrap(), values).unwrap()
    }

    fn binomial_like(lo: i64, n: usize) -> Distribution {
        let raw: Vec<f64> = (0..n).map(|i| 1.0 + ((i * 7) % 5) as f64).collect();
        let total: f64 = raw.iter().sum();
        dist(lo, raw.into_iter().map(|x| x / total).collect())
    }

    #[test]
    fn short_operands_use_direct_convolution() {
        let mut convolver = FftConvolver::new(64, 1e-12);
        let a = binomial_like(-2, 5);
        let result = convolver.convolve(&a, &a).unwrap();
        assert_eq!(convolver.transforms(), 0);
        assert_eq!(result, convolve(&a, &a));
    }

    #[test]
    fn transform_path_matches_direct_convolution() {
        let mut convolver = FftConvolver::new(1, 1e-12);
        let a = binomial_like(-40, 81);
        let b = binomial_like(3, 130);
        let fast = convolver.convolve(&a, &b).unwrap();
        let slow = convolve(&a, &b);

        assert_eq!(convolver.transforms(), 1);
        assert_eq!(fast.support(), slow.support());
        for (x, y) in fast.values().iter().zip(slow.values()) {
            assert!((x - y).abs() < 1e-14);
        }
    }

    #[test]
    fn transform_path_never_returns_negative_values() {
        let mut convolver = FftConvolver::new(1, 1e-12);
        let sparse = dist(0, vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        let result = convolver.convolve(&sparse, &sparse).unwrap();
        assert!(result.values().iter().all(|&v| v >= 0.0));
        assert!((result.probability_at(7) - 0.5).abs() < 1e-14);
        assert!(result.probability_at(3).abs() < 1e-14);
    }

    #[test]
    fn round_off_within_the_noise_floor_is_clipped_to_zero() {
        let support = Support::new(-1, 1).unwrap();
        let (values, clipped) = clip_round_off([0.5, -1e-13, 0.5], support, 1e-12).unwrap();
        assert_eq!(values, vec![0.5, 0.0, 0.5]);
        assert_eq!(clipped, 1e-13);
    }

    #[test]
    fn negative_value_beyond_the_noise_floor_is_an_error() {
        let support = Support::new(-1, 1).unwrap();
        let result = clip_round_off([0.5, -1e-9, 0.5], support, 1e-12);
        assert_eq!(
            result,
            Err(FftError::NegativeBeyondNoiseFloor {
                charge: 0,
                value: -1e-9,
                floor: 1e-12
            })
        );
    }

    #[test]
    fn zero_noise_floor_tolerates_only_non_negative_values() {
        let support = Support::new(0, 2).unwrap();
        assert!(clip_round_off([0.25, 0.0, 0.75], support, 0.0).is_ok());
        assert!(clip_round_off([0.25, -f64::MIN_POSITIVE, 0.75], support, 0.0).is_err());
    }
}
