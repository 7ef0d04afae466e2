use crate::core::models::distribution::Distribution;
use crate::core::models::support::Support;

/// Two distributions laid out densely over the union of their supports.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    support: Support,
    left: Vec<f64>,
    right: Vec<f64>,
}

/// Pads `a` and `b` with zeros so both cover the union of their supports.
pub fn align(a: &Distribution, b: &Distribution) -> AlignedPair {
    let support = a.support().union(&b.support());
    let left = support.charges().map(|c| a.probability_at(c)).collect();
    let right = support.charges().map(|c| b.probability_at(c)).collect();
    AlignedPair {
        support,
        left,
        right,
    }
}

impl AlignedPair {
    pub fn support(&self) -> Support {
        self.support
    }

    pub fn left(&self) -> &[f64] {
        &self.left
    }

    pub fn right(&self) -> &[f64] {
        &self.right
    }

    /// Iterates over `(charge, left - right)`.
    pub fn differences(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.support
            .charges()
            .zip(self.left.iter().zip(&self.right))
            .map(|(charge, (l, r))| (charge, l - r))
    }

    /// Largest absolute difference and the (lowest) charge where it occurs.
    pub fn peak_difference(&self) -> (i64, f64) {
        self.differences()
            .fold((self.support.lo(), 0.0), |best, (charge, d)| {
                if d.abs() > best.1 { (charge, d.abs()) } else { best }
            })
    }

    pub fn max_abs_diff(&self) -> f64 {
        self.peak_difference().1
    }

    /// Root mean square difference over the aligned support.
    pub fn rmse(&self) -> f64 {
        let sum_sq: f64 = self.differences().map(|(_, d)| d * d).sum();
        (sum_sq / self.support.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(lo: i64, values: Vec<f64>) -> Distribution {
        let hi = lo + values.len() as i64 - 1;
        Distribution::from_dense(Support::new(lo, hi).unwrap(), values).unwrap()
    }

    #[test]
    fn disjoint_supports_are_padded_with_zeros() {
        let a = dist(-3, vec![0.5, 0.5]);
        let b = dist(1, vec![1.0]);
        let pair = align(&a, &b);
        assert_eq!(pair.support(), Support::new(-3, 1).unwrap());
        assert_eq!(pair.left(), &[0.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(pair.right(), &[0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn identical_inputs_have_zero_difference() {
        let a = dist(-1, vec![0.2, 0.6, 0.2]);
        let pair = align(&a, &a.clone());
        assert_eq!(pair.max_abs_diff(), 0.0);
        assert_eq!(pair.rmse(), 0.0);
    }

    #[test]
    fn peak_difference_reports_charge_and_magnitude() {
        let a = dist(0, vec![0.5, 0.5]);
        let b = dist(0, vec![0.2, 0.3, 0.5]);
        let (charge, diff) = align(&a, &b).peak_difference();
        assert_eq!(charge, 2);
        assert!((diff - 0.5).abs() < 1e-15);
    }

    #[test]
    fn rmse_averages_over_the_union_support() {
        let a = dist(0, vec![1.0]);
        let b = dist(1, vec![1.0]);
        let pair = align(&a, &b);
        assert!((pair.rmse() - 1.0).abs() < 1e-15);
        assert_eq!(pair.max_abs_diff(), 1.0);
    }
}
