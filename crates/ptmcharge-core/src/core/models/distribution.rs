use super::error::ModelError;
use super::site::{PROBABILITY_SUM_TOLERANCE, SiteModel};
use super::support::Support;
use serde::Serialize;

/// A dense probability mass function over total charge.
///
/// Index `i` of the value array corresponds to charge `offset + i`. The array never
/// has implicit gaps: every charge of the support has an explicit entry, including
/// charges that carry zero probability. The support is always supplied by the caller
/// or derived mechanically (from a site, or as the sum of two supports during
/// convolution); it is never inferred from which charges happened to be observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    /// Charge of the first entry of `values`.
    offset: i64,
    /// Probabilities for every charge from `offset` to `offset + values.len() - 1`.
    values: Vec<f64>,
}

impl Distribution {
    /// Creates the distribution that puts all mass on a single charge.
    ///
    /// A point mass at charge 0 is the identity element of convolution and is the
    /// result for an empty dataset.
    pub fn point_mass(charge: i64) -> Self {
        Self {
            offset: charge,
            values: vec![1.0],
        }
    }

    /// Creates the distribution of a single copy of `site`.
    pub fn from_site(site: &SiteModel) -> Self {
        Self {
            offset: site.min_charge(),
            values: site.probabilities().to_vec(),
        }
    }

    /// Creates a distribution from a support and one value per charge in it.
    ///
    /// # Arguments
    ///
    /// * `support` - The full range of charges the values describe.
    /// * `values` - One probability per charge, in ascending charge order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DenseLengthMismatch`] if `values` does not have exactly
    /// one entry per charge of `support`, [`ModelError::InvalidProbability`] if any
    /// value is negative or not finite, and [`ModelError::MassNotNormalized`] if the
    /// values do not sum to 1 within [`PROBABILITY_SUM_TOLERANCE`].
    pub fn from_dense(support: Support, values: Vec<f64>) -> Result<Self, ModelError> {
        if values.len() != support.len() {
            return Err(ModelError::DenseLengthMismatch {
                expected: support.len(),
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ModelError::InvalidProbability {
                charge: support.charge_at(index),
                value,
            });
        }
        let total: f64 = values.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ModelError::MassNotNormalized {
                total,
                tolerance: PROBABILITY_SUM_TOLERANCE,
            });
        }
        Ok(Self::from_parts(support, values))
    }

    /// Internal constructor for engine code that has already derived `support`.
    pub(crate) fn from_parts(support: Support, values: Vec<f64>) -> Self {
        debug_assert_eq!(support.len(), values.len());
        Self {
            offset: support.lo(),
            values,
        }
    }

    /// Returns the charge corresponding to index 0.
    #[inline]
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Returns the number of charges in the support.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Retrieves the probability stored at `index`.
    ///
    /// # Return
    ///
    /// Returns `Some(p)` for `index < len()`, otherwise `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Retrieves the probability of a total charge.
    ///
    /// Charges outside the support have probability zero.
    pub fn probability_at(&self, charge: i64) -> f64 {
        self.support()
            .index_of(charge)
            .map_or(0.0, |index| self.values[index])
    }

    pub fn min_charge(&self) -> i64 {
        self.offset
    }

    pub fn max_charge(&self) -> i64 {
        self.offset + (self.values.len() as i64 - 1)
    }

    pub fn support(&self) -> Support {
        Support::point(self.min_charge()).union(&Support::point(self.max_charge()))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over `(charge, probability)` pairs in ascending charge order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, &p)| (self.offset + index as i64, p))
    }

    /// Sum of all probabilities. Equals 1 within tolerance for engine output.
    pub fn total_mass(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.iter().map(|(charge, p)| charge as f64 * p).sum()
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.iter()
            .map(|(charge, p)| {
                let deviation = charge as f64 - mean;
                deviation * deviation * p
            })
            .sum()
    }

    /// Returns the most probable charge and its probability.
    ///
    /// Ties resolve to the lowest charge.
    pub fn mode(&self) -> (i64, f64) {
        self.iter()
            .fold((self.offset, f64::NEG_INFINITY), |best, (charge, p)| {
                if p > best.1 { (charge, p) } else { best }
            })
    }

    /// Multiplies every entry by `factor`.
    pub(crate) fn rescaled(mut self, factor: f64) -> Self {
        self.values.iter_mut().for_each(|p| *p *= factor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn three_point() -> Distribution {
        Distribution::from_dense(Support::new(-1, 1).unwrap(), vec![0.25, 0.5, 0.25]).unwrap()
    }

    #[test]
    fn point_mass_has_single_entry_at_charge() {
        let dist = Distribution::point_mass(0);
        assert_eq!(dist.offset(), 0);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.get(0), Some(1.0));
        assert_eq!(dist.support(), Support::point(0));
    }

    #[test]
    fn from_site_copies_site_support_and_probabilities() {
        let site = SiteModel::new("S1", 3, -2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let dist = Distribution::from_site(&site);
        assert_eq!(dist.offset(), -2);
        assert_eq!(dist.max_charge(), 1);
        assert_eq!(dist.values(), site.probabilities());
    }

    #[test]
    fn from_dense_rejects_length_mismatch() {
        let result = Distribution::from_dense(Support::new(0, 3).unwrap(), vec![0.5, 0.5]);
        assert_eq!(
            result,
            Err(ModelError::DenseLengthMismatch {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn from_dense_rejects_negative_value_and_reports_its_charge() {
        let result =
            Distribution::from_dense(Support::new(5, 7).unwrap(), vec![0.5, -0.1, 0.6]);
        assert_eq!(
            result,
            Err(ModelError::InvalidProbability {
                charge: 6,
                value: -0.1
            })
        );
    }

    #[test]
    fn from_dense_rejects_values_that_do_not_sum_to_one() {
        let support = Support::new(0, 1).unwrap();
        for values in [vec![0.0, 0.0], vec![3.0, 5.0], vec![0.5, 0.49]] {
            let total: f64 = values.iter().sum();
            assert_eq!(
                Distribution::from_dense(support, values),
                Err(ModelError::MassNotNormalized {
                    total,
                    tolerance: PROBABILITY_SUM_TOLERANCE
                })
            );
        }
    }

    #[test]
    fn from_dense_accepts_rounding_within_tolerance() {
        let dist = Distribution::from_dense(Support::new(0, 1).unwrap(), vec![0.5, 0.5 + 1e-9])
            .unwrap();
        assert_eq!(dist.len(), 2);
    }

    #[test]
    fn from_dense_keeps_explicit_zero_entries() {
        let dist =
            Distribution::from_dense(Support::new(-2, 2).unwrap(), vec![0.5, 0.0, 0.0, 0.0, 0.5])
                .unwrap();
        assert_eq!(dist.len(), 5);
        assert_eq!(dist.probability_at(0), 0.0);
        assert_eq!(dist.probability_at(2), 0.5);
    }

    #[test]
    fn probability_at_is_zero_outside_support() {
        let dist = three_point();
        assert_eq!(dist.probability_at(-2), 0.0);
        assert_eq!(dist.probability_at(10), 0.0);
        assert_eq!(dist.probability_at(0), 0.5);
    }

    #[test]
    fn iter_yields_charges_in_ascending_order() {
        let pairs: Vec<_> = three_point().iter().collect();
        assert_eq!(pairs, vec![(-1, 0.25), (0, 0.5), (1, 0.25)]);
    }

    #[test]
    fn moments_of_symmetric_distribution() {
        let dist = three_point();
        assert!(f64_approx_equal(dist.total_mass(), 1.0));
        assert!(f64_approx_equal(dist.mean(), 0.0));
        assert!(f64_approx_equal(dist.variance(), 0.5));
    }

    #[test]
    fn mode_prefers_lowest_charge_on_ties() {
        let dist =
            Distribution::from_dense(Support::new(3, 5).unwrap(), vec![0.4, 0.2, 0.4]).unwrap();
        assert_eq!(dist.mode(), (3, 0.4));
    }

    #[test]
    fn rescaled_multiplies_every_entry() {
        let dist = three_point().rescaled(2.0);
        assert_eq!(dist.values(), &[0.5, 1.0, 0.5]);
    }
}
