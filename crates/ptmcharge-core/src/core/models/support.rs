use super::error::ModelError;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive, gap-free range of integer charges.
///
/// Every dense array in the engine is indexed against a `Support`, so index `i`
/// always corresponds to charge `lo + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Support {
    lo: i64,
    hi: i64,
}

impl Support {
    pub fn new(lo: i64, hi: i64) -> Result<Self, ModelError> {
        if lo > hi {
            return Err(ModelError::InvalidSupport { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub const fn point(charge: i64) -> Self {
        Self {
            lo: charge,
            hi: charge,
        }
    }

    #[inline]
    pub fn lo(&self) -> i64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> i64 {
        self.hi
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.hi.abs_diff(self.lo) as usize).saturating_add(1)
    }

    pub fn contains(&self, charge: i64) -> bool {
        (self.lo..=self.hi).contains(&charge)
    }

    pub fn index_of(&self, charge: i64) -> Option<usize> {
        self.contains(charge)
            .then(|| charge.abs_diff(self.lo) as usize)
    }

    #[inline]
    pub fn charge_at(&self, index: usize) -> i64 {
        self.lo + index as i64
    }

    pub fn charges(&self) -> RangeInclusive<i64> {
        self.lo..=self.hi
    }

    /// Support of the sum of two independent variables living on `self` and `other`.
    ///
    /// Bounds saturate at the `i64` limits. Supports derived from a [`Dataset`] stay
    /// within `±MAX_TOTAL_CHARGE` and never get there.
    ///
    /// [`Dataset`]: super::dataset::Dataset
    pub fn minkowski_sum(&self, other: &Support) -> Support {
        Support {
            lo: self.lo.saturating_add(other.lo),
            hi: self.hi.saturating_add(other.hi),
        }
    }

    /// Support of the sum of `times` independent copies of a variable on `self`.
    ///
    /// Saturates like [`Support::minkowski_sum`].
    pub fn repeated(&self, times: u32) -> Support {
        let times = i64::from(times);
        Support {
            lo: self.lo.saturating_mul(times),
            hi: self.hi.saturating_mul(times),
        }
    }

    pub fn union(&self, other: &Support) -> Support {
        Support {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn intersection(&self, other: &Support) -> Option<Support> {
        Support::new(self.lo.max(other.lo), self.hi.min(other.hi)).ok()
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:+}, {:+}]", self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_bounds() {
        assert_eq!(
            Support::new(3, -3),
            Err(ModelError::InvalidSupport { lo: 3, hi: -3 })
        );
    }

    #[test]
    fn len_counts_both_endpoints() {
        assert_eq!(Support::new(-2, 2).unwrap().len(), 5);
        assert_eq!(Support::point(7).len(), 1);
    }

    #[test]
    fn index_of_maps_charges_relative_to_lower_bound() {
        let support = Support::new(-3, 1).unwrap();
        assert_eq!(support.index_of(-3), Some(0));
        assert_eq!(support.index_of(0), Some(3));
        assert_eq!(support.index_of(2), None);
        assert_eq!(support.charge_at(4), 1);
    }

    #[test]
    fn minkowski_sum_adds_bounds() {
        let a = Support::new(-2, 2).unwrap();
        let b = Support::new(0, 3).unwrap();
        assert_eq!(a.minkowski_sum(&b), Support::new(-2, 5).unwrap());
    }

    #[test]
    fn repeated_scales_bounds_by_copy_count() {
        let a = Support::new(-1, 2).unwrap();
        assert_eq!(a.repeated(3), Support::new(-3, 6).unwrap());
        assert_eq!(a.repeated(0), Support::point(0));
    }

    #[test]
    fn extreme_bounds_saturate_instead_of_overflowing() {
        let wide = Support::new(i64::MIN, i64::MAX).unwrap();
        assert_eq!(wide.len(), usize::MAX);
        assert_eq!(wide.index_of(i64::MAX), Some(u64::MAX as usize));

        let high = Support::new(i64::MAX / 2, i64::MAX / 2 + 1).unwrap();
        assert_eq!(high.repeated(3), Support::new(i64::MAX, i64::MAX).unwrap());
        assert_eq!(high.minkowski_sum(&high).hi(), i64::MAX);
    }

    #[test]
    fn union_and_intersection_of_disjoint_supports() {
        let a = Support::new(-5, -2).unwrap();
        let b = Support::new(1, 4).unwrap();
        assert_eq!(a.union(&b), Support::new(-5, 4).unwrap());
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn display_uses_signed_charges() {
        assert_eq!(Support::new(-2, 3).unwrap().to_string(), "[-2, +3]");
    }
}
