use super::error::ModelError;
use super::support::Support;
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum deviation of a site's probability sum from 1 that is still accepted.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Largest absolute total charge a dataset may reach.
///
/// Every support derived from a dataset stays within `±MAX_TOTAL_CHARGE`, so charge
/// arithmetic never overflows `i64` and support lengths always fit in `usize`.
pub const MAX_TOTAL_CHARGE: i64 = i32::MAX as i64;

/// One modification site: a discrete charge-state distribution repeated `copies` times.
///
/// The probabilities cover the contiguous range `[min_charge, max_charge]`, including
/// interior states with zero probability. Accepted probabilities are rescaled to sum
/// to exactly one so that rounding in the input never accumulates across copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteModel {
    id: String,
    copies: u32,
    min_charge: i64,
    probabilities: Vec<f64>,
}

impl SiteModel {
    pub fn new(
        id: impl Into<String>,
        copies: i64,
        min_charge: i64,
        probabilities: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let copies = validate_copies(&id, copies)?;
        let probabilities = validate_probabilities(&id, probabilities)?;
        validate_charge_range(&id, copies, min_charge, probabilities.len())?;

        Ok(Self {
            id,
            copies,
            min_charge,
            probabilities,
        })
    }

    /// Builds a site from a sparse `charge -> probability` mapping.
    ///
    /// The support spans the smallest to the largest listed charge; charges in between
    /// that are not listed get probability zero.
    pub fn from_map(
        id: impl Into<String>,
        copies: i64,
        probabilities: &BTreeMap<i64, f64>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let (Some((&min_charge, _)), Some((&max_charge, _))) = (
            probabilities.first_key_value(),
            probabilities.last_key_value(),
        ) else {
            validate_copies(&id, copies)?;
            return Err(ModelError::InvalidSiteProbabilities {
                site: id,
                reason: "no charge states were given".to_string(),
            });
        };

        let dense = (min_charge..=max_charge)
            .map(|charge| probabilities.get(&charge).copied().unwrap_or(0.0))
            .collect();
        Self::new(id, copies, min_charge, dense)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn min_charge(&self) -> i64 {
        self.min_charge
    }

    pub fn max_charge(&self) -> i64 {
        self.min_charge + (self.probabilities.len() as i64 - 1)
    }

    /// Largest absolute total charge all copies of this site can contribute.
    pub fn charge_magnitude(&self) -> i64 {
        let extreme = self.min_charge.abs().max(self.max_charge().abs());
        extreme * i64::from(self.copies)
    }

    /// The support of a single copy of this site.
    pub fn support(&self) -> Support {
        Support::point(self.min_charge).union(&Support::point(self.max_charge()))
    }

    pub fn state_count(&self) -> usize {
        self.probabilities.len()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn probability_at(&self, charge: i64) -> f64 {
        self.support()
            .index_of(charge)
            .map_or(0.0, |index| self.probabilities[index])
    }

    /// Iterates over `(charge, probability)` for every state in the support.
    pub fn states(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(index, &p)| (self.min_charge + index as i64, p))
    }

    /// Expected charge of a single copy.
    pub fn mean(&self) -> f64 {
        self.states().map(|(charge, p)| charge as f64 * p).sum()
    }

    /// Charge variance of a single copy.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.states()
            .map(|(charge, p)| {
                let deviation = charge as f64 - mean;
                deviation * deviation * p
            })
            .sum()
    }
}

fn validate_copies(site: &str, copies: i64) -> Result<u32, ModelError> {
    if copies <= 0 {
        return Err(ModelError::NonPositiveCopies {
            site: site.to_string(),
            copies,
        });
    }
    u32::try_from(copies).map_err(|_| ModelError::CopiesOutOfRange {
        site: site.to_string(),
        copies,
        max: u32::MAX,
    })
}

fn validate_charge_range(
    site: &str,
    copies: u32,
    min_charge: i64,
    states: usize,
) -> Result<(), ModelError> {
    let too_large = || ModelError::ChargeRangeTooLarge {
        site: site.to_string(),
        bound: MAX_TOTAL_CHARGE,
    };
    let span = i64::try_from(states - 1).map_err(|_| too_large())?;
    let max_charge = min_charge.checked_add(span).ok_or_else(too_large)?;
    let extreme = min_charge.unsigned_abs().max(max_charge.unsigned_abs());
    match extreme.checked_mul(u64::from(copies)) {
        Some(magnitude) if magnitude <= MAX_TOTAL_CHARGE.unsigned_abs() => Ok(()),
        _ => Err(too_large()),
    }
}

fn validate_probabilities(site: &str, probabilities: Vec<f64>) -> Result<Vec<f64>, ModelError> {
    let invalid = |reason: String| ModelError::InvalidSiteProbabilities {
        site: site.to_string(),
        reason,
    };

    if probabilities.is_empty() {
        return Err(invalid("no charge states were given".to_string()));
    }
    if let Some((index, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(invalid(format!(
            "state {} has probability {}, expected a finite non-negative value",
            index, p
        )));
    }

    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(invalid(format!(
            "probabilities sum to {:.9}, expected 1 within {:e}",
            sum, PROBABILITY_SUM_TOLERANCE
        )));
    }

    Ok(probabilities.into_iter().map(|p| p / sum).collect())
}
