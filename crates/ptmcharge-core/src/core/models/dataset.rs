use super::error::ModelError;
use super::site::{MAX_TOTAL_CHARGE, SiteModel};
use super::support::Support;
use serde::Serialize;

/// An ordered collection of independent modification sites.
///
/// Site order never changes the computed distribution but is kept as given so
/// logs and reports stay reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    sites: Vec<SiteModel>,
}

impl Dataset {
    /// Collects `sites` into a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ChargeRangeTooLarge`] naming the first site at which the
    /// combined charge range would exceed `±MAX_TOTAL_CHARGE`.
    pub fn new(sites: Vec<SiteModel>) -> Result<Self, ModelError> {
        let mut magnitude = 0i64;
        for site in &sites {
            magnitude += site.charge_magnitude();
            if magnitude > MAX_TOTAL_CHARGE {
                return Err(ModelError::ChargeRangeTooLarge {
                    site: site.id().to_string(),
                    bound: MAX_TOTAL_CHARGE,
                });
            }
        }
        Ok(Self { sites })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sites(&self) -> &[SiteModel] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteModel> {
        self.sites.iter()
    }

    /// Total number of independent repeated sites, `N = Σ copies`.
    pub fn total_copies(&self) -> u64 {
        self.sites.iter().map(|site| u64::from(site.copies())).sum()
    }

    /// The full range of total charges any assignment of states can produce.
    ///
    /// `lo = Σ copies·min_charge`, `hi = Σ copies·max_charge`. An empty dataset has the
    /// single-point support `[0, 0]`.
    pub fn theoretical_support(&self) -> Support {
        self.sites
            .iter()
            .map(|site| site.support().repeated(site.copies()))
            .fold(Support::point(0), |acc, support| acc.minkowski_sum(&support))
    }

    /// Size of the full cross-product of states, `Π state_count^copies`, saturating at
    /// `u128::MAX`.
    pub fn combination_count(&self) -> u128 {
        self.sites.iter().fold(1u128, |acc, site| {
            let states = site.state_count() as u128;
            acc.saturating_mul(states.saturating_pow(site.copies()))
        })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SiteModel;
    type IntoIter = std::slice::Iter<'a, SiteModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}
