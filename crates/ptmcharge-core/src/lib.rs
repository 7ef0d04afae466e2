//! # ptmcharge
//!
//! Total-charge probability distributions for proteins with independent modification sites.
//!
//! Each site carries a discrete distribution over its charge states and a copy count. The
//! total charge is the sum of all those independent variables, and this library computes its
//! probability mass function over the full theoretical charge range without losing mass or
//! misaligning supports.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Immutable models (`SiteModel`, `Dataset`, `Support`,
//!   `Distribution`) and pure numerical kernels.
//!
//! - **[`engine`]: The Logic Core.** Four interchangeable engines (enumeration, exact
//!   convolution, FFT convolution, Gaussian approximation), the adaptive selector that picks
//!   one by problem size, the aligner, configuration, progress and cancellation.
//!
//! - **[`workflows`]: The Public API.** `compute`, `compare` and `benchmark` entry points.
//!
//! ## Example
//!
//! ```
//! use ptmcharge::core::models::{dataset::Dataset, site::SiteModel};
//! use ptmcharge::workflows::compute::compute;
//!
//! let site = SiteModel::new("K12", 2, -1, vec![0.2, 0.6, 0.2])?;
//! let result = compute(&Dataset::new(vec![site])?)?;
//! assert_eq!(result.distribution.offset(), -2);
//! assert!((result.distribution.probability_at(0) - 0.44).abs() < 1e-12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
