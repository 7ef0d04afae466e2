//! # Core Models Module
//!
//! This module contains the data structures that describe the inputs and outputs of
//! a total-charge computation.
//!
//! ## Overview
//!
//! Inputs are [`site::SiteModel`]s collected into a [`dataset::Dataset`]; outputs are dense
//! [`distribution::Distribution`]s indexed against a [`support::Support`]. All models are
//! immutable once constructed and validate their invariants at construction time, so the
//! engines never see a malformed site.
//!
//! ## Key Components
//!
//! - [`site`] - One modification site: charge-state probabilities and a copy count
//! - [`dataset`] - Ordered collection of sites with derived totals and theoretical support
//! - [`support`] - Inclusive, gap-free integer charge range
//! - [`distribution`] - Dense probability mass function over total charge
//! - [`synthetic`] - Seeded generator of random datasets for stress testing
//! - [`error`] - Validation errors raised while constructing models
//!
//! ## Usage
//!
//! ```
//! use ptmcharge::core::models::{dataset::Dataset, site::SiteModel};
//!
//! let site = SiteModel::new("K12", 2, -1, vec![0.2, 0.6, 0.2])?;
//! let dataset = Dataset::new(vec![site])?;
//! assert_eq!(dataset.total_copies(), 2);
//! assert_eq!(dataset.theoretical_support().lo(), -2);
//! # Ok::<(), ptmcharge::core::models::error::ModelError>(())
//! ```

pub mod dataset;
pub mod distribution;
pub mod error;
pub mod site;
pub mod support;
pub mod synthetic;
