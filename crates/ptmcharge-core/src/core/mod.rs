//! # Core Module
//!
//! Stateless building blocks of the total-charge computation.
//!
//! - **Models** ([`models`]) - Sites, datasets, supports and dense distributions, each
//!   validated at construction
//! - **Math** ([`math`]) - Direct and transform-domain convolution, binary exponentiation
//!   of convolution powers, and normal tail masses
//!
//! Nothing in this module keeps state between calls or reads files.

pub mod math;
pub mod models;
