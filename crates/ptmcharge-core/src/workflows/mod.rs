//! # Workflows Module
//!
//! High-level entry points that tie the engines and the models together.
//!
//! - **Compute** ([`compute`]) - Selects an engine for a dataset (or takes an explicit one)
//!   and returns the distribution with the selection and wall-clock time.
//! - **Compare** ([`compare`]) - Runs two engines on the same dataset, aligns their outputs
//!   and reports maximum and RMS differences.
//! - **Benchmark** ([`benchmark`]) - Times every applicable engine and compares each one
//!   against a ground-truth reference.

pub mod benchmark;
pub mod compare;
pub mod compute;
