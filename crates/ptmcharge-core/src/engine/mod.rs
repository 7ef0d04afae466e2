//! # Engine Module
//!
//! This module holds the computational layer between the immutable models in
//! [`crate::core`] and the user-facing [`crate::workflows`].
//!
//! ## Overview
//!
//! Four interchangeable engines ([`methods`]) turn a dataset into a total-charge
//! distribution. The [`selector`] picks one from the problem size, the [`align`]er puts
//! two results on a common support so they can be compared, and `numerics` enforces
//! mass conservation on every exact result.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Selection thresholds, FFT and Gaussian tuning, drift limit, agreement bands
//! - **Context** ([`context`]) - Configuration, progress reporter and cancellation token bundled for an engine run
//! - **Cancellation** ([`cancel`]) - Cooperative cancellation checked between convolution steps
//! - **Progress Monitoring** ([`progress`]) - Phase and task events forwarded to a caller callback
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod align;
pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod methods;
pub(crate) mod numerics;
pub mod progress;
pub mod selector;
