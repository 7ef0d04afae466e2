//! Numerical kernels shared by the distribution engines: direct convolution and its
//! binary-exponentiation ladder, transform-domain convolution, and normal tail masses.

pub mod convolution;
pub mod fft;
pub mod normal;
