//! # Distributions
//!
//! $$
//! X\sim\chi_k\iff X^2\sim\Gamma\!\left(\tfrac k2,\tfrac12\right)
//! $$
//!
pub mod chi;
pub mod gamma;

/// Configuration for the root solver behind the quantile functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileConfig {
  /// Relative tolerance on the root and on the CDF residual.
  pub tolerance: f64,
  /// Iteration cap for the Brent solver.
  pub max_iter: usize,
}

impl Default for QuantileConfig {
  fn default() -> Self {
    Self {
      tolerance: 1e-13,
      max_iter: 200,
    }
  }
}
