//! # Traits
//!
//! $$
//! Q:[0,1]\to[0,\infty],\qquad Q(p)=\inf\{x: F(x)\ge p\}
//! $$
//!
use std::fmt::Debug;

use ndarray::Array1;
use rayon::prelude::*;

/// Scalar types a quantile can be evaluated in.
///
/// Evaluation itself runs in `f64`; the conversions below move values in and out.
pub trait FloatExt:
  num_traits::Float + num_traits::FromPrimitive + Default + Debug + Send + Sync + 'static
{
  fn from_f64_fast(v: f64) -> Self;
  fn to_f64_fast(self) -> f64;
}

impl FloatExt for f64 {
  #[inline(always)]
  fn from_f64_fast(v: f64) -> Self {
    v
  }

  #[inline(always)]
  fn to_f64_fast(self) -> f64 {
    self
  }
}

impl FloatExt for f32 {
  #[inline(always)]
  fn from_f64_fast(v: f64) -> Self {
    v as f32
  }

  #[inline(always)]
  fn to_f64_fast(self) -> f64 {
    self as f64
  }
}

/// Inverse CDF of a univariate distribution with fixed parameters.
///
/// Implementors never fail: out-of-domain input evaluates to NaN.
pub trait QuantileExt<T: FloatExt>: Send + Sync {
  fn quantile(&self, p: T) -> T;

  /// Element-wise quantile of an array of probabilities.
  fn quantile_array(&self, p: &Array1<T>) -> Array1<T> {
    p.mapv(|p| self.quantile(p))
  }

  /// Element-wise quantile evaluated on the rayon pool.
  fn quantile_par(&self, p: &[T]) -> Vec<T> {
    p.par_iter().map(|&p| self.quantile(p)).collect()
  }
}
