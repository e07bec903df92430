//! # Chi Quantile
//!
//! $$
//! Q_\chi(p;k)=\sqrt{F^{-1}_{\Gamma}\!\left(p;\tfrac k2,\tfrac12\right)}
//! $$
//!
use anyhow::ensure;
use anyhow::Result;

use super::gamma::GammaQuantile;
use super::QuantileConfig;
use crate::traits::FloatExt;
use crate::traits::QuantileExt;

/// Rate of the gamma law followed by a squared chi variable.
const CHI_SQUARED_RATE: f64 = 0.5;

/// Quantile function of a chi distribution with `k` degrees of freedom.
///
/// The squared variable is chi-squared, i.e. gamma with shape `k / 2` and rate `1 / 2`,
/// so every evaluation is the square root of one gamma quantile. The gamma quantile is
/// built once at construction and reused.
///
/// Invalid input never panics: a negative, NaN or infinite `k`, or a probability outside
/// `[0, 1]`, evaluates to NaN. Use [`ChiQuantile::checked`] and
/// [`ChiQuantile::checked_quantile`] to get an error instead.
#[derive(Debug, Clone, Copy)]
pub struct ChiQuantile<T: FloatExt> {
  k: T,
  gamma: GammaQuantile,
}

impl<T: FloatExt> ChiQuantile<T> {
  pub fn new(k: T) -> Self {
    Self::with_config(k, QuantileConfig::default())
  }

  pub fn with_config(k: T, config: QuantileConfig) -> Self {
    let df = k.to_f64_fast();
    if !(df >= 0.0 && df.is_finite()) {
      tracing::debug!(k = df, "invalid degrees of freedom, chi quantile evaluates to NaN");
    }

    Self {
      k,
      gamma: GammaQuantile::with_config(df / 2.0, CHI_SQUARED_RATE, config),
    }
  }

  /// Like [`ChiQuantile::new`], but rejects a NaN, negative or infinite `k`.
  pub fn checked(k: T) -> Result<Self> {
    let df = k.to_f64_fast();
    ensure!(!df.is_nan(), "degrees of freedom must be a number, got NaN");
    ensure!(df >= 0.0, "degrees of freedom must be non-negative, got {df}");
    ensure!(df.is_finite(), "degrees of freedom must be finite, got {df}");

    Ok(Self::new(k))
  }

  pub fn k(&self) -> T {
    self.k
  }

  /// The captured gamma quantile of the squared variable.
  pub fn gamma(&self) -> &GammaQuantile {
    &self.gamma
  }

  pub fn quantile(&self, p: T) -> T {
    T::from_f64_fast(self.gamma.quantile(p.to_f64_fast()).sqrt())
  }

  /// Like [`ChiQuantile::quantile`], but errors where the unchecked path returns NaN.
  pub fn checked_quantile(&self, p: T) -> Result<T> {
    ensure!(
      self.gamma.is_valid(),
      "degrees of freedom must be a finite non-negative number, got {:?}",
      self.k
    );
    let p64 = p.to_f64_fast();
    ensure!(
      (0.0..=1.0).contains(&p64),
      "probability must be in [0, 1], got {p64}"
    );

    Ok(self.quantile(p))
  }
}

impl<T: FloatExt> QuantileExt<T> for ChiQuantile<T> {
  fn quantile(&self, p: T) -> T {
    ChiQuantile::quantile(self, p)
  }
}

/// Closure form of [`ChiQuantile`]: captures `k` and returns `p -> Q(p)`.
pub fn factory<T: FloatExt>(k: T) -> impl Fn(T) -> T + Send + Sync + Clone {
  let chi = ChiQuantile::new(k);
  move |p| chi.quantile(p)
}

/// One-shot chi quantile at `p` for `k` degrees of freedom.
pub fn quantile<T: FloatExt>(p: T, k: T) -> T {
  ChiQuantile::new(k).quantile(p)
}
