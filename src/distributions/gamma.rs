//! # Gamma Quantile
//!
//! $$
//! F^{-1}(p;\alpha,\beta)=\inf\{x\ge0:\ P(\alpha,\beta x)\ge p\}
//! $$
//!
use std::f64::consts::SQRT_2;

use roots::find_root_brent;
use roots::Convergency;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Gamma;
use statrs::function::erf::erfc_inv;
use statrs::function::gamma::ln_gamma;

use super::QuantileConfig;
use crate::traits::QuantileExt;

/// Halvings needed to walk a bracket across the whole `f64` exponent range.
const MAX_BISECTIONS: usize = 2100;

/// Below this scaled argument `rate * x` the CDF comes from the power series.
///
/// statrs' `gamma_lr` returns exactly 0 for arguments under ~1.1e-15.
const SERIES_LIMIT: f64 = 1.0;

/// Shapes under this are treated as zero by statrs' `gamma_lr`.
const STATRS_MIN_SHAPE: f64 = 1e-12;

/// From this shape on the Wilson-Hilferty approximation is used directly.
///
/// statrs' incomplete gamma needs O(sqrt(shape)) terms per evaluation here, while
/// the cube-root normal approximation is already accurate to about 1e-8.
pub const LARGE_SHAPE: f64 = 1e6;

const MAX_SERIES_TERMS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
enum Kind {
  /// NaN, negative or infinite parameters.
  Invalid,
  /// Point mass at zero (shape == 0).
  Degenerate,
  Regular(Gamma),
}

/// Quantile function of a gamma distribution with fixed shape and rate.
///
/// The CDF comes from [`statrs`], with a power series near zero where statrs
/// truncates; it is inverted with Brent's method from [`roots`]. Shapes of
/// [`LARGE_SHAPE`] and above use the Wilson-Hilferty approximation.
#[derive(Debug, Clone, Copy)]
pub struct GammaQuantile {
  shape: f64,
  rate: f64,
  kind: Kind,
  config: QuantileConfig,
}

impl GammaQuantile {
  pub fn new(shape: f64, rate: f64) -> Self {
    Self::with_config(shape, rate, QuantileConfig::default())
  }

  pub fn with_config(shape: f64, rate: f64, config: QuantileConfig) -> Self {
    let kind = if !(shape >= 0.0 && shape.is_finite() && rate > 0.0 && rate.is_finite()) {
      tracing::debug!(shape, rate, "invalid gamma parameters, quantile evaluates to NaN");
      Kind::Invalid
    } else if shape == 0.0 {
      Kind::Degenerate
    } else {
      match Gamma::new(shape, rate) {
        Ok(gamma) => Kind::Regular(gamma),
        Err(err) => {
          tracing::debug!(shape, rate, ?err, "gamma rejected by statrs, quantile evaluates to NaN");
          Kind::Invalid
        }
      }
    };

    Self {
      shape,
      rate,
      kind,
      config,
    }
  }

  pub fn shape(&self) -> f64 {
    self.shape
  }

  pub fn rate(&self) -> f64 {
    self.rate
  }

  pub fn config(&self) -> QuantileConfig {
    self.config
  }

  /// Whether the parameters describe a gamma law (degenerate shape 0 included).
  pub fn is_valid(&self) -> bool {
    !matches!(self.kind, Kind::Invalid)
  }

  pub fn cdf(&self, x: f64) -> f64 {
    if x.is_nan() {
      return f64::NAN;
    }

    match &self.kind {
      Kind::Invalid => f64::NAN,
      Kind::Degenerate => {
        if x >= 0.0 {
          1.0
        } else {
          0.0
        }
      }
      Kind::Regular(gamma) => self.lower(gamma, x),
    }
  }

  pub fn quantile(&self, p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
      return f64::NAN;
    }

    match &self.kind {
      Kind::Invalid => f64::NAN,
      Kind::Degenerate => 0.0,
      Kind::Regular(gamma) => {
        if p == 0.0 {
          0.0
        } else if p == 1.0 {
          f64::INFINITY
        } else if self.shape >= LARGE_SHAPE {
          self.wilson_hilferty(p).max(0.0)
        } else {
          self.solve(gamma, p)
        }
      }
    }
  }

  fn uses_series(&self, y: f64) -> bool {
    self.shape < STATRS_MIN_SHAPE || y < SERIES_LIMIT
  }

  /// Regularized lower incomplete gamma P(shape, rate * x).
  fn lower(&self, gamma: &Gamma, x: f64) -> f64 {
    let y = x * self.rate;
    if x <= 0.0 {
      0.0
    } else if self.uses_series(y) {
      lower_series(self.shape, y)
    } else {
      gamma.cdf(x)
    }
  }

  /// Regularized upper incomplete gamma Q(shape, rate * x).
  fn upper(&self, gamma: &Gamma, x: f64) -> f64 {
    let y = x * self.rate;
    if x <= 0.0 {
      1.0
    } else if self.uses_series(y) {
      1.0 - lower_series(self.shape, y)
    } else {
      gamma.sf(x)
    }
  }

  fn solve(&self, gamma: &Gamma, p: f64) -> f64 {
    let guess = self.initial_guess(p);
    if guess == 0.0 {
      // below the smallest subnormal
      return 0.0;
    }

    let q = 1.0 - p;
    let upper = p > 0.5;
    // Both branches increase with x; the upper one keeps precision as p -> 1.
    let residual = |x: f64| {
      if upper {
        q - self.upper(gamma, x)
      } else {
        self.lower(gamma, x) - p
      }
    };

    let (lo, hi) = bracket(&residual, guess);
    if !hi.is_finite() {
      return f64::INFINITY;
    }

    let mut convergency = RelativeConvergency {
      tolerance: self.config.tolerance,
      scale: p.min(q),
      max_iter: self.config.max_iter,
    };

    match find_root_brent(lo, hi, &residual, &mut convergency) {
      Ok(x) => {
        tracing::trace!(p, guess, lo, hi, x, "gamma quantile solved");
        x
      }
      Err(err) => {
        tracing::warn!(p, lo, hi, ?err, "brent solver failed, falling back to bisection");
        self.bisect(&residual, lo, hi)
      }
    }
  }

  /// Series inversion near zero, then Wilson-Hilferty, then the mean.
  fn initial_guess(&self, p: f64) -> f64 {
    let series = self.series_inverse(p);
    if series * self.rate < SERIES_LIMIT {
      return series;
    }

    let wilson_hilferty = self.wilson_hilferty(p);
    if wilson_hilferty.is_finite() && wilson_hilferty > 0.0 {
      return wilson_hilferty;
    }

    self.shape / self.rate
  }

  /// Leading term of P(a, y) ~ y^a / Gamma(a + 1), solved for x.
  fn series_inverse(&self, p: f64) -> f64 {
    ((p.ln() + ln_gamma(self.shape + 1.0)) / self.shape).exp() / self.rate
  }

  /// Cube-root normal approximation of the chi-squared quantile, rescaled.
  fn wilson_hilferty(&self, p: f64) -> f64 {
    let z = -SQRT_2 * erfc_inv(2.0 * p);
    let nu = 2.0 * self.shape;
    let c = 2.0 / (9.0 * nu);
    nu * (1.0 - c + z * c.sqrt()).powi(3) / (2.0 * self.rate)
  }

  fn bisect(&self, residual: &impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..MAX_BISECTIONS {
      let mid = 0.5 * (lo + hi);
      if mid <= lo || mid >= hi || hi - lo <= self.config.tolerance * hi {
        break;
      }

      if residual(mid) < 0.0 {
        lo = mid;
      } else {
        hi = mid;
      }
    }

    0.5 * (lo + hi)
  }
}

impl QuantileExt<f64> for GammaQuantile {
  fn quantile(&self, p: f64) -> f64 {
    GammaQuantile::quantile(self, p)
  }
}

/// P(a, y) from the power series `y^a e^{-y} / Gamma(a + 1) * sum y^n / ((a+1)...(a+n))`.
///
/// Accurate down to subnormal `y` and for any positive `a`.
fn lower_series(a: f64, y: f64) -> f64 {
  if y <= 0.0 {
    return 0.0;
  }
  if y.is_infinite() {
    return 1.0;
  }

  let mut term = 1.0;
  let mut sum = 1.0;
  for n in 1..MAX_SERIES_TERMS {
    term *= y / (a + n as f64);
    sum += term;
    if term <= sum * f64::EPSILON {
      break;
    }
  }

  let value = (a * y.ln() - y - ln_gamma(a + 1.0) + sum.ln()).exp();
  if value.is_nan() {
    1.0
  } else {
    value.min(1.0)
  }
}

/// Expands geometrically from `guess` until `residual` changes sign on `[lo, hi]`.
fn bracket(residual: &impl Fn(f64) -> f64, guess: f64) -> (f64, f64) {
  let mut lo = guess;
  let mut hi = guess;

  if residual(guess) < 0.0 {
    loop {
      hi *= 2.0;
      if !hi.is_finite() || residual(hi) >= 0.0 {
        break;
      }
      lo = hi;
    }
  } else {
    loop {
      lo *= 0.5;
      if lo == 0.0 || residual(lo) <= 0.0 {
        break;
      }
      hi = lo;
    }
  }

  (lo, hi)
}

/// Stops on a residual small relative to the target probability, or a relative step.
struct RelativeConvergency {
  tolerance: f64,
  scale: f64,
  max_iter: usize,
}

impl Convergency<f64> for RelativeConvergency {
  fn is_root_found(&mut self, y: f64) -> bool {
    y.abs() <= self.tolerance * self.scale
  }

  fn is_converged(&mut self, x1: f64, x2: f64) -> bool {
    (x1 - x2).abs() <= self.tolerance * x1.abs().max(x2.abs())
  }

  fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
    iter >= self.max_iter
  }
}
