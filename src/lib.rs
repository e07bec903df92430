//! # chi-quantile
//!
//! $$
//! Q_\chi(p;k)=\sqrt{F^{-1}_{\Gamma}\!\left(p;\tfrac k2,\tfrac12\right)},\qquad p\in[0,1]
//! $$
//!
//! Quantile function of the chi distribution, evaluated through the gamma quantile
//! of the squared variable.
//!
pub mod distributions;
pub mod traits;

pub use distributions::chi::ChiQuantile;
pub use distributions::gamma::GammaQuantile;
pub use distributions::QuantileConfig;
pub use traits::FloatExt;
pub use traits::QuantileExt;
