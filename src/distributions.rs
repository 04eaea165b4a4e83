//! Univariate marginals and the joint product distribution.
//!
//! Each marginal validates its parameters at construction and exposes
//! analytical moments, density, sampling, and (for the classical families)
//! the closed-form monic recurrence coefficients of its orthogonal
//! polynomials:
//!
//! | Marginal | Parameters | alpha_k | beta_k (k >= 1) | Family |
//! |---|---|---|---|---|
//! | `Uniform` | min, max | (a+b)/2 | s^2 k^2/(4k^2-1), s=(b-a)/2 | Legendre |
//! | `Normal` | mu, sigma | mu | k sigma^2 | Hermite |
//! | `Exponential` | rate | (2k+1)/rate | k^2/rate^2 | Laguerre |
//! | `Triangular` | min, mode, max | (numeric) | (numeric) | Stieltjes |
//!
//! `beta_0 = 1` throughout (probability measure).
//!
//! [`JointDistribution`] is the independent product of its marginals. That
//! is the only joint the crate can represent: correlated joints would
//! invalidate the norm factorization of the basis composer, so they are
//! unrepresentable rather than silently mishandled.

use rand::Rng;

use crate::error::{ProjectionError, Result};
use crate::quadrature::TensorQuadrature;
use crate::recurrence::RecurrenceCoefficients;

/// One-dimensional marginal distribution. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Marginal {
    Uniform { min: f64, max: f64 },
    Normal { mu: f64, sigma: f64 },
    Exponential { rate: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
}

impl Marginal {
    /// Continuous uniform on `[min, max]`.
    pub fn uniform(min: f64, max: f64) -> Result<Marginal> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ProjectionError::InvalidParameters(format!(
                "Uniform requires min < max, got min={min}, max={max}"
            )));
        }
        Ok(Marginal::Uniform { min, max })
    }

    /// Normal N(mu, sigma^2).
    pub fn normal(mu: f64, sigma: f64) -> Result<Marginal> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(ProjectionError::InvalidParameters(format!(
                "Normal requires finite mu and sigma > 0, got mu={mu}, sigma={sigma}"
            )));
        }
        Ok(Marginal::Normal { mu, sigma })
    }

    /// Exponential with the given rate (mean 1/rate).
    pub fn exponential(rate: f64) -> Result<Marginal> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ProjectionError::InvalidParameters(format!(
                "Exponential requires rate > 0, got {rate}"
            )));
        }
        Ok(Marginal::Exponential { rate })
    }

    /// Triangular on `[min, max]` peaking at `mode`.
    pub fn triangular(min: f64, mode: f64, max: f64) -> Result<Marginal> {
        if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
            return Err(ProjectionError::InvalidParameters(
                "Triangular parameters must be finite".into(),
            ));
        }
        if min > mode || mode > max || min >= max {
            return Err(ProjectionError::InvalidParameters(format!(
                "Triangular requires min <= mode <= max and min < max, got {min}, {mode}, {max}"
            )));
        }
        Ok(Marginal::Triangular { min, mode, max })
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Marginal::Uniform { min, max } => 0.5 * (min + max),
            Marginal::Normal { mu, .. } => mu,
            Marginal::Exponential { rate } => 1.0 / rate,
            Marginal::Triangular { min, mode, max } => (min + mode + max) / 3.0,
        }
    }

    pub fn variance(&self) -> f64 {
        match *self {
            Marginal::Uniform { min, max } => {
                let r = max - min;
                r * r / 12.0
            }
            Marginal::Normal { sigma, .. } => sigma * sigma,
            Marginal::Exponential { rate } => 1.0 / (rate * rate),
            Marginal::Triangular { min, mode, max } => {
                let (a, b, c) = (min, mode, max);
                (a * a + b * b + c * c - a * b - a * c - b * c) / 18.0
            }
        }
    }

    /// Probability density at x.
    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            Marginal::Uniform { min, max } => {
                if x >= min && x <= max {
                    1.0 / (max - min)
                } else {
                    0.0
                }
            }
            Marginal::Normal { mu, sigma } => {
                let z = (x - mu) / sigma;
                (-0.5 * z * z).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt())
            }
            Marginal::Exponential { rate } => {
                if x < 0.0 {
                    0.0
                } else {
                    rate * (-rate * x).exp()
                }
            }
            Marginal::Triangular { min, mode, max } => {
                let (a, b, c) = (min, mode, max);
                if x < a || x > c {
                    0.0
                } else if x <= b {
                    2.0 * (x - a) / ((c - a) * (b - a).max(f64::MIN_POSITIVE))
                } else {
                    2.0 * (c - x) / ((c - a) * (c - b).max(f64::MIN_POSITIVE))
                }
            }
        }
    }

    /// Smooth pieces of the density, used only by the Stieltjes
    /// discretization. Families with a closed-form recurrence never take
    /// that path; their segments are effective-support truncations whose
    /// omitted tail mass is far below every tolerance in the crate.
    pub fn segments(&self) -> Vec<(f64, f64)> {
        match *self {
            Marginal::Uniform { min, max } => vec![(min, max)],
            Marginal::Normal { mu, sigma } => vec![(mu - 12.0 * sigma, mu + 12.0 * sigma)],
            Marginal::Exponential { rate } => vec![(0.0, 50.0 / rate)],
            Marginal::Triangular { min, mode, max } => {
                if mode > min && mode < max {
                    vec![(min, mode), (mode, max)]
                } else {
                    vec![(min, max)]
                }
            }
        }
    }

    /// Draw one sample.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            Marginal::Uniform { min, max } => rng.random_range(min..max),
            Marginal::Normal { mu, sigma } => {
                // Box-Muller
                let u1: f64 = rng.random_range(f64::MIN_POSITIVE..1.0);
                let u2: f64 = rng.random();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                mu + sigma * z
            }
            Marginal::Exponential { rate } => {
                let u: f64 = rng.random_range(f64::MIN_POSITIVE..1.0);
                -u.ln() / rate
            }
            Marginal::Triangular { min, mode, max } => {
                // Inverse CDF, piecewise quadratic
                let (a, b, c) = (min, mode, max);
                let p: f64 = rng.random();
                let fb = (b - a) / (c - a);
                if p < fb {
                    a + ((c - a) * (b - a) * p).sqrt()
                } else {
                    c - ((c - a) * (c - b) * (1.0 - p)).sqrt()
                }
            }
        }
    }

    /// Closed-form monic recurrence coefficients through order n, where the
    /// family has them; `None` routes the caller to the Stieltjes
    /// procedure.
    pub fn recurrence(&self, n: usize) -> Option<RecurrenceCoefficients> {
        match *self {
            Marginal::Uniform { min, max } => {
                let mid = 0.5 * (min + max);
                let s = 0.5 * (max - min);
                let alpha = vec![mid; n + 1];
                let mut beta = vec![1.0; n + 1];
                for (k, b) in beta.iter_mut().enumerate().skip(1) {
                    let kf = k as f64;
                    *b = s * s * kf * kf / (4.0 * kf * kf - 1.0);
                }
                Some(RecurrenceCoefficients::new_unchecked(alpha, beta))
            }
            Marginal::Normal { mu, sigma } => {
                let alpha = vec![mu; n + 1];
                let mut beta = vec![1.0; n + 1];
                for (k, b) in beta.iter_mut().enumerate().skip(1) {
                    *b = k as f64 * sigma * sigma;
                }
                Some(RecurrenceCoefficients::new_unchecked(alpha, beta))
            }
            Marginal::Exponential { rate } => {
                let mut alpha = vec![0.0; n + 1];
                let mut beta = vec![1.0; n + 1];
                for (k, a) in alpha.iter_mut().enumerate() {
                    *a = (2.0 * k as f64 + 1.0) / rate;
                }
                for (k, b) in beta.iter_mut().enumerate().skip(1) {
                    let kf = k as f64;
                    *b = kf * kf / (rate * rate);
                }
                Some(RecurrenceCoefficients::new_unchecked(alpha, beta))
            }
            Marginal::Triangular { .. } => None,
        }
    }
}

impl std::fmt::Display for Marginal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Marginal::Uniform { min, max } => write!(f, "Uniform({min}, {max})"),
            Marginal::Normal { mu, sigma } => write!(f, "Normal({mu}, {sigma})"),
            Marginal::Exponential { rate } => write!(f, "Exponential({rate})"),
            Marginal::Triangular { min, mode, max } => {
                write!(f, "Triangular({min}, {mode}, {max})")
            }
        }
    }
}

/// Joint distribution over d dimensions as an independent product of
/// marginals. Immutable once constructed; shared read-only everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDistribution {
    marginals: Vec<Marginal>,
}

impl JointDistribution {
    pub fn new(marginals: Vec<Marginal>) -> Result<JointDistribution> {
        if marginals.is_empty() {
            return Err(ProjectionError::InvalidParameters(
                "joint distribution needs at least one marginal".into(),
            ));
        }
        Ok(JointDistribution { marginals })
    }

    /// Number of random dimensions d.
    pub fn dimensionality(&self) -> usize {
        self.marginals.len()
    }

    /// The i-th marginal.
    pub fn marginal(&self, i: usize) -> &Marginal {
        &self.marginals[i]
    }

    pub fn marginals(&self) -> &[Marginal] {
        &self.marginals
    }

    /// Draw one joint sample (independent coordinates).
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.marginals.iter().map(|m| m.sample(rng)).collect()
    }

    /// Expectation of `f`, exact for polynomial integrands of total degree
    /// up to `max_degree`. This is the integration primitive of the
    /// engine; assemblers that reuse a grid across many integrands build a
    /// [`TensorQuadrature`] directly instead.
    pub fn expectation(&self, max_degree: usize, f: impl Fn(&[f64]) -> f64) -> Result<f64> {
        let points = max_degree / 2 + 1;
        let grid = TensorQuadrature::new(self, points)?;
        Ok(grid.integrate(f))
    }
}
