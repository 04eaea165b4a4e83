//! Three-term recurrence coefficients for univariate orthogonal polynomials.
//!
//! For a probability measure dλ, the monic orthogonal polynomials satisfy
//!
//! ```text
//! pi_{n+1}(x) = (x - alpha_n) pi_n(x) - beta_n pi_{n-1}(x)
//! pi_{-1} = 0, pi_0 = 1, beta_0 = E[1] = 1
//! ```
//!
//! and the squared norms are the running products `h_n = beta_0 ... beta_n`.
//! Everything downstream (basis norms, Gauss nodes/weights, stable
//! evaluation) is derived from the `(alpha_n, beta_n)` pairs alone; raw
//! moment matrices are never formed, as they are ill-conditioned for even
//! modest orders.
//!
//! Classical families (Uniform/Legendre, Normal/Hermite,
//! Exponential/Laguerre) supply coefficients in closed form; everything
//! else goes through the discretized Stieltjes procedure
//! ([`stieltjes`]), which computes the coefficients from discrete
//! expectations evaluated through the recurrence itself.

use crate::constants::{BETA_TOLERANCE, STIELTJES_EXTRA_POINTS, STIELTJES_PANELS};
use crate::distributions::Marginal;
use crate::error::{ProjectionError, Result};
use crate::quadrature::gauss_legendre;

/// Recurrence coefficients `(alpha_n, beta_n)` for n = 0..=N of one
/// marginal dimension. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceCoefficients {
    alpha: Vec<f64>,
    beta: Vec<f64>,
}

impl RecurrenceCoefficients {
    /// Validating constructor: requires equal lengths, at least one pair,
    /// and strictly positive betas.
    pub fn from_parts(alpha: Vec<f64>, beta: Vec<f64>) -> Result<Self> {
        if alpha.len() != beta.len() {
            return Err(ProjectionError::DimensionMismatch {
                expected: alpha.len(),
                actual: beta.len(),
            });
        }
        if alpha.is_empty() {
            return Err(ProjectionError::InvalidParameters(
                "recurrence needs at least the order-0 pair".into(),
            ));
        }
        for (n, &b) in beta.iter().enumerate() {
            if !b.is_finite() || b <= BETA_TOLERANCE {
                return Err(ProjectionError::DegenerateMoment { order: n, beta: b });
            }
        }
        Ok(RecurrenceCoefficients { alpha, beta })
    }

    /// Internal constructor for coefficients positive by construction
    /// (closed-form classical families).
    pub(crate) fn new_unchecked(alpha: Vec<f64>, beta: Vec<f64>) -> Self {
        debug_assert_eq!(alpha.len(), beta.len());
        RecurrenceCoefficients { alpha, beta }
    }

    /// Highest order N carried: coefficients exist for n = 0..=N.
    pub fn max_order(&self) -> usize {
        self.alpha.len() - 1
    }

    pub fn alpha(&self, n: usize) -> f64 {
        self.alpha[n]
    }

    pub fn beta(&self, n: usize) -> f64 {
        self.beta[n]
    }

    /// Squared norms `h_n = E[pi_n^2] = beta_0 ... beta_n` for n = 0..=N.
    pub fn norms(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.beta.len());
        let mut acc = 1.0;
        for &b in &self.beta {
            acc *= b;
            out.push(acc);
        }
        out
    }

    /// Evaluate the monic polynomial pi_k at x through the recurrence.
    pub fn eval_monic(&self, k: usize, x: f64) -> f64 {
        debug_assert!(k <= self.max_order() + 1, "order {k} beyond coefficients");
        let mut prev = 0.0;
        let mut cur = 1.0;
        for n in 0..k {
            let next = (x - self.alpha[n]) * cur - self.beta[n] * prev;
            prev = cur;
            cur = next;
        }
        cur
    }

    /// Evaluate pi_0..=pi_k at x in one pass, appending into `out`.
    pub fn eval_monic_all(&self, k: usize, x: f64, out: &mut Vec<f64>) {
        out.clear();
        let mut prev = 0.0;
        let mut cur = 1.0;
        out.push(cur);
        for n in 0..k {
            let next = (x - self.alpha[n]) * cur - self.beta[n] * prev;
            prev = cur;
            cur = next;
            out.push(cur);
        }
    }

    /// Evaluate pi_k and its derivative at x (both through the recurrence).
    pub fn eval_monic_with_derivative(&self, k: usize, x: f64) -> (f64, f64) {
        let mut prev = 0.0;
        let mut cur = 1.0;
        let mut dprev = 0.0;
        let mut dcur = 0.0;
        for n in 0..k {
            let next = (x - self.alpha[n]) * cur - self.beta[n] * prev;
            let dnext = cur + (x - self.alpha[n]) * dcur - self.beta[n] * dprev;
            prev = cur;
            cur = next;
            dprev = dcur;
            dcur = dnext;
        }
        (cur, dcur)
    }

    /// Sum of squared orthonormal values `sum_{j<k} phi_j(x)^2`.
    ///
    /// This is the denominator of the Gauss weight formula; evaluating the
    /// orthonormal recurrence keeps the magnitudes O(1) where the monic
    /// values would over/underflow.
    pub fn orthonormal_square_sum(&self, k: usize, x: f64) -> f64 {
        debug_assert!(k <= self.max_order() + 1);
        let mut prev = 0.0;
        let mut cur = 1.0 / self.beta[0].sqrt();
        let mut sum = cur * cur;
        for n in 0..k.saturating_sub(1) {
            let next =
                ((x - self.alpha[n]) * cur - self.beta[n].sqrt() * prev) / self.beta[n + 1].sqrt();
            prev = cur;
            cur = next;
            sum += cur * cur;
        }
        sum
    }

    /// Dense monomial coefficients of the monic pi_k (constant term first).
    ///
    /// Only for inspection and low-order expansion; evaluation always goes
    /// through [`Self::eval_monic`].
    pub fn monic_coefficients(&self, k: usize) -> Vec<f64> {
        let mut prev = vec![0.0];
        let mut cur = vec![1.0];
        for n in 0..k {
            let mut next = vec![0.0; cur.len() + 1];
            // x * pi_n
            for (i, &c) in cur.iter().enumerate() {
                next[i + 1] += c;
            }
            // - alpha_n * pi_n
            for (i, &c) in cur.iter().enumerate() {
                next[i] -= self.alpha[n] * c;
            }
            // - beta_n * pi_{n-1}
            for (i, &c) in prev.iter().enumerate() {
                next[i] -= self.beta[n] * c;
            }
            prev = cur;
            cur = next;
        }
        cur
    }
}

/// Univariate recurrence builder: closed form where the family has one,
/// discretized Stieltjes otherwise. Pure function of (marginal, n).
pub fn build_recurrence(marginal: &Marginal, n: usize) -> Result<RecurrenceCoefficients> {
    match marginal.recurrence(n) {
        Some(rc) => Ok(rc),
        None => stieltjes(marginal, n),
    }
}

/// Discretized Stieltjes procedure.
///
/// The measure is discretized with a composite Gauss-Legendre rule over
/// the smooth pdf segments (equal-width panels, density-weighted nodes),
/// with enough points per panel to integrate degree-(2n+2) polynomials
/// exactly; for piecewise polynomial densities such as Triangular the
/// discretization is therefore exact. The coefficients then follow from
/// discrete expectations of the polynomials generated so far:
///
/// ```text
/// alpha_k = sum(w x pi_k^2) / sum(w pi_k^2)
/// beta_k  = sum(w pi_k^2)   / sum(w pi_{k-1}^2)
/// ```
///
/// Discretization weights are normalized to unit mass so `beta_0 = 1`
/// exactly. Fails with `DegenerateMoment` if any beta_k is non-positive.
pub fn stieltjes(marginal: &Marginal, n: usize) -> Result<RecurrenceCoefficients> {
    let points_per_panel = 2 * (n + 1) + STIELTJES_EXTRA_POINTS;

    let mut xs: Vec<f64> = Vec::new();
    let mut ws: Vec<f64> = Vec::new();
    for (a, b) in marginal.segments() {
        let panel = (b - a) / STIELTJES_PANELS as f64;
        for p in 0..STIELTJES_PANELS {
            let lo = a + p as f64 * panel;
            let rule = gauss_legendre(points_per_panel, lo, lo + panel)?;
            for (&x, &w) in rule.nodes.iter().zip(&rule.weights) {
                xs.push(x);
                ws.push(w * marginal.pdf(x));
            }
        }
    }

    let mass: f64 = ws.iter().sum();
    if !mass.is_finite() || mass <= BETA_TOLERANCE {
        return Err(ProjectionError::DegenerateMoment {
            order: 0,
            beta: mass,
        });
    }
    for w in &mut ws {
        *w /= mass;
    }

    let m = xs.len();
    let mut alpha = Vec::with_capacity(n + 1);
    let mut beta = Vec::with_capacity(n + 1);

    let mut pi_prev = vec![0.0; m];
    let mut pi_cur = vec![1.0; m];
    let mut h_prev = 1.0; // sum(w pi_0^2) after normalization

    for k in 0..=n {
        let mut h = 0.0;
        let mut xh = 0.0;
        for j in 0..m {
            let wp2 = ws[j] * pi_cur[j] * pi_cur[j];
            h += wp2;
            xh += xs[j] * wp2;
        }

        let b = if k == 0 { 1.0 } else { h / h_prev };
        if !b.is_finite() || b <= BETA_TOLERANCE {
            return Err(ProjectionError::DegenerateMoment { order: k, beta: b });
        }
        let a = xh / h;

        alpha.push(a);
        beta.push(b);

        // Advance to pi_{k+1} on the grid.
        for j in 0..m {
            let next = (xs[j] - a) * pi_cur[j] - b * pi_prev[j];
            pi_prev[j] = pi_cur[j];
            pi_cur[j] = next;
        }
        h_prev = h;
    }

    RecurrenceCoefficients::from_parts(alpha, beta)
}
