//! Gauss quadrature derived from recurrence coefficients.
//!
//! The n-point Gauss rule of a measure places nodes at the roots of the
//! monic orthogonal polynomial pi_n and weights them so that all
//! polynomials up to degree 2n-1 integrate exactly. Both are obtained from
//! the three-term recurrence alone:
//!
//! - nodes: the roots of pi_k strictly interlace the roots of pi_{k+1}, so
//!   starting from the single root of pi_1 (= alpha_0) each next level is
//!   found by bisection inside guaranteed sign-change brackets, with outer
//!   bounds from the Gershgorin disc of the Jacobi matrix;
//! - weights: `w_i = 1 / sum_{j<n} phi_j(x_i)^2` over the orthonormal
//!   values, which keeps magnitudes O(1). Weights sum to beta_0 = 1.
//!
//! No external linear-algebra dependency; deflation-free and deterministic.
//!
//! [`TensorQuadrature`] materializes the product grid over a joint
//! distribution and is the sole integration primitive the coupling-tensor
//! assembler relies on.

use crate::constants::{MAX_TENSOR_POINTS, NODE_TOLERANCE};
use crate::distributions::JointDistribution;
use crate::error::{ProjectionError, Result};
use crate::recurrence::{build_recurrence, RecurrenceCoefficients};

/// One-dimensional Gauss rule: nodes and matching weights.
#[derive(Debug, Clone)]
pub struct GaussRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussRule {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integrate a function against this rule.
    pub fn integrate(&self, f: impl Fn(f64) -> f64) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }
}

/// Build the n-point Gauss rule of the measure described by `rc`.
///
/// Requires coefficients through order n-1 (i.e. `rc` of length >= n);
/// fails with `DimensionMismatch` otherwise.
pub fn gauss_rule(rc: &RecurrenceCoefficients, n: usize) -> Result<GaussRule> {
    if n == 0 {
        return Err(ProjectionError::InvalidParameters(
            "Gauss rule needs at least one point".into(),
        ));
    }
    if rc.max_order() + 1 < n {
        return Err(ProjectionError::DimensionMismatch {
            expected: n,
            actual: rc.max_order() + 1,
        });
    }

    // Roots level by level: the single root of pi_1 is alpha_0; the roots
    // of pi_{k-1} bracket the roots of pi_k.
    let mut roots = vec![rc.alpha(0)];
    for k in 2..=n {
        let (lo, hi) = jacobi_bound(rc, k);
        let mut brackets = Vec::with_capacity(k + 1);
        brackets.push(lo);
        brackets.extend_from_slice(&roots);
        brackets.push(hi);

        let mut next = Vec::with_capacity(k);
        for w in brackets.windows(2) {
            next.push(bracketed_root(rc, k, w[0], w[1]));
        }
        roots = next;
    }

    let weights: Vec<f64> = roots
        .iter()
        .map(|&x| 1.0 / rc.orthonormal_square_sum(n, x))
        .collect();

    Ok(GaussRule {
        nodes: roots,
        weights,
    })
}

/// Gershgorin bound of the k-by-k Jacobi matrix: all roots of pi_k lie
/// strictly inside, padded slightly so endpoint evaluations are nonzero.
fn jacobi_bound(rc: &RecurrenceCoefficients, k: usize) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..k {
        let b_lo = if i > 0 { rc.beta(i).sqrt() } else { 0.0 };
        let b_hi = if i + 1 < k { rc.beta(i + 1).sqrt() } else { 0.0 };
        lo = lo.min(rc.alpha(i) - b_lo - b_hi);
        hi = hi.max(rc.alpha(i) + b_lo + b_hi);
    }
    let pad = 1e-9 * (1.0 + (hi - lo).abs());
    (lo - pad, hi + pad)
}

/// Single root of the monic pi_k inside (a, b): bisection to machine
/// precision, then a few Newton polish steps kept inside the bracket.
fn bracketed_root(rc: &RecurrenceCoefficients, k: usize, mut a: f64, mut b: f64) -> f64 {
    let mut fa = rc.eval_monic(k, a);
    if fa == 0.0 {
        return a;
    }
    if rc.eval_monic(k, b) == 0.0 {
        return b;
    }

    for _ in 0..200 {
        if (b - a).abs() <= NODE_TOLERANCE * (a.abs() + b.abs() + 1.0) {
            break;
        }
        let mid = 0.5 * (a + b);
        let fm = rc.eval_monic(k, mid);
        if fm == 0.0 {
            return mid;
        }
        if (fm > 0.0) == (fa > 0.0) {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }

    let mut x = 0.5 * (a + b);
    for _ in 0..3 {
        let (p, dp) = rc.eval_monic_with_derivative(k, x);
        if dp == 0.0 {
            break;
        }
        let xn = x - p / dp;
        if xn <= a || xn >= b {
            break;
        }
        x = xn;
    }
    x
}

/// n-point Gauss-Legendre rule for the plain integral over [a, b]
/// (weights sum to b - a).
pub fn gauss_legendre(n: usize, a: f64, b: f64) -> Result<GaussRule> {
    let alpha = vec![0.0; n + 1];
    let mut beta = vec![1.0; n + 1];
    for (k, bk) in beta.iter_mut().enumerate().skip(1) {
        let kf = k as f64;
        *bk = kf * kf / (4.0 * kf * kf - 1.0);
    }
    let rc = RecurrenceCoefficients::new_unchecked(alpha, beta);
    let base = gauss_rule(&rc, n)?;

    let mid = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    Ok(GaussRule {
        nodes: base.nodes.iter().map(|&t| mid + half * t).collect(),
        // Base weights sum to 1 (probability measure on [-1, 1]), so the
        // plain-integral weights scale by the interval length.
        weights: base.weights.iter().map(|&w| w * (b - a)).collect(),
    })
}

/// Tensor-product Gauss grid over a joint (product) distribution.
///
/// Points are stored flat, `dim` coordinates per point; weights are the
/// per-dimension weight products and sum to 1. Immutable after
/// construction and freely shared across threads.
#[derive(Debug, Clone)]
pub struct TensorQuadrature {
    dim: usize,
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl TensorQuadrature {
    /// Build the grid with `points_per_dim` Gauss points along each
    /// dimension. Exact for polynomial integrands of per-dimension degree
    /// up to `2 * points_per_dim - 1`.
    pub fn new(joint: &JointDistribution, points_per_dim: usize) -> Result<TensorQuadrature> {
        if points_per_dim == 0 {
            return Err(ProjectionError::InvalidParameters(
                "tensor quadrature needs at least one point per dimension".into(),
            ));
        }
        let dim = joint.dimensionality();
        let total = points_per_dim
            .checked_pow(dim as u32)
            .filter(|&t| t <= MAX_TENSOR_POINTS)
            .ok_or_else(|| {
                ProjectionError::InvalidParameters(format!(
                    "tensor grid {points_per_dim}^{dim} exceeds cap of {MAX_TENSOR_POINTS} points"
                ))
            })?;

        let mut rules = Vec::with_capacity(dim);
        for marginal in joint.marginals() {
            let rc = build_recurrence(marginal, points_per_dim)?;
            rules.push(gauss_rule(&rc, points_per_dim)?);
        }

        let mut points = Vec::with_capacity(total * dim);
        let mut weights = Vec::with_capacity(total);
        for flat in 0..total {
            let mut rem = flat;
            let mut w = 1.0;
            for rule in &rules {
                let digit = rem % points_per_dim;
                rem /= points_per_dim;
                points.push(rule.nodes[digit]);
                w *= rule.weights[digit];
            }
            weights.push(w);
        }

        Ok(TensorQuadrature {
            dim,
            points,
            weights,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Coordinates of grid point `i`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.points[i * self.dim..(i + 1) * self.dim]
    }

    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// Expectation of `f` under the product measure on this grid.
    pub fn integrate(&self, f: impl Fn(&[f64]) -> f64) -> f64 {
        (0..self.len()).map(|i| self.weights[i] * f(self.point(i))).sum()
    }
}
