//! Galerkin system assembly for `du/dt = -w(xi) u`.
//!
//! Substituting the truncated expansion `u = sum_n c_n(t) Phi_n` into the
//! governing equation and projecting onto each basis element gives, for
//! every output index k,
//!
//! ```text
//! dc_k/dt = - sum_n c_n E[w Phi_n Phi_k] / E[Phi_k^2]
//! ```
//!
//! which is a closed linear map independent of t. It is formed once as
//! `A[k][n] = -T[n][k] / norms[k]` so the hot `rhs(c, t) = A c` performs no
//! division. The initial condition is the rank-1 projection
//! `c0[k] = E[I Phi_k] / norms[k]`.
//!
//! All failure modes (ordering mismatch, singular norms, dimension
//! disagreements) are checked here, at construction; the returned system's
//! `rhs` is total, pure, and safely callable from concurrent evaluation
//! points.

use crate::basis::PolynomialBasis;
use crate::constants::NORM_TOLERANCE;
use crate::coupling::{build_coupling_vector, CouplingMatrix};
use crate::distributions::JointDistribution;
use crate::error::{ProjectionError, Result};
use crate::polynomial::Polynomial;

/// Assembled Galerkin system: the RHS matrix and the projected initial
/// condition. Immutable; shared read-only by the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct GalerkinSystem {
    m: usize,
    /// Row-major `A[k][n] = -T[n][k] / norms[k]`.
    matrix: Vec<f64>,
    c0: Vec<f64>,
}

/// Build the Galerkin system from a weighted coupling tensor and an
/// initial-condition expression.
///
/// The tensor must have been assembled under `basis` (checked by
/// fingerprint: `IndexOrderingViolation` otherwise). Norms at or below the
/// stability threshold fail with `SingularNorm` here rather than dividing.
pub fn build_galerkin_system(
    basis: &PolynomialBasis,
    joint: &JointDistribution,
    weighted: &CouplingMatrix,
    initial_condition: &Polynomial,
) -> Result<GalerkinSystem> {
    if weighted.basis_fingerprint() != basis.fingerprint() {
        return Err(ProjectionError::IndexOrderingViolation);
    }
    let m = basis.len();
    if weighted.len() != m {
        return Err(ProjectionError::DimensionMismatch {
            expected: m,
            actual: weighted.len(),
        });
    }
    for (k, &h) in basis.norms().iter().enumerate() {
        if !h.is_finite() || h <= NORM_TOLERANCE {
            return Err(ProjectionError::SingularNorm { index: k, norm: h });
        }
    }

    let mut matrix = vec![0.0; m * m];
    for k in 0..m {
        let inv_h = 1.0 / basis.norm(k);
        for n in 0..m {
            matrix[k * m + n] = -weighted.get(n, k) * inv_h;
        }
    }

    let projection = build_coupling_vector(basis, joint, initial_condition)?;
    let c0: Vec<f64> = projection
        .values()
        .iter()
        .zip(basis.norms())
        .map(|(&v, &h)| v / h)
        .collect();

    Ok(GalerkinSystem { m, matrix, c0 })
}

impl GalerkinSystem {
    /// Number of coupled modes M.
    pub fn len(&self) -> usize {
        self.m
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    /// Projected initial condition `c0`.
    pub fn initial_coefficients(&self) -> &[f64] {
        &self.c0
    }

    /// Row-major RHS matrix A.
    pub fn matrix(&self) -> &[f64] {
        &self.matrix
    }

    /// Right-hand side `dc/dt = A c`. Pure; the time argument exists only
    /// to satisfy the integrator interface of an autonomous system.
    pub fn rhs(&self, c: &[f64], _t: f64) -> Vec<f64> {
        debug_assert_eq!(c.len(), self.m, "coefficient vector length");
        let mut out = vec![0.0; self.m];
        for k in 0..self.m {
            let row = &self.matrix[k * self.m..(k + 1) * self.m];
            out[k] = row.iter().zip(c).map(|(&a, &cn)| a * cn).sum();
        }
        out
    }
}
