//! Multivariate orthogonal polynomial basis.
//!
//! Basis element k is the product of per-dimension univariate orthogonal
//! polynomials at the degrees given by multi-index k:
//!
//! ```text
//! Phi_k(x) = prod_d pi_{k_d}(x_d)
//! ```
//!
//! Orthogonality of the product holds because the joint distribution is an
//! independent product measure (the only kind [`JointDistribution`] can
//! represent), which also factorizes the squared norms:
//! `E[Phi_k^2] = prod_d h_{k_d}`. Norms therefore come straight from the
//! recurrence betas; no integral is ever evaluated for them.
//!
//! The basis is built once, is immutable afterwards, and is shared
//! read-only by the tensor assembler, the Galerkin builder, and the moment
//! reconstructor. All of them address coefficients by position in the
//! canonical graded-lexicographic index order and cross-check the basis
//! fingerprint.

use crate::constants::MAX_ORDER;
use crate::distributions::JointDistribution;
use crate::error::{ProjectionError, Result};
use crate::multi_index::{enumerate_multi_indices, ordering_fingerprint, MultiIndex};
use crate::polynomial::Polynomial;
use crate::recurrence::{build_recurrence, RecurrenceCoefficients};

/// Ordered multivariate basis with per-dimension recurrences and squared
/// norms. Size `M = C(order + d, d)`.
#[derive(Debug, Clone)]
pub struct PolynomialBasis {
    dim: usize,
    order: usize,
    indices: Vec<MultiIndex>,
    recurrences: Vec<RecurrenceCoefficients>,
    norms: Vec<f64>,
    fingerprint: u64,
}

/// Build the orthogonal basis of total degree <= `order` for a joint
/// distribution.
///
/// Fails with `InvalidOrder` above the supported cap, `DegenerateMoment`
/// if any marginal lacks the required moments, and `SingularNorm` if a
/// computed norm is not strictly positive.
pub fn build_basis(joint: &JointDistribution, order: usize) -> Result<PolynomialBasis> {
    if order > MAX_ORDER {
        return Err(ProjectionError::InvalidOrder {
            order,
            max: MAX_ORDER,
        });
    }
    let dim = joint.dimensionality();

    let mut recurrences = Vec::with_capacity(dim);
    let mut univariate_norms = Vec::with_capacity(dim);
    for marginal in joint.marginals() {
        let rc = build_recurrence(marginal, order)?;
        univariate_norms.push(rc.norms());
        recurrences.push(rc);
    }

    let indices = enumerate_multi_indices(dim, order);
    let mut norms = Vec::with_capacity(indices.len());
    for (k, idx) in indices.iter().enumerate() {
        let h: f64 = idx
            .as_slice()
            .iter()
            .enumerate()
            .map(|(d, &deg)| univariate_norms[d][deg as usize])
            .product();
        if !h.is_finite() || h <= 0.0 {
            return Err(ProjectionError::SingularNorm { index: k, norm: h });
        }
        norms.push(h);
    }

    // The fingerprint covers the index ordering and the recurrence
    // coefficients, so a tensor from a same-shaped basis over a different
    // distribution is rejected too.
    let mut fingerprint = ordering_fingerprint(&indices);
    for rc in &recurrences {
        for n in 0..=rc.max_order() {
            fingerprint = mix64(fingerprint, rc.alpha(n).to_bits());
            fingerprint = mix64(fingerprint, rc.beta(n).to_bits());
        }
    }
    Ok(PolynomialBasis {
        dim,
        order,
        indices,
        recurrences,
        norms,
        fingerprint,
    })
}

/// FNV-1a step folding one 64-bit value into the hash.
fn mix64(mut h: u64, v: u64) -> u64 {
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    for b in v.to_le_bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(PRIME);
    }
    h
}

impl PolynomialBasis {
    /// Number of basis elements M.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Multi-index of basis element k.
    pub fn index(&self, k: usize) -> &MultiIndex {
        &self.indices[k]
    }

    pub fn indices(&self) -> &[MultiIndex] {
        &self.indices
    }

    /// Squared norms `E[Phi_k^2]`, one per basis element.
    pub fn norms(&self) -> &[f64] {
        &self.norms
    }

    pub fn norm(&self, k: usize) -> f64 {
        self.norms[k]
    }

    /// Layout fingerprint; tensors derived from this basis carry it so a
    /// mismatched pairing is rejected instead of silently misindexing.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Recurrence coefficients of dimension d.
    pub fn recurrence(&self, d: usize) -> &RecurrenceCoefficients {
        &self.recurrences[d]
    }

    /// Evaluate basis element k at a point, through the univariate
    /// recurrences (moment-free and stable).
    pub fn eval(&self, k: usize, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.dim);
        self.indices[k]
            .as_slice()
            .iter()
            .enumerate()
            .map(|(d, &deg)| self.recurrences[d].eval_monic(deg as usize, x[d]))
            .product()
    }

    /// Evaluate all M basis elements at a point in one pass: per-dimension
    /// value tables pi_0..pi_order are filled once, then combined per
    /// multi-index.
    pub fn eval_all(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.dim);
        let mut tables: Vec<Vec<f64>> = Vec::with_capacity(self.dim);
        for (d, rc) in self.recurrences.iter().enumerate() {
            let mut t = Vec::with_capacity(self.order + 1);
            rc.eval_monic_all(self.order, x[d], &mut t);
            tables.push(t);
        }
        self.indices
            .iter()
            .map(|idx| {
                idx.as_slice()
                    .iter()
                    .enumerate()
                    .map(|(d, &deg)| tables[d][deg as usize])
                    .product()
            })
            .collect()
    }

    /// Expand basis element k to its explicit sparse polynomial.
    ///
    /// For inspection and tests; numeric paths use [`Self::eval`].
    pub fn expand(&self, k: usize) -> Polynomial {
        let mut out = Polynomial::constant(self.dim, 1.0);
        for (d, &deg) in self.indices[k].as_slice().iter().enumerate() {
            let coeffs = self.recurrences[d].monic_coefficients(deg as usize);
            let uni = Polynomial::from_terms(
                self.dim,
                coeffs
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c != 0.0)
                    .map(|(p, &c)| (MultiIndex::unit(self.dim, d, p as u32), c)),
            );
            out = out.mul(&uni);
        }
        out
    }
}
