//! Sparse multivariate polynomials.
//!
//! A polynomial is a map from [`MultiIndex`] to scalar coefficient, with
//! arithmetic as explicit pure functions. This is the representation used
//! for weight expressions (e.g. the decay-rate variable) and
//! initial-condition expressions; basis polynomials themselves are
//! evaluated through the three-term recurrence and only expanded to this
//! form on request.
//!
//! Mixing polynomials of different dimensionality is a programming error
//! and asserts; the engine entry points validate dimensions with proper
//! errors before any arithmetic runs.

use std::collections::BTreeMap;

use crate::multi_index::MultiIndex;

/// Sparse multivariate polynomial: MultiIndex -> coefficient.
///
/// Exact-zero coefficients are never stored, so `is_zero` and
/// `total_degree` read directly off the term map.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    dim: usize,
    terms: BTreeMap<MultiIndex, f64>,
}

impl Polynomial {
    /// The zero polynomial in `dim` variables.
    pub fn zero(dim: usize) -> Self {
        Polynomial {
            dim,
            terms: BTreeMap::new(),
        }
    }

    /// The constant polynomial `c`.
    pub fn constant(dim: usize, c: f64) -> Self {
        let mut p = Polynomial::zero(dim);
        if c != 0.0 {
            p.terms.insert(MultiIndex::zero(dim), c);
        }
        p
    }

    /// The coordinate variable `x_which`.
    pub fn variable(dim: usize, which: usize) -> Self {
        assert!(which < dim, "variable index {which} out of range for dim {dim}");
        let mut p = Polynomial::zero(dim);
        p.terms.insert(MultiIndex::unit(dim, which, 1), 1.0);
        p
    }

    /// Build from explicit (index, coefficient) terms.
    pub fn from_terms(dim: usize, terms: impl IntoIterator<Item = (MultiIndex, f64)>) -> Self {
        let mut p = Polynomial::zero(dim);
        for (idx, c) in terms {
            assert_eq!(idx.dim(), dim, "term dimensionality mismatch");
            p.add_term(idx, c);
        }
        p
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Largest total degree among the terms; 0 for the zero polynomial.
    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(|m| m.degree()).max().unwrap_or(0)
    }

    /// Iterate terms in canonical graded-lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = (&MultiIndex, f64)> {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    /// Coefficient of a given multi-index (0.0 if absent).
    pub fn coefficient(&self, idx: &MultiIndex) -> f64 {
        self.terms.get(idx).copied().unwrap_or(0.0)
    }

    fn add_term(&mut self, idx: MultiIndex, c: f64) {
        if c == 0.0 {
            return;
        }
        let entry = self.terms.entry(idx.clone()).or_insert(0.0);
        *entry += c;
        if *entry == 0.0 {
            self.terms.remove(&idx);
        }
    }

    /// Sum of two polynomials.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        assert_eq!(self.dim, other.dim, "polynomial dimensionality mismatch");
        let mut out = self.clone();
        for (idx, c) in other.terms() {
            out.add_term(idx.clone(), c);
        }
        out
    }

    /// Product of two polynomials (term-by-term exponent addition).
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        assert_eq!(self.dim, other.dim, "polynomial dimensionality mismatch");
        let mut out = Polynomial::zero(self.dim);
        for (ia, ca) in self.terms() {
            for (ib, cb) in other.terms() {
                let idx = MultiIndex(
                    ia.as_slice()
                        .iter()
                        .zip(ib.as_slice())
                        .map(|(a, b)| a + b)
                        .collect(),
                );
                out.add_term(idx, ca * cb);
            }
        }
        out
    }

    /// Scalar multiple.
    pub fn scale(&self, s: f64) -> Polynomial {
        if s == 0.0 {
            return Polynomial::zero(self.dim);
        }
        Polynomial {
            dim: self.dim,
            terms: self.terms.iter().map(|(m, &c)| (m.clone(), c * s)).collect(),
        }
    }

    /// Evaluate at a point.
    pub fn eval(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.dim, "evaluation point dimensionality");
        let mut acc = 0.0;
        for (idx, c) in self.terms() {
            let mut term = c;
            for (&e, &xi) in idx.as_slice().iter().zip(x) {
                term *= xi.powi(e as i32);
            }
            acc += term;
        }
        acc
    }
}
