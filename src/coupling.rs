//! Coupling tensors: expectations of weighted products of basis elements.
//!
//! Three ranks share one assembly scheme:
//!
//! - rank 1: `v[k] = E[w Phi_k]` (initial-condition projection)
//! - rank 2: `T[i][j] = E[w Phi_i Phi_j]`
//! - rank 3: `T[i][j][k] = E[w Phi_i Phi_j Phi_k]`
//!
//! For `w = 1` the rank-2 tensor is `norms[i] * [i == j]` by orthogonality,
//! so that case returns the diagonal directly with no integration. A
//! non-trivial weight falls back to tensor-grid expectation with a depth
//! chosen so every integrand is integrated exactly; this is the expensive
//! path, `O(M^2)` (or `O(M^3)`) independent entries, and is parallelized
//! with rayon over the distinct (sorted) index tuples. Symmetry fills the
//! rest. Tensors are immutable once the parallel collect completes.
//!
//! Every tensor carries the fingerprint of the basis it was assembled
//! under; downstream builders reject a tensor paired with a different
//! basis.

use rayon::prelude::*;

use crate::basis::PolynomialBasis;
use crate::distributions::JointDistribution;
use crate::error::{ProjectionError, Result};
use crate::polynomial::Polynomial;
use crate::quadrature::TensorQuadrature;

/// Rank-1 coupling tensor `E[w Phi_k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingVector {
    values: Vec<f64>,
    basis_fingerprint: u64,
}

impl CouplingVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, k: usize) -> f64 {
        self.values[k]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn basis_fingerprint(&self) -> u64 {
        self.basis_fingerprint
    }
}

/// Rank-2 coupling tensor `E[w Phi_i Phi_j]`, dense row-major, symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingMatrix {
    m: usize,
    values: Vec<f64>,
    basis_fingerprint: u64,
}

impl CouplingMatrix {
    pub fn len(&self) -> usize {
        self.m
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.m + j]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn basis_fingerprint(&self) -> u64 {
        self.basis_fingerprint
    }
}

/// Rank-3 coupling tensor `E[w Phi_i Phi_j Phi_k]`, dense, fully symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingTensor3 {
    m: usize,
    values: Vec<f64>,
    basis_fingerprint: u64,
}

impl CouplingTensor3 {
    pub fn len(&self) -> usize {
        self.m
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[(i * self.m + j) * self.m + k]
    }

    pub fn basis_fingerprint(&self) -> u64 {
        self.basis_fingerprint
    }
}

fn check_dims(basis: &PolynomialBasis, joint: &JointDistribution) -> Result<()> {
    if basis.dim() != joint.dimensionality() {
        return Err(ProjectionError::DimensionMismatch {
            expected: basis.dim(),
            actual: joint.dimensionality(),
        });
    }
    Ok(())
}

fn check_weight(basis: &PolynomialBasis, weight: &Polynomial) -> Result<()> {
    if weight.dim() != basis.dim() {
        return Err(ProjectionError::DimensionMismatch {
            expected: basis.dim(),
            actual: weight.dim(),
        });
    }
    Ok(())
}

/// Grid deep enough to integrate `products` basis factors times the weight
/// exactly: per-dimension degree is at most `products * order + wdeg`, and
/// n Gauss points are exact through degree 2n - 1.
fn grid_points(order: usize, wdeg: u32, products: usize) -> usize {
    (products * order + wdeg as usize) / 2 + 1
}

/// Basis values and weighted quadrature weights on the grid, shared by all
/// tensor entries. `vals[p]` holds the M basis values at grid point p.
fn tabulate(
    basis: &PolynomialBasis,
    grid: &TensorQuadrature,
    weight: Option<&Polynomial>,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let vals: Vec<Vec<f64>> = (0..grid.len())
        .into_par_iter()
        .map(|p| basis.eval_all(grid.point(p)))
        .collect();
    let wts: Vec<f64> = (0..grid.len())
        .map(|p| {
            let w = weight.map_or(1.0, |w| w.eval(grid.point(p)));
            grid.weight(p) * w
        })
        .collect();
    (vals, wts)
}

/// Rank-1 assembly: project an expression onto every basis element.
pub fn build_coupling_vector(
    basis: &PolynomialBasis,
    joint: &JointDistribution,
    expr: &Polynomial,
) -> Result<CouplingVector> {
    check_dims(basis, joint)?;
    check_weight(basis, expr)?;

    let points = grid_points(basis.order(), expr.total_degree(), 1);
    let grid = TensorQuadrature::new(joint, points)?;
    let (vals, wts) = tabulate(basis, &grid, Some(expr));

    let m = basis.len();
    let values: Vec<f64> = (0..m)
        .into_par_iter()
        .map(|k| (0..grid.len()).map(|p| wts[p] * vals[p][k]).sum())
        .collect();

    Ok(CouplingVector {
        values,
        basis_fingerprint: basis.fingerprint(),
    })
}

/// Rank-2 assembly.
///
/// `weight = None` means w = 1: by orthogonality the tensor is the
/// diagonal of basis norms and is returned without integration. This
/// asymmetry with the weighted path is intentional; the diagonal shortcut
/// is both cheaper and more accurate than quadrature, while the general
/// expectation path stays available for any weight.
pub fn build_coupling_matrix(
    basis: &PolynomialBasis,
    joint: &JointDistribution,
    weight: Option<&Polynomial>,
) -> Result<CouplingMatrix> {
    check_dims(basis, joint)?;
    let m = basis.len();

    let weight = match weight {
        None => {
            let mut values = vec![0.0; m * m];
            for k in 0..m {
                values[k * m + k] = basis.norm(k);
            }
            return Ok(CouplingMatrix {
                m,
                values,
                basis_fingerprint: basis.fingerprint(),
            });
        }
        Some(w) => w,
    };
    check_weight(basis, weight)?;

    let points = grid_points(basis.order(), weight.total_degree(), 2);
    let grid = TensorQuadrature::new(joint, points)?;
    let (vals, wts) = tabulate(basis, &grid, Some(weight));

    // Upper triangle only; T[i][j] = T[j][i].
    let pairs: Vec<(usize, usize)> = (0..m).flat_map(|i| (i..m).map(move |j| (i, j))).collect();
    let entries: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| {
            (0..grid.len())
                .map(|p| wts[p] * vals[p][i] * vals[p][j])
                .sum()
        })
        .collect();

    let mut values = vec![0.0; m * m];
    for (&(i, j), &e) in pairs.iter().zip(&entries) {
        values[i * m + j] = e;
        values[j * m + i] = e;
    }

    Ok(CouplingMatrix {
        m,
        values,
        basis_fingerprint: basis.fingerprint(),
    })
}

/// Rank-3 assembly: each sorted triple i <= j <= k is integrated once and
/// mirrored to all permutations.
pub fn build_coupling_tensor3(
    basis: &PolynomialBasis,
    joint: &JointDistribution,
    weight: Option<&Polynomial>,
) -> Result<CouplingTensor3> {
    check_dims(basis, joint)?;
    if let Some(w) = weight {
        check_weight(basis, w)?;
    }
    let m = basis.len();
    let wdeg = weight.map_or(0, |w| w.total_degree());

    let points = grid_points(basis.order(), wdeg, 3);
    let grid = TensorQuadrature::new(joint, points)?;
    let (vals, wts) = tabulate(basis, &grid, weight);

    let triples: Vec<(usize, usize, usize)> = (0..m)
        .flat_map(|i| (i..m).flat_map(move |j| (j..m).map(move |k| (i, j, k))))
        .collect();
    let entries: Vec<f64> = triples
        .par_iter()
        .map(|&(i, j, k)| {
            (0..grid.len())
                .map(|p| wts[p] * vals[p][i] * vals[p][j] * vals[p][k])
                .sum()
        })
        .collect();

    let mut values = vec![0.0; m * m * m];
    for (&(i, j, k), &e) in triples.iter().zip(&entries) {
        // All 6 permutations of (i, j, k); duplicates just rewrite e.
        for (a, b, c) in [
            (i, j, k),
            (i, k, j),
            (j, i, k),
            (j, k, i),
            (k, i, j),
            (k, j, i),
        ] {
            values[(a * m + b) * m + c] = e;
        }
    }

    Ok(CouplingTensor3 {
        m,
        values,
        basis_fingerprint: basis.fingerprint(),
    })
}
