//! Moment reconstruction from coefficient vectors.
//!
//! With `Phi_0 = 1` and mutual orthogonality, the moments of the expansion
//! `u = sum_k c_k Phi_k` read directly off the coefficients:
//!
//! ```text
//! mean     = c_0
//! variance = sum_{k >= 1} c_k^2 E[Phi_k^2]     (Parseval)
//! ```
//!
//! No re-evaluation of the polynomial expansion is involved; the result is
//! exact to floating-point precision for coefficients produced under the
//! same basis. The only approximation is the truncation already present in
//! the Galerkin system.

use serde::Serialize;

use crate::basis::PolynomialBasis;
use crate::coupling::CouplingTensor3;
use crate::error::{ProjectionError, Result};

/// Mean/variance of the reconstructed stochastic solution at one time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Moment trajectory over a time grid, ready for JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentSeries {
    pub times: Vec<f64>,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub std_dev: Vec<f64>,
}

/// Reconstruct mean and variance from one coefficient vector.
///
/// Fails with `DimensionMismatch` if the vector length differs from the
/// basis size.
pub fn reconstruct_moments(c: &[f64], basis: &PolynomialBasis) -> Result<Moments> {
    if c.len() != basis.len() {
        return Err(ProjectionError::DimensionMismatch {
            expected: basis.len(),
            actual: c.len(),
        });
    }
    let mean = c[0];
    let variance: f64 = c
        .iter()
        .zip(basis.norms())
        .skip(1)
        .map(|(&ck, &h)| ck * ck * h)
        .sum();
    Ok(Moments {
        mean,
        variance,
        std_dev: variance.sqrt(),
    })
}

/// Reconstruct the moment trajectory for a coefficient time series.
pub fn reconstruct_moment_series(
    times: &[f64],
    trajectory: &[Vec<f64>],
    basis: &PolynomialBasis,
) -> Result<MomentSeries> {
    if times.len() != trajectory.len() {
        return Err(ProjectionError::DimensionMismatch {
            expected: times.len(),
            actual: trajectory.len(),
        });
    }
    let mut mean = Vec::with_capacity(times.len());
    let mut variance = Vec::with_capacity(times.len());
    let mut std_dev = Vec::with_capacity(times.len());
    for c in trajectory {
        let m = reconstruct_moments(c, basis)?;
        mean.push(m.mean);
        variance.push(m.variance);
        std_dev.push(m.std_dev);
    }
    Ok(MomentSeries {
        times: times.to_vec(),
        mean,
        variance,
        std_dev,
    })
}

/// Third central moment `E[(u - mean)^3]` from the unweighted rank-3
/// coupling tensor:
///
/// ```text
/// E[(u - c_0)^3] = sum_{i,j,k >= 1} c_i c_j c_k E[Phi_i Phi_j Phi_k]
/// ```
///
/// The tensor must have been assembled under the same basis
/// (`IndexOrderingViolation` otherwise).
pub fn third_central_moment(
    c: &[f64],
    basis: &PolynomialBasis,
    products: &CouplingTensor3,
) -> Result<f64> {
    if products.basis_fingerprint() != basis.fingerprint() {
        return Err(ProjectionError::IndexOrderingViolation);
    }
    if c.len() != basis.len() {
        return Err(ProjectionError::DimensionMismatch {
            expected: basis.len(),
            actual: c.len(),
        });
    }
    let m = basis.len();
    let mut acc = 0.0;
    for i in 1..m {
        if c[i] == 0.0 {
            continue;
        }
        for j in 1..m {
            if c[j] == 0.0 {
                continue;
            }
            for k in 1..m {
                acc += c[i] * c[j] * c[k] * products.get(i, j, k);
            }
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::build_basis;
    use crate::coupling::build_coupling_tensor3;
    use crate::distributions::{JointDistribution, Marginal};

    fn basis() -> PolynomialBasis {
        let joint = JointDistribution::new(vec![
            Marginal::uniform(0.1, 0.2).unwrap(),
            Marginal::uniform(1.0, 2.0).unwrap(),
        ])
        .unwrap();
        build_basis(&joint, 3).unwrap()
    }

    #[test]
    fn test_single_mode_is_deterministic() {
        let basis = basis();
        let mut c = vec![0.0; basis.len()];
        c[0] = 2.5;
        let m = reconstruct_moments(&c, &basis).unwrap();
        assert_eq!(m.mean, 2.5);
        assert_eq!(m.variance, 0.0);
    }

    #[test]
    fn test_known_random_variable() {
        // u = I with I ~ Uniform(1,2): c_0 = 1.5 and weight 1 on the
        // pure-I degree-1 element. Mean 1.5, variance 1/12.
        let basis = basis();
        let mut c = vec![0.0; basis.len()];
        c[0] = 1.5;
        let k = basis
            .indices()
            .iter()
            .position(|idx| idx.as_slice() == [0, 1])
            .unwrap();
        c[k] = 1.0;
        let m = reconstruct_moments(&c, &basis).unwrap();
        assert!((m.mean - 1.5).abs() < 1e-15);
        assert!((m.variance - 1.0 / 12.0).abs() < 1e-15);
        assert!((m.std_dev - m.variance.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_scaled_mode_variance() {
        // Scaling a single higher mode by s multiplies variance by s^2 h_k.
        let basis = basis();
        for k in 1..basis.len() {
            let mut c = vec![0.0; basis.len()];
            c[k] = 3.0;
            let m = reconstruct_moments(&c, &basis).unwrap();
            assert!(
                (m.variance - 9.0 * basis.norm(k)).abs() < 1e-14,
                "mode {k}"
            );
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let basis = basis();
        let c = vec![0.0; basis.len() + 1];
        assert!(matches!(
            reconstruct_moments(&c, &basis),
            Err(ProjectionError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_series_shapes() {
        let basis = basis();
        let times = vec![0.0, 1.0, 2.0];
        let trajectory = vec![vec![0.0; basis.len()]; 3];
        let s = reconstruct_moment_series(&times, &trajectory, &basis).unwrap();
        assert_eq!(s.times, times);
        assert_eq!(s.mean.len(), 3);
        assert_eq!(s.variance.len(), 3);

        let bad = reconstruct_moment_series(&times, &trajectory[..2].to_vec(), &basis);
        assert!(bad.is_err());
    }

    #[test]
    fn test_third_central_moment_symmetric_vanishes() {
        // u = I, I uniform: symmetric, so the third central moment is 0.
        let joint = JointDistribution::new(vec![
            Marginal::uniform(0.1, 0.2).unwrap(),
            Marginal::uniform(1.0, 2.0).unwrap(),
        ])
        .unwrap();
        let basis = build_basis(&joint, 3).unwrap();
        let t3 = build_coupling_tensor3(&basis, &joint, None).unwrap();
        let mut c = vec![0.0; basis.len()];
        c[0] = 1.5;
        let k = basis
            .indices()
            .iter()
            .position(|idx| idx.as_slice() == [0, 1])
            .unwrap();
        c[k] = 1.0;
        let m3 = third_central_moment(&c, &basis, &t3).unwrap();
        assert!(m3.abs() < 1e-12, "m3 = {m3}");
    }

    #[test]
    fn test_third_central_moment_exponential() {
        // u = X, X ~ Exp(rate): E[(X - mean)^3] = 2 / rate^3.
        let rate = 2.0_f64;
        let joint =
            JointDistribution::new(vec![Marginal::exponential(rate).unwrap()]).unwrap();
        let basis = build_basis(&joint, 3).unwrap();
        let t3 = build_coupling_tensor3(&basis, &joint, None).unwrap();
        let mut c = vec![0.0; basis.len()];
        c[0] = 1.0 / rate;
        c[1] = 1.0; // X = mean + pi_1(X)
        let m3 = third_central_moment(&c, &basis, &t3).unwrap();
        let expected = 2.0 / rate.powi(3);
        assert!(
            (m3 - expected).abs() < 1e-10,
            "m3 = {m3}, expected {expected}"
        );
    }

    #[test]
    fn test_third_central_moment_foreign_tensor_rejected() {
        let joint = JointDistribution::new(vec![
            Marginal::uniform(0.1, 0.2).unwrap(),
            Marginal::uniform(1.0, 2.0).unwrap(),
        ])
        .unwrap();
        let basis2 = build_basis(&joint, 2).unwrap();
        let basis3 = build_basis(&joint, 3).unwrap();
        let t3 = build_coupling_tensor3(&basis2, &joint, None).unwrap();
        let c = vec![0.0; basis3.len()];
        assert!(matches!(
            third_central_moment(&c, &basis3, &t3),
            Err(ProjectionError::IndexOrderingViolation)
        ));
    }

    #[test]
    fn test_series_serializes() {
        let basis = basis();
        let s =
            reconstruct_moment_series(&[0.0], &[vec![0.0; basis.len()]], &basis).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"variance\""));
    }
}
