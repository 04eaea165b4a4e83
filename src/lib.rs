//! # polychaos — Intrusive Polynomial Chaos / Stochastic Galerkin Projection
//!
//! Given an ODE whose parameters are random variables with known
//! distributions, this crate deterministically computes a finite set of
//! coefficients representing the full distribution of the solution over
//! time. The random solution is expanded in polynomials orthogonal with
//! respect to the joint parameter distribution; projecting the governing
//! equation onto each basis element (stochastic Galerkin) yields a closed
//! deterministic ODE system for the coefficients.
//!
//! ## Pipeline
//!
//! | Stage | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`distributions`] | Marginals + independent product joint: moments, density, sampling, closed-form recurrences |
//! | 1 | [`recurrence`] | Three-term recurrence per dimension: classical families in closed form, discretized Stieltjes otherwise |
//! | 2 | [`quadrature`] | Gauss rules from recurrence coefficients; tensor-product grid over the joint |
//! | 3 | [`basis`] | Graded-lexicographic multivariate basis with product norms |
//! | 4 | [`coupling`] | Rank-1/2/3 expectation tensors `E[w Phi_i Phi_j ...]`, rayon-parallel |
//! | 5 | [`galerkin`] | RHS matrix `A[k][n] = -T[n][k]/norms[k]` and projected initial condition |
//! | 6 | [`integrate`] | Fixed-step RK4 driver over an output time grid |
//! | 7 | [`moments`] | Mean/variance recovery: `mean = c_0`, Parseval variance |
//!
//! ## Layout invariant
//!
//! Multi-indices are ordered by total degree ascending, lexicographic
//! tie-break. Basis, tensors, and coefficient vectors all use this one
//! order; position k always refers to the same polynomial. Tensors carry
//! the fingerprint of the basis they were assembled under, and mismatched
//! pairings are rejected at construction time.
//!
//! ## Error discipline
//!
//! Every failure (degenerate moments, singular norms, order cap, dimension
//! disagreements, ordering mismatches) is detected while building the
//! basis/tensors/system. Once `rhs` and `c0` exist, they are total pure
//! functions; nothing in the integration loop can fail.
//!
//! ## Example
//!
//! Exponential decay `du/dt = -a u`, `u(0) = I`, with
//! `a ~ Uniform(0.1, 0.2)` and `I ~ Uniform(1, 2)`:
//!
//! ```
//! use polychaos::*;
//!
//! let joint = JointDistribution::new(vec![
//!     Marginal::uniform(0.1, 0.2)?,
//!     Marginal::uniform(1.0, 2.0)?,
//! ])?;
//! let basis = build_basis(&joint, 3)?;
//! assert_eq!(basis.len(), 10); // C(3 + 2, 2)
//!
//! let a = Polynomial::variable(2, 0);
//! let tensor = build_coupling_matrix(&basis, &joint, Some(&a))?;
//! let initial = Polynomial::variable(2, 1);
//! let system = build_galerkin_system(&basis, &joint, &tensor, &initial)?;
//!
//! let times: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
//! let trajectory = integrate_rk4(
//!     |c, t| system.rhs(c, t),
//!     system.initial_coefficients(),
//!     &times,
//!     1e-2,
//! )?;
//! let series = reconstruct_moment_series(&times, &trajectory, &basis)?;
//! assert!((series.mean[0] - 1.5).abs() < 1e-10);
//! # Ok::<(), polychaos::ProjectionError>(())
//! ```

pub mod basis;
pub mod constants;
pub mod coupling;
pub mod distributions;
pub mod error;
pub mod galerkin;
pub mod integrate;
pub mod moments;
pub mod multi_index;
pub mod polynomial;
pub mod quadrature;
pub mod recurrence;

pub use basis::{build_basis, PolynomialBasis};
pub use coupling::{
    build_coupling_matrix, build_coupling_tensor3, build_coupling_vector, CouplingMatrix,
    CouplingTensor3, CouplingVector,
};
pub use distributions::{JointDistribution, Marginal};
pub use error::{ProjectionError, Result};
pub use galerkin::{build_galerkin_system, GalerkinSystem};
pub use integrate::integrate_rk4;
pub use moments::{
    reconstruct_moment_series, reconstruct_moments, third_central_moment, MomentSeries, Moments,
};
pub use multi_index::MultiIndex;
pub use polynomial::Polynomial;
pub use quadrature::{gauss_rule, GaussRule, TensorQuadrature};
pub use recurrence::{build_recurrence, stieltjes, RecurrenceCoefficients};
