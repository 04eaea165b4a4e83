//! End-to-end benchmark: du/dt = -a u, u(0) = I, with a ~ Uniform(0.1, 0.2)
//! and I ~ Uniform(1, 2).
//!
//! The solution is u(t) = I e^(-a t) with closed-form moments
//!
//! ```text
//! E[u]   = E[I] (e^(-a0 t) - e^(-a1 t)) / ((a1 - a0) t)
//! E[u^2] = E[I^2] (e^(-2 a0 t) - e^(-2 a1 t)) / (2 (a1 - a0) t)
//! ```
//!
//! so the reconstructed polynomial-chaos moments can be checked exactly,
//! and independently cross-checked by Monte Carlo sampling of the joint.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use polychaos::{
    build_basis, build_coupling_matrix, build_galerkin_system, integrate_rk4,
    reconstruct_moment_series, reconstruct_moments, GalerkinSystem, JointDistribution, Marginal,
    Polynomial, PolynomialBasis,
};

const A0: f64 = 0.1;
const A1: f64 = 0.2;

fn decay_joint() -> JointDistribution {
    JointDistribution::new(vec![
        Marginal::uniform(A0, A1).unwrap(),
        Marginal::uniform(1.0, 2.0).unwrap(),
    ])
    .unwrap()
}

fn decay_system(order: usize) -> (PolynomialBasis, GalerkinSystem) {
    let joint = decay_joint();
    let basis = build_basis(&joint, order).unwrap();
    let a = Polynomial::variable(2, 0);
    let tensor = build_coupling_matrix(&basis, &joint, Some(&a)).unwrap();
    let initial = Polynomial::variable(2, 1);
    let system = build_galerkin_system(&basis, &joint, &tensor, &initial).unwrap();
    (basis, system)
}

/// Closed-form (mean, variance) of u(t) = I e^(-a t).
fn exact_moments(t: f64) -> (f64, f64) {
    let laplace = |s: f64| {
        if t == 0.0 {
            1.0
        } else {
            ((-s * A0 * t).exp() - (-s * A1 * t).exp()) / (s * (A1 - A0) * t)
        }
    };
    let mean = 1.5 * laplace(1.0);
    let second = (7.0 / 3.0) * laplace(2.0);
    (mean, second - mean * mean)
}

#[test]
fn test_benchmark_configuration() {
    let (basis, system) = decay_system(3);

    // M = C(3 + 2, 2) = 10, norms[0] = E[1] = 1
    assert_eq!(basis.len(), 10);
    assert!((basis.norm(0) - 1.0).abs() < 1e-14);

    // c0[0] is the mean of I; the only other nonzero entry sits on the
    // pure-I degree-1 multi-index (0, 1).
    let c0 = system.initial_coefficients();
    assert!((c0[0] - 1.5).abs() < 1e-12, "c0[0] = {}", c0[0]);
    for k in 1..basis.len() {
        if basis.index(k).as_slice() == [0, 1] {
            assert!((c0[k] - 1.0).abs() < 1e-12, "c0[{k}] = {}", c0[k]);
        } else {
            assert!(c0[k].abs() < 1e-12, "c0[{k}] = {} should vanish", c0[k]);
        }
    }

    // Moments at t = 0 are exactly those of I
    let m0 = reconstruct_moments(c0, &basis).unwrap();
    assert!((m0.mean - 1.5).abs() < 1e-12);
    assert!((m0.variance - 1.0 / 12.0).abs() < 1e-12);
}

#[test]
fn test_moments_track_closed_form() {
    let (basis, system) = decay_system(3);
    let times: Vec<f64> = (0..=40).map(|k| k as f64 * 0.25).collect();
    let trajectory = integrate_rk4(
        |c, t| system.rhs(c, t),
        system.initial_coefficients(),
        &times,
        1e-3,
    )
    .unwrap();
    let series = reconstruct_moment_series(&times, &trajectory, &basis).unwrap();

    for (k, &t) in times.iter().enumerate() {
        let (em, ev) = exact_moments(t);
        let mean_err = (series.mean[k] - em).abs() / em;
        assert!(
            mean_err < 0.01,
            "t={t}: mean {} vs exact {em} (rel err {mean_err})",
            series.mean[k]
        );
        let var_err = (series.variance[k] - ev).abs() / ev.max(1e-12);
        assert!(
            var_err < 0.05,
            "t={t}: variance {} vs exact {ev} (rel err {var_err})",
            series.variance[k]
        );
    }
}

#[test]
fn test_mean_and_variance_decay_monotonically() {
    // a and I ranges are narrow and positive, so both moments shrink.
    let (basis, system) = decay_system(3);
    let times: Vec<f64> = (0..=20).map(|k| k as f64 * 0.5).collect();
    let trajectory = integrate_rk4(
        |c, t| system.rhs(c, t),
        system.initial_coefficients(),
        &times,
        1e-3,
    )
    .unwrap();
    let series = reconstruct_moment_series(&times, &trajectory, &basis).unwrap();

    for w in series.mean.windows(2) {
        assert!(w[1] < w[0], "mean not decreasing: {} -> {}", w[0], w[1]);
    }
    for w in series.variance.windows(2) {
        assert!(
            w[1] < w[0],
            "variance not decreasing: {} -> {}",
            w[0],
            w[1]
        );
    }
    // Variance heads toward zero
    assert!(series.variance.last().unwrap() < &0.02);
}

#[test]
fn test_truncation_error_shrinks_with_order() {
    let t_final = 10.0;
    let (em, _) = exact_moments(t_final);
    let mut errors = Vec::new();
    for order in [1usize, 3] {
        let (basis, system) = decay_system(order);
        let times = vec![0.0, t_final];
        let trajectory = integrate_rk4(
            |c, t| system.rhs(c, t),
            system.initial_coefficients(),
            &times,
            1e-3,
        )
        .unwrap();
        let m = reconstruct_moments(&trajectory[1], &basis).unwrap();
        errors.push((m.mean - em).abs() / em);
    }
    assert!(
        errors[1] < errors[0],
        "order-3 error {} should beat order-1 error {}",
        errors[1],
        errors[0]
    );
}

#[test]
fn test_monte_carlo_cross_check() {
    let (basis, system) = decay_system(3);
    let t_probe = 3.0;
    let times = vec![0.0, t_probe];
    let trajectory = integrate_rk4(
        |c, t| system.rhs(c, t),
        system.initial_coefficients(),
        &times,
        1e-3,
    )
    .unwrap();
    let pc = reconstruct_moments(&trajectory[1], &basis).unwrap();

    let joint = decay_joint();
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let n = 200_000;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for _ in 0..n {
        let x = joint.sample(&mut rng);
        let u = x[1] * (-x[0] * t_probe).exp();
        sum += u;
        sum_sq += u * u;
    }
    let mc_mean = sum / n as f64;
    let mc_var = sum_sq / n as f64 - mc_mean * mc_mean;

    assert!(
        (pc.mean - mc_mean).abs() / mc_mean < 0.005,
        "PC mean {} vs MC mean {mc_mean}",
        pc.mean
    );
    assert!(
        (pc.variance - mc_var).abs() / mc_var < 0.05,
        "PC variance {} vs MC variance {mc_var}",
        pc.variance
    );
}

#[test]
fn test_deterministic_end_to_end() {
    let (_, s1) = decay_system(3);
    let (_, s2) = decay_system(3);
    assert_eq!(s1.matrix(), s2.matrix());
    assert_eq!(s1.initial_coefficients(), s2.initial_coefficients());

    let times = vec![0.0, 1.0, 2.0];
    let t1 = integrate_rk4(|c, t| s1.rhs(c, t), s1.initial_coefficients(), &times, 1e-2).unwrap();
    let t2 = integrate_rk4(|c, t| s2.rhs(c, t), s2.initial_coefficients(), &times, 1e-2).unwrap();
    assert_eq!(t1, t2);
}
