//! Property-based tests for the projection engine invariants.

use proptest::prelude::*;

use polychaos::multi_index::basis_len;
use polychaos::{
    build_basis, reconstruct_moments, JointDistribution, Marginal, TensorQuadrature,
};

/// Strategy: generate one marginal from the supported families with sane
/// parameter ranges.
fn marginal_strategy() -> impl Strategy<Value = Marginal> {
    prop_oneof![
        (-5.0..5.0f64, 0.5..4.0f64)
            .prop_map(|(a, w)| Marginal::uniform(a, a + w).unwrap()),
        (-3.0..3.0f64, 0.2..2.0f64).prop_map(|(mu, s)| Marginal::normal(mu, s).unwrap()),
        (0.5..4.0f64).prop_map(|r| Marginal::exponential(r).unwrap()),
        (-2.0..2.0f64, 0.1..0.9f64, 1.0..3.0f64).prop_map(|(a, frac, w)| {
            Marginal::triangular(a, a + frac * w, a + w).unwrap()
        }),
    ]
}

/// Strategy: a joint distribution with 1-3 independent dimensions.
fn joint_strategy() -> impl Strategy<Value = JointDistribution> {
    prop::collection::vec(marginal_strategy(), 1..=3)
        .prop_map(|ms| JointDistribution::new(ms).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // 1. Basis size is C(order + d, d)
    #[test]
    fn combinatorial_sizing(joint in joint_strategy(), order in 0..=4usize) {
        let basis = build_basis(&joint, order).unwrap();
        prop_assert_eq!(basis.len(), basis_len(joint.dimensionality(), order));
    }

    // 2. All norms are strictly positive and norms[0] = 1
    #[test]
    fn norm_positivity(joint in joint_strategy(), order in 0..=4usize) {
        let basis = build_basis(&joint, order).unwrap();
        prop_assert!((basis.norm(0) - 1.0).abs() < 1e-12);
        for k in 0..basis.len() {
            prop_assert!(basis.norm(k) > 0.0, "norm {} = {}", k, basis.norm(k));
        }
    }

    // 3. Distinct basis elements are orthogonal under the joint measure
    #[test]
    fn orthogonality(joint in joint_strategy(), order in 1..=3usize) {
        let basis = build_basis(&joint, order).unwrap();
        let grid = TensorQuadrature::new(&joint, order + 2).unwrap();
        for i in 0..basis.len() {
            for j in 0..i {
                let e = grid.integrate(|x| basis.eval(i, x) * basis.eval(j, x));
                let scale = (basis.norm(i) * basis.norm(j)).sqrt().max(1e-30);
                prop_assert!(
                    (e / scale).abs() < 1e-7,
                    "E[Phi_{} Phi_{}] = {} (scale {})", i, j, e, scale
                );
            }
        }
    }

    // 4. Parseval: E[(sum c_k Phi_k)^2] = sum c_k^2 norms[k]
    #[test]
    fn parseval_identity(
        joint in joint_strategy(),
        order in 1..=3usize,
        raw in prop::collection::vec(-2.0..2.0f64, 56),
    ) {
        let basis = build_basis(&joint, order).unwrap();
        let c = &raw[..basis.len()];
        let grid = TensorQuadrature::new(&joint, order + 2).unwrap();

        let quad = grid.integrate(|x| {
            let u: f64 = basis
                .eval_all(x)
                .iter()
                .zip(c)
                .map(|(&phi, &ck)| ck * phi)
                .sum();
            u * u
        });
        let parseval: f64 = c
            .iter()
            .zip(basis.norms())
            .map(|(&ck, &h)| ck * ck * h)
            .sum();
        let scale = parseval.abs().max(1.0);
        prop_assert!(
            (quad - parseval).abs() < 1e-7 * scale,
            "quadrature {} vs Parseval {}", quad, parseval
        );
    }

    // 5. Reconstructed moments match Parseval directly for a single mode
    #[test]
    fn single_mode_moments(
        joint in joint_strategy(),
        order in 1..=3usize,
        scale in -3.0..3.0f64,
        pick in 0.0..1.0f64,
    ) {
        let basis = build_basis(&joint, order).unwrap();
        let k = 1 + ((pick * (basis.len() - 1) as f64) as usize).min(basis.len() - 2);
        let mut c = vec![0.0; basis.len()];
        c[0] = 7.0;
        c[k] = scale;
        let m = reconstruct_moments(&c, &basis).unwrap();
        prop_assert_eq!(m.mean, 7.0);
        let expected = scale * scale * basis.norm(k);
        prop_assert!(
            (m.variance - expected).abs() < 1e-12 * expected.max(1.0),
            "variance {} expected {}", m.variance, expected
        );
    }

    // 6. Construction is deterministic
    #[test]
    fn determinism(joint in joint_strategy(), order in 0..=3usize) {
        let a = build_basis(&joint, order).unwrap();
        let b = build_basis(&joint, order).unwrap();
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
        for k in 0..a.len() {
            prop_assert_eq!(a.norm(k).to_bits(), b.norm(k).to_bits());
        }
    }

    // 7. Gauss grids integrate marginal mean/variance exactly
    #[test]
    fn grid_matches_analytic_moments(m in marginal_strategy()) {
        let joint = JointDistribution::new(vec![m.clone()]).unwrap();
        let grid = TensorQuadrature::new(&joint, 6).unwrap();
        let mean = grid.integrate(|x| x[0]);
        let var = grid.integrate(|x| (x[0] - mean) * (x[0] - mean));
        prop_assert!((mean - m.mean()).abs() < 1e-8 * m.mean().abs().max(1.0),
            "{}: mean {} vs {}", m, mean, m.mean());
        prop_assert!((var - m.variance()).abs() < 1e-8 * m.variance().max(1.0),
            "{}: var {} vs {}", m, var, m.variance());
    }
}

// 8. Expansion of Phi_0 is the constant 1 for every supported family
//    (non-proptest spot check across a fixed mixed joint).
#[test]
fn first_element_is_unity() {
    let joint = JointDistribution::new(vec![
        Marginal::uniform(0.0, 1.0).unwrap(),
        Marginal::triangular(0.0, 0.25, 1.0).unwrap(),
        Marginal::normal(0.0, 1.0).unwrap(),
    ])
    .unwrap();
    let basis = build_basis(&joint, 2).unwrap();
    for &x in &[[0.2, 0.3, -1.0], [0.9, 0.8, 2.0]] {
        assert!((basis.eval(0, &x) - 1.0).abs() < 1e-15);
    }
    let p = basis.expand(0);
    assert_eq!(p.total_degree(), 0);
    assert!((p.eval(&[0.5, 0.5, 0.0]) - 1.0).abs() < 1e-15);
}
