//! Fixed-step RK4 time integrator.
//!
//! Reference implementation of the integrator interface the engine
//! produces `rhs`/`c0` for: classical fourth-order Runge-Kutta over a
//! caller-supplied monotone output grid, with internal substeps capped at
//! `dt_max`. Deterministic, no adaptivity. The Galerkin RHS is linear and
//! mildly scaled, so a fixed step far below the decay timescale is both
//! simple and accurate to well past the truncation error of the expansion.

use crate::error::{ProjectionError, Result};

/// Integrate `dc/dt = rhs(c, t)` from `c0` at `times[0]`, returning one
/// state per output time (the first entry is `c0` itself).
///
/// Fails with `InvalidParameters` on an empty/non-monotone grid or a
/// non-positive `dt_max`.
pub fn integrate_rk4<F>(rhs: F, c0: &[f64], times: &[f64], dt_max: f64) -> Result<Vec<Vec<f64>>>
where
    F: Fn(&[f64], f64) -> Vec<f64>,
{
    if times.is_empty() {
        return Err(ProjectionError::InvalidParameters(
            "output time grid is empty".into(),
        ));
    }
    if !(dt_max > 0.0) {
        return Err(ProjectionError::InvalidParameters(format!(
            "dt_max must be positive, got {dt_max}"
        )));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ProjectionError::InvalidParameters(
            "output times must be strictly increasing".into(),
        ));
    }

    let mut trajectory = Vec::with_capacity(times.len());
    let mut state = c0.to_vec();
    trajectory.push(state.clone());

    for w in times.windows(2) {
        let (t_start, t_end) = (w[0], w[1]);
        let span = t_end - t_start;
        let steps = (span / dt_max).ceil().max(1.0) as usize;
        let h = span / steps as f64;

        let mut t = t_start;
        for _ in 0..steps {
            state = rk4_step(&rhs, &state, t, h);
            t += h;
        }
        trajectory.push(state.clone());
    }

    Ok(trajectory)
}

fn rk4_step<F>(rhs: &F, c: &[f64], t: f64, h: f64) -> Vec<f64>
where
    F: Fn(&[f64], f64) -> Vec<f64>,
{
    let k1 = rhs(c, t);
    let k2 = rhs(&axpy(c, &k1, 0.5 * h), t + 0.5 * h);
    let k3 = rhs(&axpy(c, &k2, 0.5 * h), t + 0.5 * h);
    let k4 = rhs(&axpy(c, &k3, h), t + h);

    c.iter()
        .enumerate()
        .map(|(i, &ci)| ci + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
        .collect()
}

/// `c + s * k`, element-wise.
fn axpy(c: &[f64], k: &[f64], s: f64) -> Vec<f64> {
    c.iter().zip(k).map(|(&ci, &ki)| ci + s * ki).collect()
}
