//! polychaos-decay: end-to-end stochastic Galerkin benchmark.
//!
//! Solves `du/dt = -a u`, `u(0) = I` with `a ~ Uniform(0.1, 0.2)` and
//! `I ~ Uniform(1, 2)`, reconstructs the moment trajectory, compares it
//! against the closed-form moments of `u(t) = I e^(-a t)`, and writes the
//! series as JSON.

use std::fs;
use std::time::Instant;

use polychaos::{
    build_basis, build_coupling_matrix, build_galerkin_system, integrate_rk4,
    reconstruct_moment_series, JointDistribution, Marginal, Polynomial,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut order = 3usize;
    let mut t_max = 10.0f64;
    let mut steps = 100usize;
    let mut output = "outputs/decay_moments.json".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--order" => {
                i += 1;
                order = args[i].parse().expect("--order takes an integer");
            }
            "--t-max" => {
                i += 1;
                t_max = args[i].parse().expect("--t-max takes a number");
            }
            "--steps" => {
                i += 1;
                steps = args[i].parse().expect("--steps takes an integer");
                if steps == 0 {
                    eprintln!("--steps must be at least 1");
                    std::process::exit(1);
                }
            }
            "--output" => {
                i += 1;
                output = args[i].clone();
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    println!("=== polychaos-decay ===");

    let a_dist = Marginal::uniform(0.1, 0.2).unwrap();
    let i_dist = Marginal::uniform(1.0, 2.0).unwrap();
    println!("a ~ {}", a_dist);
    println!("I ~ {}", i_dist);
    println!("Expansion order: {} | t in [0, {}] | {} outputs", order, t_max, steps);
    println!();

    let joint = JointDistribution::new(vec![a_dist, i_dist]).unwrap();

    // Basis + Galerkin assembly
    let t0 = Instant::now();
    let basis = match build_basis(&joint, order) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Basis construction failed: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Basis: M = {} elements (order {}, d = {}) in {:.2} ms",
        basis.len(),
        basis.order(),
        basis.dim(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let t0 = Instant::now();
    let a = Polynomial::variable(2, 0);
    let tensor = build_coupling_matrix(&basis, &joint, Some(&a))
        .unwrap_or_else(|e| {
            eprintln!("Coupling tensor assembly failed: {}", e);
            std::process::exit(1);
        });
    let initial = Polynomial::variable(2, 1);
    let system = build_galerkin_system(&basis, &joint, &tensor, &initial)
        .unwrap_or_else(|e| {
            eprintln!("Galerkin assembly failed: {}", e);
            std::process::exit(1);
        });
    println!(
        "Galerkin system: {}x{} matrix in {:.2} ms",
        system.len(),
        system.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    // Time integration
    let times: Vec<f64> = (0..=steps)
        .map(|k| t_max * k as f64 / steps as f64)
        .collect();
    let t0 = Instant::now();
    let trajectory = integrate_rk4(
        |c, t| system.rhs(c, t),
        system.initial_coefficients(),
        &times,
        1e-3,
    )
    .unwrap();
    println!(
        "RK4: {} outputs in {:.2} ms",
        trajectory.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let series = reconstruct_moment_series(&times, &trajectory, &basis).unwrap();

    // Compare against the closed-form moments of u(t) = I e^(-a t)
    println!();
    println!("   t   |  mean (PC)  | mean (exact) |  var (PC)   | var (exact) ");
    println!("-------|-------------|--------------|-------------|-------------");
    let mut max_mean_err = 0.0f64;
    let mut max_var_err = 0.0f64;
    for k in (0..=steps).step_by((steps / 10).max(1)) {
        let t = times[k];
        let (em, ev) = exact_moments(t);
        let rel_m = (series.mean[k] - em).abs() / em.abs().max(1e-300);
        let rel_v = (series.variance[k] - ev).abs() / ev.abs().max(1e-300);
        max_mean_err = max_mean_err.max(rel_m);
        max_var_err = max_var_err.max(rel_v);
        println!(
            " {:5.2} | {:11.6} | {:12.6} | {:11.8} | {:11.8}",
            t, series.mean[k], em, series.variance[k], ev
        );
    }
    println!();
    println!(
        "Max relative error: mean {:.2e}, variance {:.2e}",
        max_mean_err, max_var_err
    );

    // JSON export
    if let Some(parent) = std::path::Path::new(&output).parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(&series).expect("JSON serialization failed");
    fs::write(&output, json).expect("Failed to write output file");
    println!("Wrote {} ({} samples)", output, series.times.len());
}

/// Closed-form moments of u(t) = I e^(-a t) for a ~ U(0.1, 0.2),
/// I ~ U(1, 2).
fn exact_moments(t: f64) -> (f64, f64) {
    let (a0, a1) = (0.1, 0.2);
    let mean_i = 1.5;
    let mean_i2 = 7.0 / 3.0;
    // E[e^(-s a t)] for a ~ U(a0, a1)
    let laplace = |s: f64| {
        if t == 0.0 {
            1.0
        } else {
            ((-s * a0 * t).exp() - (-s * a1 * t).exp()) / (s * (a1 - a0) * t)
        }
    };
    let mean = mean_i * laplace(1.0);
    let second = mean_i2 * laplace(2.0);
    (mean, second - mean * mean)
}

fn print_usage() {
    println!(
        "polychaos-decay: stochastic Galerkin benchmark for du/dt = -a u.

USAGE:
    polychaos-decay [OPTIONS]

OPTIONS:
    --order <N>       Total polynomial order [default: 3]
    --t-max <T>       Final time [default: 10]
    --steps <N>       Number of output intervals [default: 100]
    --output <FILE>   JSON output path [default: outputs/decay_moments.json]
    -h, --help        Print this help

OUTPUT:
    Moment trajectory (times, mean, variance, std_dev) as pretty JSON,
    plus a comparison table against the closed-form moments of
    u(t) = I exp(-a t)."
    );
}
