// Dirichlet expectations for the variational updates.

use statrs::function::gamma::digamma;

/// E[log θ] for θ ~ Dirichlet(alpha).
pub fn dirichlet_expectation(alpha: &[f64]) -> Vec<f64> {
    let total = digamma(alpha.iter().sum());
    alpha.iter().map(|&a| digamma(a) - total).collect()
}

/// exp(E[log θ]) for θ ~ Dirichlet(alpha).
pub fn exp_dirichlet_expectation(alpha: &[f64]) -> Vec<f64> {
    dirichlet_expectation(alpha)
        .into_iter()
        .map(f64::exp)
        .collect()
}

/// Mean absolute elementwise difference.
pub fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    sum / a.len() as f64
}
