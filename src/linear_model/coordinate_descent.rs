//! Cyclic coordinate descent shared by `ElasticNet` and `Lasso`.
//!
//! Minimizes
//!
//! ```text
//! 1 / (2 * n_samples) * ||y - Xw||² + alpha * l1_ratio * ||w||₁
//!     + 0.5 * alpha * (1 - l1_ratio) * ||w||²
//! ```
//!
//! keeping the residual `y - Xw` up to date after every coordinate update and
//! using the duality gap as the stopping certificate.

use tracing::{debug, warn};

use super::base::{check_alpha, prepare_data};
use crate::error::{check_samples, Error, Result};
use crate::{Matrix, Vector};

#[derive(Clone, Copy, Debug)]
pub(crate) struct CdParams {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub fit_intercept: bool,
    pub normalize: bool,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl CdParams {
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(Error::invalid(format!(
                "l1_ratio must be between 0 and 1, got {}",
                self.l1_ratio
            )));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid("max_iter must be at least 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Result of a single coordinate descent run on prepared data.
#[derive(Clone, Debug)]
pub(crate) struct CdOutcome {
    pub coefficients: Vector,
    pub n_iter: usize,
    /// Duality gap divided by `n_samples`, in units of the objective.
    pub dual_gap: f64,
    pub converged: bool,
}

/// Fitted penalized model in the original feature space.
#[derive(Clone, Debug)]
pub(crate) struct CdFit {
    pub coefficients: Vector,
    pub intercept: f64,
    pub n_iter: usize,
    pub dual_gap: f64,
    pub converged: bool,
}

pub(crate) fn fit_penalized(x: &Matrix, y: &Vector, params: &CdParams) -> Result<CdFit> {
    check_samples(x.nrows(), y.len())?;
    params.validate()?;

    let data = prepare_data(x, y, params.fit_intercept, params.normalize);
    let outcome = coordinate_descent(
        &data.x,
        &data.y,
        params.alpha * params.l1_ratio,
        params.alpha * (1.0 - params.l1_ratio),
        params.max_iter,
        params.tolerance,
        None,
    );

    if outcome.converged {
        debug!(
            alpha = params.alpha,
            l1_ratio = params.l1_ratio,
            n_iter = outcome.n_iter,
            dual_gap = outcome.dual_gap,
            "coordinate descent converged"
        );
    } else {
        warn!(
            alpha = params.alpha,
            l1_ratio = params.l1_ratio,
            max_iter = params.max_iter,
            dual_gap = outcome.dual_gap,
            "objective did not converge, consider increasing max_iter"
        );
    }

    let (coefficients, intercept) = data.finish(outcome.coefficients);
    Ok(CdFit {
        coefficients,
        intercept,
        n_iter: outcome.n_iter,
        dual_gap: outcome.dual_gap,
        converged: outcome.converged,
    })
}

/// Runs coordinate descent with penalties `l1` and `l2` as in the module
/// objective, optionally warm-started from `init`.
pub(crate) fn coordinate_descent(
    x: &Matrix,
    y: &Vector,
    l1: f64,
    l2: f64,
    max_iter: usize,
    tolerance: f64,
    init: Option<Vector>,
) -> CdOutcome {
    let (n_samples, n_features) = x.dim();
    let n = n_samples as f64;
    let l1_reg = l1 * n;
    let l2_reg = l2 * n;

    let mut beta = init.unwrap_or_else(|| Vector::zeros(n_features));
    let mut residual = y - &x.dot(&beta);

    let x_norms: Vec<f64> = x.columns().into_iter().map(|col| col.dot(&col)).collect();
    let tolerance_scaled = tolerance * y.dot(y);
    let mut dual_gap = f64::INFINITY;

    for n_iter in 1..=max_iter {
        let mut w_max: f64 = 0.0;
        let mut d_w_max: f64 = 0.0;

        for j in 0..n_features {
            if x_norms[j] == 0.0 {
                continue;
            }

            let column = x.column(j);
            let w_old = beta[j];
            if w_old != 0.0 {
                residual.scaled_add(w_old, &column);
            }

            let rho = column.dot(&residual);
            let w_new = soft_threshold(rho, l1_reg) / (x_norms[j] + l2_reg);
            if w_new != 0.0 {
                residual.scaled_add(-w_new, &column);
            }
            beta[j] = w_new;

            d_w_max = d_w_max.max((w_new - w_old).abs());
            w_max = w_max.max(w_new.abs());
        }

        if w_max == 0.0 || d_w_max / w_max < tolerance || n_iter == max_iter {
            dual_gap = duality_gap(x, y, &beta, &residual, l1_reg, l2_reg);
            if dual_gap <= tolerance_scaled {
                return CdOutcome {
                    coefficients: beta,
                    n_iter,
                    dual_gap: dual_gap / n,
                    converged: true,
                };
            }
        }
    }

    CdOutcome {
        coefficients: beta,
        n_iter: max_iter,
        dual_gap: dual_gap / n,
        converged: false,
    }
}

fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

/// Gap between the primal objective and the dual objective evaluated at the
/// rescaled residual, both multiplied by `n_samples`.
fn duality_gap(
    x: &Matrix,
    y: &Vector,
    beta: &Vector,
    residual: &Vector,
    l1_reg: f64,
    l2_reg: f64,
) -> f64 {
    let xt_a = x.t().dot(residual) - &(beta * l2_reg);
    let dual_norm = xt_a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let r_norm2 = residual.dot(residual);
    let w_norm2 = beta.dot(beta);

    let (constant, mut gap) = if dual_norm > l1_reg {
        let constant = l1_reg / dual_norm;
        (constant, 0.5 * r_norm2 * (1.0 + constant * constant))
    } else {
        (1.0, r_norm2)
    };

    let l1_norm = beta.mapv(f64::abs).sum();
    gap += l1_reg * l1_norm - constant * residual.dot(y)
        + 0.5 * l2_reg * (1.0 + constant * constant) * w_norm2;
    gap
}
