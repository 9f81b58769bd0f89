use super::base::predict_linear;
use super::coordinate_descent::{fit_penalized, CdParams};
use super::Regressor;
use crate::error::Result;
use crate::{Matrix, Vector};

/// Linear regression with a mix of L1 and L2 penalties.
///
/// `l1_ratio = 1` is the lasso, `l1_ratio = 0` a ridge penalty of strength
/// `alpha / 2` on the `1 / (2 * n_samples)` scaled loss.
#[derive(Clone, Debug)]
pub struct ElasticNet {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    /// Passes over the features made by the last `fit`.
    pub n_iter: Option<usize>,
    pub dual_gap: Option<f64>,
    pub converged: Option<bool>,
    alpha: f64,
    l1_ratio: f64,
    fit_intercept: bool,
    normalize: bool,
    max_iter: usize,
    tolerance: f64,
}

impl ElasticNet {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            n_iter: None,
            dual_gap: None,
            converged: None,
            alpha: 1.0,
            l1_ratio: 0.5,
            fit_intercept: true,
            normalize: false,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn l1_ratio(mut self, l1_ratio: f64) -> Self {
        self.l1_ratio = l1_ratio;
        self
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn l1_penalty(&self) -> f64 {
        self.alpha * self.l1_ratio
    }

    pub fn l2_penalty(&self) -> f64 {
        self.alpha * (1.0 - self.l1_ratio)
    }

    fn params(&self) -> CdParams {
        CdParams {
            alpha: self.alpha,
            l1_ratio: self.l1_ratio,
            fit_intercept: self.fit_intercept,
            normalize: self.normalize,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
        }
    }
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for ElasticNet {
    fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        let fit = fit_penalized(x, y, &self.params())?;

        self.coefficients = Some(fit.coefficients);
        self.intercept = Some(fit.intercept);
        self.n_iter = Some(fit.n_iter);
        self.dual_gap = Some(fit.dual_gap);
        self.converged = Some(fit.converged);
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vector> {
        predict_linear(self.coefficients.as_ref(), self.intercept, x)
    }

    fn coefficients(&self) -> Option<&Vector> {
        self.coefficients.as_ref()
    }

    fn intercept(&self) -> Option<f64> {
        self.intercept
    }
}
