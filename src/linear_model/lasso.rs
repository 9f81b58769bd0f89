use tracing::debug;

use super::base::{check_alpha, predict_linear, prepare_data};
use super::coordinate_descent::{coordinate_descent, fit_penalized, CdParams};
use super::Regressor;
use crate::error::{check_samples, Error, Result};
use crate::{Matrix, Vector};

/// Linear regression with an L1 penalty, minimizing
/// `1 / (2 * n_samples) * ||y - Xw||² + alpha * ||w||₁`.
///
/// Larger `alpha` drives more coefficients to exactly zero.
#[derive(Clone, Debug)]
pub struct Lasso {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    pub n_iter: Option<usize>,
    pub dual_gap: Option<f64>,
    pub converged: Option<bool>,
    alpha: f64,
    fit_intercept: bool,
    normalize: bool,
    max_iter: usize,
    tolerance: f64,
}

impl Lasso {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            n_iter: None,
            dual_gap: None,
            converged: None,
            alpha: 1.0,
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

    pub fn penalty(&self) -> f64 {
        self.alpha
    }
}

impl Default for Lasso {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for Lasso {
    fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        let params = CdParams {
            alpha: self.alpha,
            l1_ratio: 1.0,
            fit_intercept: self.fit_intercept,
            normalize: self.normalize,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
        };
        let fit = fit_penalized(x, y, &params)?;

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

/// One point of a regularization path.
#[derive(Clone, Debug)]
pub struct LassoPathPoint {
    pub alpha: f64,
    pub coefficients: Vector,
    pub converged: bool,
}

/// Fits the lasso for every alpha, from the strongest penalty to the weakest,
/// warm-starting each fit from the previous solution.
///
/// The data is centred once up front. Points are returned in decreasing
/// `alpha` order.
pub fn lasso_path(
    x: &Matrix,
    y: &Vector,
    alphas: &[f64],
    max_iter: usize,
    tolerance: f64,
) -> Result<Vec<LassoPathPoint>> {
    check_samples(x.nrows(), y.len())?;
    if alphas.is_empty() {
        return Err(Error::invalid("lasso_path needs at least one alpha"));
    }
    for &alpha in alphas {
        check_alpha(alpha)?;
    }

    let mut sorted = alphas.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let data = prepare_data(x, y, true, false);
    let mut warm_start: Option<Vector> = None;
    let mut path = Vec::with_capacity(sorted.len());

    for alpha in sorted {
        let outcome = coordinate_descent(
            &data.x,
            &data.y,
            alpha,
            0.0,
            max_iter,
            tolerance,
            warm_start.take(),
        );
        debug!(
            alpha,
            n_iter = outcome.n_iter,
            converged = outcome.converged,
            "lasso path step"
        );

        path.push(LassoPathPoint {
            alpha,
            coefficients: data.unscale(&outcome.coefficients),
            converged: outcome.converged,
        });
        warm_start = Some(outcome.coefficients);
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Centred, mutually orthogonal columns: the lasso solution is the least
    /// squares solution soft-thresholded by alpha.
    fn orthogonal_problem() -> (Matrix, Vector) {
        let x = array![
            [1.0, 1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0, 1.0],
            [-1.0, -1.0, -1.0, -1.0]
        ];
        let y = x.dot(&array![5.0, 2.0, 0.5, 0.0]) + 3.0;
        (x, y)
    }

    #[test]
    fn test_lasso_soft_thresholds_orthogonal_design() {
        let (x, y) = orthogonal_problem();

        let mut model = Lasso::new().alpha(1.0).tolerance(1e-8);
        model.fit(&x, &y).unwrap();

        let coeffs = model.coefficients.as_ref().unwrap();
        assert!((coeffs[0] - 4.0).abs() < 1e-10);
        assert!((coeffs[1] - 1.0).abs() < 1e-10);
        assert_eq!(coeffs[2], 0.0);
        assert_eq!(coeffs[3], 0.0);
        assert!((model.intercept.unwrap() - 3.0).abs() < 1e-10);
        assert_eq!(model.n_nonzero(), Some(2));
        assert_eq!(model.converged, Some(true));
    }

    #[test]
    fn test_lasso_features_used_shrink_with_alpha() {
        let (x, y) = orthogonal_problem();

        let counts: Vec<usize> = [0.1, 1.0, 3.0, 10.0]
            .iter()
            .map(|&alpha| {
                let mut model = Lasso::new().alpha(alpha);
                model.fit(&x, &y).unwrap();
                model.n_nonzero().unwrap()
            })
            .collect();

        assert_eq!(counts, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_lasso_tiny_alpha_matches_least_squares() {
        let x = array![[1.0, 0.5], [2.0, -1.0], [3.0, 2.0], [4.0, 0.0], [5.0, 1.5]];
        let y = array![2.0, 8.0, 6.0, 13.0, 13.0];

        let mut lasso = Lasso::new().alpha(1e-8).tolerance(1e-10).max_iter(100_000);
        lasso.fit(&x, &y).unwrap();

        let mut ols = crate::LinearRegression::new();
        ols.fit(&x, &y).unwrap();

        let lasso_coeffs = lasso.coefficients.as_ref().unwrap();
        let ols_coeffs = ols.coefficients.as_ref().unwrap();
        for (a, b) in lasso_coeffs.iter().zip(ols_coeffs.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_lasso_without_intercept() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = Lasso::new().alpha(0.1).fit_intercept(false);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.intercept.unwrap(), 0.0);
        // (x.y - n * alpha) / x.x = (60 - 0.4) / 30
        let coeffs = model.coefficients.as_ref().unwrap();
        assert!((coeffs[0] - 59.6 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_lasso_invalid_parameters() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];

        assert!(Lasso::new().alpha(-0.5).fit(&x, &y).is_err());
        assert!(Lasso::new().max_iter(0).fit(&x, &y).is_err());
        assert!(Lasso::new().tolerance(-1.0).fit(&x, &y).is_err());
    }

    #[test]
    fn test_lasso_predict_without_fit() {
        let x = array![[1.0], [2.0]];
        assert!(Lasso::new().predict(&x).is_err());
    }

    #[test]
    fn test_lasso_path_orders_and_sparsifies() {
        let (x, y) = orthogonal_problem();

        let path = lasso_path(&x, &y, &[1.0, 10.0, 0.1, 3.0], 1000, 1e-8).unwrap();
        let alphas: Vec<f64> = path.iter().map(|point| point.alpha).collect();
        assert_eq!(alphas, vec![10.0, 3.0, 1.0, 0.1]);

        let counts: Vec<usize> = path
            .iter()
            .map(|point| point.coefficients.iter().filter(|&&w| w != 0.0).count())
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(counts, vec![0, 1, 2, 3]);
        assert!(path.iter().all(|point| point.converged));

        let at_one = &path[2].coefficients;
        assert!((at_one[0] - 4.0).abs() < 1e-10);
        assert!((at_one[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_lasso_path_rejects_bad_input() {
        let (x, y) = orthogonal_problem();

        assert!(lasso_path(&x, &y, &[], 100, 1e-4).is_err());
        assert!(lasso_path(&x, &y, &[1.0, -1.0], 100, 1e-4).is_err());
    }
}
