use tracing::debug;

use super::base::{check_alpha, predict_linear, prepare_data};
use super::Regressor;
use crate::error::{check_samples, Result};
use crate::linalg;
use crate::{Matrix, Vector};

/// Least squares with an L2 penalty `alpha * ||w||²`.
#[derive(Clone, Debug)]
pub struct Ridge {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    alpha: f64,
    fit_intercept: bool,
    normalize: bool,
}

impl Ridge {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 1.0,
            fit_intercept: true,
            normalize: false,
        }
    }

    /// Regularization strength, must be non-negative. Checked by `fit`.
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

    pub fn penalty(&self) -> f64 {
        self.alpha
    }

    /// Solves the penalized normal equations in whichever of the primal
    /// (`n_features x n_features`) or dual (`n_samples x n_samples`) forms is
    /// smaller.
    fn solve_ridge_equation(&self, x: &Matrix, y: &Vector) -> Result<Vector> {
        if x.nrows() >= x.ncols() {
            let xt = x.t();
            let mut regularized_xtx = xt.dot(x);
            for i in 0..regularized_xtx.nrows() {
                regularized_xtx[(i, i)] += self.alpha;
            }

            let xty = xt.dot(y);
            linalg::solve(&regularized_xtx, &xty)
        } else {
            let mut regularized_xxt = x.dot(&x.t());
            for i in 0..regularized_xxt.nrows() {
                regularized_xxt[(i, i)] += self.alpha;
            }

            let dual = linalg::solve(&regularized_xxt, y)?;
            Ok(x.t().dot(&dual))
        }
    }
}

impl Default for Ridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for Ridge {
    fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        check_samples(x.nrows(), y.len())?;
        check_alpha(self.alpha)?;

        let data = prepare_data(x, y, self.fit_intercept, self.normalize);
        let coeffs_scaled = self.solve_ridge_equation(&data.x, &data.y)?;
        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            alpha = self.alpha,
            "fitted ridge"
        );

        let (coeffs, intercept) = data.finish(coeffs_scaled);
        self.coefficients = Some(coeffs);
        self.intercept = Some(intercept);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use ndarray::array;

    #[test]
    fn test_ridge_simple() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = Ridge::new().alpha(0.0);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();

        for (pred, actual) in predictions.iter().zip(y.iter()) {
            assert!((pred - actual).abs() < 1e-10);
        }
    }

    #[test]
    fn test_ridge_closed_form() {
        // Centred x is [-1.5, -0.5, 0.5, 1.5] (sum of squares 5), centred y is
        // 2x, so the slope is 10 / (5 + alpha).
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = Ridge::new().alpha(1.0);
        model.fit(&x, &y).unwrap();

        let slope = model.coefficients.as_ref().unwrap()[0];
        assert!((slope - 10.0 / 6.0).abs() < 1e-12);
        assert!((model.intercept.unwrap() - (5.0 - slope * 2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_with_regularization() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.1, 3.9, 6.1, 7.9];

        let mut model = Ridge::new().alpha(1.0);
        model.fit(&x, &y).unwrap();

        let score = model.score(&x, &y).unwrap();
        assert!(score > 0.8);
    }

    #[test]
    fn test_ridge_shrinks_with_alpha() {
        let x = array![
            [1.0, 0.2, -1.0],
            [2.0, -0.4, 0.5],
            [3.0, 1.1, 0.0],
            [4.0, 0.3, 2.0],
            [5.0, -0.8, -0.7],
            [6.0, 0.9, 1.3]
        ];
        let y = array![1.5, 3.2, 6.8, 8.1, 8.9, 12.4];

        let mut previous = f64::INFINITY;
        for alpha in [0.01, 0.1, 1.0, 10.0, 100.0] {
            let mut model = Ridge::new().alpha(alpha);
            model.fit(&x, &y).unwrap();
            let norm = model.coefficients.as_ref().unwrap().mapv(|w| w * w).sum();
            assert!(norm < previous);
            previous = norm;
        }
    }

    #[test]
    fn test_ridge_without_intercept() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = Ridge::new().alpha(0.1).fit_intercept(false);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.intercept.unwrap(), 0.0);
        let coeffs = model.coefficients.as_ref().unwrap();
        assert!((coeffs[0] - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_ridge_multivariate() {
        let x = array![[1.0, 2.0], [2.0, 3.0], [3.0, 4.0], [4.0, 5.0]];
        let y = array![5.0, 8.0, 11.0, 14.0];

        let mut model = Ridge::new().alpha(0.5);
        model.fit(&x, &y).unwrap();

        let score = model.score(&x, &y).unwrap();
        assert!(score > 0.8);
    }

    #[test]
    fn test_ridge_dual_matches_primal() {
        // More features than samples takes the dual path.
        let x = array![[1.0, 2.0, 0.5, -1.0], [0.0, 1.0, 3.0, 2.0], [2.0, -1.0, 1.0, 0.5]];
        let y = array![1.0, -2.0, 0.5];
        let alpha = 0.7;

        let mut model = Ridge::new().alpha(alpha).fit_intercept(false);
        model.fit(&x, &y).unwrap();

        let mut gram = x.t().dot(&x);
        for i in 0..gram.nrows() {
            gram[(i, i)] += alpha;
        }
        let primal = linalg::solve(&gram, &x.t().dot(&y)).unwrap();

        let coeffs = model.coefficients.as_ref().unwrap();
        for (dual, expected) in coeffs.iter().zip(primal.iter()) {
            assert!((dual - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_ridge_with_normalization() {
        let x = array![[1.0, 100.0], [2.0, 200.0], [3.0, 300.0], [4.0, 400.0]];
        let y = array![5.0, 8.0, 11.0, 14.0];

        let mut model = Ridge::new().alpha(1.0).normalize(true);
        model.fit(&x, &y).unwrap();

        let score = model.score(&x, &y).unwrap();
        assert!(score > 0.5);
    }

    #[test]
    fn test_ridge_invalid_alpha() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];

        let mut model = Ridge::new().alpha(-1.0);
        assert!(matches!(
            model.fit(&x, &y),
            Err(Error::InvalidParameter(_))
        ));
        assert!(model.coefficients.is_none());
    }

    #[test]
    fn test_ridge_predict_without_fit() {
        let x = array![[1.0], [2.0]];
        let model = Ridge::new();

        assert!(model.predict(&x).is_err());
    }

    #[test]
    fn test_ridge_dimension_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];

        let mut model = Ridge::new();
        assert!(model.fit(&x, &y).is_err());
    }
}
