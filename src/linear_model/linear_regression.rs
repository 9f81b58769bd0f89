use tracing::debug;

use super::base::{predict_linear, prepare_data};
use super::Regressor;
use crate::error::{check_samples, Result};
use crate::linalg;
use crate::{Matrix, Vector};

/// Ordinary least squares.
///
/// Solved through the SVD of the (centred) design matrix, so collinear or
/// duplicated features yield the minimum-norm solution instead of an error.
#[derive(Clone, Debug)]
pub struct LinearRegression {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    /// Numerical rank of the design matrix seen by the solver.
    pub rank: Option<usize>,
    pub singular_values: Option<Vector>,
    fit_intercept: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::with_intercept(true)
    }

    pub fn with_intercept(fit_intercept: bool) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            rank: None,
            singular_values: None,
            fit_intercept,
        }
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        check_samples(x.nrows(), y.len())?;

        let data = prepare_data(x, y, self.fit_intercept, false);
        let solution = linalg::lstsq(&data.x, &data.y, None)?;
        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            rank = solution.rank,
            "fitted linear regression"
        );

        let (coeffs, intercept) = data.finish(solution.coefficients);
        self.coefficients = Some(coeffs);
        self.intercept = Some(intercept);
        self.rank = Some(solution.rank);
        self.singular_values = Some(solution.singular_values);
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
