//! Linear models for regression.
//!
//! This module provides implementations of linear models including:
//! - `LinearRegression`: Ordinary least squares linear regression
//! - `Ridge`: Least squares with an L2 penalty, solved in closed form
//! - `Lasso`: Least squares with an L1 penalty, solved by coordinate descent
//! - `ElasticNet`: Mixed L1/L2 penalty, solved by coordinate descent
//!
//! All of them implement [`Regressor`].
//!
//! # Examples
//!
//! ## Linear Regression
//! ```rust
//! use linear_models::{LinearRegression, Regressor};
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0], [3.0]];
//! let y = array![2.0, 4.0, 6.0];
//!
//! let mut model = LinearRegression::new();
//! model.fit(&x, &y).unwrap();
//! let predictions = model.predict(&x).unwrap();
//! assert!((predictions[2] - 6.0).abs() < 1e-10);
//! ```
//!
//! ## Lasso
//! ```rust
//! use linear_models::{Lasso, Regressor};
//! use ndarray::array;
//!
//! let x = array![[1.0, 0.3], [2.0, -0.1], [3.0, 0.2], [4.0, -0.4]];
//! let y = array![2.0, 4.0, 6.0, 8.0];
//!
//! let mut lasso = Lasso::new().alpha(0.5);
//! lasso.fit(&x, &y).unwrap();
//! println!("features used: {}", lasso.n_nonzero().unwrap());
//! ```

mod base;
mod coordinate_descent;
mod elastic_net;
mod lasso;
mod linear_regression;
mod ridge;

pub use elastic_net::ElasticNet;
pub use lasso::{lasso_path, Lasso, LassoPathPoint};
pub use linear_regression::LinearRegression;
pub use ridge::Ridge;

use crate::error::Result;
use crate::{Matrix, Vector};

/// Common interface of the fitted-by-`fit` regression estimators.
pub trait Regressor {
    fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()>;

    fn predict(&self, x: &Matrix) -> Result<Vector>;

    /// Fitted weights, one per feature; `None` before `fit`.
    fn coefficients(&self) -> Option<&Vector>;

    fn intercept(&self) -> Option<f64>;

    /// R² of the predictions on `x` against `y`.
    fn score(&self, x: &Matrix, y: &Vector) -> Result<f64> {
        let y_pred = self.predict(x)?;
        crate::metrics::r2_score(y, &y_pred)
    }

    /// Number of coefficients that are exactly non-zero.
    fn n_nonzero(&self) -> Option<usize> {
        self.coefficients()
            .map(|coeffs| coeffs.iter().filter(|&&w| w != 0.0).count())
    }
}
