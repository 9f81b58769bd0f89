use ndarray::Axis;

use crate::error::{Error, Result};
use crate::{Matrix, Vector};

const STD_EPSILON: f64 = 1e-10;

/// Training data after centring and optional scaling, together with the
/// offsets needed to express the solution in the original feature space.
pub(crate) struct PreparedData {
    pub x: Matrix,
    pub y: Vector,
    x_offset: Vector,
    y_offset: f64,
    x_scale: Vector,
    fit_intercept: bool,
}

/// Centres `x` and `y` when an intercept is fitted and, for centred data
/// only, divides the columns of `x` by their standard deviation when
/// `normalize` is set. Without an intercept `normalize` is ignored.
pub(crate) fn prepare_data(
    x: &Matrix,
    y: &Vector,
    fit_intercept: bool,
    normalize: bool,
) -> PreparedData {
    let n_features = x.ncols();

    let (mut x_out, y_out, x_offset, y_offset) = if fit_intercept {
        let x_offset = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Vector::zeros(n_features));
        let y_offset = y.mean().unwrap_or(0.0);
        (x - &x_offset, y - y_offset, x_offset, y_offset)
    } else {
        (x.clone(), y.clone(), Vector::zeros(n_features), 0.0)
    };

    let x_scale = if fit_intercept && normalize {
        let scale = x_out
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > STD_EPSILON { std } else { 1.0 });
        x_out /= &scale;
        scale
    } else {
        Vector::ones(n_features)
    };

    PreparedData {
        x: x_out,
        y: y_out,
        x_offset,
        y_offset,
        x_scale,
        fit_intercept,
    }
}

impl PreparedData {
    /// Maps coefficients solved on the prepared data back to the input space
    /// and derives the intercept.
    pub fn finish(&self, coef_scaled: Vector) -> (Vector, f64) {
        let coef = coef_scaled / &self.x_scale;
        let intercept = if self.fit_intercept {
            self.y_offset - self.x_offset.dot(&coef)
        } else {
            0.0
        };
        (coef, intercept)
    }

    /// Maps coefficients back to the input space without deriving an intercept.
    pub fn unscale(&self, coef_scaled: &Vector) -> Vector {
        coef_scaled / &self.x_scale
    }
}

pub(crate) fn predict_linear(
    coefficients: Option<&Vector>,
    intercept: Option<f64>,
    x: &Matrix,
) -> Result<Vector> {
    let coeffs = coefficients.ok_or(Error::NotFitted)?;

    if x.ncols() != coeffs.len() {
        return Err(Error::FeatureMismatch {
            expected: coeffs.len(),
            got: x.ncols(),
        });
    }

    Ok(x.dot(coeffs) + intercept.unwrap_or(0.0))
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(Error::invalid(format!(
            "alpha must be non-negative, got {}",
            alpha
        )));
    }
    Ok(())
}
