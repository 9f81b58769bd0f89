use crate::error::{Error, Result};
use crate::Vector;

fn check_lengths(y_true: &Vector, y_pred: &Vector) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::invalid(format!(
            "y_true ({}) and y_pred ({}) must have the same length",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(Error::EmptyInput("y_true"));
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(|x| x * x).sum() / diff.len() as f64)
}

pub fn mean_absolute_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(f64::abs).sum() / diff.len() as f64)
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// Never exceeds 1.0 and is unbounded below. A constant `y_true` scores 1.0
/// when predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let y_mean = y_true.sum() / y_true.len() as f64;
    let ss_res = (y_true - y_pred).mapv(|x| x * x).sum();
    let ss_tot = y_true.mapv(|x| (x - y_mean) * (x - y_mean)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_squared_error() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![1.0, 2.0, 5.0];

        let mse = mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((mse - 4.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_absolute_error() {
        let y_true = array![1.0, -2.0, 3.0, 0.0];
        let y_pred = array![2.0, -2.0, 1.0, 1.0];

        let mae = mean_absolute_error(&y_true, &y_pred).unwrap();
        assert!((mae - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_r2_score_perfect() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![1.0, 2.0, 3.0, 4.0];

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!((r2 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_r2_score_mean_prediction_is_zero() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![2.5, 2.5, 2.5, 2.5];

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!(r2.abs() < 1e-10);
    }

    #[test]
    fn test_r2_score_can_be_negative() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![3.0, 2.0, 1.0];

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!((r2 - (-3.0)).abs() < 1e-10);
    }

    #[test]
    fn test_r2_score_constant_target() {
        let y_true = array![2.0, 2.0, 2.0];

        assert_eq!(r2_score(&y_true, &array![2.0, 2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&y_true, &array![1.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0];

        assert!(r2_score(&y_true, &y_pred).is_err());
        assert!(mean_squared_error(&y_true, &y_pred).is_err());
        assert!(mean_absolute_error(&Vector::zeros(0), &Vector::zeros(0)).is_err());
    }
}
