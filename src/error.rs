use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("number of samples in X ({x_rows}) and y ({y_len}) must match")]
    SampleMismatch { x_rows: usize, y_len: usize },

    #[error("{0} must have at least one sample")]
    EmptyInput(&'static str),

    #[error("model not fitted, call fit() first")]
    NotFitted,

    #[error("number of features in X ({got}) doesn't match training data ({expected})")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("matrix is singular or nearly singular")]
    Singular,

    #[error("malformed dataset: {0}")]
    MalformedData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}

/// Rejects `x`/`y` pairs that cannot be fitted: differing sample counts or no
/// samples at all.
pub(crate) fn check_samples(x_rows: usize, y_len: usize) -> Result<()> {
    if x_rows != y_len {
        return Err(Error::SampleMismatch { x_rows, y_len });
    }
    if x_rows == 0 {
        return Err(Error::EmptyInput("X"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_samples() {
        assert!(check_samples(3, 3).is_ok());
        assert!(matches!(
            check_samples(2, 3),
            Err(Error::SampleMismatch { x_rows: 2, y_len: 3 })
        ));
        assert!(matches!(check_samples(0, 0), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_error_messages() {
        let err = Error::FeatureMismatch { expected: 4, got: 2 };
        assert_eq!(
            err.to_string(),
            "number of features in X (2) doesn't match training data (4)"
        );
        assert_eq!(Error::NotFitted.to_string(), "model not fitted, call fit() first");
    }
}
