use ndarray::Axis;

use crate::error::{Error, Result};
use crate::Matrix;
use crate::Vector;

const RANGE_EPSILON: f64 = 1e-12;

fn check_features(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::FeatureMismatch { expected, got });
    }
    Ok(())
}

/// Removes the mean and scales to unit variance, per feature.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        let mean = data
            .mean_axis(Axis(0))
            .ok_or(Error::EmptyInput("data"))?;
        // Constant features are left unscaled.
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > RANGE_EPSILON { s } else { 1.0 });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = self
            .mean
            .as_ref()
            .zip(self.std.as_ref())
            .ok_or(Error::NotFitted)?;
        check_features(mean.len(), data.ncols())?;

        Ok((data - mean) / std)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }
}

/// Scales every feature linearly into `feature_range` (default `[0, 1]`),
/// using the minimum and maximum seen by `fit`.
#[derive(Clone, Debug)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
    data_min: Option<Vector>,
    data_max: Option<Vector>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self {
            feature_range: (0.0, 1.0),
            data_min: None,
            data_max: None,
        }
    }

    pub fn feature_range(mut self, min: f64, max: f64) -> Self {
        self.feature_range = (min, max);
        self
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        let (lower, upper) = self.feature_range;
        if !(lower < upper) {
            return Err(Error::invalid(format!(
                "feature_range minimum must be smaller than maximum, got ({}, {})",
                lower, upper
            )));
        }
        if data.nrows() == 0 {
            return Err(Error::EmptyInput("data"));
        }

        let data_min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let data_max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));

        self.data_min = Some(data_min);
        self.data_max = Some(data_max);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (data_min, data_max) = self
            .data_min
            .as_ref()
            .zip(self.data_max.as_ref())
            .ok_or(Error::NotFitted)?;
        check_features(data_min.len(), data.ncols())?;

        let (lower, upper) = self.feature_range;
        // Constant features map to the lower bound.
        let data_range = (data_max - data_min).mapv(|r| if r > RANGE_EPSILON { r } else { 1.0 });
        let scale = data_range.mapv(|r| (upper - lower) / r);

        Ok((data - data_min) * &scale + lower)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn data_min(&self) -> Option<&Vector> {
        self.data_min.as_ref()
    }

    pub fn data_max(&self) -> Option<&Vector> {
        self.data_max.as_ref()
    }
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates all monomials of the input features up to `degree`.
///
/// Output columns are ordered by degree, then lexicographically by feature
/// index: for `[a, b]` and degree 2 that is `[1, a, b, a², ab, b²]`, the
/// leading `1` only when `include_bias` is set.
#[derive(Clone, Debug)]
pub struct PolynomialFeatures {
    degree: usize,
    include_bias: bool,
    interaction_only: bool,
    combinations: Option<Vec<Vec<usize>>>,
    n_features_in: Option<usize>,
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            include_bias: true,
            interaction_only: false,
            combinations: None,
            n_features_in: None,
        }
    }

    pub fn include_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    /// Only products of distinct features (no powers).
    pub fn interaction_only(mut self, interaction_only: bool) -> Self {
        self.interaction_only = interaction_only;
        self
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        if self.degree == 0 && !self.include_bias {
            return Err(Error::invalid(
                "degree 0 without a bias column produces no features",
            ));
        }

        let n_features = data.ncols();
        let mut combinations = Vec::new();
        if self.include_bias {
            combinations.push(Vec::new());
        }
        for degree in 1..=self.degree {
            push_combinations(
                n_features,
                degree,
                self.interaction_only,
                &mut Vec::with_capacity(degree),
                &mut combinations,
            );
        }

        self.combinations = Some(combinations);
        self.n_features_in = Some(n_features);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let combinations = self.combinations.as_ref().ok_or(Error::NotFitted)?;
        let n_features_in = self.n_features_in.ok_or(Error::NotFitted)?;
        check_features(n_features_in, data.ncols())?;

        let mut out = Matrix::zeros((data.nrows(), combinations.len()));
        for (mut out_row, row) in out.rows_mut().into_iter().zip(data.rows()) {
            for (value, combination) in out_row.iter_mut().zip(combinations) {
                *value = combination.iter().map(|&j| row[j]).product();
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    /// Number of output columns, once fitted.
    pub fn n_output_features(&self) -> Option<usize> {
        self.combinations.as_ref().map(Vec::len)
    }
}

/// Appends every non-decreasing index sequence of length `remaining` (strictly
/// increasing when `interaction_only`) that extends `current`.
fn push_combinations(
    n_features: usize,
    remaining: usize,
    interaction_only: bool,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if remaining == 0 {
        out.push(current.clone());
        return;
    }

    let start = match current.last() {
        Some(&last) if interaction_only => last + 1,
        Some(&last) => last,
        None => 0,
    };

    for j in start..n_features {
        current.push(j);
        push_combinations(n_features, remaining - 1, interaction_only, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let mut scaler = StandardScaler::new();

        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled.shape(), data.shape());
        for col in scaled.columns() {
            assert!(col.mean().unwrap().abs() < 1e-12);
            assert!((col.std(0.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let data = array![[1.0, 7.0], [3.0, 7.0]];
        let mut scaler = StandardScaler::new();

        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled.column(1).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_standard_scaler_not_fitted() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(Error::NotFitted)
        ));
    }

    #[test]
    fn test_minmax_scaler() {
        let data = array![[1.0, -2.0], [3.0, 0.0], [5.0, 2.0]];
        let mut scaler = MinMaxScaler::new();

        assert!(scaler.data_min().is_none());
        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled, array![[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]]);
        assert_eq!(scaler.data_min(), Some(&array![1.0, -2.0]));
        assert_eq!(scaler.data_max(), Some(&array![5.0, 2.0]));

        // Unseen data may fall outside the range.
        let outside = scaler.transform(&array![[7.0, -4.0]]).unwrap();
        assert_eq!(outside, array![[1.5, -0.5]]);
    }

    #[test]
    fn test_minmax_scaler_custom_range_and_constant() {
        let data = array![[0.0, 4.0], [10.0, 4.0]];
        let mut scaler = MinMaxScaler::new().feature_range(-1.0, 1.0);

        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled, array![[-1.0, -1.0], [1.0, -1.0]]);
    }

    #[test]
    fn test_minmax_scaler_errors() {
        let mut bad_range = MinMaxScaler::new().feature_range(1.0, 1.0);
        assert!(bad_range.fit(&array![[1.0]]).is_err());

        let mut scaler = MinMaxScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(Error::FeatureMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_polynomial_features_basic() {
        let data = array![[2.0, 3.0]];
        let mut poly = PolynomialFeatures::new(2);

        let out = poly.fit_transform(&data).unwrap();
        assert_eq!(out, array![[1.0, 2.0, 3.0, 4.0, 6.0, 9.0]]);
    }

    #[test]
    fn test_polynomial_features_no_bias() {
        let data = array![[2.0, 3.0], [1.0, -1.0]];
        let mut poly = PolynomialFeatures::new(2).include_bias(false);

        let out = poly.fit_transform(&data).unwrap();
        assert_eq!(out, array![[2.0, 3.0, 4.0, 6.0, 9.0], [1.0, -1.0, 1.0, -1.0, 1.0]]);
    }

    #[test]
    fn test_polynomial_features_interaction_only() {
        let data = array![[2.0, 3.0, 5.0]];
        let mut poly = PolynomialFeatures::new(2)
            .include_bias(false)
            .interaction_only(true);

        let out = poly.fit_transform(&data).unwrap();
        assert_eq!(out, array![[2.0, 3.0, 5.0, 6.0, 10.0, 15.0]]);
    }

    #[test]
    fn test_polynomial_features_output_count() {
        // 13 inputs: 13 linear terms plus 13 * 14 / 2 quadratic ones.
        let data = Matrix::ones((2, 13));
        let mut poly = PolynomialFeatures::new(2).include_bias(false);

        let out = poly.fit_transform(&data).unwrap();
        assert_eq!(out.ncols(), 104);
        assert_eq!(poly.n_output_features(), Some(104));
    }

    #[test]
    fn test_polynomial_features_degree_3() {
        let data = array![[2.0]];
        let mut poly = PolynomialFeatures::new(3);

        let out = poly.fit_transform(&data).unwrap();
        assert_eq!(out, array![[1.0, 2.0, 4.0, 8.0]]);
    }

    #[test]
    fn test_polynomial_features_not_fitted() {
        let poly = PolynomialFeatures::new(2);
        assert!(poly.transform(&array![[1.0]]).is_err());
    }
}
