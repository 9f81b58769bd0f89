//! In-memory datasets: the one-feature `wave` problem and a 13-feature
//! housing benchmark, either read from CSV or generated.

use std::path::Path;

use ndarray::Axis;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{check_samples, Error, Result};
use crate::model_selection;
use crate::preprocessing::{MinMaxScaler, PolynomialFeatures};
use crate::{Matrix, Vector};

/// Feature columns of the housing benchmark, in file order.
pub const HOUSING_FEATURES: [&str; 13] = [
    "CRIM", "ZN", "INDUS", "CHAS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B",
    "LSTAT",
];

/// Number of rows in the classic housing benchmark.
pub const HOUSING_SAMPLES: usize = 506;

#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Vector,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vector) -> Result<Self> {
        check_samples(features.nrows(), labels.len())?;
        Ok(Self { features, labels })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Shuffled train/test split, see [`model_selection::train_test_split`].
    pub fn train_test_split(&self, test_size: f64, random_state: u64) -> Result<(Self, Self)> {
        model_selection::train_test_split(self, test_size, random_state)
    }
}

/// One noisy feature on `[-3, 3)` with target
/// `(sin(4x) + x + N(0, 1)) / 2`. Same seed, same data.
pub fn make_wave(n_samples: usize, seed: u64) -> Result<Dataset> {
    if n_samples == 0 {
        return Err(Error::EmptyInput("wave dataset"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let features = Matrix::random_using((n_samples, 1), Uniform::new(-3.0_f64, 3.0), &mut rng);
    let noise = Vector::random_using(n_samples, StandardNormal, &mut rng);
    let labels = (features.column(0).mapv(|x| (4.0 * x).sin() + x) + noise) / 2.0;

    debug!(n_samples, seed, "generated wave dataset");
    Dataset::new(features, labels)
}

/// Housing-shaped data: the 13 columns of [`HOUSING_FEATURES`] drawn over
/// their usual ranges, median value (in $1000s) from a noisy model with a
/// rooms/status interaction, clipped to `[5, 50]`.
pub fn make_housing(n_samples: usize, seed: u64) -> Result<Dataset> {
    if n_samples == 0 {
        return Err(Error::EmptyInput("housing dataset"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Matrix::zeros((n_samples, HOUSING_FEATURES.len()));
    let mut labels = Vector::zeros(n_samples);

    for (mut row, label) in features.rows_mut().into_iter().zip(labels.iter_mut()) {
        let crim = rng.gen_range(-5.0_f64..4.5).exp();
        let zn = if rng.gen_bool(0.25) {
            rng.gen_range(12.5_f64..100.0)
        } else {
            0.0
        };
        let indus = rng.gen_range(0.46_f64..27.74);
        let chas = if rng.gen_bool(0.07) { 1.0 } else { 0.0 };
        let nox = (0.38 + 0.015 * indus + 0.05 * normal(&mut rng)).clamp(0.385, 0.871);
        let rm = (6.28 + 0.7 * normal(&mut rng)).clamp(3.56, 8.78);
        let age = rng.gen_range(2.9_f64..100.0);
        let dis = (12.0 - 0.1 * age + 1.5 * normal(&mut rng)).clamp(1.13, 12.13);
        let rad = [1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 24.0][rng.gen_range(0..9)];
        let tax = (180.0 + 15.0 * rad + rng.gen_range(0.0_f64..250.0)).min(711.0);
        let ptratio = rng.gen_range(12.6_f64..22.0);
        let b = (396.9 - rng.gen_range(0.0_f64..1.0).powi(8) * 396.0).max(0.32);
        let lstat = (12.65 - 6.0 * (rm - 6.28) + 0.08 * (age - 68.0) + 4.0 * normal(&mut rng))
            .clamp(1.73, 37.97);

        let value = 22.5 + 6.5 * (rm - 6.28) - 0.55 * (lstat - 12.65)
            - 0.7 * (dis - 3.8)
            - 0.9 * (ptratio - 18.5)
            - 12.0 * (nox - 0.55)
            + 2.7 * chas
            - 0.1 * crim
            + 0.01 * zn
            - 0.01 * (tax - 408.0)
            + 0.01 * (b - 356.0)
            - 0.4 * (rm - 6.28) * (lstat - 12.65)
            + 3.0 * normal(&mut rng);

        for (cell, v) in row.iter_mut().zip([
            crim, zn, indus, chas, nox, rm, age, dis, rad, tax, ptratio, b, lstat,
        ]) {
            *cell = v;
        }
        *label = value.clamp(5.0, 50.0);
    }

    debug!(n_samples, seed, "generated housing dataset");
    Dataset::new(features, labels)
}

fn normal(rng: &mut StdRng) -> f64 {
    rng.sample(StandardNormal)
}

/// Reads a comma separated housing file: the 13 [`HOUSING_FEATURES`]
/// followed by the target in the last column.
pub fn load_housing_csv(path: impl AsRef<Path>, has_headers: bool) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let n_columns = HOUSING_FEATURES.len() + 1;
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != n_columns {
            return Err(Error::MalformedData(format!(
                "row {} has {} columns, expected {}",
                i + 1,
                record.len(),
                n_columns
            )));
        }

        for (j, field) in record.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| {
                Error::MalformedData(format!("row {}, column {}: {:?} is not a number", i + 1, j + 1, field))
            })?;
            if j + 1 == n_columns {
                labels.push(value);
            } else {
                features.push(value);
            }
        }
    }

    if labels.is_empty() {
        return Err(Error::EmptyInput("housing CSV"));
    }

    let features = Matrix::from_shape_vec((labels.len(), HOUSING_FEATURES.len()), features)?;
    debug!(path = %path.display(), n_samples = labels.len(), "loaded housing CSV");
    Dataset::new(features, Vector::from(labels))
}

/// Scales every feature to `[0, 1]` and adds all degree-2 products, turning
/// the 13 housing features into 104.
pub fn extend_housing(dataset: &Dataset) -> Result<Dataset> {
    let scaled = MinMaxScaler::new().fit_transform(&dataset.features)?;
    let extended = PolynomialFeatures::new(2)
        .include_bias(false)
        .fit_transform(&scaled)?;

    Dataset::new(extended, dataset.labels.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataset_creation() {
        let features = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let targets = array![1.0, 2.0, 3.0];

        let dataset = Dataset::new(features, targets).unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
    }

    #[test]
    fn test_dataset_rejects_mismatch() {
        let features = array![[1.0], [2.0]];
        let targets = array![1.0];

        assert!(matches!(
            Dataset::new(features, targets),
            Err(Error::SampleMismatch { x_rows: 2, y_len: 1 })
        ));
    }

    #[test]
    fn test_select() {
        let dataset = Dataset::new(array![[1.0], [2.0], [3.0]], array![10.0, 20.0, 30.0]).unwrap();

        let picked = dataset.select(&[2, 0]);
        assert_eq!(picked.features, array![[3.0], [1.0]]);
        assert_eq!(picked.labels, array![30.0, 10.0]);
    }

    #[test]
    fn test_make_wave() {
        let wave = make_wave(40, 42).unwrap();
        assert_eq!(wave.features.dim(), (40, 1));
        assert_eq!(wave.labels.len(), 40);
        assert!(wave.features.iter().all(|&x| (-3.0..3.0).contains(&x)));

        let again = make_wave(40, 42).unwrap();
        assert_eq!(wave.features, again.features);
        assert_eq!(wave.labels, again.labels);

        let other = make_wave(40, 7).unwrap();
        assert_ne!(wave.features, other.features);
    }

    #[test]
    fn test_make_wave_follows_trend() {
        // The noise averages out: the target grows with x overall.
        let wave = make_wave(500, 0).unwrap();
        let x = wave.features.column(0);
        let x_mean = x.mean().unwrap();
        let y_mean = wave.labels.mean().unwrap();
        let covariance: f64 = x
            .iter()
            .zip(wave.labels.iter())
            .map(|(a, b)| (a - x_mean) * (b - y_mean))
            .sum();
        assert!(covariance > 0.0);
    }

    #[test]
    fn test_make_wave_empty() {
        assert!(matches!(make_wave(0, 42), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_make_housing() {
        let housing = make_housing(HOUSING_SAMPLES, 0).unwrap();
        assert_eq!(housing.features.dim(), (506, 13));
        assert!(housing.labels.iter().all(|&v| (5.0..=50.0).contains(&v)));
        assert!(housing.features.column(3).iter().all(|&c| c == 0.0 || c == 1.0));

        let rooms = housing.features.column(5);
        assert!(rooms.iter().all(|&r| (3.56..=8.78).contains(&r)));

        let again = make_housing(HOUSING_SAMPLES, 0).unwrap();
        assert_eq!(housing.labels, again.labels);
    }

    #[test]
    fn test_make_housing_column_ranges() {
        let housing = make_housing(200, 3).unwrap();
        let column = |name: &str| {
            let j = HOUSING_FEATURES.iter().position(|&f| f == name).unwrap();
            housing.features.column(j).to_owned()
        };

        assert!(column("ZN").iter().all(|&v| v == 0.0 || (12.5..100.0).contains(&v)));
        assert!(column("INDUS").iter().all(|&v| (0.46..27.74).contains(&v)));
        assert!(column("AGE").iter().all(|&v| (2.9..100.0).contains(&v)));
        assert!(column("PTRATIO").iter().all(|&v| (12.6..22.0).contains(&v)));

        let rad = column("RAD");
        assert!(rad.iter().all(|&v| [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 24.0].contains(&v)));
        let tax = column("TAX");
        for (&r, &t) in rad.iter().zip(tax.iter()) {
            assert!(t >= 180.0 + 15.0 * r || t == 711.0);
            assert!(t <= 711.0);
        }
    }

    #[test]
    fn test_extend_housing() {
        let housing = make_housing(50, 1).unwrap();
        let extended = extend_housing(&housing).unwrap();

        assert_eq!(extended.features.dim(), (50, 104));
        assert_eq!(extended.labels, housing.labels);
        // Linear terms are min-max scaled, so every product lies in [0, 1].
        assert!(extended
            .features
            .iter()
            .all(|&v| (-1e-12..=1.0 + 1e-12).contains(&v)));
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.csv", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_housing_csv() {
        let header = HOUSING_FEATURES.join(",") + ",MEDV\n";
        let rows = "0.00632,18,2.31,0,0.538,6.575,65.2,4.09,1,296,15.3,396.9,4.98,24\n\
                    0.02731, 0, 7.07, 0, 0.469, 6.421, 78.9, 4.9671, 2, 242, 17.8, 396.9, 9.14, 21.6\n";
        let path = write_temp("housing-ok", &(header + rows));

        let dataset = load_housing_csv(&path, true).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(dataset.features.dim(), (2, 13));
        assert_eq!(dataset.labels, array![24.0, 21.6]);
        assert!((dataset.features[(1, 5)] - 6.421).abs() < 1e-12);
    }

    #[test]
    fn test_load_housing_csv_malformed() {
        let path = write_temp("housing-short", "1,2,3\n");
        let short = load_housing_csv(&path, false);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(short, Err(Error::MalformedData(_))));

        let path = write_temp(
            "housing-nan",
            "a,18,2.31,0,0.538,6.575,65.2,4.09,1,296,15.3,396.9,4.98,24\n",
        );
        let not_numeric = load_housing_csv(&path, false);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(not_numeric, Err(Error::MalformedData(_))));
    }

    #[test]
    fn test_load_housing_csv_missing_file() {
        let missing = std::env::temp_dir().join("no-such-housing-file.csv");
        assert!(load_housing_csv(missing, true).is_err());
    }
}
