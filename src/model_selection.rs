use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{check_samples, Error, Result};
use crate::linear_model::Regressor;
use crate::{Matrix, Vector};

/// Shuffles the samples with a seeded generator and holds out
/// `ceil(test_size * n_samples)` of them for testing.
///
/// Returns `(train, test)`. Both parts must end up non-empty.
pub fn train_test_split(
    dataset: &Dataset,
    test_size: f64,
    random_state: u64,
) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::invalid(format!(
            "test_size must be between 0 and 1, got {}",
            test_size
        )));
    }

    let n_samples = dataset.n_samples();
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test >= n_samples {
        return Err(Error::invalid(format!(
            "test_size {} leaves no training samples out of {}",
            test_size, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(random_state));
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok((dataset.select(train_idx), dataset.select(test_idx)))
}

/// K-fold cross validation splitter.
///
/// Every sample is used exactly once for testing. The first
/// `n_samples % n_splits` folds hold one extra sample.
#[derive(Clone, Debug)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: 0,
        }
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Seed for the shuffle. Ignored unless shuffling.
    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// `(train_indices, test_indices)` for every fold.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(Error::invalid(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }
        if self.n_splits > n_samples {
            return Err(Error::invalid(format!(
                "cannot have n_splits={} greater than the number of samples ({})",
                self.n_splits, n_samples
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            indices.shuffle(&mut StdRng::seed_from_u64(self.random_state));
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            let stop = start + size;

            let test = indices[start..stop].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[stop..])
                .copied()
                .collect();
            folds.push((train, test));
            start = stop;
        }

        Ok(folds)
    }
}

/// Mean training and validation scores per training-set size.
#[derive(Clone, Debug)]
pub struct LearningCurve {
    /// Absolute number of training samples at each point.
    pub train_sizes: Vec<usize>,
    pub train_scores: Vec<f64>,
    pub test_scores: Vec<f64>,
}

/// Fits a fresh copy of `estimator` on growing prefixes of every fold's
/// training indices and scores it on that prefix and on the fold's test
/// indices.
///
/// `train_sizes` are fractions in `(0, 1]` of the smallest fold's training
/// set; duplicate absolute sizes are dropped.
pub fn learning_curve<R>(
    estimator: &R,
    x: &Matrix,
    y: &Vector,
    train_sizes: &[f64],
    cv: &KFold,
) -> Result<LearningCurve>
where
    R: Regressor + Clone,
{
    check_samples(x.nrows(), y.len())?;
    if train_sizes.is_empty() {
        return Err(Error::invalid("train_sizes must not be empty"));
    }
    if let Some(bad) = train_sizes.iter().find(|&&f| !(f > 0.0 && f <= 1.0)) {
        return Err(Error::invalid(format!(
            "train_sizes must be fractions in (0, 1], got {}",
            bad
        )));
    }

    let folds = cv.split(x.nrows())?;
    let max_train = folds
        .iter()
        .map(|(train, _)| train.len())
        .min()
        .unwrap_or(0);

    let mut sizes: Vec<usize> = train_sizes
        .iter()
        .map(|&f| ((f * max_train as f64).ceil() as usize).clamp(1, max_train))
        .collect();
    sizes.sort_unstable();
    sizes.dedup();

    let mut curve = LearningCurve {
        train_sizes: Vec::with_capacity(sizes.len()),
        train_scores: Vec::with_capacity(sizes.len()),
        test_scores: Vec::with_capacity(sizes.len()),
    };

    for size in sizes {
        let mut train_total = 0.0;
        let mut test_total = 0.0;

        for (train, test) in &folds {
            let subset = &train[..size];
            let x_train = x.select(Axis(0), subset);
            let y_train = y.select(Axis(0), subset);

            let mut model = estimator.clone();
            model.fit(&x_train, &y_train)?;
            train_total += model.score(&x_train, &y_train)?;
            test_total += model.score(&x.select(Axis(0), test), &y.select(Axis(0), test))?;
        }

        let n_folds = cv.n_splits() as f64;
        let train_score = train_total / n_folds;
        let test_score = test_total / n_folds;
        debug!(size, train_score, test_score, "learning curve point");

        curve.train_sizes.push(size);
        curve.train_scores.push(train_score);
        curve.test_scores.push(test_score);
    }

    Ok(curve)
}
