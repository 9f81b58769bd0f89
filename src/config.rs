//! Walkthrough settings.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! TOML file, then environment variables prefixed with `LINEAR_MODELS_`
//! (nested keys separated by `__`, e.g. `LINEAR_MODELS_PLOT__WIDTH=80`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "linear_models.toml";
pub const ENV_PREFIX: &str = "LINEAR_MODELS_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    pub wave: WaveConfig,
    pub housing: HousingConfig,
    /// Fraction of samples held out by every train/test split.
    pub test_size: f64,
    pub ridge_alphas: Vec<f64>,
    pub lasso_runs: Vec<LassoRun>,
    /// Ridge model drawn next to the lasso coefficients.
    pub lasso_reference_ridge_alpha: f64,
    pub learning_curve: LearningCurveConfig,
    pub plot: PlotConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Samples in the scatter plot of the first section.
    pub plot_samples: usize,
    /// Samples used to fit and score the one-feature models.
    pub fit_samples: usize,
    pub seed: u64,
    pub split_seed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingConfig {
    /// CSV file with the 13 housing features and the target. Generated data
    /// is used when unset.
    pub csv_path: Option<PathBuf>,
    pub has_headers: bool,
    /// Size of the generated substitute.
    pub n_samples: usize,
    pub seed: u64,
    pub split_seed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LassoRun {
    pub alpha: f64,
    #[serde(default = "default_lasso_max_iter")]
    pub max_iter: usize,
}

fn default_lasso_max_iter() -> usize {
    1000
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningCurveConfig {
    pub enabled: bool,
    pub ridge_alpha: f64,
    pub n_splits: usize,
    pub random_state: u64,
    /// Number of training sizes, evenly spaced from `min_fraction` to 1.
    pub n_sizes: usize,
    pub min_fraction: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub width: usize,
    pub height: usize,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self {
            wave: WaveConfig::default(),
            housing: HousingConfig::default(),
            test_size: 0.25,
            ridge_alphas: vec![1.0, 10.0, 0.1],
            lasso_runs: vec![
                LassoRun {
                    alpha: 1.0,
                    max_iter: default_lasso_max_iter(),
                },
                LassoRun {
                    alpha: 0.01,
                    max_iter: 100_000,
                },
                LassoRun {
                    alpha: 0.0001,
                    max_iter: 100_000,
                },
            ],
            lasso_reference_ridge_alpha: 0.1,
            learning_curve: LearningCurveConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            plot_samples: 40,
            fit_samples: 60,
            seed: 42,
            split_seed: 42,
        }
    }
}

impl Default for HousingConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            has_headers: true,
            n_samples: crate::dataset::HOUSING_SAMPLES,
            seed: 0,
            split_seed: 0,
        }
    }
}

impl Default for LearningCurveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ridge_alpha: 1.0,
            n_splits: 5,
            random_state: 1,
            n_sizes: 10,
            min_fraction: 0.1,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 60,
            height: 20,
        }
    }
}

impl WalkthroughConfig {
    /// Defaults, then `linear_models.toml` in the working directory if
    /// present, then `LINEAR_MODELS_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path))
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::invalid(format!(
                "test_size must be between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.wave.plot_samples == 0 || self.wave.fit_samples < 2 {
            return Err(Error::invalid(
                "wave needs at least 1 plotted and 2 fitted samples",
            ));
        }
        if self.housing.csv_path.is_none() && self.housing.n_samples < 2 {
            return Err(Error::invalid("housing.n_samples must be at least 2"));
        }

        let alphas = self
            .ridge_alphas
            .iter()
            .chain(self.lasso_runs.iter().map(|run| &run.alpha))
            .chain([
                &self.lasso_reference_ridge_alpha,
                &self.learning_curve.ridge_alpha,
            ]);
        for &alpha in alphas {
            if !alpha.is_finite() || alpha < 0.0 {
                return Err(Error::invalid(format!(
                    "alphas must be finite and non-negative, got {}",
                    alpha
                )));
            }
        }
        if self.lasso_runs.iter().any(|run| run.max_iter == 0) {
            return Err(Error::invalid("lasso max_iter must be at least 1"));
        }

        let curve = &self.learning_curve;
        if curve.n_splits < 2 {
            return Err(Error::invalid("learning_curve.n_splits must be at least 2"));
        }
        if curve.n_sizes == 0 {
            return Err(Error::invalid("learning_curve.n_sizes must be at least 1"));
        }
        if !(curve.min_fraction > 0.0 && curve.min_fraction <= 1.0) {
            return Err(Error::invalid(format!(
                "learning_curve.min_fraction must be in (0, 1], got {}",
                curve.min_fraction
            )));
        }

        if self.plot.width < 10 || self.plot.height < 5 {
            return Err(Error::invalid("plots need at least 10x5 characters"));
        }
        Ok(())
    }
}

impl LearningCurveConfig {
    /// `n_sizes` fractions evenly spaced over `[min_fraction, 1]`.
    pub fn train_fractions(&self) -> Vec<f64> {
        if self.n_sizes == 1 {
            return vec![1.0];
        }
        let step = (1.0 - self.min_fraction) / (self.n_sizes - 1) as f64;
        (0..self.n_sizes)
            .map(|i| self.min_fraction + step * i as f64)
            .collect()
    }
}
