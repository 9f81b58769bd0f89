//! Classical linear regression on toy and benchmark datasets.
//!
//! The crate provides ordinary least squares, ridge and lasso estimators on
//! top of `ndarray`, the datasets and splitting utilities needed to compare
//! them, and a [`walkthrough`] driver that prints scores and coefficient plots.

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod config;
pub mod dataset;
pub mod error;
pub mod linalg;
pub mod linear_model;
pub mod metrics;
pub mod model_selection;
pub mod plot;
pub mod preprocessing;
pub mod walkthrough;

pub use config::WalkthroughConfig;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use linear_model::{lasso_path, ElasticNet, Lasso, LinearRegression, Regressor, Ridge};
pub use model_selection::{learning_curve, KFold, LearningCurve};
pub use plot::Chart;
pub use preprocessing::{MinMaxScaler, PolynomialFeatures, StandardScaler};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
