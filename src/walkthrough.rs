//! Step-by-step comparison of the linear models.
//!
//! [`run`] goes through the sections in order: sample datasets, a first
//! linear model on the wave data, ordinary least squares on wave and
//! housing, ridge, learning curves and lasso. Each section prints its
//! numbers, a summary table and, unless disabled, a chart.

use std::io::{self, Write};

use comfy_table::{Cell, CellAlignment, Table};
use ndarray::Axis;
use tracing::info;

use crate::config::WalkthroughConfig;
use crate::dataset::{self, Dataset};
use crate::error::{Error, Result};
use crate::linear_model::{Lasso, LinearRegression, Regressor, Ridge};
use crate::model_selection::{learning_curve, KFold, LearningCurve};
use crate::plot::{Chart, Marker};
use crate::Vector;

/// Scores and weights of one fitted model.
#[derive(Clone, Debug)]
pub struct ModelSummary {
    pub name: String,
    pub alpha: Option<f64>,
    pub train_score: f64,
    pub test_score: f64,
    pub n_nonzero: usize,
    pub coefficients: Vector,
    pub intercept: f64,
}

impl ModelSummary {
    fn from_model<R: Regressor>(
        name: impl Into<String>,
        alpha: Option<f64>,
        model: &R,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<Self> {
        let coefficients = model.coefficients().ok_or(Error::NotFitted)?.clone();
        Ok(Self {
            name: name.into(),
            alpha,
            train_score: model.score(&train.features, &train.labels)?,
            test_score: model.score(&test.features, &test.labels)?,
            n_nonzero: model.n_nonzero().unwrap_or(0),
            intercept: model.intercept().ok_or(Error::NotFitted)?,
            coefficients,
        })
    }
}

/// Everything [`run`] printed, for callers that want the numbers.
#[derive(Clone, Debug)]
pub struct WalkthroughReport {
    pub wave_shape: (usize, usize),
    pub housing_shape: (usize, usize),
    pub extended_shape: (usize, usize),
    pub wave_ols: ModelSummary,
    pub housing_ols: ModelSummary,
    pub ridge: Vec<ModelSummary>,
    /// Model name and its curve; empty when learning curves are disabled.
    pub learning_curves: Vec<(String, LearningCurve)>,
    pub lasso: Vec<ModelSummary>,
}

impl WalkthroughReport {
    /// Every summary in the report, in the order it was printed.
    pub fn models(&self) -> impl Iterator<Item = &ModelSummary> {
        [&self.wave_ols, &self.housing_ols]
            .into_iter()
            .chain(&self.ridge)
            .chain(&self.lasso)
    }
}

/// Runs the walkthrough, printing to standard output.
pub fn run(config: &WalkthroughConfig) -> Result<WalkthroughReport> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(config, &mut out)
}

pub fn run_with_output<W: Write>(
    config: &WalkthroughConfig,
    out: &mut W,
) -> Result<WalkthroughReport> {
    config.validate()?;

    let (wave_shape, housing_shape, extended) = sample_datasets(config, out)?;
    let (wave_train, wave_test) = linear_models_for_regression(config, out)?;

    let (housing_train, housing_test) =
        extended.train_test_split(config.test_size, config.housing.split_seed)?;
    let (wave_ols, housing_ols) =
        ordinary_least_squares(&wave_train, &wave_test, &housing_train, &housing_test, out)?;

    let ridge = ridge_regression(config, &housing_train, &housing_test, &housing_ols, out)?;
    let learning_curves = learning_curves(config, &extended, out)?;
    let lasso = lasso(config, &housing_train, &housing_test, out)?;

    Ok(WalkthroughReport {
        wave_shape,
        housing_shape,
        extended_shape: extended.features.dim(),
        wave_ols,
        housing_ols,
        ridge,
        learning_curves,
        lasso,
    })
}

fn load_housing(config: &WalkthroughConfig) -> Result<Dataset> {
    match &config.housing.csv_path {
        Some(path) => {
            info!(path = %path.display(), "loading housing data");
            dataset::load_housing_csv(path, config.housing.has_headers)
        }
        None => {
            info!(
                n_samples = config.housing.n_samples,
                "no housing CSV configured, generating housing data"
            );
            dataset::make_housing(config.housing.n_samples, config.housing.seed)
        }
    }
}

fn heading<W: Write>(out: &mut W, title: &str) -> Result<()> {
    info!(section = title, "starting section");
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    Ok(())
}

fn show_chart<W: Write>(config: &WalkthroughConfig, out: &mut W, chart: Chart) -> Result<()> {
    if config.plot.enabled {
        writeln!(out, "{}", chart.size(config.plot.width, config.plot.height))?;
    }
    Ok(())
}

fn sample_datasets<W: Write>(
    config: &WalkthroughConfig,
    out: &mut W,
) -> Result<((usize, usize), (usize, usize), Dataset)> {
    heading(out, "Sample datasets")?;

    let wave = dataset::make_wave(config.wave.plot_samples, config.wave.seed)?;
    let chart = Chart::new("make_wave")
        .x_label("Feature")
        .y_label("Target")
        .y_limits(-3.0, 3.0)
        .scatter(
            "",
            wave.features.column(0).iter().copied(),
            wave.labels.iter().copied(),
            Marker::Circle,
        );
    show_chart(config, out, chart)?;

    let housing = load_housing(config)?;
    writeln!(out, "Data shape: ({}, {})", housing.n_samples(), housing.n_features())?;

    let extended = dataset::extend_housing(&housing)?;
    writeln!(out, "X.shape: ({}, {})", extended.n_samples(), extended.n_features())?;

    Ok((wave.features.dim(), housing.features.dim(), extended))
}

fn linear_models_for_regression<W: Write>(
    config: &WalkthroughConfig,
    out: &mut W,
) -> Result<(Dataset, Dataset)> {
    heading(out, "Linear models for regression")?;

    let wave = dataset::make_wave(config.wave.fit_samples, config.wave.seed)?;
    let (train, test) = wave.train_test_split(config.test_size, config.wave.split_seed)?;

    let mut lr = LinearRegression::new();
    lr.fit(&train.features, &train.labels)?;
    let w = lr.coefficients.as_ref().ok_or(Error::NotFitted)?;
    let b = lr.intercept.ok_or(Error::NotFitted)?;
    writeln!(out, "w[0]: {:.6}  b: {:.6}", w[0], b)?;

    let line = Vector::linspace(-3.0, 3.0, 100);
    let predicted = lr.predict(&line.clone().insert_axis(Axis(1)))?;
    let chart = Chart::new("Linear regression on make_wave")
        .x_label("Feature")
        .y_label("Target")
        .x_limits(-3.0, 3.0)
        .y_limits(-3.0, 3.0)
        .hline(0.0)
        .line("model", line, predicted, '*')
        .scatter(
            "training data",
            train.features.column(0).iter().copied(),
            train.labels.iter().copied(),
            Marker::Circle,
        )
        .scatter(
            "test data",
            test.features.column(0).iter().copied(),
            test.labels.iter().copied(),
            Marker::TriangleUp,
        );
    show_chart(config, out, chart)?;

    Ok((train, test))
}

fn ordinary_least_squares<W: Write>(
    wave_train: &Dataset,
    wave_test: &Dataset,
    housing_train: &Dataset,
    housing_test: &Dataset,
    out: &mut W,
) -> Result<(ModelSummary, ModelSummary)> {
    heading(out, "Linear regression (ordinary least squares)")?;

    let mut lr = LinearRegression::new();
    lr.fit(&wave_train.features, &wave_train.labels)?;
    let wave = ModelSummary::from_model("LinearRegression", None, &lr, wave_train, wave_test)?;

    writeln!(out, "lr.coef_: {}", format_vector(&wave.coefficients))?;
    writeln!(out, "lr.intercept_: {}", wave.intercept)?;
    writeln!(out, "Training set score: {:.2}", wave.train_score)?;
    writeln!(out, "Test set score: {:.2}", wave.test_score)?;

    let mut lr = LinearRegression::new();
    lr.fit(&housing_train.features, &housing_train.labels)?;
    let housing =
        ModelSummary::from_model("LinearRegression", None, &lr, housing_train, housing_test)?;
    info!(
        rank = lr.rank.unwrap_or(0),
        n_features = housing_train.n_features(),
        "fitted least squares on extended housing"
    );

    writeln!(out)?;
    writeln!(out, "Extended housing:")?;
    writeln!(out, "Training set score: {:.2}", housing.train_score)?;
    writeln!(out, "Test set score: {:.2}", housing.test_score)?;

    Ok((wave, housing))
}

fn ridge_regression<W: Write>(
    config: &WalkthroughConfig,
    train: &Dataset,
    test: &Dataset,
    ols: &ModelSummary,
    out: &mut W,
) -> Result<Vec<ModelSummary>> {
    heading(out, "Ridge regression")?;

    let mut summaries = Vec::with_capacity(config.ridge_alphas.len());
    for &alpha in &config.ridge_alphas {
        let mut ridge = Ridge::new().alpha(alpha);
        ridge.fit(&train.features, &train.labels)?;
        let summary =
            ModelSummary::from_model("Ridge", Some(ridge.penalty()), &ridge, train, test)?;

        writeln!(out, "Ridge alpha={}", alpha)?;
        writeln!(out, "Training set score: {:.2}", summary.train_score)?;
        writeln!(out, "Test set score: {:.2}", summary.test_score)?;
        summaries.push(summary);
    }

    let mut table_rows: Vec<&ModelSummary> = summaries.iter().collect();
    table_rows.push(ols);
    writeln!(out, "{}", summary_table(&table_rows))?;

    let mut chart = coefficient_chart("Ridge coefficients", train.n_features());
    for (i, summary) in summaries.iter().enumerate() {
        chart = chart.scatter(
            label(summary),
            indices(summary.coefficients.len()),
            summary.coefficients.iter().copied(),
            Marker::nth(i + 1),
        );
    }
    chart = chart.scatter(
        label(ols),
        indices(ols.coefficients.len()),
        ols.coefficients.iter().copied(),
        Marker::Circle,
    );
    show_chart(config, out, chart)?;

    Ok(summaries)
}

fn learning_curves<W: Write>(
    config: &WalkthroughConfig,
    data: &Dataset,
    out: &mut W,
) -> Result<Vec<(String, LearningCurve)>> {
    let settings = &config.learning_curve;
    if !settings.enabled {
        info!("learning curves disabled");
        return Ok(Vec::new());
    }
    heading(out, "Learning curves")?;

    let cv = KFold::new(settings.n_splits)
        .shuffle(true)
        .random_state(settings.random_state);
    let fractions = settings.train_fractions();

    let ridge_name = format!("Ridge(alpha={})", settings.ridge_alpha);
    let ridge = Ridge::new().alpha(settings.ridge_alpha);
    let ridge_curve = learning_curve(&ridge, &data.features, &data.labels, &fractions, &cv)?;
    let ols_curve = learning_curve(
        &LinearRegression::new(),
        &data.features,
        &data.labels,
        &fractions,
        &cv,
    )?;
    let curves = vec![
        (ridge_name, ridge_curve),
        ("LinearRegression".to_string(), ols_curve),
    ];

    let mut table = Table::new();
    let mut header = vec![Cell::new("Training set size")];
    for (name, _) in &curves {
        header.push(Cell::new(format!("{} train", name)));
        header.push(Cell::new(format!("{} test", name)));
    }
    table.set_header(header);
    for (i, size) in curves[0].1.train_sizes.iter().enumerate() {
        let mut row = vec![Cell::new(size)];
        for (_, curve) in &curves {
            row.push(Cell::new(format!("{:.2}", curve.train_scores[i])));
            row.push(Cell::new(format!("{:.2}", curve.test_scores[i])));
        }
        table.add_row(row);
    }
    right_align(&mut table);
    writeln!(out, "{}", table)?;

    let mut chart = Chart::new("Learning curves")
        .x_label("Training set size")
        .y_label("Score (R^2)")
        .y_limits(0.0, 1.1);
    for ((name, curve), (train_symbol, test_symbol)) in curves.iter().zip([('r', 'R'), ('l', 'L')]) {
        let sizes = || curve.train_sizes.iter().map(|&s| s as f64);
        chart = chart
            .line(
                format!("training {}", name),
                sizes(),
                curve.train_scores.iter().copied(),
                train_symbol,
            )
            .line(
                format!("test {}", name),
                sizes(),
                curve.test_scores.iter().copied(),
                test_symbol,
            );
    }
    show_chart(config, out, chart)?;

    Ok(curves)
}

fn lasso<W: Write>(
    config: &WalkthroughConfig,
    train: &Dataset,
    test: &Dataset,
    out: &mut W,
) -> Result<Vec<ModelSummary>> {
    heading(out, "Lasso")?;

    let mut summaries = Vec::with_capacity(config.lasso_runs.len());
    for run in &config.lasso_runs {
        let mut lasso = Lasso::new().alpha(run.alpha).max_iter(run.max_iter);
        lasso.fit(&train.features, &train.labels)?;
        let summary =
            ModelSummary::from_model("Lasso", Some(lasso.penalty()), &lasso, train, test)?;

        writeln!(out, "Lasso alpha={} max_iter={}", run.alpha, run.max_iter)?;
        writeln!(out, "Training set score: {:.2}", summary.train_score)?;
        writeln!(out, "Test set score: {:.2}", summary.test_score)?;
        writeln!(out, "Number of features used: {}", summary.n_nonzero)?;
        summaries.push(summary);
    }

    let alpha = config.lasso_reference_ridge_alpha;
    let mut ridge = Ridge::new().alpha(alpha);
    ridge.fit(&train.features, &train.labels)?;
    let reference =
        ModelSummary::from_model("Ridge", Some(ridge.penalty()), &ridge, train, test)?;

    let mut table_rows: Vec<&ModelSummary> = summaries.iter().collect();
    table_rows.push(&reference);
    writeln!(out, "{}", summary_table(&table_rows))?;

    let mut chart = coefficient_chart("Lasso coefficients", train.n_features());
    for (i, summary) in summaries.iter().enumerate() {
        chart = chart.scatter(
            label(summary),
            indices(summary.coefficients.len()),
            summary.coefficients.iter().copied(),
            Marker::nth(i + 1),
        );
    }
    chart = chart.scatter(
        label(&reference),
        indices(reference.coefficients.len()),
        reference.coefficients.iter().copied(),
        Marker::Circle,
    );
    show_chart(config, out, chart)?;

    Ok(summaries)
}

fn coefficient_chart(title: &str, n_features: usize) -> Chart {
    Chart::new(title)
        .x_label("Coefficient index")
        .y_label("Coefficient magnitude")
        .x_limits(0.0, n_features as f64)
        .y_limits(-25.0, 25.0)
        .hline(0.0)
}

fn indices(n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(|i| i as f64)
}

fn label(summary: &ModelSummary) -> String {
    match summary.alpha {
        Some(alpha) => format!("{} alpha={}", summary.name, alpha),
        None => summary.name.clone(),
    }
}

fn summary_table(models: &[&ModelSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Model",
        "alpha",
        "Training set score",
        "Test set score",
        "Features used",
    ]);
    for model in models {
        table.add_row(vec![
            Cell::new(&model.name),
            Cell::new(model.alpha.map_or_else(|| "-".to_string(), |a| a.to_string())),
            Cell::new(format!("{:.2}", model.train_score)),
            Cell::new(format!("{:.2}", model.test_score)),
            Cell::new(format!("{} / {}", model.n_nonzero, model.coefficients.len())),
        ]);
    }
    right_align(&mut table);
    table
}

fn right_align(table: &mut Table) {
    table
        .column_iter_mut()
        .skip(1)
        .for_each(|c| {
            c.set_cell_alignment(CellAlignment::Right);
        });
}

fn format_vector(values: &Vector) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{:.8}", v)).collect();
    format!("[{}]", items.join(" "))
}
