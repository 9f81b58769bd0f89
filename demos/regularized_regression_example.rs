use linear_models::{
    lasso_path, Dataset, ElasticNet, Lasso, LinearRegression, Regressor, Ridge, StandardScaler,
};
use ndarray::array;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Regularized Linear Regression Comparison ===\n");

    // Target: y = 3*x1 + 2*x2 + noise, x3 and x4 are irrelevant
    let x = array![
        [1.0, 2.0, 0.5, -0.3],
        [2.0, 3.0, -0.2, 0.8],
        [3.0, 1.0, 1.1, -0.5],
        [4.0, 4.0, 0.3, 0.2],
        [5.0, 2.0, -0.8, 0.7],
        [6.0, 5.0, 0.9, -0.1],
        [7.0, 3.0, -0.4, 0.6],
        [8.0, 6.0, 0.7, -0.9],
        [9.0, 4.0, -0.1, 0.4],
        [10.0, 7.0, 0.2, -0.2]
    ];
    let y = array![7.1, 11.9, 12.8, 19.7, 18.9, 27.8, 26.7, 35.9, 34.8, 43.1];

    println!("Training data shape: {} samples, {} features", x.nrows(), x.ncols());
    println!("True relationship: y = 3*x1 + 2*x2 + noise (x3, x4 are irrelevant)\n");

    let dataset = Dataset::new(x, y)?;
    let (train_data, test_data) = dataset.train_test_split(0.3, 42)?;

    let mut scaler = StandardScaler::new();
    let train_features_scaled = scaler.fit_transform(&train_data.features)?;
    let test_features_scaled = scaler.transform(&test_data.features)?;

    println!(
        "Training samples: {}, Test samples: {}\n",
        train_data.n_samples(),
        test_data.n_samples()
    );

    let models: Vec<(&str, Box<dyn Regressor>)> = vec![
        ("Linear Regression", boxed(LinearRegression::new())),
        ("Ridge (α=0.1)", boxed(Ridge::new().alpha(0.1))),
        ("Ridge (α=1.0)", boxed(Ridge::new().alpha(1.0))),
        ("Lasso (α=0.1)", boxed(Lasso::new().alpha(0.1))),
        ("Lasso (α=0.5)", boxed(Lasso::new().alpha(0.5))),
        ("ElasticNet (α=0.1, l1=0.5)", boxed(ElasticNet::new().alpha(0.1).l1_ratio(0.5))),
        ("ElasticNet (α=0.5, l1=0.7)", boxed(ElasticNet::new().alpha(0.5).l1_ratio(0.7))),
    ];

    println!("Model Comparison Results:");
    println!(
        "{:<28} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Train R²", "Test R²", "Coef 1", "Coef 2", "Coef 3", "Coef 4"
    );
    println!("{}", "-".repeat(95));

    for (name, mut model) in models {
        model.fit(&train_features_scaled, &train_data.labels)?;

        let train_score = model.score(&train_features_scaled, &train_data.labels)?;
        let test_score = model.score(&test_features_scaled, &test_data.labels)?;
        let coeffs = model.coefficients().ok_or("model has no coefficients")?;

        println!(
            "{:<28} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            name, train_score, test_score, coeffs[0], coeffs[1], coeffs[2], coeffs[3]
        );
    }

    println!("\n=== Lasso Regularization Path ===");
    let alphas = [0.001, 0.01, 0.1, 0.5, 1.0, 5.0];
    let path = lasso_path(&train_features_scaled, &train_data.labels, &alphas, 1000, 1e-4)?;

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Alpha", "Used", "Coef 1", "Coef 2", "Coef 3", "Coef 4"
    );
    println!("{}", "-".repeat(65));

    for point in path {
        let used = point.coefficients.iter().filter(|&&w| w != 0.0).count();
        let c = &point.coefficients;
        println!(
            "{:<10.3} {:>10} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            point.alpha, used, c[0], c[1], c[2], c[3]
        );
    }

    println!("\nLasso drives the irrelevant coefficients (3 & 4) to zero as α increases.");

    Ok(())
}

fn boxed<R: Regressor + 'static>(model: R) -> Box<dyn Regressor> {
    Box::new(model)
}
