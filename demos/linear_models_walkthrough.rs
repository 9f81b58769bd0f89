//! Runs the linear model walkthrough end to end.
//!
//! Settings come from `linear_models.toml` in the working directory and
//! `LINEAR_MODELS_*` environment variables; log verbosity from `RUST_LOG`.

use linear_models::walkthrough;
use linear_models::WalkthroughConfig;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = WalkthroughConfig::load()?;
    info!(?config, "loaded configuration");

    let report = walkthrough::run(&config)?;
    info!(
        models = report.models().count(),
        learning_curves = report.learning_curves.len(),
        "walkthrough finished"
    );

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        // Keep stdout for the walkthrough output
        .with_writer(std::io::stderr)
        .init()
}
