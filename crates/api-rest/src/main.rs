//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the HTML workflow and JSON API on their own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's `clinrisk-run` binary serves the same
//! router; this one only differs in its default log directive.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinrisk_core::AppConfig;

/// Main entry point for the clinical risk REST server
///
/// Configuration is read once from the environment (and a `.env` file when present);
/// see `clinrisk_core::config::env` for the variable names.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the models cannot be loaded, or
/// - the HTTP server fails to bind or run.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("clinrisk_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env()?;
    api_rest::serve(cfg).await
}
