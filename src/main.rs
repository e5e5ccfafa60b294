use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinrisk_core::AppConfig;

/// Main entry point for the clinical risk engine
///
/// Serves the two-stage HTML workflow and the JSON API from a single listener.
///
/// # Environment Variables
/// - `CLINRISK_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `CLINRISK_MODEL_DIR`: Directory holding the six model artifacts (default: "models")
/// - `CLINRISK_SESSION_TTL_MINUTES`: Session lifetime since last write (default: 1440)
/// - `CLINRISK_SESSION_COOKIE`: Session cookie name (default: "clinrisk_session")
/// - `CLINRISK_SECURE_COOKIE`: Mark the session cookie `Secure` (default: false)
/// - `CLINRISK_STRICT_DISEASE_ROUTES`: 404 on unknown stage-2 diseases (default: false)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, model loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinrisk_run=info".parse()?)
                .add_directive("clinrisk_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env()?;
    tracing::info!(
        "-- Configuration loaded, session TTL {} minutes",
        cfg.session_ttl().num_minutes()
    );

    api_rest::serve(cfg).await
}
