//! # API REST
//!
//! HTTP surface for the clinical risk engine.
//!
//! Handles:
//! - The two-stage HTML form workflow (`/`, `/stage2/:disease`)
//! - JSON endpoints with OpenAPI documentation (`/health`, `/api/*`)
//! - Session cookies, CORS and request tracing
//!
//! Uses `clinrisk-core` for all inference and session logic and `api-shared`
//! for the JSON wire types.

#![warn(rust_2018_idioms)]

mod api;
mod error;
mod pages;
mod views;

#[cfg(test)]
mod test_support;

pub use error::{ApiError, PageError};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use clinrisk_core::{
    resolve_model_dir, AppConfig, InferenceContext, MemorySessionStore, ModelRegistry, SessionId,
    SessionStore,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(api::health, api::stage1, api::stage2),
    components(schemas(
        api_shared::HealthRes,
        api_shared::VitalsReq,
        api_shared::FormFieldsReq,
        api_shared::RankedDiseaseRes,
        api_shared::ScreeningRes,
        api_shared::AssessmentRes,
        api_shared::FieldErrorRes,
        api_shared::ValidationErrorRes,
        api_shared::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Attributes of the session cookie, fixed at startup.
#[derive(Clone, Debug)]
pub(crate) struct SessionCookie {
    name: String,
    secure: bool,
    max_age: time::Duration,
}

impl SessionCookie {
    fn from_config(cfg: &AppConfig) -> Self {
        Self {
            name: cfg.session_cookie().to_string(),
            secure: cfg.secure_cookie(),
            max_age: time::Duration::minutes(cfg.session_ttl().num_minutes()),
        }
    }

    pub(crate) fn build(&self, session: SessionId) -> Cookie<'static> {
        Cookie::build((self.name.clone(), session.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age)
            .build()
    }
}

/// Application state shared by every handler
///
/// The inference context is immutable; the session store is the only shared
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    inference: InferenceContext,
    sessions: Arc<dyn SessionStore>,
    cookie: Arc<SessionCookie>,
}

impl AppState {
    pub fn new(
        inference: InferenceContext,
        sessions: Arc<dyn SessionStore>,
        cfg: &AppConfig,
    ) -> Self {
        Self {
            inference,
            sessions,
            cookie: Arc::new(SessionCookie::from_config(cfg)),
        }
    }

    /// Session id carried by the request, if it parses.
    pub(crate) fn session_id(&self, jar: &CookieJar) -> Option<SessionId> {
        jar.get(&self.cookie.name)
            .and_then(|cookie| SessionId::parse(cookie.value()))
    }
}

/// Build the full router: HTML workflow, JSON API and OpenAPI document.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::intake_form).post(pages::submit_intake))
        .route(
            "/stage2/:disease",
            get(pages::stage2_form).post(pages::submit_stage2),
        )
        .route("/health", get(api::health))
        .route("/api/stage1", post(api::stage1))
        .route("/api/stage2/:disease", post(api::stage2))
        .route("/api-docs/openapi.json", get(api::openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the models named by `cfg` and serve until the process is stopped.
///
/// # Errors
/// Returns an error if:
/// - the model directory cannot be found,
/// - any model artifact fails to load,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    let model_dir = resolve_model_dir(cfg.model_dir_override())?;
    let registry = ModelRegistry::load(&model_dir)
        .with_context(|| format!("failed to load models from {}", model_dir.display()))?;
    tracing::info!("-- Loaded models from {}", model_dir.display());

    let inference = InferenceContext::new(registry, cfg.strict_disease_routes());
    if cfg.strict_disease_routes() {
        tracing::info!("Strict disease routing enabled");
    }
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(cfg.session_ttl()));
    let app = router(AppState::new(inference, sessions, &cfg));

    tracing::info!("-- Starting clinical risk engine on {}", cfg.bind_addr());
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr()))?;
    axum::serve(listener, app).await?;

    Ok(())
}
