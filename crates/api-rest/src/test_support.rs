//! Router fixtures for handler tests.

use crate::AppState;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use clinrisk_core::{
    AppConfig, ConstantClassifier, Disease, InferenceContext, MemorySessionStore, ModelRegistry,
    Stage,
};
use http_body_util::BodyExt;
use std::sync::Arc;

/// App state over constant classifiers; probabilities are in heart, diabetes,
/// hypertension order.
pub(crate) fn state_with(stage1: [f64; 3], stage2: [f64; 3], strict: bool) -> AppState {
    let mut builder = ModelRegistry::builder();
    for (i, disease) in Disease::ALL.into_iter().enumerate() {
        builder = builder
            .with(
                disease,
                Stage::Screening,
                Arc::new(ConstantClassifier::new(format!("{disease}-1"), stage1[i])),
            )
            .with(
                disease,
                Stage::Assessment,
                Arc::new(ConstantClassifier::new(format!("{disease}-2"), stage2[i])),
            );
    }
    let registry = builder.build().expect("complete registry");

    let cfg = AppConfig::default().with_strict_disease_routes(strict);
    let sessions = Arc::new(MemorySessionStore::new(cfg.session_ttl()));
    AppState::new(InferenceContext::new(registry, strict), sessions, &cfg)
}

pub(crate) fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub(crate) async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
