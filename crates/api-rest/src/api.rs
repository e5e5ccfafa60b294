//! JSON endpoints.
//!
//! Same semantics as the HTML workflow, minus the session: stage 1 here never
//! stores anything.

use crate::error::ApiError;
use crate::{ApiDoc, AppState};
use api_shared::{
    AssessmentRes, ErrorRes, FormFieldsReq, HealthRes, HealthService, ScreeningRes,
    ValidationErrorRes, VitalsReq,
};
use axum::{
    extract::{Path, State},
    Json,
};
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Models are loaded before the listener binds, so a response here means the
/// full registry is available.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/stage1",
    request_body = VitalsReq,
    responses(
        (status = 200, description = "Ranked screening result", body = ScreeningRes),
        (status = 400, description = "Invalid or missing fields", body = ValidationErrorRes),
        (status = 500, description = "Classifier failure", body = ErrorRes)
    )
)]
/// Run stage-1 screening on JSON vitals
///
/// Values are coerced like the HTML intake form, so every missing or
/// malformed field is reported together.
#[axum::debug_handler]
pub(crate) async fn stage1(
    State(state): State<AppState>,
    Json(req): Json<FormFieldsReq>,
) -> Result<Json<ScreeningRes>, ApiError> {
    let (_, screening) = state.inference.screen_form(&req.into_form())?;
    Ok(Json(ScreeningRes::from(&screening)))
}

#[utoipa::path(
    post,
    path = "/api/stage2/{disease}",
    params(
        ("disease" = String, Path, description = "heart, diabetes or hypertension")
    ),
    request_body = FormFieldsReq,
    responses(
        (status = 200, description = "Risk estimate", body = AssessmentRes),
        (status = 400, description = "Invalid or missing fields", body = ValidationErrorRes),
        (status = 404, description = "Unknown disease (strict routing only)", body = ErrorRes),
        (status = 500, description = "Classifier failure", body = ErrorRes)
    )
)]
/// Run stage-2 risk estimation for one disease
///
/// Field names and value formats match the HTML stage-2 form.
#[axum::debug_handler]
pub(crate) async fn stage2(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(req): Json<FormFieldsReq>,
) -> Result<Json<AssessmentRes>, ApiError> {
    let assessment = state.inference.assess_form(&segment, &req.into_form())?;
    Ok(Json(AssessmentRes::from(&assessment)))
}

/// OpenAPI document for the JSON endpoints.
pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
