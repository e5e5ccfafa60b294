//! HTTP error mapping.
//!
//! Core errors are rendered twice over: as HTML pages for the form workflow
//! ([`PageError`]) and as JSON bodies for the REST surface ([`ApiError`]).
//!
//! | Error                         | Status |
//! |-------------------------------|--------|
//! | `ClinriskError::Validation`   | 400    |
//! | `ClinriskError::UnknownDisease` | 404  |
//! | anything else                 | 500    |

use crate::views;
use api_shared::{ErrorRes, ValidationErrorRes};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use clinrisk_core::ClinriskError;

/// Error returned by the HTML handlers.
#[derive(Debug)]
pub struct PageError(pub ClinriskError);

impl From<ClinriskError> for PageError {
    fn from(err: ClinriskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0 {
            ClinriskError::Validation(errors) => {
                tracing::info!("Rejected form submission: {}", errors);
                (StatusCode::BAD_REQUEST, Html(views::validation_errors(&errors))).into_response()
            }
            ClinriskError::UnknownDisease(disease) => (
                StatusCode::NOT_FOUND,
                Html(views::not_found(&format!("Unknown disease: {disease}"))),
            )
                .into_response(),
            other => {
                tracing::error!("Request failed: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(views::internal_error())).into_response()
            }
        }
    }
}

/// Error returned by the JSON handlers.
#[derive(Debug)]
pub struct ApiError(pub ClinriskError);

impl From<ClinriskError> for ApiError {
    fn from(err: ClinriskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ClinriskError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorRes::from(&errors)),
            )
                .into_response(),
            ClinriskError::UnknownDisease(disease) => (
                StatusCode::NOT_FOUND,
                Json(ErrorRes {
                    error: format!("unknown disease: {disease}"),
                }),
            )
                .into_response(),
            other => {
                tracing::error!("API request failed: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorRes {
                        error: "Internal error".into(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
