//! HTML form workflow handlers.
//!
//! Stage 1 stores its vitals and ranking in the caller's session so that the
//! stage-2 form can be pre-filled. Stage 2 never requires session state.

use crate::error::PageError;
use crate::views;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use clinrisk_core::session::stage2_prefill;
use clinrisk_core::{SessionId, SessionState};
use std::collections::HashMap;

/// `GET /`: stage-1 intake form.
#[axum::debug_handler]
pub(crate) async fn intake_form() -> Html<String> {
    Html(views::intake_form())
}

/// `POST /`: run stage 1 and remember the submission for stage 2.
///
/// A fresh session is issued when the request carries no cookie or one the
/// store does not recognise.
#[axum::debug_handler]
pub(crate) async fn submit_intake(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<(CookieJar, Html<String>), PageError> {
    let (vitals, screening) = state.inference.screen_form(&fields)?;

    let session = state
        .session_id(&jar)
        .filter(|id| state.sessions.contains(id))
        .unwrap_or_default();
    SessionState::save_stage1(state.sessions.as_ref(), &session, &vitals, &screening)?;

    let jar = jar.add(state.cookie.build(session));
    Ok((jar, Html(views::stage1_result(&screening))))
}

/// `GET /stage2/:disease`: disease-specific form, pre-filled from stage 1
/// when the session has it.
#[axum::debug_handler]
pub(crate) async fn stage2_form(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    jar: CookieJar,
) -> Result<Html<String>, PageError> {
    let disease = state.inference.resolve_disease(&segment)?;

    let vitals = match state.session_id(&jar) {
        Some(session) => match SessionState::load(state.sessions.as_ref(), &session) {
            Ok(stored) => stored.stage1_data,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session {}: {}", session, e);
                None
            }
        },
        None => None,
    };

    let prefill = stage2_prefill(disease, vitals.as_ref());
    Ok(Html(views::stage2_form(disease, &prefill)))
}

/// `POST /stage2/:disease`: estimate risk for the routed disease.
///
/// The result is headed by the segment itself, so an unknown disease that fell
/// through to the diabetes model still shows what was requested.
#[axum::debug_handler]
pub(crate) async fn submit_stage2(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let assessment = state.inference.assess_form(&segment, &fields)?;
    Ok(Html(views::stage2_result(&segment, &assessment)))
}
