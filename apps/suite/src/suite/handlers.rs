//! Axum route handlers for the career suite modal.
//!
//! Each handler applies one trigger under the controller lock and returns the
//! resulting view model. AI actions return while the view is still Loading;
//! the page polls `GET /api/v1/suite` until the result lands.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::suite::view::ViewModel;
use crate::suite::{spawn_request, Dispatch, FormFields, SuiteAction, SuiteController, SuiteError};

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

/// Applies `trigger`, snapshots the view, then starts any dispatched request
/// after the lock is released.
async fn apply<F>(state: &AppState, trigger: F) -> Result<Json<ViewModel>, AppError>
where
    F: FnOnce(&mut SuiteController) -> Result<Option<Dispatch>, SuiteError>,
{
    let mut suite = state.suite.lock().await;
    let dispatch = trigger(&mut *suite)?;
    let view = suite.view_model(&state.download);
    drop(suite);

    if let Some(dispatch) = dispatch {
        spawn_request(state.suite.clone(), state.generator.clone(), dispatch);
    }
    Ok(Json(view))
}

/// Like [`apply`], for triggers that touch key storage. Storage does blocking
/// file I/O, so the trigger runs on the blocking pool.
async fn apply_blocking<F>(state: &AppState, trigger: F) -> Result<Json<ViewModel>, AppError>
where
    F: FnOnce(&mut SuiteController) -> Result<Option<Dispatch>, SuiteError> + Send + 'static,
{
    let suite = state.suite.clone();
    let download = state.download.clone();
    let (dispatch, view) = tokio::task::spawn_blocking(move || {
        let mut suite = suite.blocking_lock();
        let dispatch = trigger(&mut *suite)?;
        Ok::<_, SuiteError>((dispatch, suite.view_model(&download)))
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    if let Some(dispatch) = dispatch {
        spawn_request(state.suite.clone(), state.generator.clone(), dispatch);
    }
    Ok(Json(view))
}

/// GET /api/v1/suite
pub async fn handle_get_view(State(state): State<AppState>) -> Json<ViewModel> {
    let suite = state.suite.lock().await;
    Json(suite.view_model(&state.download))
}

/// POST /api/v1/suite/open
pub async fn handle_open(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| {
        suite.open();
        Ok(None)
    })
    .await
}

/// POST /api/v1/suite/close
pub async fn handle_close(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| {
        suite.close();
        Ok(None)
    })
    .await
}

/// POST /api/v1/suite/toggle
pub async fn handle_toggle(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| {
        suite.toggle();
        Ok(None)
    })
    .await
}

/// POST /api/v1/suite/reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| suite.reset().map(|_| None)).await
}

/// POST /api/v1/suite/actions/:action
pub async fn handle_choose(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<ViewModel>, AppError> {
    let action: SuiteAction = action.parse()?;
    apply(&state, |suite| suite.choose(action)).await
}

/// POST /api/v1/suite/form
///
/// A blank required field is not an error: the form simply stays on screen.
pub async fn handle_submit_form(
    State(state): State<AppState>,
    Json(fields): Json<FormFields>,
) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| suite.submit_form(fields)).await
}

/// POST /api/v1/suite/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| suite.submit_answer(&request.answer)).await
}

/// POST /api/v1/suite/key
pub async fn handle_submit_key(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ViewModel>, AppError> {
    apply_blocking(&state, move |suite| suite.submit_key(&request.key)).await
}

/// POST /api/v1/suite/key/configure
pub async fn handle_configure_key(
    State(state): State<AppState>,
) -> Result<Json<ViewModel>, AppError> {
    apply(&state, |suite| suite.configure_key().map(|_| None)).await
}

/// DELETE /api/v1/suite/key
pub async fn handle_clear_key(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    apply_blocking(&state, |suite| suite.clear_key().map(|_| None)).await
}
