use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

/// GET /
/// Serves the résumé document the suite reads its prompts from.
pub async fn handle_resume_page(State(state): State<AppState>) -> Response {
    if state.resume.is_html() {
        Html(state.resume.raw().to_string()).into_response()
    } else {
        (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            state.resume.raw().to_string(),
        )
            .into_response()
    }
}

/// GET /download
/// Serves the pre-rendered résumé PDF. Only one download runs at a time.
pub async fn handle_download(State(state): State<AppState>) -> Result<Response, AppError> {
    let Some(guard) = state.download.try_begin() else {
        return Err(AppError::Conflict(state.strings.generating.clone()));
    };

    let bytes = state
        .download
        .read(&guard)
        .await
        .map_err(|_| AppError::Download(state.strings.pdf_error.clone()))?;
    info!("Serving {} ({} bytes)", state.download.filename(), bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                state.download.content_disposition(),
            ),
        ],
        bytes,
    )
        .into_response())
}
