//! HTTP request handlers
//!
//! Axum handlers for the fraud detection form. Each one runs to completion
//! synchronously; failures render a single error message and no partial
//! results.

use crate::csv_io::{parse_csv, DOWNLOAD_FILE_NAME};
use crate::error::PredictionError;
use crate::models::Threshold;
use crate::pipeline::{run_from_csv, PredictionRun};
use crate::types::Dataset;
use crate::web::form::RunForm;
use crate::web::{render, AppState};
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

/// Health check payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub default_threshold: f64,
    pub uptime_secs: i64,
}

fn status_for(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::Parse(_) | PredictionError::Threshold(_) => StatusCode::BAD_REQUEST,
        PredictionError::Schema(_) | PredictionError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(state: &AppState, threshold: Threshold, err: &PredictionError) -> Response {
    warn!(error = %err, "Request failed");
    (
        status_for(err),
        Html(render::error_page(state, threshold, &err.to_string())),
    )
        .into_response()
}

/// Threshold for the error page: the requested one if valid
fn display_threshold(state: &AppState, form: &RunForm) -> Threshold {
    Threshold::resolve(form.threshold.as_deref(), state.default_threshold).unwrap_or(state.default_threshold)
}

/// Resolve the threshold and score the posted CSV
fn score(state: &AppState, form: &RunForm) -> Result<PredictionRun, PredictionError> {
    let threshold = Threshold::resolve(form.threshold.as_deref(), state.default_threshold)?;
    run_from_csv(state.model.as_ref(), form.csv_text()?, threshold)
}

/// Decode the form and score the upload
async fn execute(state: &AppState, multipart: Multipart) -> (RunForm, Result<PredictionRun, PredictionError>) {
    match RunForm::read(multipart).await {
        Ok(form) => {
            let result = score(state, &form);
            (form, result)
        }
        Err(e) => (RunForm::default(), Err(e.into())),
    }
}

fn parse_preview<'a>(state: &AppState, form: &'a RunForm) -> Result<(Threshold, Dataset, &'a str), PredictionError> {
    let threshold = Threshold::resolve(form.threshold.as_deref(), state.default_threshold)?;
    let csv_text = form.csv_text()?;
    let dataset = parse_csv(csv_text)?;
    Ok((threshold, dataset, csv_text))
}

/// Upload form
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::index_page(&state))
}

/// Show the first rows of the upload; no inference
pub async fn preview(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match RunForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => return error_response(&state, state.default_threshold, &e.into()),
    };

    match parse_preview(&state, &form) {
        Ok((threshold, dataset, csv_text)) => {
            info!(rows = dataset.len(), columns = dataset.columns().len(), "Upload previewed");
            Html(render::preview_page(&state, threshold, &dataset, csv_text)).into_response()
        }
        Err(e) => error_response(&state, display_threshold(&state, &form), &e),
    }
}

/// Run trigger: score and render results
pub async fn predict(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (form, result) = execute(&state, multipart).await;

    match result {
        Ok(run) => {
            let csv_text = form.csv.as_deref().unwrap_or_default();
            Html(render::results_page(&state, &run, csv_text)).into_response()
        }
        Err(e) => error_response(&state, display_threshold(&state, &form), &e),
    }
}

/// Score and return the label column as a CSV attachment
pub async fn download(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (form, result) = execute(&state, multipart).await;

    match result.and_then(|run| run.download_csv()) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(&state, display_threshold(&state, &form), &e),
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model.name().to_string(),
        default_threshold: state.default_threshold.value(),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}
