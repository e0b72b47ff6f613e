//! HTTP request handlers

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::patient::PatientRecord;
use crate::screening::{self, ScreeningOutcome};
use crate::utils::{DataLoader, FeatureMatrix};

use super::error::{PageError, Result, ServerError};
use super::pages;
use super::state::AppState;

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::index_page(&state.page_context()))
}

/// Fields of the patient form, as submitted
#[derive(Debug, Default)]
struct FormSubmission {
    name: String,
    age: String,
    gender: String,
    file_name: Option<String>,
    data: Bytes,
}

async fn read_form(mut multipart: Multipart) -> Result<FormSubmission> {
    let mut form = FormSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = field.text().await.map_err(|e| ServerError::BadRequest(e.to_string()))?,
            "age" => form.age = field.text().await.map_err(|e| ServerError::BadRequest(e.to_string()))?,
            "gender" => form.gender = field.text().await.map_err(|e| ServerError::BadRequest(e.to_string()))?,
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.data = field.bytes().await.map_err(|e| ServerError::BadRequest(e.to_string()))?;
            }
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn check_upload(form: &FormSubmission) -> Result<()> {
    let file_name = match form.file_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ServerError::BadRequest("Please upload a CSV file".to_string())),
    };
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ServerError::BadRequest(format!(
            "Unsupported file '{}'. Upload a .csv file.",
            file_name
        )));
    }
    Ok(())
}

/// Parse, normalize and classify off the async runtime
async fn run_screening(
    state: &AppState,
    patient: PatientRecord,
    csv: Bytes,
) -> Result<(ScreeningOutcome, FeatureMatrix)> {
    let model = Arc::clone(&state.model);
    let result = tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
        let features = DataLoader::new().load_csv_bytes(&csv)?;
        info!(rows = features.n_rows(), columns = features.n_cols(), "Parsed upload");
        let outcome = screening::screen(&model, patient, &features)?;
        Ok((outcome, features))
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;
    Ok(result)
}

/// Write the PDF for an outcome to the configured report path
async fn write_report(state: &AppState, outcome: &ScreeningOutcome) -> Result<()> {
    let report = outcome.report();
    let path = state.config.report_path.clone();

    let _guard = state.report_lock.lock().await;
    tokio::task::spawn_blocking(move || report.write_pdf(&path))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;
    Ok(())
}

pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> std::result::Result<Html<String>, PageError> {
    let form = read_form(multipart).await?;
    check_upload(&form)?;
    info!(
        file = form.file_name.as_deref().unwrap_or_default(),
        size_bytes = form.data.len(),
        "Received upload"
    );

    let patient = PatientRecord::from_form(&form.name, &form.age, &form.gender)?;
    let (outcome, features) = run_screening(&state, patient, form.data).await?;

    let report_written = state.config.variant.writes_report();
    if report_written {
        write_report(&state, &outcome).await?;
    }

    Ok(Html(pages::result_page(
        &state.page_context(),
        &outcome,
        &features,
        state.config.preview_rows,
        report_written,
    )))
}

pub async fn download_report(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    if !state.config.variant.writes_report() {
        return Err(ServerError::NotFound("This front-end does not produce reports".to_string()));
    }

    let bytes = {
        let _guard = state.report_lock.lock().await;
        match tokio::fs::read(&state.config.report_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServerError::NotFound("No report has been generated yet".to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"epilepsy_report.pdf\""),
        ],
        bytes,
    ))
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub patient: Option<PatientRecord>,
    pub rows: Vec<Vec<f64>>,
}

pub async fn api_predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<serde_json::Value>> {
    let patient = request.patient.unwrap_or_default();
    let model = Arc::clone(&state.model);
    let rows = request.rows;

    let outcome = tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
        let features = FeatureMatrix::from_rows(rows)?;
        screening::screen(&model, patient, &features)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    let narrative = outcome.narrative;
    let labels: Vec<u8> = outcome.labels.iter().map(|l| l.as_u8()).collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "patient": outcome.patient,
        "label": outcome.label().as_u8(),
        "labels": labels,
        "rows": outcome.rows(),
        "flagged": outcome.flagged(),
        "headline": narrative.headline(),
        "advice": narrative.advice(),
        "prevention_tips": narrative.prevention_tips(),
        "scaling": state.model.scaling().name(),
    })))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "variant": state.config.variant,
        "model": state.model.kind(),
        "n_features": state.model.n_features(),
        "uptime_secs": uptime.num_seconds(),
    }))
}
