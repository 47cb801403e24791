use crate::infra::{ensure_pdf, AppState};
use axum::extract::{DefaultBodyLimit, Multipart, Path};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use creditlens::analysis::FinancialAnalysis;
use creditlens::error::AppError;
use creditlens::pipeline::{ParsedDocument, ScoredAnalysis};
use creditlens::report::Report;
use creditlens::scoring::ScoringResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// `max_upload_bytes` caps the upload route only; other routes keep axum's default limit.
pub(crate) fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/analyze/upload",
            post(upload_endpoint).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/v1/analyze/analyze/:filename", post(analyze_endpoint))
        .route("/api/v1/analyze/score", post(score_endpoint))
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) message: &'static str,
    pub(crate) filename: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeResponse {
    pub(crate) parsed_data: ParsedDocument,
    pub(crate) message: &'static str,
    pub(crate) results: FinancialAnalysis,
    pub(crate) scoring: ScoringResult,
    pub(crate) final_output: Report,
}

/// An analysis already extracted by a model, either raw text or parsed JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) analysis: Value,
}

pub(crate) async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Bank Statement Analyzer API" }))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn upload_endpoint(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        ensure_pdf(&filename)?;
        let path = state.upload_path(&filename)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read upload: {err}")))?;

        tokio::fs::create_dir_all(&state.upload_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        info!(%filename, bytes = bytes.len(), "statement uploaded");

        return Ok(Json(UploadResponse {
            message: "PDF uploaded successfully",
            filename,
        }));
    }

    Err(AppError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}

pub(crate) async fn analyze_endpoint(
    Extension(state): Extension<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let path = state.upload_path(&filename)?;
    if !tokio::fs::try_exists(&path).await? {
        return Err(AppError::NotFound(
            "File not found. Please upload the file first.".to_string(),
        ));
    }

    let output = state.pipeline.run(&path).await?;

    if let Err(err) = tokio::fs::remove_file(&path).await {
        warn!(%filename, error = %err, "failed to remove analyzed upload");
    }

    Ok(Json(AnalyzeResponse {
        parsed_data: output.parsed_data,
        message: "Analysis completed successfully",
        results: output.results,
        scoring: output.scoring,
        final_output: output.final_output,
    }))
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoredAnalysis>, AppError> {
    let scored = match &payload.analysis {
        Value::String(raw) => state.scorer().score_text(raw)?,
        other => state.scorer().score_value(other)?,
    };
    Ok(Json(scored))
}
