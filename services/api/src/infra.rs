use creditlens::error::AppError;
use creditlens::pipeline::{AnalysisScorer, StatementPipeline};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pipeline: Arc<StatementPipeline>,
    pub(crate) upload_dir: PathBuf,
}

impl AppState {
    pub(crate) fn scorer(&self) -> &AnalysisScorer {
        self.pipeline.scorer()
    }

    /// Location of an uploaded statement, rejecting names that could escape
    /// the upload directory.
    pub(crate) fn upload_path(&self, filename: &str) -> Result<PathBuf, AppError> {
        ensure_safe_filename(filename)?;
        Ok(self.upload_dir.join(filename))
    }
}

pub(crate) const PDF_ONLY: &str = "Only PDF files are supported at this time";

fn ensure_safe_filename(filename: &str) -> Result<(), AppError> {
    let trimmed = filename.trim();
    let plain = !trimmed.is_empty()
        && trimmed == filename
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
        && Path::new(filename).file_name().is_some();
    if plain {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid filename '{filename}'")))
    }
}

/// Only PDFs are accepted, by extension and by guessed mime type.
pub(crate) fn ensure_pdf(filename: &str) -> Result<(), AppError> {
    let has_pdf_extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let guessed = mime_guess::from_path(filename).first_raw();
    if has_pdf_extension && guessed == Some("application/pdf") {
        Ok(())
    } else {
        Err(AppError::BadRequest(PDF_ONLY.to_string()))
    }
}
