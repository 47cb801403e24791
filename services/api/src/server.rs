use crate::cli::ServeArgs;
use crate::clients::{ChatCompletionClient, LlamaParseClient};
use crate::infra::AppState;
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use creditlens::config::AppConfig;
use creditlens::error::AppError;
use creditlens::pipeline::{AnalysisScorer, StatementPipeline};
use creditlens::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if config.language_model.api_key.is_none() {
        warn!("LLAMA_API_KEY is not set; analysis requests will fail");
    }
    if config.document_parser.api_key.is_none() {
        warn!("LLAMA_CLOUD_API_KEY is not set; document parsing will fail");
    }

    let pipeline = StatementPipeline::new(
        Arc::new(LlamaParseClient::new(config.document_parser.clone())),
        Arc::new(ChatCompletionClient::new(config.language_model.clone())),
        AnalysisScorer::for_kind(config.scoring.policy),
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pipeline: Arc::new(pipeline),
        upload_dir: config.storage.upload_dir.clone(),
    };

    tokio::fs::create_dir_all(&app_state.upload_dir).await?;

    let app = router(config.storage.max_upload_bytes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = %config.scoring.policy,
        "bank statement analyzer ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
