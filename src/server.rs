//! HTTPサービス
//!
//! - POST /api/compare-images : 2枚比較（成功エンベロープ or エラーエンベロープ）
//! - GET  /health             : バックエンドの死活確認

use crate::analyzer::{ComparisonPipeline, InferenceBackend, OllamaClient, PipelineLogger, PipelineSettings, TracingLogger};
use crate::config::Config;
use crate::error::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use site_progress_common::{ComparisonRequest, Outcome, ReportError};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn create_router<B, L>(pipeline: Arc<ComparisonPipeline<B, L>>, max_body_bytes: usize) -> Router
where
    B: InferenceBackend + 'static,
    L: PipelineLogger + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/compare-images", post(compare_images::<B, L>))
        .route("/health", get(health::<B, L>))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .with_state(pipeline)
}

fn outcome_response(outcome: Outcome) -> Response {
    let status = StatusCode::from_u16(outcome.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome)).into_response()
}

async fn compare_images<B, L>(
    State(pipeline): State<Arc<ComparisonPipeline<B, L>>>,
    payload: std::result::Result<Json<ComparisonRequest>, JsonRejection>,
) -> Response
where
    B: InferenceBackend + 'static,
    L: PipelineLogger + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ReportError::InvalidRequest { message: rejection.body_text() };
            return outcome_response(Outcome::failure(&error));
        }
    };

    outcome_response(pipeline.analyze(request).await)
}

async fn health<B, L>(State(pipeline): State<Arc<ComparisonPipeline<B, L>>>) -> Response
where
    B: InferenceBackend + 'static,
    L: PipelineLogger + 'static,
{
    match pipeline.check_backend().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => outcome_response(Outcome::failure(&error)),
    }
}

/// 設定に従ってサービスを起動
pub async fn serve(config: &Config) -> Result<()> {
    let client = OllamaClient::from_config(config)?;
    let pipeline = Arc::new(ComparisonPipeline::new(
        client,
        TracingLogger,
        PipelineSettings::from_config(config),
    ));
    let app = create_router(pipeline, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(
        address = %listener.local_addr()?,
        backend = %config.backend_url,
        model = %config.model,
        "listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}
