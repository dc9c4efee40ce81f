//! 比較解析パイプライン
//!
//! ```text
//! HealthCheck ─ng→ ServiceUnavailable
//!   └ok→ Inference ─status→ UpstreamError / timeout→ Timeout
//!          └ok→ process_reply ─empty→ EmptyResponse
//!                 └ok→ Extract ─none→ MalformedResponse
//!                        └ok→ Parse ─ng→ MalformedJson
//!                               └ok→ SchemaCheck ─ng→ SchemaViolation
//!                                      └ok→ Normalize → Success
//! ```

use super::logger::{PipelineLogger, Stage};
use super::types::{ChatRequest, SamplingOptions};
use super::{BackendError, InferenceBackend};
use crate::config::Config;
use sha2::{Digest, Sha256};
use site_progress_common::{
    describe_panic, preview, process_reply, ComparisonRequest, Outcome, ReportError,
    StructuredReport, PREVIEW_CHARS,
};
use std::sync::Arc;

/// モデル名とサンプリング設定
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub model: String,
    pub sampling: SamplingOptions,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            sampling: config.sampling.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// ログ相関用のリクエスト識別子（2枚の画像のSHA-256先頭12桁）
pub fn request_fingerprint(request: &ComparisonRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.image1.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.image2.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub struct ComparisonPipeline<B, L> {
    backend: B,
    logger: L,
    settings: PipelineSettings,
}

impl<B, L> ComparisonPipeline<B, L>
where
    B: InferenceBackend,
    L: PipelineLogger,
{
    pub fn new(backend: B, logger: L, settings: PipelineSettings) -> Self {
        Self { backend, logger, settings }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// 死活確認のみ
    pub async fn check_backend(&self) -> Result<(), ReportError> {
        self.backend
            .health_check()
            .await
            .map_err(|e| ReportError::ServiceUnavailable { reason: e.to_string() })
    }

    /// パイプライン本体
    pub async fn run(&self, request: &ComparisonRequest) -> Result<StructuredReport, ReportError> {
        let id = request_fingerprint(request);
        self.logger.stage(
            Stage::Received,
            &id,
            &format!(
                "image1={} bytes, image2={} bytes, format={}, date={}, location={}",
                request.image1.len(),
                request.image2.len(),
                request.output_format.as_str(),
                request.site_info.date,
                request.site_info.location,
            ),
        );

        // 1. ヘルスチェック（画像送信前）
        if let Err(e) = self.check_backend().await {
            self.logger.failure(Stage::HealthCheck, &id, &e.details().unwrap_or_default());
            return Err(e);
        }
        self.logger.stage(Stage::HealthCheck, &id, "backend is running");

        // 2. リクエスト構築
        let images = request.image_payloads().map_err(|e| {
            self.logger.failure(Stage::Inference, &id, &e.to_string());
            ReportError::InvalidRequest { message: e.to_string() }
        })?;
        let chat = ChatRequest::for_comparison(&self.settings.model, &self.settings.sampling, images);

        // 3. 推論
        self.logger.stage(
            Stage::Inference,
            &id,
            &format!("sending {} bytes of images to {}", chat.image_bytes(), self.settings.model),
        );
        let reply = self.backend.chat(&chat).await.map_err(|e| {
            self.logger.failure(Stage::Inference, &id, &e.to_string());
            match e {
                BackendError::Status { status, body } => ReportError::Upstream { status, body },
                BackendError::Timeout { seconds } => ReportError::Timeout { seconds },
                other => ReportError::Processing { message: other.to_string() },
            }
        })?;
        self.logger.stage(Stage::Inference, &id, &format!("reply length {} chars", reply.chars().count()));
        self.logger.detail(Stage::Inference, &id, &preview(&reply, PREVIEW_CHARS));

        // 4. 空判定・JSON抽出・検証・正規化
        let report = process_reply(&reply, &request.site_info, &today()).map_err(|e| {
            let stage = match e {
                ReportError::EmptyResponse => Stage::Inference,
                ReportError::MalformedResponse { .. } => Stage::Extraction,
                _ => Stage::Validation,
            };
            self.logger.failure(stage, &id, &format!("{}: {}", e, e.details().unwrap_or_default()));
            if let Some(raw) = e.raw_response() {
                self.logger.detail(stage, &id, &raw);
            }
            e
        })?;

        self.logger.stage(
            Stage::Completed,
            &id,
            &format!(
                "overall completion {:.0}%, components total {}",
                report.metrics.overall_completion,
                report.components.total()
            ),
        );
        Ok(report)
    }
}

impl<B, L> ComparisonPipeline<B, L>
where
    B: InferenceBackend + 'static,
    L: PipelineLogger + 'static,
{
    /// 外側の境界: 結果は必ず成功か失敗のどちらか一方
    ///
    /// パイプラインは別タスクで実行し、パニックも Processing に変換する。
    pub async fn analyze(self: Arc<Self>, request: ComparisonRequest) -> Outcome {
        let id = request_fingerprint(&request);
        let pipeline = Arc::clone(&self);
        let handle = tokio::spawn(async move { pipeline.run(&request).await });

        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    describe_panic(join_error.into_panic().as_ref())
                } else {
                    "pipeline task was cancelled".to_string()
                };
                self.logger.failure(Stage::Completed, &id, &message);
                Err(ReportError::Processing { message })
            }
        };

        Outcome::from_result(&result)
    }
}
