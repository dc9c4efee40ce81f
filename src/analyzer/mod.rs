//! 推論バックエンド連携と解析パイプライン
//!
//! HealthCheck → Prompt → Inference → Extract → Validate の一直線。
//! どの段階の失敗も ReportError に分類して返し、再試行はしない。

mod logger;
mod ollama;
mod pipeline;
mod types;

pub use logger::{LogEntry, LogLevel, PipelineLogger, RecordingLogger, Stage, TracingLogger};
pub use ollama::OllamaClient;
pub use pipeline::{request_fingerprint, ComparisonPipeline, PipelineSettings};
pub use types::{ChatMessage, ChatRequest, ChatResponse, SamplingOptions};

use std::future::Future;
use thiserror::Error;

/// バックエンド呼び出しの失敗
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("backend is unreachable: {0}")]
    Transport(String),

    #[error("backend response could not be read: {0}")]
    Body(String),
}

/// 推論バックエンド
///
/// 実装は `OllamaClient`。テストでは差し替える。
pub trait InferenceBackend: Send + Sync {
    /// 軽量な死活確認（モデル一覧の取得）
    fn health_check(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// 非ストリーミングの chat 呼び出し。返り値は message.content
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;
}
