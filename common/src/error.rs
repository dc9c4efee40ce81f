//! エラー型定義
//!
//! - Error: 共通ユーティリティのエラー
//! - ReportError: 解析パイプラインの各段階で発生する失敗（すべて分類済み）
//! - describe_panic: 任意のパニック値からメッセージを取り出す

use std::any::Any;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// パイプラインの失敗分類
///
/// Display はクライアントに返す `error` 文言そのもの。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Ollama service is not running or not accessible")]
    ServiceUnavailable { reason: String },

    #[error("Ollama API error: {status}")]
    Upstream { status: u16, body: String },

    #[error("Empty response from Ollama")]
    EmptyResponse,

    #[error("Invalid JSON response from AI")]
    MalformedResponse { preview: String },

    #[error("Failed to parse AI response as valid JSON")]
    MalformedJson { preview: String, diagnostic: String },

    #[error("AI response is missing required report structure")]
    SchemaViolation { details: String },

    #[error("Failed to process images: inference request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Failed to process images: {message}")]
    Processing { message: String },
}

/// 機械判別用の失敗種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ServiceUnavailable,
    UpstreamError,
    EmptyResponse,
    MalformedResponse,
    MalformedJson,
    SchemaViolation,
    Timeout,
    InvalidRequest,
    ProcessingFailed,
}

impl ErrorKind {
    /// HTTPステータスコード
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Timeout => 504,
            ErrorKind::InvalidRequest => 400,
            _ => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::MalformedJson => "malformed_json",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ProcessingFailed => "processing_failed",
        }
    }
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            ReportError::Upstream { .. } => ErrorKind::UpstreamError,
            ReportError::EmptyResponse => ErrorKind::EmptyResponse,
            ReportError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ReportError::MalformedJson { .. } => ErrorKind::MalformedJson,
            ReportError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            ReportError::Timeout { .. } => ErrorKind::Timeout,
            ReportError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ReportError::Processing { .. } => ErrorKind::ProcessingFailed,
        }
    }

    /// 利用者向けの対処方法
    pub fn suggestion(&self) -> &'static str {
        match self {
            ReportError::ServiceUnavailable { .. } => "Run \"ollama serve\" in your terminal",
            ReportError::Upstream { .. } => {
                "Check if the model is loaded and Ollama is running properly"
            }
            ReportError::EmptyResponse => "Try again or check if the model supports image analysis",
            ReportError::MalformedResponse { .. } | ReportError::MalformedJson { .. } => {
                "Try again; the model did not follow the report format"
            }
            ReportError::SchemaViolation { .. } => {
                "Try again or switch to a model that follows structured output instructions"
            }
            ReportError::Timeout { .. } => {
                "Try smaller images or check that the model fits in available memory"
            }
            ReportError::InvalidRequest { .. } => {
                "Send both images as data URLs (data:image/...;base64,...)"
            }
            ReportError::Processing { .. } => {
                "Check if Ollama is running and the model is available"
            }
        }
    }

    /// 診断用の詳細
    pub fn details(&self) -> Option<String> {
        match self {
            ReportError::ServiceUnavailable { reason } => Some(reason.clone()),
            ReportError::Upstream { body, .. } => Some(body.clone()),
            ReportError::MalformedJson { diagnostic, .. } => Some(diagnostic.clone()),
            ReportError::SchemaViolation { details } => Some(details.clone()),
            _ => None,
        }
    }

    /// 生レスポンスのプレビュー
    pub fn raw_response(&self) -> Option<String> {
        match self {
            ReportError::MalformedResponse { preview }
            | ReportError::MalformedJson { preview, .. } => Some(preview.clone()),
            _ => None,
        }
    }
}

/// パニック値からメッセージを取り出す
///
/// `&str` / `String` / エラー型 / その他 のいずれでも必ず文字列を返す。
pub fn describe_panic(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    if let Some(error) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        return error.to_string();
    }
    if let Some(error) = payload.downcast_ref::<ReportError>() {
        return error.to_string();
    }
    "unknown failure".to_string()
}
