//! パイプラインのログ出力先
//!
//! パイプラインは直接 tracing を呼ばず、注入された PipelineLogger に書く。

use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

/// パイプラインの段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    HealthCheck,
    Inference,
    Extraction,
    Validation,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::HealthCheck => "health_check",
            Stage::Inference => "inference",
            Stage::Extraction => "extraction",
            Stage::Validation => "validation",
            Stage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

pub trait PipelineLogger: Send + Sync {
    fn log(&self, level: LogLevel, stage: Stage, request_id: &str, message: &str);

    fn stage(&self, stage: Stage, request_id: &str, message: &str) {
        self.log(LogLevel::Info, stage, request_id, message);
    }

    fn detail(&self, stage: Stage, request_id: &str, message: &str) {
        self.log(LogLevel::Debug, stage, request_id, message);
    }

    fn failure(&self, stage: Stage, request_id: &str, message: &str) {
        self.log(LogLevel::Error, stage, request_id, message);
    }
}

/// tracing へ構造化イベントとして出力
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PipelineLogger for TracingLogger {
    fn log(&self, level: LogLevel, stage: Stage, request_id: &str, message: &str) {
        let stage = stage.as_str();
        match level {
            LogLevel::Debug => debug!(stage, request_id, "{}", message),
            LogLevel::Info => info!(stage, request_id, "{}", message),
            LogLevel::Error => error!(stage, request_id, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub stage: Stage,
    pub request_id: String,
    pub message: String,
}

/// メモリに記録（テスト用）
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // 記録中のパニックで毒化しても内容は読める
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// 記録された段階（重複除去、出現順）
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        for entry in self.lock().iter() {
            if !stages.contains(&entry.stage) {
                stages.push(entry.stage);
            }
        }
        stages
    }

    pub fn failures(&self) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .cloned()
            .collect()
    }
}

impl PipelineLogger for RecordingLogger {
    fn log(&self, level: LogLevel, stage: Stage, request_id: &str, message: &str) {
        self.lock().push(LogEntry {
            level,
            stage,
            request_id: request_id.to_string(),
            message: message.to_string(),
        });
    }
}
