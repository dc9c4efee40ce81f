//! 結合テスト共通: 推論バックエンドの差し替えとフィクスチャ

#![allow(dead_code)]

use axum::Router;
use site_progress::analyzer::{
    BackendError, ChatRequest, ComparisonPipeline, InferenceBackend, PipelineSettings,
    RecordingLogger,
};
use site_progress_common::{ComparisonRequest, OutputFormat, SiteInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// chat の応答パターン
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16, String),
    Timeout(u64),
    Unreachable,
    Panic(&'static str),
}

/// 呼び出し回数を記録するフェイク
#[derive(Debug)]
pub struct FakeBackend {
    healthy: bool,
    reply: Reply,
    health_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl FakeBackend {
    pub fn new(healthy: bool, reply: Reply) -> Self {
        Self {
            healthy,
            reply,
            health_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(true, Reply::Text(text.to_string()))
    }

    pub fn down() -> Self {
        Self::new(false, Reply::Text(String::new()))
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl InferenceBackend for FakeBackend {
    async fn health_check(&self) -> Result<(), BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(BackendError::Status { status: 503, body: "ollama is down".into() })
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status, body) => Err(BackendError::Status { status: *status, body: body.clone() }),
            Reply::Timeout(seconds) => Err(BackendError::Timeout { seconds: *seconds }),
            Reply::Unreachable => Err(BackendError::Transport("connection reset by peer".into())),
            Reply::Panic(message) => panic!("{}", message),
        }
    }
}

pub type TestPipeline = ComparisonPipeline<FakeBackend, RecordingLogger>;

pub fn pipeline(backend: FakeBackend) -> Arc<TestPipeline> {
    Arc::new(ComparisonPipeline::new(backend, RecordingLogger::new(), PipelineSettings::default()))
}

pub fn site_info() -> SiteInfo {
    SiteInfo {
        date: "2025-07-09".into(),
        location: "Marina Residences, Level 14".into(),
        supervisor: "A. Rahman".into(),
        weather: "Humid, 31°C".into(),
    }
}

pub fn comparison_request() -> ComparisonRequest {
    ComparisonRequest {
        image1: "data:image/jpeg;base64,/9j/RAWPHASE".into(),
        image2: "data:image/png;base64,iVBORFINISHED".into(),
        output_format: OutputFormat::Structured,
        site_info: site_info(),
    }
}

/// 契約どおりの応答（一部フィールドのみ）
pub const CONTRACT_REPLY: &str = r#"{
  "phaseAnalysis": {"rawPhaseCompletion": 40, "finishedPhaseCompletion": 95, "progressGap": 55,
                    "estimatedTimespan": "5 months", "qualityConsistency": "High"},
  "metrics": {"overallCompletion": 78, "structuralIntegrity": 90, "alignmentAccuracy": 84,
              "qualityScore": 81, "safetyCompliance": 73, "scheduleAdherence": 66},
  "components": {"completed": 6, "inProgress": 3, "pending": 1, "total": 10},
  "tradeAnalysis": {
    "ceilingWorks": {"completionPercentage": 100, "quality": "Excellent", "status": "completed",
                     "observations": "Grid ceiling installed with integrated lights",
                     "deficiencies": [], "compliance": "Compliant"}
  },
  "historicalTrends": [{"date": "2025-06-01", "completion": 70}, {"date": "2025-07-09", "completion": 78}],
  "insights": {"aiSummary": "Fit-out is nearly complete.", "recommendations": ["Snag list walk"],
               "risks": [{"level": "low", "description": "Minor paint touch-ups", "mitigation": "Schedule painter"}],
               "nextPhaseRequirements": ["Handover documentation"]}
}"#;

/// 127.0.0.1 の空きポートで router を起動し、ベースURLを返す
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// 接続できないアドレス（一度バインドして解放したポート）
pub async fn unused_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
