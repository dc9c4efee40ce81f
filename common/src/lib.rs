//! Site Progress AI Common Library
//!
//! CLIとHTTPサービスで共有される型とユーティリティ:
//! プロンプト契約、レスポンス抽出、検証・正規化、エラー分類

pub mod types;
pub mod lenient;
pub mod draft;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod envelope;

pub use types::{
    ComparisonRequest, ComponentCounts, ComponentDetail, Insights, Metrics, OutputFormat,
    PhaseAnalysis, Quality, Risk, RiskLevel, SiteInfo, StructuredReport, Trade, TradeAnalysis,
    TradeAssessment, TrendPoint, VisualObservations, WorkStatus, strip_data_url,
};
pub use draft::ReportDraft;
pub use error::{describe_panic, Error, ErrorKind, ReportError, Result};
pub use parser::{extract_json, parse_report, preview, process_reply, strip_fences, PREVIEW_CHARS};
pub use prompts::{build_system_prompt, build_user_prompt};
pub use envelope::{ErrorEnvelope, Outcome, SuccessEnvelope};
