//! レスポンスエンベロープ
//!
//! 1リクエストの結果は必ず `Outcome::Success` か `Outcome::Failure` のどちらか一方。

use crate::error::{ErrorKind, ReportError};
use crate::types::StructuredReport;
use serde::{Deserialize, Serialize};

/// 成功時: 整形済みレポートJSONを文字列で返す
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub result: String,
}

/// 失敗時の公開形式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl From<&ReportError> for ErrorEnvelope {
    fn from(error: &ReportError) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind(),
            details: error.details(),
            suggestion: Some(error.suggestion().to_string()),
            raw_response: error.raw_response(),
        }
    }
}

/// リクエスト結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(SuccessEnvelope),
    Failure(ErrorEnvelope),
}

impl Outcome {
    /// レポートを整形JSONにして成功エンベロープへ
    pub fn from_report(report: &StructuredReport) -> Self {
        match serde_json::to_string_pretty(report) {
            Ok(result) => Outcome::Success(SuccessEnvelope { result }),
            Err(e) => Outcome::failure(&ReportError::Processing { message: e.to_string() }),
        }
    }

    pub fn failure(error: &ReportError) -> Self {
        Outcome::Failure(error.into())
    }

    pub fn from_result(result: &Result<StructuredReport, ReportError>) -> Self {
        match result {
            Ok(report) => Outcome::from_report(report),
            Err(error) => Outcome::failure(error),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Outcome::Success(_) => 200,
            Outcome::Failure(envelope) => envelope.kind.http_status(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// 成功時のレポートを読み戻す
    pub fn report(&self) -> Option<StructuredReport> {
        match self {
            Outcome::Success(envelope) => serde_json::from_str(&envelope.result).ok(),
            Outcome::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentCounts, Metrics, SiteInfo};

    fn report() -> StructuredReport {
        StructuredReport {
            site_info: SiteInfo { date: "2025-07-01".into(), ..Default::default() },
            phase_analysis: None,
            metrics: Metrics { overall_completion: 55.0, ..Default::default() },
            components: ComponentCounts::new(1, 2, 3),
            trade_analysis: None,
            component_details: None,
            visual_observations: None,
            historical_trends: None,
            insights: None,
        }
    }

    #[test]
    fn test_success_envelope_shape() {
        let outcome = Outcome::from_report(&report());
        let json = serde_json::to_value(&outcome).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj["result"].as_str().unwrap().contains("\"overallCompletion\": 55,"));
        assert!(obj.get("error").is_none());
        assert_eq!(outcome.http_status(), 200);
    }

    #[test]
    fn test_success_report_round_trip() {
        let outcome = Outcome::from_report(&report());
        assert_eq!(outcome.report(), Some(report()));
    }

    #[test]
    fn test_error_envelope_shape() {
        let outcome = Outcome::failure(&ReportError::MalformedJson {
            preview: "{\"metrics\":".into(),
            diagnostic: "EOF while parsing an object at line 1 column 11".into(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "Failed to parse AI response as valid JSON");
        assert_eq!(json["kind"], "malformed_json");
        assert_eq!(json["rawResponse"], "{\"metrics\":");
        assert!(json["details"].as_str().unwrap().contains("EOF"));
        assert!(json.get("result").is_none());
        assert_eq!(outcome.http_status(), 500);
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_error_envelope_omits_empty_fields() {
        let envelope = ErrorEnvelope::from(&ReportError::EmptyResponse);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("rawResponse").is_none());
        assert!(json.get("suggestion").is_some());
    }

    #[test]
    fn test_outcome_deserialize_discriminates() {
        let ok: Outcome = serde_json::from_str(r#"{"result": "{}"}"#).unwrap();
        assert!(ok.is_success());
        let err: Outcome =
            serde_json::from_str(r#"{"error": "x", "kind": "timeout"}"#).unwrap();
        assert!(!err.is_success());
        assert_eq!(err.http_status(), 504);
    }
}
