//! 部分的な中間表現
//!
//! モデル出力は全フィールド省略可能な `ReportDraft` として読み、
//! `promote` で厳密な `StructuredReport` に昇格させる。
//! 生のパース結果を直接 `StructuredReport` として扱うことはしない。

use crate::error::ReportError;
use crate::lenient;
use crate::types::{
    ComponentCounts, ComponentDetail, Insights, Metrics, PhaseAnalysis, SiteInfo,
    StructuredReport, TradeAnalysis, TrendPoint, VisualObservations,
};
use serde::Deserialize;

/// 必須（欠けていればスキーマ違反）のトップレベルキー
pub const REQUIRED_KEYS: &[&str] = &["metrics", "components"];

/// metrics の中間表現
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsDraft {
    #[serde(deserialize_with = "lenient::score")]
    pub overall_completion: Option<f64>,
    #[serde(deserialize_with = "lenient::score")]
    pub structural_integrity: Option<f64>,
    #[serde(deserialize_with = "lenient::score")]
    pub alignment_accuracy: Option<f64>,
    #[serde(deserialize_with = "lenient::score")]
    pub quality_score: Option<f64>,
    #[serde(deserialize_with = "lenient::score")]
    pub safety_compliance: Option<f64>,
    #[serde(deserialize_with = "lenient::score")]
    pub schedule_adherence: Option<f64>,
}

impl From<MetricsDraft> for Metrics {
    fn from(draft: MetricsDraft) -> Self {
        Self {
            overall_completion: draft.overall_completion.unwrap_or(0.0),
            structural_integrity: draft.structural_integrity.unwrap_or(0.0),
            alignment_accuracy: draft.alignment_accuracy.unwrap_or(0.0),
            quality_score: draft.quality_score.unwrap_or(0.0),
            safety_compliance: draft.safety_compliance.unwrap_or(0.0),
            schedule_adherence: draft.schedule_adherence.unwrap_or(0.0),
        }
    }
}

/// components の中間表現
///
/// モデルが返す `total` は読むが使わない。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentsDraft {
    #[serde(deserialize_with = "lenient::count")]
    pub completed: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub in_progress: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub pending: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub total: Option<u32>,
}

impl From<ComponentsDraft> for ComponentCounts {
    fn from(draft: ComponentsDraft) -> Self {
        ComponentCounts::new(
            draft.completed.unwrap_or(0),
            draft.in_progress.unwrap_or(0),
            draft.pending.unwrap_or(0),
        )
    }
}

/// historicalTrends の1点（date 欠損可）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendDraft {
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(deserialize_with = "lenient::score")]
    pub completion: Option<f64>,
}

impl TrendDraft {
    fn promote(self, today: &str) -> TrendPoint {
        let date = if self.date.trim().is_empty() {
            today.to_string()
        } else {
            self.date
        };
        TrendPoint { date, completion: self.completion }
    }
}

/// レポートの中間表現（全フィールド省略可）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDraft {
    #[serde(deserialize_with = "lenient::section")]
    pub phase_analysis: Option<PhaseAnalysis>,
    pub metrics: Option<MetricsDraft>,
    pub components: Option<ComponentsDraft>,
    #[serde(deserialize_with = "lenient::section")]
    pub trade_analysis: Option<TradeAnalysis>,
    #[serde(deserialize_with = "lenient::section_list")]
    pub component_details: Option<Vec<ComponentDetail>>,
    #[serde(deserialize_with = "lenient::section")]
    pub visual_observations: Option<VisualObservations>,
    #[serde(deserialize_with = "lenient::section_list")]
    pub historical_trends: Option<Vec<TrendDraft>>,
    #[serde(deserialize_with = "lenient::section")]
    pub insights: Option<Insights>,
}

impl ReportDraft {
    /// 厳密なレポートへ昇格
    ///
    /// - components.total は3区分の合計で上書き
    /// - date の無い推移点には `today` を補完
    /// - siteInfo は呼び出し側の値で確定
    pub fn promote(self, site_info: SiteInfo, today: &str) -> Result<StructuredReport, ReportError> {
        let missing: Vec<&str> = [
            ("metrics", self.metrics.is_none()),
            ("components", self.components.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(key, _)| *key)
        .collect();

        let (Some(metrics), Some(components)) = (self.metrics, self.components) else {
            return Err(ReportError::SchemaViolation {
                details: format!("missing required keys: {}", missing.join(", ")),
            });
        };

        Ok(StructuredReport {
            site_info,
            phase_analysis: self.phase_analysis,
            metrics: metrics.into(),
            components: components.into(),
            trade_analysis: self.trade_analysis,
            component_details: self.component_details,
            visual_observations: self.visual_observations,
            historical_trends: self
                .historical_trends
                .map(|trends| trends.into_iter().map(|t| t.promote(today)).collect()),
            insights: self.insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteInfo {
        SiteInfo {
            date: "2025-07-01".into(),
            location: "Tower A, Level 3".into(),
            supervisor: "J. Okafor".into(),
            weather: "Overcast".into(),
        }
    }

    #[test]
    fn test_promote_requires_metrics_and_components() {
        let draft = ReportDraft::default();
        let err = draft.promote(site(), "2025-07-01").unwrap_err();
        match err {
            ReportError::SchemaViolation { details } => {
                assert!(details.contains("metrics"));
                assert!(details.contains("components"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_promote_recomputes_total() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"metrics": {}, "components": {"completed": 4, "inProgress": 1, "total": 40}}"#,
        )
        .unwrap();
        let report = draft.promote(site(), "2025-07-01").unwrap();
        assert_eq!(report.components.total(), 5);
        assert_eq!(report.components.pending(), 0);
    }

    #[test]
    fn test_promote_defaults_missing_scores_to_zero() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"metrics": {"overallCompletion": 64}, "components": {}}"#,
        )
        .unwrap();
        let report = draft.promote(site(), "2025-07-01").unwrap();
        assert_eq!(report.metrics.overall_completion, 64.0);
        assert_eq!(report.metrics.safety_compliance, 0.0);
    }

    #[test]
    fn test_promote_fills_blank_trend_dates() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"metrics": {}, "components": {}, "historicalTrends": [
                {"date": "2025-05-01", "completion": 30},
                {"date": "  ", "completion": 35},
                {"completion": 42}
            ]}"#,
        )
        .unwrap();
        let report = draft.promote(site(), "2025-07-09").unwrap();
        let trends = report.historical_trends.unwrap();
        assert_eq!(trends[0].date, "2025-05-01");
        assert_eq!(trends[1].date, "2025-07-09");
        assert_eq!(trends[2].date, "2025-07-09");
        assert_eq!(trends[2].completion, Some(42.0));
    }

    #[test]
    fn test_unreadable_presentation_section_is_dropped() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"metrics": {}, "components": {}, "insights": "see summary", "historicalTrends": {"a": 1}}"#,
        )
        .unwrap();
        assert!(draft.insights.is_none());
        assert!(draft.historical_trends.is_none());
    }

    #[test]
    fn test_unreadable_list_entries_are_skipped() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"componentDetails": [{"name": "Blockwork", "status": "completed"}, "Ceiling", 3]}"#,
        )
        .unwrap();
        let details = draft.component_details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "Blockwork");
    }

    #[test]
    fn test_caller_site_info_wins() {
        let draft: ReportDraft = serde_json::from_str(
            r#"{"metrics": {}, "components": {}, "siteInfo": {"location": "hallucinated"}}"#,
        )
        .unwrap();
        let report = draft.promote(site(), "2025-07-01").unwrap();
        assert_eq!(report.site_info, site());
    }
}
