//! レポートの型定義
//!
//! - SiteInfo / ComparisonRequest: 呼び出し側からの入力
//! - StructuredReport: 検証・正規化済みの最終出力
//!
//! 表示用セクションの葉は `lenient` 経由で読むため、型の崩れた
//! モデル出力でもセクション単位で欠損扱いにできる。

use crate::error::{Error, Result};
use crate::lenient::{self, loose_key, LooseEnum};
use serde::{Deserialize, Serialize, Serializer};

/// 現場情報（レポートにそのまま転記）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteInfo {
    pub date: String,
    pub location: String,
    pub supervisor: String,
    pub weather: String,
}

/// 出力形式（受理・記録のみでレポートの形は変わらない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
    Structured,
    Detailed,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Structured => "structured",
            OutputFormat::Detailed => "detailed",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "structured" => Ok(OutputFormat::Structured),
            "detailed" => Ok(OutputFormat::Detailed),
            _ => Err(format!(
                "Unknown format: {}. Use json, markdown, structured, or detailed",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 比較リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    /// 施工中（躯体）フェーズの写真 Data URL
    pub image1: String,
    /// 仕上げフェーズの写真 Data URL
    pub image2: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub site_info: SiteInfo,
}

impl ComparisonRequest {
    /// 送信用に Data URL のプレフィックスを除いた2枚分のBase64
    pub fn image_payloads(&self) -> Result<[&str; 2]> {
        let first = strip_data_url(&self.image1)
            .ok_or_else(|| Error::InvalidImage("image1 is not a data URL".into()))?;
        let second = strip_data_url(&self.image2)
            .ok_or_else(|| Error::InvalidImage("image2 is not a data URL".into()))?;
        Ok([first, second])
    }
}

/// Data URLからBase64データ部分を抽出
///
/// "data:image/jpeg;base64,/9j/4AAQ..." → "/9j/4AAQ..."
pub fn strip_data_url(data_url: &str) -> Option<&str> {
    data_url
        .split_once(',')
        .map(|(_, data)| data.trim())
        .filter(|data| !data.is_empty())
}

/// 評価対象の10工種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trade {
    Blockwork,
    ElectricalWork,
    PlumbingWork,
    HvacWorks,
    CeilingWorks,
    FlooringWorks,
    WallFinishes,
    JoineryWorks,
    CurtainWorks,
    GlassWork,
}

impl Trade {
    pub const ALL: [Trade; 10] = [
        Trade::Blockwork,
        Trade::ElectricalWork,
        Trade::PlumbingWork,
        Trade::HvacWorks,
        Trade::CeilingWorks,
        Trade::FlooringWorks,
        Trade::WallFinishes,
        Trade::JoineryWorks,
        Trade::CurtainWorks,
        Trade::GlassWork,
    ];

    /// JSONキー
    pub fn key(&self) -> &'static str {
        match self {
            Trade::Blockwork => "blockwork",
            Trade::ElectricalWork => "electricalWork",
            Trade::PlumbingWork => "plumbingWork",
            Trade::HvacWorks => "hvacWorks",
            Trade::CeilingWorks => "ceilingWorks",
            Trade::FlooringWorks => "flooringWorks",
            Trade::WallFinishes => "wallFinishes",
            Trade::JoineryWorks => "joineryWorks",
            Trade::CurtainWorks => "curtainWorks",
            Trade::GlassWork => "glassWork",
        }
    }

    /// 表示名（componentDetails の name）
    pub fn display_name(&self) -> &'static str {
        match self {
            Trade::Blockwork => "Blockwork",
            Trade::ElectricalWork => "Electrical Work",
            Trade::PlumbingWork => "Plumbing Work",
            Trade::HvacWorks => "HVAC Works",
            Trade::CeilingWorks => "Ceiling Works",
            Trade::FlooringWorks => "Flooring Works",
            Trade::WallFinishes => "Wall Finishes",
            Trade::JoineryWorks => "Joinery Works",
            Trade::CurtainWorks => "Curtain Works",
            Trade::GlassWork => "Glass Work",
        }
    }

    /// プロンプトで指示する評価観点
    pub fn focus(&self) -> &'static str {
        match self {
            Trade::Blockwork => "Wall construction quality and completion",
            Trade::ElectricalWork => "Installation progress and safety compliance",
            Trade::PlumbingWork => "System installation and fixture placement",
            Trade::HvacWorks => "Equipment and ductwork installation status",
            Trade::CeilingWorks => "False ceiling and lighting integration",
            Trade::FlooringWorks => "Material installation and finishing quality",
            Trade::WallFinishes => "Surface preparation and application quality",
            Trade::JoineryWorks => "Doors, windows, built-in elements",
            Trade::CurtainWorks => "Window treatments and installation",
            Trade::GlassWork => "Windows, partitions, quality assessment",
        }
    }
}

/// 施工品質
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl LooseEnum for Quality {
    fn from_loose(s: &str) -> Option<Self> {
        match loose_key(s).as_str() {
            "poor" => Some(Quality::Poor),
            "fair" | "average" => Some(Quality::Fair),
            "good" => Some(Quality::Good),
            "excellent" => Some(Quality::Excellent),
            _ => None,
        }
    }
}

/// 施工状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkStatus {
    Completed,
    InProgress,
    Pending,
}

impl LooseEnum for WorkStatus {
    fn from_loose(s: &str) -> Option<Self> {
        match loose_key(s).as_str() {
            "completed" | "complete" | "done" => Some(WorkStatus::Completed),
            "inprogress" | "ongoing" => Some(WorkStatus::InProgress),
            "pending" | "notstarted" => Some(WorkStatus::Pending),
            _ => None,
        }
    }
}

/// リスクレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl LooseEnum for RiskLevel {
    fn from_loose(s: &str) -> Option<Self> {
        match loose_key(s).as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" | "moderate" => Some(RiskLevel::Medium),
            "high" | "critical" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// スコアの出力（整数値は `72.0` ではなく `72` と書く）
fn score<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn optional_score<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => score(value, serializer),
        None => serializer.serialize_none(),
    }
}

/// フェーズ比較
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseAnalysis {
    #[serde(
        deserialize_with = "lenient::score",
        serialize_with = "optional_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_phase_completion: Option<f64>,
    #[serde(
        deserialize_with = "lenient::score",
        serialize_with = "optional_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub finished_phase_completion: Option<f64>,
    #[serde(
        deserialize_with = "lenient::score",
        serialize_with = "optional_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress_gap: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub estimated_timespan: String,
    #[serde(deserialize_with = "lenient::text")]
    pub quality_consistency: String,
}

/// 6つの評価スコア（0〜100）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "crate::draft::MetricsDraft")]
pub struct Metrics {
    #[serde(serialize_with = "score")]
    pub overall_completion: f64,
    #[serde(serialize_with = "score")]
    pub structural_integrity: f64,
    #[serde(serialize_with = "score")]
    pub alignment_accuracy: f64,
    #[serde(serialize_with = "score")]
    pub quality_score: f64,
    #[serde(serialize_with = "score")]
    pub safety_compliance: f64,
    #[serde(serialize_with = "score")]
    pub schedule_adherence: f64,
}

/// 構成要素の件数
///
/// `total` は常に3区分の合計。デシリアライズ時も再計算する。
/// 各区分は u32 のため、合計は u64 で桁あふれしない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "crate::draft::ComponentsDraft")]
pub struct ComponentCounts {
    completed: u32,
    in_progress: u32,
    pending: u32,
    total: u64,
}

impl ComponentCounts {
    pub fn new(completed: u32, in_progress: u32, pending: u32) -> Self {
        Self {
            completed,
            in_progress,
            pending,
            total: u64::from(completed) + u64::from(in_progress) + u64::from(pending),
        }
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn in_progress(&self) -> u32 {
        self.in_progress
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// 工種ごとの評価
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeAssessment {
    #[serde(
        deserialize_with = "lenient::score",
        serialize_with = "optional_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_percentage: Option<f64>,
    #[serde(deserialize_with = "lenient::choice", skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    #[serde(deserialize_with = "lenient::choice", skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
    #[serde(deserialize_with = "lenient::text")]
    pub observations: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub deficiencies: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub compliance: String,
}

/// 10工種の評価
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeAnalysis {
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub blockwork: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub electrical_work: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub plumbing_work: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub hvac_works: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub ceiling_works: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub flooring_works: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub wall_finishes: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub joinery_works: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub curtain_works: Option<TradeAssessment>,
    #[serde(deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub glass_work: Option<TradeAssessment>,
}

impl TradeAnalysis {
    pub fn get(&self, trade: Trade) -> Option<&TradeAssessment> {
        match trade {
            Trade::Blockwork => self.blockwork.as_ref(),
            Trade::ElectricalWork => self.electrical_work.as_ref(),
            Trade::PlumbingWork => self.plumbing_work.as_ref(),
            Trade::HvacWorks => self.hvac_works.as_ref(),
            Trade::CeilingWorks => self.ceiling_works.as_ref(),
            Trade::FlooringWorks => self.flooring_works.as_ref(),
            Trade::WallFinishes => self.wall_finishes.as_ref(),
            Trade::JoineryWorks => self.joinery_works.as_ref(),
            Trade::CurtainWorks => self.curtain_works.as_ref(),
            Trade::GlassWork => self.glass_work.as_ref(),
        }
    }

    /// 評価が返ってきた工種の数
    pub fn assessed_count(&self) -> usize {
        Trade::ALL.iter().filter(|t| self.get(**t).is_some()).count()
    }
}

/// 構成要素の一覧行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentDetail {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::choice", skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
    #[serde(deserialize_with = "lenient::choice", skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

/// 目視所見
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualObservations {
    #[serde(deserialize_with = "lenient::text")]
    pub raw_phase_details: String,
    #[serde(deserialize_with = "lenient::text")]
    pub finished_phase_details: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub quality_indicators: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub deficiencies: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub strengths: Vec<String>,
}

/// 進捗推移の1点（date は必ず非空）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    #[serde(default, serialize_with = "optional_score", skip_serializing_if = "Option::is_none")]
    pub completion: Option<f64>,
}

/// リスク
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Risk {
    #[serde(deserialize_with = "lenient::choice", skip_serializing_if = "Option::is_none")]
    pub level: Option<RiskLevel>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mitigation: String,
}

/// 所見・提言
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insights {
    #[serde(deserialize_with = "lenient::text")]
    pub ai_summary: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub risks: Vec<Risk>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub next_phase_requirements: Vec<String>,
}

/// 検証済みの進捗レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub site_info: SiteInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_analysis: Option<PhaseAnalysis>,
    pub metrics: Metrics,
    pub components: ComponentCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_analysis: Option<TradeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_details: Option<Vec<ComponentDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_observations: Option<VisualObservations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_trends: Option<Vec<TrendPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}
