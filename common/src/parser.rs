//! 推論レスポンスパーサー
//!
//! 生のレスポンス文字列からJSONオブジェクトを切り出し、
//! 検証・正規化して StructuredReport を返す

use crate::draft::{ReportDraft, REQUIRED_KEYS};
use crate::error::ReportError;
use crate::types::{SiteInfo, StructuredReport};
use regex::Regex;
use serde_json::Value;

/// エラーに含めるプレビューの最大文字数
pub const PREVIEW_CHARS: usize = 500;

lazy_static::lazy_static! {
    // ```json / ``` などのフェンス記号（言語タグと直後の改行を含む）
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap();
}

/// 文字境界で切り詰めたプレビュー
pub fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// 前後の空白とコードフェンス記号を除去
pub fn strip_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw.trim(), "").into_owned()
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 1. 前後の空白を除去
/// 2. コードフェンス記号を除去
/// 3. 最初の `{` から最後の `}` までを候補とする
///
/// 最初の `{` が目的のオブジェクトの開始、最後の `}` がその終了と仮定する。
/// オブジェクトが複数ある場合や文字列中に括弧がある場合は誤抽出しうる。
///
/// # Examples
/// ```
/// use site_progress_common::extract_json;
///
/// let reply = "Here you go:\n```json\n{\"metrics\": {}}\n```";
/// assert_eq!(extract_json(reply).as_deref(), Some("{\"metrics\": {}}"));
/// assert_eq!(extract_json("no braces at all"), None);
/// ```
pub fn extract_json(raw: &str) -> Option<String> {
    let unfenced = strip_fences(raw);
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(unfenced[start..=end].to_string())
}

/// 抽出済みJSONを検証・正規化
///
/// - 構文エラー → MalformedJson
/// - metrics / components 欠損 → SchemaViolation
/// - components.total 再計算、推移日付補完、siteInfo 上書き
pub fn parse_report(
    span: &str,
    site_info: &SiteInfo,
    today: &str,
) -> Result<StructuredReport, ReportError> {
    let value: Value = serde_json::from_str(span).map_err(|e| ReportError::MalformedJson {
        preview: preview(span, PREVIEW_CHARS),
        diagnostic: e.to_string(),
    })?;

    let Value::Object(fields) = &value else {
        return Err(ReportError::SchemaViolation {
            details: "top-level value is not a JSON object".into(),
        });
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| fields.get(*key).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::SchemaViolation {
            details: format!("missing required keys: {}", missing.join(", ")),
        });
    }

    let draft: ReportDraft = serde_json::from_value(value).map_err(|e| {
        ReportError::SchemaViolation {
            details: format!("report structure could not be read: {}", e),
        }
    })?;

    draft.promote(site_info.clone(), today)
}

/// 生レスポンスから StructuredReport まで（空判定・抽出・検証）
///
/// 抽出失敗時のプレビューはフェンス除去後のテキスト。
pub fn process_reply(
    raw: &str,
    site_info: &SiteInfo,
    today: &str,
) -> Result<StructuredReport, ReportError> {
    if raw.trim().is_empty() {
        return Err(ReportError::EmptyResponse);
    }

    let span = extract_json(raw).ok_or_else(|| ReportError::MalformedResponse {
        preview: preview(&strip_fences(raw), PREVIEW_CHARS),
    })?;

    parse_report(&span, site_info, today)
}
