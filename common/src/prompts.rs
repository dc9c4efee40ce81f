//! プロンプト生成モジュール
//!
//! 推論バックエンドに渡す固定の指示文:
//! - build_system_prompt: ペルソナ・10工種・出力スキーマ
//! - build_user_prompt: 2枚の画像に添える指示
//!
//! リクエストごとの変数は含めない（同じ入力なら同じ文字列）。

use crate::types::Trade;

/// 品質の許容値
pub const QUALITY_VALUES: &str = "Poor/Fair/Good/Excellent";
/// 状況の許容値
pub const STATUS_VALUES: &str = "completed/inProgress/pending";
/// リスクレベルの許容値
pub const RISK_LEVEL_VALUES: &str = "low/medium/high";

const PERSONA: &str = "You are a Senior Construction Project Manager and Quantity Surveyor with 25+ years of experience. Analyze these construction images and provide a comprehensive assessment.";

const IMAGE_REQUIREMENTS: &str = r#"CRITICAL ANALYSIS REQUIREMENTS:

IMAGE 1 - RAW CONSTRUCTION PHASE:
- Assess structural concrete work, blockwork progress, electrical rough-ins
- Evaluate plumbing installations, HVAC preparations, foundation quality
- Identify visible construction elements and their completion status

IMAGE 2 - FINISHED CONSTRUCTION PHASE:
- Analyze ceiling works, flooring installations, wall finishes
- Evaluate joinery work, curtain installations, glass work quality
- Assess lighting systems, furniture placement, overall completion"#;

const USER_PROMPT: &str = "Perform comprehensive construction trade analysis. Image 1: Raw construction phase with concrete work and structural elements. Image 2: Finished interior space with completed finishes. Analyze all 10 construction trades and provide realistic completion percentages and quality assessments based on visual evidence.";

fn trade_list() -> String {
    Trade::ALL
        .iter()
        .enumerate()
        .map(|(i, trade)| {
            format!(
                "{}. {} - {}",
                i + 1,
                trade.display_name().to_uppercase(),
                trade.focus()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn trade_schema() -> String {
    Trade::ALL
        .iter()
        .map(|trade| {
            format!(
                r#"    "{key}": {{
      "completionPercentage": <number 0-100>,
      "quality": "<{QUALITY_VALUES}>",
      "status": "<{STATUS_VALUES}>",
      "observations": "<specific observations>",
      "deficiencies": ["<deficiency1>", "<deficiency2>"],
      "compliance": "<compliance status>"
    }}"#,
                key = trade.key()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

fn component_detail_schema() -> String {
    Trade::ALL
        .iter()
        .map(|trade| {
            format!(
                r#"    {{"name": "{}", "status": "<{STATUS_VALUES}>", "quality": "<{QUALITY_VALUES}>"}}"#,
                trade.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// システムプロンプト生成
pub fn build_system_prompt() -> String {
    let trades = trade_list();
    let trade_schema = trade_schema();
    let component_details = component_detail_schema();

    format!(
        r#"{PERSONA}

{IMAGE_REQUIREMENTS}

TRADE-SPECIFIC ASSESSMENT (provide realistic percentages based on visual evidence):

{trades}

Return this EXACT JSON structure with realistic values based on visual analysis:

{{
  "phaseAnalysis": {{
    "rawPhaseCompletion": <number 0-100>,
    "finishedPhaseCompletion": <number 0-100>,
    "progressGap": <number 0-100>,
    "estimatedTimespan": "<string>",
    "qualityConsistency": "<string>"
  }},
  "metrics": {{
    "overallCompletion": <number 0-100>,
    "structuralIntegrity": <number 0-100>,
    "alignmentAccuracy": <number 0-100>,
    "qualityScore": <number 0-100>,
    "safetyCompliance": <number 0-100>,
    "scheduleAdherence": <number 0-100>
  }},
  "components": {{
    "completed": <number>,
    "inProgress": <number>,
    "pending": <number>,
    "total": <number>
  }},
  "tradeAnalysis": {{
{trade_schema}
  }},
  "componentDetails": [
{component_details}
  ],
  "visualObservations": {{
    "rawPhaseDetails": "<detailed description of Image 1>",
    "finishedPhaseDetails": "<detailed description of Image 2>",
    "qualityIndicators": ["<indicator1>", "<indicator2>"],
    "deficiencies": ["<deficiency1>", "<deficiency2>"],
    "strengths": ["<strength1>", "<strength2>"]
  }},
  "historicalTrends": [
    {{"date": "<YYYY-MM-DD>", "completion": <estimated_percentage>}},
    {{"date": "<YYYY-MM-DD>", "completion": <current_percentage>}}
  ],
  "insights": {{
    "aiSummary": "<comprehensive analysis based on visual evidence>",
    "recommendations": ["<recommendation1>", "<recommendation2>"],
    "risks": [
      {{
        "level": "<{RISK_LEVEL_VALUES}>",
        "description": "<risk description>",
        "mitigation": "<mitigation strategy>"
      }}
    ],
    "nextPhaseRequirements": ["<requirement1>", "<requirement2>"]
  }}
}}

Return ONLY this JSON object, with no markdown and no commentary.
Base ALL assessments on actual visual evidence from the images. Provide realistic construction industry percentages and observations."#
    )
}

/// ユーザープロンプト生成
pub fn build_user_prompt() -> String {
    USER_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_deterministic() {
        assert_eq!(build_system_prompt(), build_system_prompt());
        assert_eq!(build_user_prompt(), build_user_prompt());
    }

    #[test]
    fn test_system_prompt_lists_all_trades() {
        let prompt = build_system_prompt();
        for trade in Trade::ALL {
            assert!(prompt.contains(&format!("\"{}\": {{", trade.key())), "schema missing {}", trade.key());
            assert!(prompt.contains(&format!("\"name\": \"{}\"", trade.display_name())));
        }
        assert!(prompt.contains("10. GLASS WORK - Windows, partitions, quality assessment"));
        assert!(prompt.contains("2. ELECTRICAL WORK"));
    }

    #[test]
    fn test_system_prompt_declares_enums_and_risk_shape() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("\"quality\": \"<Poor/Fair/Good/Excellent>\""));
        assert!(prompt.contains("\"status\": \"<completed/inProgress/pending>\""));
        assert!(prompt.contains("\"level\": \"<low/medium/high>\""));
        assert!(prompt.contains("\"mitigation\""));
        assert!(prompt.contains("Return ONLY this JSON object"));
    }

    #[test]
    fn test_system_prompt_declares_required_sections() {
        let prompt = build_system_prompt();
        for key in crate::draft::REQUIRED_KEYS {
            assert!(prompt.contains(&format!("\"{}\": {{", key)));
        }
    }

    #[test]
    fn test_user_prompt_mentions_both_images() {
        let prompt = build_user_prompt();
        assert!(prompt.contains("Image 1"));
        assert!(prompt.contains("Image 2"));
    }
}
