//! 寛容なデシリアライザ
//!
//! モデル出力は型が保証されないため、葉の値はここを通して読む。
//! 読めない値は欠損扱いにし、リクエスト全体を失敗させない。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 文字列から列挙値への寛容な変換
pub trait LooseEnum: Sized {
    fn from_loose(s: &str) -> Option<Self>;
}

/// 比較用に正規化（小文字化、空白・区切り記号の除去）
pub fn loose_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 0〜100のスコア
pub fn score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_of)
        .map(|n| n.clamp(0.0, 100.0)))
}

/// 非負の件数（小数は四捨五入、負数は0）
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_of)
        .map(|n| n.round().clamp(0.0, u32::MAX as f64) as u32))
}

/// テキスト（スカラーは文字列化、文字列配列は連結）
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => scalar_text(&other).unwrap_or_default(),
        None => String::new(),
    })
}

/// 文字列リスト（単一文字列も1要素のリストとして受ける）
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// 列挙値（未知の値は欠損）
pub fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: LooseEnum,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => T::from_loose(&s),
        _ => None,
    })
}

/// オブジェクトのセクション（形が読めなければ欠損）
pub fn section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

/// 配列のセクション（読めない要素は除外、配列でなければ欠損）
pub fn section_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// 配列（欠損時は空）
pub fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(section_list(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "score")]
        score: Option<f64>,
        #[serde(deserialize_with = "count")]
        count: Option<u32>,
        #[serde(deserialize_with = "text")]
        text: String,
        #[serde(deserialize_with = "string_list")]
        list: Vec<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_score_accepts_percent_string() {
        assert_eq!(probe(r#"{"score": "85%"}"#).score, Some(85.0));
        assert_eq!(probe(r#"{"score": " 42.5 "}"#).score, Some(42.5));
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(probe(r#"{"score": 140}"#).score, Some(100.0));
        assert_eq!(probe(r#"{"score": -3}"#).score, Some(0.0));
    }

    #[test]
    fn test_score_unreadable_is_absent() {
        assert_eq!(probe(r#"{"score": "high"}"#).score, None);
        assert_eq!(probe(r#"{"score": null}"#).score, None);
        assert_eq!(probe(r#"{}"#).score, None);
    }

    #[test]
    fn test_count_rounds_and_floors_at_zero() {
        assert_eq!(probe(r#"{"count": 2.6}"#).count, Some(3));
        assert_eq!(probe(r#"{"count": -4}"#).count, Some(0));
        assert_eq!(probe(r#"{"count": "7"}"#).count, Some(7));
    }

    #[test]
    fn test_text_from_scalars() {
        assert_eq!(probe(r#"{"text": 12}"#).text, "12");
        assert_eq!(probe(r#"{"text": ["a", "b"]}"#).text, "a; b");
        assert_eq!(probe(r#"{"text": {"x": 1}}"#).text, "");
    }

    #[test]
    fn test_string_list_shapes() {
        assert_eq!(probe(r#"{"list": ["crack", 3, null]}"#).list, vec!["crack", "3"]);
        assert_eq!(probe(r#"{"list": "single item"}"#).list, vec!["single item"]);
        assert!(probe(r#"{"list": ""}"#).list.is_empty());
        assert!(probe(r#"{"list": {"a": 1}}"#).list.is_empty());
    }

    #[test]
    fn test_loose_key() {
        assert_eq!(loose_key("In Progress"), "inprogress");
        assert_eq!(loose_key("in_progress"), "inprogress");
        assert_eq!(loose_key("in-progress"), "inprogress");
    }
}
