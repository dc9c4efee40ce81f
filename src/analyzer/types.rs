//! 推論バックエンドとの送受信型（Ollama chat API）

use serde::{Deserialize, Serialize};
use site_progress_common::{build_system_prompt, build_user_prompt};

/// サンプリング設定
///
/// 再現性と保守的な抽出を優先した固定値。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_ctx: u32,
    pub num_predict: u32,
    pub repeat_penalty: f32,
    pub seed: i64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.05,
            top_p: 0.7,
            num_ctx: 4096,
            num_predict: 2048,
            repeat_penalty: 1.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// chat リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: SamplingOptions,
}

impl ChatRequest {
    /// 2枚比較用のリクエスト（画像は Data URL プレフィックス除去済み）
    pub fn for_comparison(model: &str, options: &SamplingOptions, images: [&str; 2]) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: build_system_prompt(),
                    images: Vec::new(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: build_user_prompt(),
                    images: images.iter().map(|s| s.to_string()).collect(),
                },
            ],
            stream: false,
            options: options.clone(),
        }
    }

    /// 送信する画像データの合計サイズ
    pub fn image_bytes(&self) -> usize {
        self.messages
            .iter()
            .flat_map(|m| m.images.iter())
            .map(|img| img.len())
            .sum()
    }
}

/// content は欠損・null のどちらも空応答として扱う
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// chat レスポンス（message.content のみ使用）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

impl ChatResponse {
    pub fn into_content(self) -> String {
        self.message.and_then(|m| m.content).unwrap_or_default()
    }
}
