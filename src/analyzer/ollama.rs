//! Ollama HTTPクライアント
//!
//! - GET  /api/tags : ヘルスチェック（短いタイムアウト）
//! - POST /api/chat : 2枚画像の推論（長いタイムアウト）

use super::types::{ChatRequest, ChatResponse};
use super::{BackendError, InferenceBackend};
use crate::config::Config;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    health_timeout: Duration,
    inference_timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        health_timeout: Duration,
        inference_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            health_timeout,
            inference_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.backend_url.clone(),
            config.health_timeout(),
            config.inference_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout { seconds: timeout.as_secs() }
    } else if error.is_decode() || error.is_body() {
        BackendError::Body(error.to_string())
    } else {
        BackendError::Transport(error.to_string())
    }
}

impl InferenceBackend for OllamaClient {
    async fn health_check(&self) -> std::result::Result<(), BackendError> {
        let response = self
            .http
            .get(self.endpoint("/api/tags"))
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.health_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> std::result::Result<String, BackendError> {
        let response = self
            .http
            .post(self.endpoint("/api/chat"))
            .json(request)
            .timeout(self.inference_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.inference_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| classify(e, self.inference_timeout))?;

        Ok(payload.into_content())
    }
}
