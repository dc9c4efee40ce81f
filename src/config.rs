use crate::analyzer::SamplingOptions;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 推論バックエンドURLの環境変数
pub const ENV_BACKEND_URL: &str = "SITE_PROGRESS_BACKEND_URL";
/// モデル名の環境変数
pub const ENV_MODEL: &str = "SITE_PROGRESS_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub model: String,
    pub health_timeout_seconds: u64,
    pub timeout_seconds: u64,
    pub bind_address: String,
    pub max_body_bytes: usize,
    pub sampling: SamplingOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// 設定ファイルを読み込み（環境変数は反映しない）
    ///
    /// 保存はこの値に対して行う。実行時は `effective()` を使う。
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 環境変数を反映した実行用の設定
    pub fn effective(&self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// 指定した参照元で環境変数を反映したコピー（元の値は変えない）
    pub fn with_env<F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.clone();
        config.apply_env(lookup);
        config
    }

    /// 指定パスから読み込み（無ければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("site-progress").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            backend_url: "http://localhost:11434".into(),
            model: "llava:7b".into(),
            health_timeout_seconds: 5,
            timeout_seconds: 120,
            bind_address: "127.0.0.1:3000".into(),
            max_body_bytes: 50 * 1024 * 1024,
            sampling: SamplingOptions::default(),
        }
    }

    /// 環境変数を優先
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
    }

    /// ヘルスチェックは推論より短くなければならない
    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(AppError::Config("backend_url が空です".into()));
        }
        if self.health_timeout_seconds == 0 || self.timeout_seconds == 0 {
            return Err(AppError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        if self.health_timeout_seconds >= self.timeout_seconds {
            return Err(AppError::Config(format!(
                "health_timeout_seconds ({}) は timeout_seconds ({}) より短くしてください",
                self.health_timeout_seconds, self.timeout_seconds
            )));
        }
        Ok(())
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn set_backend_url(&mut self, url: String) -> Result<()> {
        self.backend_url = url.trim_end_matches('/').to_string();
        self.save()
    }

    pub fn set_model(&mut self, model: String) -> Result<()> {
        self.model = model;
        self.save()
    }
}
