use clap::{Parser, Subcommand};
use site_progress_common::{OutputFormat, SiteInfo};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site-progress")]
#[command(about = "現場写真2枚から工事進捗レポートを生成", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPサービスを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// 2枚の写真を比較してレポートを出力
    Compare {
        /// 施工中（躯体）フェーズの写真
        #[arg(required = true)]
        before: PathBuf,

        /// 仕上げフェーズの写真
        #[arg(required = true)]
        after: PathBuf,

        #[command(flatten)]
        site: SiteArgs,

        /// 出力形式 (json/markdown/structured/detailed)
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 推論バックエンドの死活確認
    Health,

    /// 設定を表示/編集
    Config {
        /// 推論バックエンドURLを設定
        #[arg(long)]
        set_backend_url: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 現場情報
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// 調査日（省略時は今日）
    #[arg(long)]
    pub date: Option<String>,

    /// 現場所在地
    #[arg(long, default_value = "")]
    pub location: String,

    /// 監督者
    #[arg(long, default_value = "")]
    pub supervisor: String,

    /// 天候
    #[arg(long, default_value = "")]
    pub weather: String,
}

impl SiteArgs {
    pub fn into_site_info(self, today: &str) -> SiteInfo {
        SiteInfo {
            date: self.date.unwrap_or_else(|| today.to_string()),
            location: self.location,
            supervisor: self.supervisor,
            weather: self.weather,
        }
    }
}
