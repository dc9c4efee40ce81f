use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use site_progress::analyzer::{ComparisonPipeline, OllamaClient, PipelineSettings, TracingLogger};
use site_progress::{cli, config, logging, scanner, server};
use cli::{Cli, Commands};
use config::Config;
use site_progress_common::{ComparisonRequest, Outcome};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    // 保存用（ファイルの値）と実行用（環境変数を反映）を分ける
    let mut saved = Config::load().context("設定の読み込みに失敗")?;
    let mut config = saved.effective();

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            println!("🏗  site-progress - サービス起動: http://{}", config.bind_address);
            server::serve(&config).await?;
        }

        Commands::Compare { before, after, site, format, output } => {
            let today = chrono::Local::now().format("%Y-%m-%d").to_string();

            let request = ComparisonRequest {
                image1: scanner::load_data_url(&before)?,
                image2: scanner::load_data_url(&after)?,
                output_format: format,
                site_info: site.into_site_info(&today),
            };

            let client = OllamaClient::from_config(&config)?;
            let pipeline = Arc::new(ComparisonPipeline::new(
                client,
                TracingLogger,
                PipelineSettings::from_config(&config),
            ));

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
            spinner.set_message(format!("AI解析中 ({})...", config.model));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let outcome = pipeline.analyze(request).await;
            spinner.finish_and_clear();

            let json = serde_json::to_string_pretty(&outcome)?;
            match &output {
                Some(path) => {
                    std::fs::write(path, &json)
                        .with_context(|| format!("書き込みに失敗: {}", path.display()))?;
                    eprintln!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }

            if let Outcome::Failure(envelope) = outcome {
                bail!("{} ({})", envelope.error, envelope.kind.as_str());
            }
        }

        Commands::Health => {
            let client = OllamaClient::from_config(&config)?;
            let pipeline = ComparisonPipeline::new(
                client,
                TracingLogger,
                PipelineSettings::from_config(&config),
            );
            match pipeline.check_backend().await {
                Ok(()) => println!("✔ バックエンド稼働中: {}", config.backend_url),
                Err(e) => bail!("{}: {} ({})", e, e.details().unwrap_or_default(), e.suggestion()),
            }
        }

        Commands::Config { set_backend_url, set_model, show } => {
            if let Some(url) = set_backend_url {
                saved.set_backend_url(url)?;
                println!("✔ バックエンドURLを設定しました");
            }

            if let Some(model) = set_model {
                saved.set_model(model)?;
                println!("✔ モデルを設定しました");
            }

            if show {
                let config = saved.effective();
                println!("設定:");
                println!("  バックエンド: {}", config.backend_url);
                println!("  モデル: {}", config.model);
                println!("  ヘルスチェック: {}秒", config.health_timeout_seconds);
                println!("  推論タイムアウト: {}秒", config.timeout_seconds);
                println!("  待ち受け: {}", config.bind_address);
                println!("  最大リクエストサイズ: {} bytes", config.max_body_bytes);
                println!(
                    "  サンプリング: temperature={} top_p={} num_ctx={} num_predict={} repeat_penalty={} seed={}",
                    config.sampling.temperature,
                    config.sampling.top_p,
                    config.sampling.num_ctx,
                    config.sampling.num_predict,
                    config.sampling.repeat_penalty,
                    config.sampling.seed,
                );
            }
        }
    }

    Ok(())
}
