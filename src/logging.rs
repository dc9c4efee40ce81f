//! ログ初期化
//!
//! 診断ログは tracing で標準エラーへ出力する。標準出力はレポート用。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// デフォルトのフィルタ
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "site_progress=debug,site_progress_common=debug"
    } else {
        "site_progress=info"
    }
}

/// RUST_LOG があればそちらを優先
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(false), "site_progress=info");
        assert!(default_filter(true).contains("debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false);
        init_tracing(true);
    }
}
