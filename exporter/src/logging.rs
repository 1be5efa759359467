//! ロギング初期化ユーティリティ

use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, Layer,
};

/// ログ形式を切り替える環境変数（`json` でJSON行出力）
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

/// tracingサブスクライバを初期化する
///
/// `RUST_LOG` が未設定の場合、`debug` フラグに応じて DEBUG / INFO を既定とする。
pub fn init(debug: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();

    let log_layer = match var(LOG_FORMAT_ENV).unwrap_or_default().as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_filter(env_filter)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).try_init()
}

fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}
