//! Checkhost Exporter
//!
//! check-host.net のチェック結果をPrometheusゲージとして公開するサーバー

#![warn(missing_docs)]

/// メトリクスエンドポイント
pub mod api;

/// check-host APIクライアント（チェック開始・結果ポーリング）
pub mod checkhost;

/// CLIインターフェース
pub mod cli;

/// 定期チェックサイクル
pub mod cycle;

/// ロギング初期化ユーティリティ
pub mod logging;

/// ゲージ公開
pub mod metrics;

/// axumサーバー起動
pub mod server;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// `request_time` ゲージ
    pub gauge: metrics::PrometheusGauge,
}
