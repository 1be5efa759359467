//! チェックサイクル
//!
//! 一定間隔で「チェック開始 → 結果待ち → ゲージ更新」を1サイクルずつ実行する。
//! サイクルは重複して実行されない。

use std::sync::Arc;
use std::time::Duration;

use checkhost_exporter_common::error::ExporterResult;
use checkhost_exporter_common::types::{CheckType, NodeMetricRecord};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::checkhost::{CheckRequester, CheckResultMapper};
use crate::metrics::MetricPublisher;

/// デフォルトのチェック間隔（秒）
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;

/// デフォルトのノード数
pub const DEFAULT_NODES_COUNT: u32 = 7;

/// レート制限時の待機時間
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(600);

/// チェックサイクル
#[derive(Clone)]
pub struct CheckCycle {
    /// APIリクエスタ
    requester: Arc<CheckRequester>,
    /// 結果マッパー
    mapper: CheckResultMapper,
    /// ゲージパブリッシャー
    publisher: MetricPublisher,
    /// チェック種別
    check_type: CheckType,
    /// ノード数
    nodes_count: u32,
    /// チェック間隔（秒）
    check_interval_secs: u64,
    /// レート制限時の待機時間
    rate_limit_backoff: Duration,
}

impl CheckCycle {
    /// 新しいチェックサイクルを作成
    pub fn new(
        requester: Arc<CheckRequester>,
        mapper: CheckResultMapper,
        publisher: MetricPublisher,
    ) -> Self {
        Self {
            requester,
            mapper,
            publisher,
            check_type: CheckType::Http,
            nodes_count: DEFAULT_NODES_COUNT,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            rate_limit_backoff: RATE_LIMIT_BACKOFF,
        }
    }

    /// チェック種別とノード数を設定
    pub fn with_check(mut self, check_type: CheckType, nodes_count: u32) -> Self {
        self.check_type = check_type;
        self.nodes_count = nodes_count;
        self
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.check_interval_secs = interval_secs;
        self
    }

    /// レート制限時の待機時間を設定
    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    /// 1サイクル実行し、公開したレコードを返す
    pub async fn run_once(&self) -> ExporterResult<Vec<NodeMetricRecord>> {
        let domain = self.publisher.target_domain();

        let request = self
            .requester
            .start_check(self.check_type, domain, self.nodes_count)
            .await?;

        info!(
            request_id = %request.request_id,
            check_type = %self.check_type,
            nodes = request.target_nodes.len(),
            "Check started"
        );

        let records = self.mapper.resolve(self.check_type, &request).await?;
        self.publisher.publish(&records);

        Ok(records)
    }

    /// サイクルループ
    ///
    /// 致命的エラーのときのみ戻る。
    pub async fn run(&self) -> ExporterResult<()> {
        let mut timer = interval(Duration::from_secs(self.check_interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            domain = %self.publisher.target_domain(),
            interval_secs = self.check_interval_secs,
            "Check cycle started"
        );

        loop {
            timer.tick().await;

            match self.run_once().await {
                Ok(records) => {
                    info!(records = records.len(), "Metrics updated");
                }
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Fatal check-host API error");
                    return Err(e);
                }
                Err(e) if e.requires_backoff() => {
                    warn!(
                        error = %e,
                        backoff_secs = self.rate_limit_backoff.as_secs(),
                        "Skipping cycle, backing off"
                    );
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                Err(e) => {
                    warn!(error = %e, "Check cycle did not complete");
                }
            }
        }
    }
}
