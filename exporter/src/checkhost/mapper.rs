//! チェック結果マッパー
//!
//! 部分的に埋まったチェック結果を完了までポーリングし、
//! ノードごとの [`NodeMetricRecord`] に変換する。

use std::sync::Arc;
use std::time::Duration;

use checkhost_exporter_common::error::{ExporterError, ExporterResult};
use checkhost_exporter_common::protocol::classify_result;
use checkhost_exporter_common::types::{
    round_secs, CheckRawResult, CheckRequest, CheckType, NodeMetricRecord,
};
use tracing::debug;

use super::requester::CheckRequester;

/// 結果ポーリング間隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// 結果ポーリングのデフォルト上限回数（0で無制限）
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 40;

/// チェック結果マッパー
#[derive(Clone)]
pub struct CheckResultMapper {
    /// APIリクエスタ
    requester: Arc<CheckRequester>,
    /// ポーリング間隔
    poll_interval: Duration,
    /// ポーリング上限回数（0で無制限）
    max_poll_attempts: u32,
}

impl CheckResultMapper {
    /// 新しいマッパーを作成
    pub fn new(requester: Arc<CheckRequester>) -> Self {
        Self {
            requester,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }

    /// ポーリング間隔を設定
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// ポーリング上限回数を設定（0で無制限）
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// 結果が揃うまで待ち、ノードごとのレコードに変換する
    pub async fn resolve(
        &self,
        check_type: CheckType,
        request: &CheckRequest,
    ) -> ExporterResult<Vec<NodeMetricRecord>> {
        let raw = self.poll_until_complete(&request.request_id).await?;
        parse(check_type, request, &raw)
    }

    /// `null` のノードがなくなるまで結果を再取得する
    ///
    /// ポーリング回数はAPIリトライ回数とは別に数える。
    pub async fn poll_until_complete(&self, request_id: &str) -> ExporterResult<CheckRawResult> {
        let mut polls = 0;

        loop {
            polls += 1;
            let raw = classify_result(self.requester.fetch_raw_result(request_id).await?)?;

            if raw.is_complete() {
                debug!(request_id = %request_id, polls, "Check result complete");
                return Ok(raw);
            }

            debug!(
                request_id = %request_id,
                polls,
                pending = raw.pending_count(),
                "Incomplete check result, polling again"
            );

            if self.max_poll_attempts > 0 && polls >= self.max_poll_attempts {
                return Err(ExporterError::Timeout { attempts: polls });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// チェック結果をノードごとのレコードに変換する
///
/// 要求に含まれないノードは無視する。要求ノードが結果に存在しない場合は
/// `MalformedResult`、まだ `null` のノードはレコードを生成しない。
pub fn parse(
    check_type: CheckType,
    request: &CheckRequest,
    raw: &CheckRawResult,
) -> ExporterResult<Vec<NodeMetricRecord>> {
    let mut records = Vec::with_capacity(request.target_nodes.len());

    for (node_id, node) in &request.target_nodes {
        let outcomes = match raw.nodes.get(node_id) {
            Some(Some(outcomes)) => outcomes,
            Some(None) => continue,
            None => {
                return Err(ExporterError::MalformedResult(format!(
                    "node {} missing from check result",
                    node_id
                )))
            }
        };

        let response_time_secs = round_secs(check_type.aggregate(outcomes));
        debug!(
            node_id = %node_id,
            country = %node.country,
            response_time_secs,
            "Node check result"
        );

        records.push(NodeMetricRecord {
            node_id: node_id.clone(),
            country_code: node.country_code.clone(),
            country: node.country.clone(),
            city: node.city.clone(),
            response_time_secs,
        });
    }

    Ok(records)
}
