//! 共通型定義
//!
//! CheckType, CheckRequest, CheckRawResult, NodeMetricRecord等のコアデータ型

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CommonError;

/// check-hostノードID（例: `us1.node.check-host.net`）
pub type NodeId = String;

/// チェック種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// HTTPチェック
    Http,
    /// PINGチェック
    Ping,
}

impl CheckType {
    /// API URLで使用する文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Http => "http",
            CheckType::Ping => "ping",
        }
    }

    /// ノード1件分の結果から応答時間（秒）を集計する
    ///
    /// 戻り値は丸め前の値。失敗時は `0.0`。
    pub fn aggregate(&self, outcomes: &Value) -> f64 {
        match self {
            CheckType::Http => http_response_time(outcomes),
            CheckType::Ping => ping_average(outcomes),
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(CheckType::Http),
            "ping" => Ok(CheckType::Ping),
            other => Err(CommonError::Config(format!(
                "Unsupported check type: {}",
                other
            ))),
        }
    }
}

/// HTTPチェック: 先頭タプルのステータスが `1` のときのみ成功
///
/// タプル形式: `[status, response_time, message, http_code, ip]`
fn http_response_time(outcomes: &Value) -> f64 {
    let Some(first) = outcomes
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_array)
    else {
        return 0.0;
    };

    let succeeded = first.first().and_then(Value::as_i64) == Some(1);
    if !succeeded {
        return 0.0;
    }

    first.get(1).and_then(Value::as_f64).unwrap_or(0.0)
}

/// PINGチェック: `"OK"` の遅延合計を全件数で割る
///
/// 分母に失敗したPINGも含まれるため、失敗があると平均が小さくなる。
/// check-hostは解決済みアドレスごとに1段ネストした配列を返すので、
/// ネストしている場合は先頭のリストを使用する。
fn ping_average(outcomes: &Value) -> f64 {
    let Some(list) = outcomes.as_array() else {
        return 0.0;
    };

    let pings = match list.first() {
        Some(Value::Array(inner)) if inner.first().is_some_and(Value::is_array) => inner,
        _ => list,
    };

    if pings.is_empty() {
        return 0.0;
    }

    let ok_sum: f64 = pings
        .iter()
        .filter_map(Value::as_array)
        .filter(|ping| ping.first().and_then(Value::as_str) == Some("OK"))
        .filter_map(|ping| ping.get(1).and_then(Value::as_f64))
        .sum();

    ok_sum / pings.len() as f64
}

/// 応答時間を小数点以下3桁に丸める
pub fn round_secs(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// チェックノード情報
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// 国コード（例: "us"）
    pub country_code: String,
    /// 国名（例: "USA"）
    pub country: String,
    /// 都市名
    pub city: String,
    /// チェッカーのIPアドレス
    pub checker_ip: String,
}

/// チェック要求（check-{type} のレスポンスから生成、以後不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// check-hostのリクエストID
    pub request_id: String,
    /// 対象ノード
    pub target_nodes: BTreeMap<NodeId, NodeDescriptor>,
}

/// ポーリング中のチェック結果
///
/// 値が `None` のノードはまだ結果を報告していない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckRawResult {
    /// ノードごとの結果
    pub nodes: BTreeMap<NodeId, Option<Value>>,
}

impl CheckRawResult {
    /// 全ノードが結果を報告済みか（空配列は報告済み扱い）
    pub fn is_complete(&self) -> bool {
        self.nodes.values().all(Option::is_some)
    }

    /// 未報告ノード数
    pub fn pending_count(&self) -> usize {
        self.nodes.values().filter(|v| v.is_none()).count()
    }
}

/// ノードごとのメトリクスレコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeMetricRecord {
    /// ノードID
    pub node_id: NodeId,
    /// 国コード
    pub country_code: String,
    /// 国名（ゲージの `from` ラベル）
    pub country: String,
    /// 都市名
    pub city: String,
    /// 応答時間（秒、小数点以下3桁、失敗時は0.0）
    pub response_time_secs: f64,
}
