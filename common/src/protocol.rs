//! 通信プロトコル定義
//!
//! check-host.net API のレスポンス形式とデコード処理
//!
//! - `GET /check-{type}?host=...&max_nodes=N` → [`StartCheckResponse`]
//! - `GET /check-result/{request_id}` → ノードIDをキーとするオブジェクト
//!
//! どちらのエンドポイントも、クォータ超過時はノード別のオブジェクトではなく
//! `{"error": "limit_exceeded"}` のようなフラットなエラーオブジェクトを返す。

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ExporterError, ExporterResult};
use crate::types::{CheckRawResult, CheckRequest, NodeDescriptor};

/// レート制限を示すセンチネル値
pub const RATE_LIMIT_SENTINEL: &str = "limit_exceeded";

/// チェック開始レスポンス
///
/// `ok` や `permanent_link` など、使用しないキーは読み捨てる。
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckResponse {
    /// リクエストID
    pub request_id: String,
    /// ノードID → `[country_code, country, city, ip, asn]`
    pub nodes: BTreeMap<String, Vec<Value>>,
}

/// レスポンスがレート制限エラーか判定する
///
/// 専用のステータスフィールドは存在しないため、トップレベルの値に
/// センチネル文字列が含まれているかで判定する。
pub fn is_rate_limited(response: &Value) -> bool {
    response
        .as_object()
        .is_some_and(|map| map.values().any(|v| v.as_str() == Some(RATE_LIMIT_SENTINEL)))
}

/// ノード情報配列をデコードする（先頭4要素のみ使用）
pub fn decode_node_descriptor(node_id: &str, fields: &[Value]) -> ExporterResult<NodeDescriptor> {
    let field = |index: usize| -> ExporterResult<String> {
        fields
            .get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ExporterError::MalformedResult(format!(
                    "node {} descriptor is missing field #{}",
                    node_id, index
                ))
            })
    };

    Ok(NodeDescriptor {
        country_code: field(0)?,
        country: field(1)?,
        city: field(2)?,
        checker_ip: field(3)?,
    })
}

/// チェック開始レスポンスを `CheckRequest` にデコードする
pub fn decode_check_request(response: Value) -> ExporterResult<CheckRequest> {
    if is_rate_limited(&response) {
        return Err(ExporterError::RateLimited);
    }

    let start: StartCheckResponse = serde_json::from_value(response)
        .map_err(|e| ExporterError::MalformedResult(format!("start check response: {}", e)))?;

    let target_nodes = start
        .nodes
        .iter()
        .map(|(id, fields)| Ok((id.clone(), decode_node_descriptor(id, fields)?)))
        .collect::<ExporterResult<BTreeMap<_, _>>>()?;

    Ok(CheckRequest {
        request_id: start.request_id,
        target_nodes,
    })
}

/// チェック結果レスポンスを分類する
///
/// - レート制限オブジェクト → `RateLimited`
/// - オブジェクト以外 → `MalformedResult`
/// - それ以外 → ノード別の `CheckRawResult`（`null` は未報告）
pub fn classify_result(response: Value) -> ExporterResult<CheckRawResult> {
    if is_rate_limited(&response) {
        return Err(ExporterError::RateLimited);
    }

    match response {
        Value::Object(map) => Ok(CheckRawResult {
            nodes: map
                .into_iter()
                .map(|(id, value)| {
                    let value = if value.is_null() { None } else { Some(value) };
                    (id, value)
                })
                .collect(),
        }),
        other => Err(ExporterError::MalformedResult(format!(
            "check result is not an object: {}",
            other
        ))),
    }
}
