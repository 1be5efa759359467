//! check-host API リクエスタ
//!
//! チェック開始（`/check-{type}`）と結果取得（`/check-result/{id}`）を行う。
//! 結果が揃うまでのポーリングは [`super::mapper::CheckResultMapper`] の責務。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use checkhost_exporter_common::error::{ExporterError, ExporterResult};
use checkhost_exporter_common::protocol::decode_check_request;
use checkhost_exporter_common::types::{CheckRequest, CheckType};
use reqwest::{header::ACCEPT, Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

/// check-host APIのデフォルトベースURL
pub const DEFAULT_API_URL: &str = "https://check-host.net";

/// リトライ間隔
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// APIリクエストのタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// URLからJSONを取得する機能
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// `url` にGETリクエストを送り、レスポンスボディをJSONとして返す
    async fn fetch_json(&self, url: &str) -> ExporterResult<Value>;
}

/// reqwestによる [`JsonFetcher`] 実装（固定間隔リトライ付き）
#[derive(Clone)]
pub struct HttpJsonFetcher {
    /// 共有HTTPクライアント
    client: Client,
    /// 最大試行回数
    retries: u32,
    /// 試行間の待機時間
    retry_delay: Duration,
}

impl HttpJsonFetcher {
    /// 新しいフェッチャーを作成
    pub fn new(client: Client, retries: u32) -> Self {
        Self {
            client,
            retries: retries.max(1),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// リトライ間隔を設定
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// 最大試行回数
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// タイムアウト付きのHTTPクライアントを作成
    pub fn build_client() -> ExporterResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ExporterError::Http(e.to_string()))
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, url: &str) -> ExporterResult<Value> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(url = %url, attempt, "Request to API");

            match self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await
            {
                Ok(response) if response.status() == StatusCode::OK => {
                    match response.bytes().await {
                        Ok(body) => {
                            debug!(
                                url = %url,
                                body = %String::from_utf8_lossy(&body),
                                "Raw response from API"
                            );
                            return serde_json::from_slice(&body).map_err(|e| {
                                ExporterError::Decode(format!("{}: {}", url, e))
                            });
                        }
                        Err(e) => {
                            warn!(url = %url, attempt, error = %e, "Failed to read API response body");
                        }
                    }
                }
                Ok(response) => {
                    warn!(
                        url = %url,
                        attempt,
                        status = %response.status(),
                        "API returned non-OK status"
                    );
                }
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "API request failed");
                }
            }

            if attempt >= self.retries {
                return Err(ExporterError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                });
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

/// check-host APIリクエスタ
#[derive(Clone)]
pub struct CheckRequester {
    /// JSON取得機能
    fetcher: Arc<dyn JsonFetcher>,
    /// APIベースURL
    api_url: String,
}

impl CheckRequester {
    /// 新しいリクエスタを作成
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            fetcher,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// APIベースURLを設定
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// チェック開始URL
    ///
    /// クエリ値はエンコードされるため、ドメインに `&` や `#` を含んでも壊れない。
    pub fn check_url(
        &self,
        check_type: CheckType,
        domain: &str,
        node_count: u32,
    ) -> ExporterResult<String> {
        let mut url = Url::parse(&format!("{}/check-{}", self.api_url, check_type))
            .map_err(|e| ExporterError::Http(format!("invalid API URL {}: {}", self.api_url, e)))?;
        url.query_pairs_mut()
            .append_pair("host", &format!("https://{}", domain))
            .append_pair("max_nodes", &node_count.to_string());
        Ok(url.into())
    }

    /// チェック結果URL
    pub fn result_url(&self, request_id: &str) -> String {
        format!("{}/check-result/{}", self.api_url, request_id)
    }

    /// チェックを開始する
    pub async fn start_check(
        &self,
        check_type: CheckType,
        domain: &str,
        node_count: u32,
    ) -> ExporterResult<CheckRequest> {
        let url = self.check_url(check_type, domain, node_count)?;
        let response = self.fetcher.fetch_json(&url).await?;
        decode_check_request(response)
    }

    /// チェック結果を1回取得する（未完了のノードは `null`）
    pub async fn fetch_raw_result(&self, request_id: &str) -> ExporterResult<Value> {
        let url = self.result_url(request_id);
        self.fetcher.fetch_json(&url).await
    }
}
