//! 設定管理
//!
//! ExporterConfig 設定構造体

use serde::{Deserialize, Serialize};

use crate::error::CommonError;
use crate::types::CheckType;

/// Exporter設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// チェック対象ドメイン（必須）
    #[serde(default)]
    pub domain: Option<String>,

    /// メトリクスエンドポイントのホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// メトリクスエンドポイントのポート番号 (デフォルト: 8100)
    #[serde(default = "default_port")]
    pub port: u16,

    /// チェックに使用するノード数 (デフォルト: 7)
    #[serde(default = "default_nodes_count")]
    pub nodes_count: u32,

    /// APIリクエストの最大試行回数 (デフォルト: 3)
    #[serde(default = "default_api_retries")]
    pub api_retries: u32,

    /// チェック種別 (デフォルト: http)
    #[serde(default = "default_check_type")]
    pub check_type: CheckType,

    /// チェック間隔（秒）(デフォルト: 30)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// 結果ポーリングの上限回数 (デフォルト: 40、0で無制限)
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// check-host APIのベースURL (デフォルト: "https://check-host.net")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// デバッグログ (デフォルト: false)
    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8100
}

fn default_nodes_count() -> u32 {
    7
}

fn default_api_retries() -> u32 {
    3
}

fn default_check_type() -> CheckType {
    CheckType::Http
}

fn default_check_interval() -> u64 {
    30
}

fn default_max_poll_attempts() -> u32 {
    40
}

fn default_api_url() -> String {
    "https://check-host.net".to_string()
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            domain: None,
            host: default_host(),
            port: default_port(),
            nodes_count: default_nodes_count(),
            api_retries: default_api_retries(),
            check_type: default_check_type(),
            check_interval_secs: default_check_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            api_url: default_api_url(),
            debug: false,
        }
    }
}

impl ExporterConfig {
    /// 設定値を検証し、チェック対象ドメインを返す
    pub fn validate(&self) -> Result<&str, CommonError> {
        let domain = self
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                CommonError::Config("CHECKHOST_CHECK_DOMAIN is required".to_string())
            })?;

        if self.api_retries == 0 {
            return Err(CommonError::Config(
                "API_REQ_RETRIES must be at least 1".to_string(),
            ));
        }
        if self.nodes_count == 0 {
            return Err(CommonError::Config(
                "CHECKHOST_NODES_COUNT must be at least 1".to_string(),
            ));
        }
        if self.check_interval_secs == 0 {
            return Err(CommonError::Config(
                "CHECKHOST_CHECK_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        Ok(domain)
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
