//! CLI module for checkhost-exporter
//!
//! コマンドライン引数と環境変数から設定を読み込む。

use checkhost_exporter_common::config::ExporterConfig;
use checkhost_exporter_common::types::CheckType;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};

/// Checkhost Exporter - check-host.net の応答時間をPrometheusメトリクスとして公開
#[derive(Parser, Debug, Clone)]
#[command(name = "checkhost-exporter")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    CHECKHOST_CHECK_DOMAIN          Target domain (required)
    CHECKHOST_EXPORTER_HOST         Bind address (default: 0.0.0.0)
    CHECKHOST_EXPORTER_PORT         Listen port (default: 8100)
    CHECKHOST_NODES_COUNT           Number of check-host nodes (default: 7)
    API_REQ_RETRIES                 API request attempts (default: 3)
    CHECKHOST_CHECK_TYPE            http or ping (default: http)
    CHECKHOST_CHECK_INTERVAL_SECS   Seconds between checks (default: 30)
    CHECKHOST_MAX_POLL_ATTEMPTS     Result polls per check, 0 = unbounded (default: 40)
    CHECKHOST_API_URL               check-host API base URL
    CHECKHOST_EXPORTER_DEBUG        Enable debug logging (any value but 0/false/no/off)
    RUST_LOG_FORMAT                 Set to "json" for JSON logs
"#)]
pub struct Cli {
    /// Target domain to check
    #[arg(short, long, env = "CHECKHOST_CHECK_DOMAIN")]
    pub domain: Option<String>,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "CHECKHOST_EXPORTER_HOST")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value = "8100", env = "CHECKHOST_EXPORTER_PORT")]
    pub port: u16,

    /// Number of check-host nodes per check
    #[arg(short, long, default_value = "7", env = "CHECKHOST_NODES_COUNT")]
    pub nodes: u32,

    /// API request attempts before giving up
    #[arg(long, default_value = "3", env = "API_REQ_RETRIES")]
    pub retries: u32,

    /// Check type (http or ping)
    #[arg(long, default_value = "http", env = "CHECKHOST_CHECK_TYPE")]
    pub check_type: CheckType,

    /// Seconds between checks
    #[arg(long, default_value = "30", env = "CHECKHOST_CHECK_INTERVAL_SECS")]
    pub interval_secs: u64,

    /// Result polls per check (0 = unbounded)
    #[arg(long, default_value = "40", env = "CHECKHOST_MAX_POLL_ATTEMPTS")]
    pub max_poll_attempts: u32,

    /// check-host API base URL
    #[arg(long, default_value = "https://check-host.net", env = "CHECKHOST_API_URL")]
    pub api_url: String,

    /// Enable debug logging
    #[arg(
        long,
        env = "CHECKHOST_EXPORTER_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub debug: bool,
}

impl Cli {
    /// 設定構造体に変換
    pub fn into_config(self) -> ExporterConfig {
        ExporterConfig {
            domain: self.domain,
            host: self.host,
            port: self.port,
            nodes_count: self.nodes,
            api_retries: self.retries,
            check_type: self.check_type,
            check_interval_secs: self.interval_secs,
            max_poll_attempts: self.max_poll_attempts,
            api_url: self.api_url,
            debug: self.debug,
        }
    }
}
